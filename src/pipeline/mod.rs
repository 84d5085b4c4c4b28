// Feed generation: one pass over an event payload, producing the import CSV

pub mod processing;

use crate::app::ports::UserDirectory;
use crate::config::Config;
use crate::constants::CSV_HEADER;
use crate::error::{ImportError, Result};
use crate::types::{Attendee, EventPayload};
use metrics::counter;
use processing::{
    ChoiceResolver, CsvRow, CsvRowBuilder, EnrollmentMapper, GroupCatalog, GroupCatalogExtractor,
};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

/// An attendee that produced no row, with the reason.
#[derive(Debug, Serialize)]
pub struct SkippedAttendee {
    /// Position in `data.attendees`
    pub index: usize,
    pub reason: String,
    pub kind: &'static str,
}

/// Result of a complete feed run
#[derive(Debug, Serialize)]
pub struct Feed {
    pub csv: String,
    pub rows: Vec<CsvRow>,
    pub skipped: Vec<SkippedAttendee>,
    pub total_attendees: usize,
    pub profiles_updated: usize,
    #[serde(skip)]
    pub catalog: GroupCatalog,
}

impl Feed {
    pub fn skip_count(&self) -> usize {
        self.skipped.len()
    }
}

pub struct FeedAssembler;

impl FeedAssembler {
    /// Builds the catalog once, then maps every attendee in input order.
    ///
    /// Only a payload without questions or attendees fails the run; every
    /// per-attendee failure is recorded in `Feed::skipped` and the run goes on.
    /// When `directory` is given and `feed.update_existing_profiles` is set,
    /// existing accounts get their import marker and company domain refreshed.
    #[instrument(skip_all)]
    pub fn assemble(
        payload: &EventPayload,
        config: &Config,
        directory: Option<&dyn UserDirectory>,
    ) -> Result<Feed> {
        counter!("aloom_feed_runs_total").increment(1);

        let catalog = GroupCatalogExtractor::extract(payload, config)?;
        let attendees = payload
            .data
            .as_ref()
            .and_then(|data| data.attendees.as_ref())
            .ok_or_else(|| ImportError::MalformedSchema("data.attendees is missing".into()))?;
        if catalog.is_empty() {
            warn!("Group catalog is empty; no attendee can be enrolled");
        }

        let directory = directory.filter(|_| config.feed.update_existing_profiles);

        let mut csv = String::from(CSV_HEADER);
        let mut rows = Vec::new();
        let mut skipped = Vec::new();
        let mut profiles_updated = 0;

        for (index, attendee) in attendees.iter().enumerate() {
            match Self::process_attendee(attendee, &catalog, config) {
                Ok(row) => {
                    if let Some(directory) = directory {
                        match CsvRowBuilder::sync_profile(&row, directory) {
                            Ok(true) => profiles_updated += 1,
                            Ok(false) => {}
                            Err(e) => warn!(index, "Profile update failed: {}", e),
                        }
                    }
                    csv.push('\n');
                    csv.push_str(&row.to_csv_line());
                    rows.push(row);
                }
                Err(e) => {
                    match &e {
                        ImportError::UnknownOption(_) => error!(index, "Catalog inconsistency: {}", e),
                        _ => warn!(index, kind = e.kind(), "Skipping attendee: {}", e),
                    }
                    counter!("aloom_feed_skipped_total", "reason" => e.kind()).increment(1);
                    skipped.push(SkippedAttendee { index, reason: e.to_string(), kind: e.kind() });
                }
            }
        }

        counter!("aloom_feed_rows_total").increment(rows.len() as u64);
        info!(
            "Assembled feed: {} rows, {} skipped of {} attendees",
            rows.len(),
            skipped.len(),
            attendees.len()
        );

        Ok(Feed {
            csv,
            rows,
            skipped,
            total_attendees: attendees.len(),
            profiles_updated,
            catalog,
        })
    }

    fn process_attendee(attendee: &Attendee, catalog: &GroupCatalog, config: &Config) -> Result<CsvRow> {
        let choice = ChoiceResolver::resolve(attendee, config, &config.feed.suppressed_option_ids, catalog)
            .ok_or(ImportError::UnresolvedChoice)?;
        let enrollment = EnrollmentMapper::map(&choice, catalog, config)?;
        CsvRowBuilder::build(attendee, &enrollment, config)
    }
}
