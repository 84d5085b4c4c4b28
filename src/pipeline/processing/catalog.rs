//! Group catalog extraction.
//!
//! The event questionnaire contains one date-selection question per track. Its
//! options whose labels carry the track's group prefix ("Gruppe II-3 ...") are
//! the groups attendees can be enrolled in. Each such option yields a
//! [`GroupEntry`] with the truncated label, the option id and the course language.

use crate::config::Config;
use crate::error::{ImportError, Result};
use crate::types::{EventPayload, Language, Question, QuestionOption, Track};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupEntry {
    pub name: String,
    pub option_id: i64,
    pub language: Language,
}

/// Groups per track, in questionnaire order. Built once per run, read-only afterwards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupCatalog {
    tracks: [Vec<GroupEntry>; 3],
    /// Options that looked like groups but lacked id or language
    #[serde(skip)]
    skipped_options: usize,
}

impl GroupCatalog {
    pub fn entries(&self, track: Track) -> &[GroupEntry] {
        &self.tracks[track.index()]
    }

    /// First entry carrying `option_id`, searching tracks in order.
    pub fn find(&self, option_id: i64) -> Option<(Track, &GroupEntry)> {
        Track::ALL.into_iter().find_map(|track| {
            self.entries(track)
                .iter()
                .find(|entry| entry.option_id == option_id)
                .map(|entry| (track, entry))
        })
    }

    pub fn contains(&self, option_id: i64) -> bool {
        self.find(option_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tracks.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn skipped_options(&self) -> usize {
        self.skipped_options
    }
}

pub struct GroupCatalogExtractor;

impl GroupCatalogExtractor {
    /// Builds the catalog from `data.questions`.
    ///
    /// Fails with `MalformedSchema` only when the questions list is missing;
    /// an empty list produces an empty catalog. Broken options are skipped.
    pub fn extract(payload: &EventPayload, config: &Config) -> Result<GroupCatalog> {
        let questions = payload
            .data
            .as_ref()
            .and_then(|data| data.questions.as_ref())
            .ok_or_else(|| ImportError::MalformedSchema("data.questions is missing".into()))?;

        let mut tracks: [Vec<GroupEntry>; 3] = Default::default();
        let mut skipped_options = 0;

        for question in questions {
            let Some(track) = Self::match_track(question, config) else {
                continue;
            };
            debug!(%track, label = question.label.as_deref().unwrap_or_default(), "Found selection question");

            for option in &question.options {
                match Self::entry_for_option(option, track) {
                    Ok(Some(entry)) => tracks[track.index()].push(entry),
                    Ok(None) => {}
                    Err(e) => {
                        warn!(%track, "Skipping option: {}", e);
                        skipped_options += 1;
                    }
                }
            }
        }

        for track in Track::ALL {
            let mut seen = HashSet::new();
            for entry in &tracks[track.index()] {
                if !seen.insert(entry.option_id) {
                    warn!(%track, option_id = entry.option_id, "Duplicate option id in catalog; first entry wins");
                }
            }
        }

        if skipped_options > 0 {
            metrics::counter!("aloom_catalog_options_skipped_total").increment(skipped_options as u64);
        }
        info!(
            track1 = tracks[0].len(),
            track2 = tracks[1].len(),
            track3 = tracks[2].len(),
            skipped_options,
            "Built group catalog"
        );
        Ok(GroupCatalog { tracks, skipped_options })
    }

    /// First track whose marker occurs in the question label.
    fn match_track(question: &Question, config: &Config) -> Option<Track> {
        let label = question.label.as_deref()?;
        Track::ALL
            .into_iter()
            .find(|track| label.contains(config.track(*track).catalog_label_marker.as_str()))
    }

    /// `Ok(None)` for options that are not groups of `track`.
    fn entry_for_option(option: &QuestionOption, track: Track) -> Result<Option<GroupEntry>> {
        let Some(label) = option.label.as_deref() else {
            return Ok(None);
        };
        if prefix_owner(label) != Some(track) {
            return Ok(None);
        }

        let malformed = |reason: &str| ImportError::MalformedOption {
            label: label.to_string(),
            reason: reason.to_string(),
        };
        let option_id = option
            .condition(0)
            .and_then(|condition| condition.option_id)
            .ok_or_else(|| malformed("option_conditions[0].option_id missing"))?;
        let param = option
            .condition(1)
            .and_then(|condition| condition.param.as_deref())
            .ok_or_else(|| malformed("option_conditions[1].param missing"))?;
        let language = Language::parse(param).ok_or_else(|| malformed(&format!("unknown language '{param}'")))?;

        Ok(Some(GroupEntry {
            name: label.chars().take(track.group_name_width()).collect(),
            option_id,
            language,
        }))
    }
}

/// Track whose group prefix is the longest one found in `label`, so that
/// "Gruppe II-1" belongs to track 2 even though it contains "Gruppe I".
fn prefix_owner(label: &str) -> Option<Track> {
    Track::ALL
        .into_iter()
        .filter(|track| label.contains(track.group_prefix()))
        .max_by_key(|track| track.group_prefix().len())
}
