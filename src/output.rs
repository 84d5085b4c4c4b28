//! Persistence of a finished feed: the CSV handed to the bulk importer and a
//! JSON manifest describing the run.

use crate::config::{Config, ImportPolicy};
use crate::error::Result;
use crate::pipeline::{Feed, SkippedAttendee};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct FeedManifest<'a> {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub event_id: &'a str,
    pub payload_sha256: String,
    pub csv_file: String,
    pub total_attendees: usize,
    pub rows: usize,
    pub skipped: &'a [SkippedAttendee],
    pub profiles_updated: usize,
    /// Settings the downstream importer must apply unchanged
    pub import_policy: &'a ImportPolicy,
}

/// Paths of the files written by [`persist_feed`].
#[derive(Debug)]
pub struct PersistedFeed {
    pub csv_path: PathBuf,
    pub manifest_path: PathBuf,
}

pub fn payload_digest(raw: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw);
    hex::encode(hasher.finalize())
}

/// Writes `aloom_feed_<timestamp>.csv` and its `.manifest.json` into `output_dir`.
pub fn persist_feed(feed: &Feed, raw_payload: &[u8], config: &Config, output_dir: &Path) -> Result<PersistedFeed> {
    fs::create_dir_all(output_dir)?;

    let generated_at = Utc::now();
    let stem = format!("aloom_feed_{}", generated_at.format("%Y%m%d_%H%M%S"));
    let csv_path = output_dir.join(format!("{stem}.csv"));
    let manifest_path = output_dir.join(format!("{stem}.manifest.json"));

    fs::write(&csv_path, feed.csv.as_bytes())?;

    let manifest = FeedManifest {
        run_id: Uuid::new_v4(),
        generated_at,
        event_id: &config.api.event_id,
        payload_sha256: payload_digest(raw_payload),
        csv_file: csv_path.to_string_lossy().to_string(),
        total_attendees: feed.total_attendees,
        rows: feed.rows.len(),
        skipped: &feed.skipped,
        profiles_updated: feed.profiles_updated,
        import_policy: &config.import_policy,
    };
    fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;

    Ok(PersistedFeed { csv_path, manifest_path })
}
