use aloom_import::app::ports::EventSource;
use aloom_import::infra::http_client::FileEventSource;
use aloom_import::output::{payload_digest, persist_feed};
use aloom_import::{Config, FeedAssembler};
use std::fs;
use tempfile::tempdir;

#[tokio::test]
async fn test_feed_and_manifest_written() {
    let source = FileEventSource::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/event.json"));
    let fetched = source.fetch_event().await.unwrap();

    let mut config = Config::default();
    config.api.event_id = "4711".into();
    let feed = FeedAssembler::assemble(&fetched.payload, &config, None).unwrap();

    let dir = tempdir().unwrap();
    let persisted = persist_feed(&feed, &fetched.raw, &config, dir.path()).unwrap();

    assert_eq!(fs::read_to_string(&persisted.csv_path).unwrap(), feed.csv);

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&persisted.manifest_path).unwrap()).unwrap();
    assert_eq!(manifest["event_id"], "4711");
    assert_eq!(manifest["rows"], 2);
    assert_eq!(manifest["total_attendees"], 3);
    assert_eq!(manifest["skipped"][0]["index"], 1);
    assert_eq!(manifest["skipped"][0]["kind"], "unresolved_choice");
    assert_eq!(manifest["payload_sha256"], payload_digest(&fetched.raw));
    assert_eq!(manifest["import_policy"]["encoding"], "UTF-8");
    assert_eq!(manifest["import_policy"]["no_email_duplicates"], true);
}
