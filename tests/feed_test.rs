use aloom_import::app::ports::UserDirectory;
use aloom_import::constants::CSV_HEADER;
use aloom_import::infra::in_memory_directory::InMemoryUserDirectory;
use aloom_import::pipeline::processing::GroupCatalogExtractor;
use aloom_import::types::{EventPayload, Track};
use aloom_import::{Config, FeedAssembler, ImportError};
use serde_json::{json, Value};

fn fixture() -> EventPayload {
    serde_json::from_str(include_str!("fixtures/event.json")).unwrap()
}

fn payload(value: Value) -> EventPayload {
    serde_json::from_value(value).unwrap()
}

fn group_option(label: &str, id: i64, lang: &str) -> Value {
    json!({"label": label, "option_conditions": [{"option_id": id}, {"param": lang}]})
}

fn person(first: &str, last: &str, email: &str, choices: &[(i64, i64)]) -> Value {
    let mut answers = vec![
        json!({"question_id": 706576, "value": first}),
        json!({"question_id": 706575, "value": last}),
        json!({"question_id": 706578, "value": email}),
    ];
    answers.extend(
        choices
            .iter()
            .map(|(q, o)| json!({"value": {"question_id": q, "option_id": o}})),
    );
    json!({ "answers": answers })
}

fn questions() -> Value {
    json!([
        {"label": "Managing Organizations", "options": [
            group_option("Gruppe I-1 (DE)", 100, "deutsch"),
            group_option("Gruppe I-2 (EN)", 101, "englisch"),
        ]},
        {"label": "Managing a Business - a Function", "options": [
            group_option("Gruppe II-1 (DE)", 200, "deutsch"),
            group_option("Gruppe II-2 (EN)", 201, "englisch"),
        ]},
        {"label": "Managing a Team - a Project", "options": [
            group_option("Gruppe III-1 (DE)", 300, "deutsch"),
            group_option("Gruppe III-2 (EN)", 301, "englisch"),
        ]},
    ])
}

#[test]
fn test_fixture_feed_is_byte_exact() {
    let feed = FeedAssembler::assemble(&fixture(), &Config::default(), None).unwrap();

    let expected = format!(
        "{CSV_HEADER}\n\
         john.smith@example.com,John,Smith,John.Smith@Example.COM,example.com,automatisch,Formel P1: Organizations (ENG),Gruppe I-2 ,example.com\n\
         petra@firma.de,Petra,Beispiel,petra@firma.de,firma.de,automatisch,Formel P2: Business/Function (DE),Gruppe II-1 ,firma.de"
    );
    assert_eq!(feed.csv, expected);
    assert_eq!(feed.total_attendees, 3);
    assert_eq!(feed.skip_count(), 1);
    assert_eq!(feed.skipped[0].index, 1);
    assert_eq!(feed.skipped[0].kind, "unresolved_choice");
    assert_eq!(feed.catalog.skipped_options(), 1);
}

#[test]
fn test_skip_and_continue_preserves_order() {
    let p = payload(json!({"data": {"questions": questions(), "attendees": [
        person("Zoe", "Last", "zoe@z.de", &[(709655, 300)]),
        person("Nobody", "Valid", "nobody@n.de", &[]),
        person("Adam", "First", "adam@a.de", &[(706587, 101)]),
    ]}}));

    let feed = FeedAssembler::assemble(&p, &Config::default(), None).unwrap();
    assert_eq!(feed.rows.len(), 2);
    assert_eq!(feed.rows[0].firstname, "Zoe");
    assert_eq!(feed.rows[1].firstname, "Adam");
    assert_eq!(feed.skip_count(), 1);
    assert_eq!(feed.skipped[0].index, 1);
    assert!(feed.csv.starts_with(CSV_HEADER));
    assert_eq!(feed.csv.lines().count(), 3);
}

#[test]
fn test_every_catalog_entry_round_trips() {
    let config = Config::default();
    let p = payload(json!({"data": {"questions": questions(), "attendees": []}}));
    let catalog = GroupCatalogExtractor::extract(&p, &config).unwrap();
    assert_eq!(catalog.len(), 6);

    for track in Track::ALL {
        for entry in catalog.entries(track) {
            let selection = config.track(track).selection_question_id;
            let single = payload(json!({"data": {"questions": questions(), "attendees": [
                person("A", "B", "a@b.de", &[(selection, entry.option_id)]),
            ]}}));
            let feed = FeedAssembler::assemble(&single, &config, None).unwrap();
            assert_eq!(feed.rows.len(), 1, "option {}", entry.option_id);

            let expected_course = match entry.language {
                aloom_import::types::Language::German => &config.track(track).course_shortname_de,
                aloom_import::types::Language::English => &config.track(track).course_shortname_en,
            };
            assert_eq!(&feed.rows[0].course_shortname, expected_course);
            assert_eq!(feed.rows[0].group_name, entry.name);
        }
    }
}

#[test]
fn test_cancellation_in_one_track_booking_in_another() {
    let p = payload(json!({"data": {"questions": questions(), "attendees": [
        person("A", "B", "a@b.de", &[(706592, 201), (706587, 582946)]),
        person("C", "D", "c@d.de", &[(706587, 596675), (709655, 300)]),
    ]}}));
    let feed = FeedAssembler::assemble(&p, &Config::default(), None).unwrap();
    assert_eq!(feed.rows[0].course_shortname, "Formel P2: Business/Function (ENG)");
    assert_eq!(feed.rows[1].course_shortname, "Formel P3: Team/Project (DE)");
}

#[test]
fn test_missing_identity_skips_attendee() {
    let p = payload(json!({"data": {"questions": questions(), "attendees": [
        {"answers": [
            {"question_id": 706576, "value": "Only"},
            {"value": {"question_id": 706587, "option_id": 100}},
        ]},
        "garbage",
    ]}}));
    let feed = FeedAssembler::assemble(&p, &Config::default(), None).unwrap();
    assert!(feed.rows.is_empty());
    assert_eq!(feed.csv, CSV_HEADER);
    assert_eq!(feed.skipped[0].kind, "missing_identity_field");
    assert_eq!(feed.skipped[1].kind, "unresolved_choice");
}

#[test]
fn test_broken_question_entry_is_not_fatal() {
    let mut with_null = vec![Value::Null];
    with_null.extend(questions().as_array().cloned().unwrap_or_default());
    let p = payload(json!({"data": {"questions": with_null, "attendees": [
        person("Adam", "First", "adam@a.de", &[(706587, 101)]),
    ]}}));

    let feed = FeedAssembler::assemble(&p, &Config::default(), None).unwrap();
    assert_eq!(feed.catalog.len(), 6);
    assert_eq!(feed.rows.len(), 1);
    assert_eq!(feed.rows[0].course_shortname, "Formel P1: Organizations (ENG)");
}

#[test]
fn test_missing_structure_is_fatal() {
    let no_questions = payload(json!({"data": {"attendees": []}}));
    assert!(matches!(
        FeedAssembler::assemble(&no_questions, &Config::default(), None),
        Err(ImportError::MalformedSchema(_))
    ));

    let no_attendees = payload(json!({"data": {"questions": []}}));
    assert!(matches!(
        FeedAssembler::assemble(&no_attendees, &Config::default(), None),
        Err(ImportError::MalformedSchema(_))
    ));

    let no_data = payload(json!({"error": "invalid token"}));
    assert!(FeedAssembler::assemble(&no_data, &Config::default(), None).is_err());
}

#[test]
fn test_configured_tracks_drive_mapping() {
    let mut config = Config::default();
    config.tracks[0].selection_question_id = 1;
    config.tracks[0].course_shortname_de = "ORG-DE".into();
    let p = payload(json!({"data": {"questions": questions(), "attendees": [
        person("A", "B", "a@b.de", &[(1, 100)]),
        person("C", "D", "c@d.de", &[(706587, 100)]),
    ]}}));
    let feed = FeedAssembler::assemble(&p, &config, None).unwrap();
    assert_eq!(feed.rows.len(), 1);
    assert_eq!(feed.rows[0].course_shortname, "ORG-DE");
}

#[test]
fn test_profile_updates_are_gated_and_idempotent() {
    let directory = InMemoryUserDirectory::new();
    let petra = directory.add_user("petra@firma.de");

    let disabled = FeedAssembler::assemble(&fixture(), &Config::default(), Some(&directory)).unwrap();
    assert_eq!(disabled.profiles_updated, 0);
    assert!(directory.profile(petra).is_empty());

    let mut config = Config::default();
    config.feed.update_existing_profiles = true;
    let first = FeedAssembler::assemble(&fixture(), &config, Some(&directory)).unwrap();
    let snapshot = directory.profile(petra);
    let second = FeedAssembler::assemble(&fixture(), &config, Some(&directory)).unwrap();

    assert_eq!(first.profiles_updated, 1);
    assert_eq!(second.profiles_updated, 1);
    assert_eq!(first.csv, second.csv);
    assert_eq!(directory.profile(petra), snapshot);
    assert_eq!(snapshot.get("userimport").map(String::as_str), Some("automatisch"));
    assert_eq!(snapshot.get("unternehmen").map(String::as_str), Some("firma.de"));
    assert_eq!(directory.find_by_email("anna@firma.de").unwrap(), None);
}
