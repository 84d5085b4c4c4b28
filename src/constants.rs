//! Defaults taken from the production Aloom event and the downstream importer.
//! Every value here can be overridden through `config.toml`.

pub const DEFAULT_API_BASE_URL: &str = "https://tms.aloom.de";
pub const EVENT_ENDPOINT_PATH: &str = "/eventapi/geteventfull";
pub const AUTH_HEADER: &str = "X-Auth-Token";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Column layout expected by the bulk user import. Must match `CsvRow` field order.
pub const CSV_HEADER: &str = "username,firstname,lastname,email,profile_field_unternehmen,profile_field_userimport,course1,group1,cohort1";

pub const DEFAULT_IMPORT_MARKER: &str = "automatisch";

// Profile fields written through the user directory
pub const PROFILE_FIELD_IMPORT: &str = "userimport";
pub const PROFILE_FIELD_COMPANY: &str = "unternehmen";

// Selection questions, one per track
pub const TRACK1_SELECTION_QUESTION: i64 = 706587;
pub const TRACK2_SELECTION_QUESTION: i64 = 706592;
pub const TRACK3_SELECTION_QUESTION: i64 = 709655;

// Identity questions
pub const FIRST_NAME_QUESTION: i64 = 706576;
pub const LAST_NAME_QUESTION: i64 = 706575;
pub const EMAIL_QUESTION: i64 = 706578;

/// "Termin stornieren" options for tracks 1..3
pub const CANCELLATION_OPTIONS: [i64; 3] = [582946, 582947, 582948];
/// "Bitte wählen Sie einen neuen Termin" options for tracks 1..3
pub const RESCHEDULE_PLACEHOLDER_OPTIONS: [i64; 3] = [596675, 596676, 596677];

// Language tags as delivered in `option_conditions[1].param`
pub const LANGUAGE_GERMAN: &str = "deutsch";
pub const LANGUAGE_ENGLISH: &str = "englisch";

// Environment overrides
pub const ENV_TOKEN: &str = "ALOOM_TOKEN";
pub const ENV_EVENT_ID: &str = "ALOOM_EVENT_ID";
pub const ENV_BASE_URL: &str = "ALOOM_BASE_URL";
pub const ENV_CA_CERT: &str = "ALOOM_CA_CERT";
