use crate::constants::*;
use crate::error::{ImportError, Result};
use crate::types::Track;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Run configuration, loaded once and handed to every component by reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub tracks: [TrackConfig; 3],
    pub identity: IdentityQuestions,
    pub feed: FeedConfig,
    pub import_policy: ImportPolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: String,
    pub event_id: String,
    /// PEM file trusted in addition to the system roots
    pub ca_cert_path: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackConfig {
    pub selection_question_id: i64,
    /// Substring identifying the track's date-selection question in the catalog
    pub catalog_label_marker: String,
    pub course_shortname_de: String,
    pub course_shortname_en: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityQuestions {
    pub first_name_question_id: i64,
    pub last_name_question_id: i64,
    pub email_question_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Options meaning "no active selection": cancellations and re-selection placeholders
    pub suppressed_option_ids: BTreeSet<i64>,
    pub import_marker: String,
    pub update_existing_profiles: bool,
}

/// Flags the downstream bulk importer must run with. Carried through unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportPolicy {
    pub encoding: String,
    pub delimiter: String,
    pub password_new: bool,
    pub suspend_missing: bool,
    pub no_email_duplicates: bool,
    pub standard_usernames: bool,
    pub allow_renames: bool,
    pub allow_deletes: bool,
    pub auth: String,
    pub lang: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            tracks: [
                TrackConfig {
                    selection_question_id: TRACK1_SELECTION_QUESTION,
                    catalog_label_marker: "Managing Organizations".into(),
                    course_shortname_de: "Formel P1: Organizations (DE)".into(),
                    course_shortname_en: "Formel P1: Organizations (ENG)".into(),
                },
                TrackConfig {
                    selection_question_id: TRACK2_SELECTION_QUESTION,
                    catalog_label_marker: "Managing a Business - a Function".into(),
                    course_shortname_de: "Formel P2: Business/Function (DE)".into(),
                    course_shortname_en: "Formel P2: Business/Function (ENG)".into(),
                },
                TrackConfig {
                    selection_question_id: TRACK3_SELECTION_QUESTION,
                    catalog_label_marker: "Managing a Team - a Project".into(),
                    course_shortname_de: "Formel P3: Team/Project (DE)".into(),
                    course_shortname_en: "Formel P3: Team/Project (ENG)".into(),
                },
            ],
            identity: IdentityQuestions::default(),
            feed: FeedConfig::default(),
            import_policy: ImportPolicy::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            token: String::new(),
            event_id: String::new(),
            ca_cert_path: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl Default for IdentityQuestions {
    fn default() -> Self {
        Self {
            first_name_question_id: FIRST_NAME_QUESTION,
            last_name_question_id: LAST_NAME_QUESTION,
            email_question_id: EMAIL_QUESTION,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            suppressed_option_ids: CANCELLATION_OPTIONS
                .iter()
                .chain(RESCHEDULE_PLACEHOLDER_OPTIONS.iter())
                .copied()
                .collect(),
            import_marker: DEFAULT_IMPORT_MARKER.to_string(),
            update_existing_profiles: false,
        }
    }
}

impl Default for ImportPolicy {
    fn default() -> Self {
        Self {
            encoding: "UTF-8".into(),
            delimiter: "comma".into(),
            password_new: true,
            suspend_missing: true,
            no_email_duplicates: true,
            standard_usernames: true,
            allow_renames: false,
            allow_deletes: false,
            auth: "manual".into(),
            lang: "de".into(),
        }
    }
}

impl Config {
    /// Reads `path` if it exists, otherwise starts from the defaults. Environment
    /// overrides are applied in both cases.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                ImportError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
            })?;
            Self::from_toml(&content)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        if let Some(token) = non_empty(ENV_TOKEN) {
            self.api.token = token;
        }
        if let Some(event_id) = non_empty(ENV_EVENT_ID) {
            self.api.event_id = event_id;
        }
        if let Some(base_url) = non_empty(ENV_BASE_URL) {
            self.api.base_url = base_url;
        }
        if let Some(cert) = non_empty(ENV_CA_CERT) {
            self.api.ca_cert_path = Some(cert);
        }
    }

    /// Checks the invariants the mapping engine relies on.
    pub fn validate(&self) -> Result<()> {
        let mut question_ids = BTreeSet::new();
        for track in Track::ALL {
            let cfg = self.track(track);
            if cfg.catalog_label_marker.trim().is_empty() {
                return Err(ImportError::Config(format!("{track}: catalog_label_marker is empty")));
            }
            if cfg.course_shortname_de.trim().is_empty() || cfg.course_shortname_en.trim().is_empty() {
                return Err(ImportError::Config(format!("{track}: course short names must be set")));
            }
            if !question_ids.insert(cfg.selection_question_id) {
                return Err(ImportError::Config(format!(
                    "{track}: selection question {} is used by another track",
                    cfg.selection_question_id
                )));
            }
        }

        for a in Track::ALL {
            for b in Track::ALL {
                let (ma, mb) = (&self.track(a).catalog_label_marker, &self.track(b).catalog_label_marker);
                if a < b && mb.contains(ma.as_str()) {
                    warn!("{a} marker '{ma}' also matches {b} marker '{mb}'; the earlier track wins");
                }
            }
        }
        Ok(())
    }

    /// Connection settings are only needed when fetching from the API.
    pub fn validate_api(&self) -> Result<()> {
        if self.api.token.trim().is_empty() {
            return Err(ImportError::Config(format!("API token missing (set api.token or {ENV_TOKEN})")));
        }
        if self.api.event_id.trim().is_empty() {
            return Err(ImportError::Config(format!("Event id missing (set api.event_id or {ENV_EVENT_ID})")));
        }
        Ok(())
    }

    pub fn track(&self, track: Track) -> &TrackConfig {
        &self.tracks[track.index()]
    }

    /// Track whose selection question is `question_id`.
    pub fn track_for_question(&self, question_id: i64) -> Option<Track> {
        Track::ALL
            .into_iter()
            .find(|t| self.track(*t).selection_question_id == question_id)
    }
}
