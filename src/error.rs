use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The payload lacks `data.questions` or `data.attendees`. Aborts the run.
    #[error("Malformed event payload: {0}")]
    MalformedSchema(String),

    /// A single questionnaire option is missing its id or language condition.
    #[error("Malformed option '{label}': {reason}")]
    MalformedOption { label: String, reason: String },

    #[error("Attendee has no active, known group selection")]
    UnresolvedChoice,

    #[error("Missing identity answer: {0}")]
    MissingIdentityField(&'static str),

    /// A resolved option id disappeared from the catalog it was validated against.
    #[error("Option {0} is not present in the group catalog")]
    UnknownOption(i64),

    #[error("User directory error: {0}")]
    Directory(String),
}

impl ImportError {
    /// Short label used for skip metrics and the run manifest.
    pub fn kind(&self) -> &'static str {
        match self {
            ImportError::Http(_) => "http",
            ImportError::Json(_) => "json",
            ImportError::Toml(_) => "toml",
            ImportError::Io(_) => "io",
            ImportError::Config(_) => "config",
            ImportError::Api { .. } => "api",
            ImportError::MalformedSchema(_) => "malformed_schema",
            ImportError::MalformedOption { .. } => "malformed_option",
            ImportError::UnresolvedChoice => "unresolved_choice",
            ImportError::MissingIdentityField(_) => "missing_identity_field",
            ImportError::UnknownOption(_) => "unknown_option",
            ImportError::Directory(_) => "directory",
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
