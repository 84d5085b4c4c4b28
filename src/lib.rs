pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod types;

// Collaborator ports and their adapters
pub mod app;
pub mod infra;

pub use config::Config;
pub use error::{ImportError, Result};
pub use pipeline::{Feed, FeedAssembler};
