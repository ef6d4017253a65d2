use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflicting updates for scan {scan}: {}", tags.join(", "))]
    Conflict { scan: String, tags: Vec<String> },

    #[error("{operation} failed with status {status}")]
    ExternalCall { operation: String, status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No session found for {0}")]
    SessionNotFound(String),

    #[error("Found {count} sessions labelled '{label}', use --project")]
    AmbiguousSession { label: String, count: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
