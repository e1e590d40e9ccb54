use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrepError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A record points at side-lookup data that does not exist.
    #[error("Missing {kind} for id {id}")]
    MissingReference { kind: &'static str, id: u32 },

    /// A row passed the importer but does not fit the source schema.
    #[error("Row {row_id}: column {column} ({field}) {problem}")]
    Schema {
        row_id: String,
        column: usize,
        field: &'static str,
        problem: String,
    },

    #[error("Fetching {url} failed: {message}")]
    Fetch { url: String, message: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Minifying {file} failed: {reason}")]
    Minify { file: String, reason: String },
}

pub type Result<T> = std::result::Result<T, PrepError>;
