use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImporterError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot access {path}: {source}")]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Incident feed error: {message}")]
    Feed { message: String },

    #[error("Unrecognized date {value:?} in {source_name} row {row}")]
    DateParse {
        source_name: String,
        row: usize,
        value: String,
    },

    #[error("Invalid rule pattern: {0}")]
    Rule(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, ImporterError>;
