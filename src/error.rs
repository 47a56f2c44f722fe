// File: src/error.rs
use thiserror::Error;

/// Errors surfaced by the matching core and its learning store.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Index cache error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Code pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Feedback arrays must pair up one-to-one.
    #[error("Input shape mismatch: {texts} texts vs {corrections} corrections")]
    InputShapeMismatch { texts: usize, corrections: usize },

    #[error("Malformed catalog record: {0}")]
    MalformedRecord(String),

    #[error("Window of {0} days is out of range")]
    WindowOutOfRange(i64),

    #[error("Subject index is empty")]
    MissingIndex,
}

pub type Result<T> = std::result::Result<T, MatchError>;
