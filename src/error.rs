//! Error handling

use thiserror::Error;

pub type NagResult<T> = Result<T, NagError>;

#[derive(Debug, Error)]
pub enum NagError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date '{0}' (expected today, yesterday, tomorrow or YYYY-MM-DD)")]
    Date(String),

    // IO / parsing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Bugzilla errors
    #[error("Network error: {0}")]
    Network(String),

    #[error("Bugzilla returned {status}: {message}")]
    BugzillaStatus { status: u16, message: String },

    // Model errors
    #[error("Model error: {0}")]
    Model(String),

    #[error("Model checksum mismatch: expected {expected}, got {actual}")]
    ModelIntegrity { expected: String, actual: String },

    /// The label encoder produced something outside {defect, enhancement, task}.
    /// Aborts the run: the model and this check disagree on the label set.
    #[error("Suggestion {0} is invalid")]
    InvalidSuggestion(String),

    #[error("Got {probs} probability rows for {bugs} bugs")]
    ShapeMismatch { bugs: usize, probs: usize },
}
