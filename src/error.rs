use thiserror::Error;

/// Errors returned by BFL API operations.
///
/// A task that finishes in `Error` or one of the moderated states is not an
/// error here: it is a successful poll whose [`Status`](crate::Status) says
/// so.
#[derive(Error, Debug)]
pub enum BflError {
    /// The client could not be constructed (no API key, bad HTTP setup).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The service returned a non-success HTTP status.
    #[error("BFL API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Network-level request failure with context.
    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },

    /// A successful response that does not fit the task model.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BflError {
    /// True for errors raised while building a client.
    pub fn is_configuration(&self) -> bool {
        matches!(self, BflError::Configuration(_))
    }

    /// HTTP status code of an [`BflError::Http`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            BflError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, BflError>;
