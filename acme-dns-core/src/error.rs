//! Unified error type definition

use thiserror::Error;

// Re-export library error type
pub use acme_dns_provider::ProviderError;

/// Core layer error type
///
/// Attempt failures are not errors of this type: they are recorded as
/// [`FailureReason`](crate::types::FailureReason) inside the attempt outcome.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration file missing, malformed or incomplete
    #[error("Configuration error: {0}")]
    Config(String),

    /// Domain list line or request could not be parsed
    #[error("Invalid renewal request: {0}")]
    InvalidRequest(String),

    /// File system error with the path involved
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// ACME client process could not be spawned or talked to
    #[error("Process error: {0}")]
    Process(String),

    /// Renewed certificate material could not be exported
    #[error("Certificate export error: {0}")]
    Export(String),

    /// Notification could not be delivered
    #[error("Notification error: {0}")]
    Notification(String),

    /// Batch report could not be serialized
    #[error("Report serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Build an [`CoreError::Io`] for `path`.
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
