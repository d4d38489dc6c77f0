use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::ProvisionedRecord;

/// Raw API error as reported in a response body (internal)
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// Error code (format differs per provider)
    pub code: Option<String>,
    /// Raw error message
    pub message: String,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// Extra context used while mapping an error (internal)
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// Record name (for `RecordExists`)
    pub record_name: Option<String>,
    /// Record ID (for `RecordNotFound`)
    pub record_id: Option<String>,
}

/// Maps raw provider API errors to [`ProviderError`] (internal)
pub(crate) trait ProviderErrorMapper {
    /// Provider identifier
    fn provider_name(&self) -> &'static str;

    /// Map a raw API error to the unified error type
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// Shortcut: parse error
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// Shortcut: unknown error (fallback)
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// DNS provider able to publish and withdraw DNS-01 challenge records.
///
/// Implementations are bound to a single zone at construction time and hold no
/// per-call state. No retries are performed on creation; implementations may
/// retry transport failures on deletion.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Provider identifier
    fn id(&self) -> &'static str;

    /// Create a TXT record `name` with content `value` (short TTL, not proxied).
    ///
    /// On success the record exists remotely until [`delete_record`](Self::delete_record)
    /// is called with the returned id.
    async fn create_challenge_record(&self, name: &str, value: &str) -> Result<ProvisionedRecord>;

    /// Delete a record previously returned by
    /// [`create_challenge_record`](Self::create_challenge_record).
    ///
    /// A non-2xx status and a provider-reported failure on a 2xx status are both errors.
    async fn delete_record(&self, record_id: &str) -> Result<()>;
}
