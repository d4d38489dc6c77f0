//! Challenge events and attempt outcomes

use std::fmt;

use acme_dns_provider::{ProviderError, ProvisionedRecord};
use serde::Serialize;

use super::RenewalRequest;

/// A pending DNS-01 challenge announced by the ACME client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeEvent {
    /// Fully qualified TXT record name, without the trailing root dot.
    pub record_name: String,
    /// Value to publish in the TXT record.
    pub token: String,
}

/// Why an attempt failed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum FailureReason {
    /// The challenge record lies outside the configured DNS suffix.
    AuthorityViolation {
        record_name: String,
        required_suffix: String,
    },
    /// The DNS provider rejected or never answered the creation request.
    Provider { error: ProviderError },
    /// The ACME client exited non-zero (`None` when killed by a signal).
    ProcessExit { code: Option<i32> },
    /// The ACME client could not be spawned, read from or written to.
    Process { detail: String },
}

impl FailureReason {
    /// HTTP status of a provider rejection, if that is what this failure is.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Provider { error } => error.status_code(),
            _ => None,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthorityViolation {
                record_name,
                required_suffix,
            } => write!(
                f,
                "{record_name} does not fall under our {required_suffix} DNS authority. Cannot create DNS record for ACME."
            ),
            Self::Provider { error } => write!(f, "DNS provider request failed: {error}"),
            Self::ProcessExit { code: Some(code) } => write!(
                f,
                "ACME client failed with exit code {code}, check /var/log/letsencrypt"
            ),
            Self::ProcessExit { code: None } => {
                write!(f, "ACME client was terminated by a signal")
            }
            Self::Process { detail } => write!(f, "ACME client process error: {detail}"),
        }
    }
}

impl From<ProviderError> for FailureReason {
    fn from(error: ProviderError) -> Self {
        Self::Provider { error }
    }
}

/// Result of one renewal attempt; produced exactly once per request.
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Success,
    Failure { reason: FailureReason },
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn failure_reason(&self) -> Option<&FailureReason> {
        match self {
            Self::Success => None,
            Self::Failure { reason } => Some(reason),
        }
    }
}

/// A provisioned record that could not be deleted during cleanup.
///
/// Needs manual removal at the provider.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupAlert {
    pub record: ProvisionedRecord,
    pub error: ProviderError,
}

/// Everything one attempt produced.
#[derive(Debug, Clone)]
pub struct AttemptReport {
    pub request: RenewalRequest,
    pub outcome: AttemptOutcome,
    pub cleanup_alerts: Vec<CleanupAlert>,
}
