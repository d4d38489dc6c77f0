//! Per-entry and batch results

use std::fmt;

use serde::Serialize;

use super::{CleanupAlert, FailureReason, RenewalRequest};
use crate::error::CoreResult;

/// Why a batch entry ended up failed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "stage")]
pub enum EntryFailure {
    /// The renewal attempt itself failed.
    Attempt { reason: FailureReason },
    /// The certificate renewed but could not be exported.
    Export { detail: String },
}

impl fmt::Display for EntryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attempt { reason } => write!(f, "{reason}"),
            Self::Export { detail } => {
                write!(f, "Certificate renewed but export failed: {detail}")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status")]
pub enum EntryStatus {
    Renewed,
    /// Existing certificate is still valid beyond the renewal window.
    Skipped,
    Failed { failure: EntryFailure },
}

/// Result of running the post-renewal hook of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "hook")]
pub enum HookStatus {
    /// No script exists for the identity.
    NotFound,
    Succeeded,
    Failed { detail: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryResult {
    pub request: RenewalRequest,
    pub status: EntryStatus,
    pub cleanup_alerts: Vec<CleanupAlert>,
    /// Set only for renewed entries, once hooks have run.
    pub hook: Option<HookStatus>,
}

impl EntryResult {
    pub fn skipped(request: RenewalRequest) -> Self {
        Self {
            request,
            status: EntryStatus::Skipped,
            cleanup_alerts: Vec::new(),
            hook: None,
        }
    }

    pub fn is_renewed(&self) -> bool {
        matches!(self.status, EntryStatus::Renewed)
    }

    pub fn failure(&self) -> Option<&EntryFailure> {
        match &self.status {
            EntryStatus::Failed { failure } => Some(failure),
            _ => None,
        }
    }
}

/// Results of one pass over the domain list, in list order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub entries: Vec<EntryResult>,
}

impl BatchReport {
    pub fn renewed(&self) -> impl Iterator<Item = &EntryResult> {
        self.entries.iter().filter(|e| e.is_renewed())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&EntryResult, &EntryFailure)> {
        self.entries
            .iter()
            .filter_map(|e| e.failure().map(|failure| (e, failure)))
    }

    pub fn skipped_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, EntryStatus::Skipped))
            .count()
    }

    pub fn cleanup_alerts(&self) -> impl Iterator<Item = &CleanupAlert> {
        self.entries.iter().flat_map(|e| e.cleanup_alerts.iter())
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    /// Pretty-printed JSON form, for tooling that consumes the run result.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(line: &str) -> RenewalRequest {
        RenewalRequest::parse_line(line).unwrap().unwrap()
    }

    #[test]
    fn report_partitions_entries() {
        let report = BatchReport {
            entries: vec![
                EntryResult {
                    request: request("a.example.com"),
                    status: EntryStatus::Renewed,
                    cleanup_alerts: Vec::new(),
                    hook: Some(HookStatus::NotFound),
                },
                EntryResult::skipped(request("b.example.com")),
                EntryResult {
                    request: request("c.example.com"),
                    status: EntryStatus::Failed {
                        failure: EntryFailure::Attempt {
                            reason: FailureReason::ProcessExit { code: Some(1) },
                        },
                    },
                    cleanup_alerts: Vec::new(),
                    hook: None,
                },
            ],
        };

        assert_eq!(report.renewed().count(), 1);
        assert_eq!(report.failed().count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert!(report.has_failures());
    }

    #[test]
    fn json_report_tags_statuses_and_alerts() {
        use acme_dns_provider::{ProviderError, ProvisionedRecord};

        let report = BatchReport {
            entries: vec![
                EntryResult {
                    request: request("a.example.com,www.example.com"),
                    status: EntryStatus::Renewed,
                    cleanup_alerts: vec![CleanupAlert {
                        record: ProvisionedRecord {
                            record_id: "rec123".to_string(),
                            name: "_acme-challenge.a.example.com".to_string(),
                        },
                        error: ProviderError::ApiError {
                            provider: "cloudflare".to_string(),
                            status_code: 500,
                            raw_message: None,
                        },
                    }],
                    hook: Some(HookStatus::Succeeded),
                },
                EntryResult {
                    request: request("c.example.com"),
                    status: EntryStatus::Failed {
                        failure: EntryFailure::Attempt {
                            reason: FailureReason::AuthorityViolation {
                                record_name: "_acme-challenge.c.evil.com".to_string(),
                                required_suffix: "example.com".to_string(),
                            },
                        },
                    },
                    cleanup_alerts: Vec::new(),
                    hook: None,
                },
            ],
        };

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        let entries = json["entries"].as_array().unwrap();

        assert_eq!(entries[0]["request"]["domains"][1], "www.example.com");
        assert_eq!(entries[0]["status"]["status"], "Renewed");
        assert_eq!(entries[0]["hook"]["hook"], "Succeeded");
        assert_eq!(entries[0]["cleanup_alerts"][0]["record"]["record_id"], "rec123");
        assert_eq!(entries[0]["cleanup_alerts"][0]["error"]["code"], "ApiError");
        assert_eq!(entries[1]["status"]["status"], "Failed");
        assert_eq!(entries[1]["status"]["failure"]["stage"], "Attempt");
        assert_eq!(entries[1]["status"]["failure"]["reason"]["kind"], "AuthorityViolation");
        assert!(entries[1]["hook"].is_null());
    }

    #[test]
    fn export_failure_message() {
        let failure = EntryFailure::Export {
            detail: "disk full".to_string(),
        };
        assert_eq!(
            failure.to_string(),
            "Certificate renewed but export failed: disk full"
        );
    }
}
