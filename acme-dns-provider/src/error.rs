use serde::Serialize;

/// Unified error type for all DNS provider operations.
///
/// Each variant includes a `provider` field identifying which provider produced the error,
/// plus variant-specific context. All variants serialize into the JSON batch report.
///
/// # Transport Errors
///
/// [`NetworkError`](Self::NetworkError) and [`Timeout`](Self::Timeout) mean the request
/// never produced an HTTP response. Everything else carries an answer from the provider.
/// Only transport errors are ever retried, and only on deletion.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    NetworkError {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The provider answered with a status outside the 2xx range.
    ApiError {
        /// Provider that produced the error.
        provider: String,
        /// HTTP status code of the response.
        status_code: u16,
        /// First error message reported in the response body, if it could be parsed.
        raw_message: Option<String>,
    },

    /// The provided credentials are invalid or expired.
    InvalidCredentials {
        /// Provider that produced the error.
        provider: String,
        /// Raw error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// A DNS record with the same name/content already exists.
    RecordExists {
        /// Provider that produced the error.
        provider: String,
        /// Name of the conflicting record.
        record_name: String,
        /// Raw error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The specified DNS record was not found.
    RecordNotFound {
        /// Provider that produced the error.
        provider: String,
        /// ID of the record that was not found.
        record_id: String,
        /// Raw error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// A request parameter was rejected (bad record name, TTL, content...).
    InvalidParameter {
        /// Provider that produced the error.
        provider: String,
        /// Name of the invalid parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// Failed to parse the provider's API response.
    ParseError {
        /// Provider that produced the error.
        provider: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// The provider client could not be constructed.
    Configuration {
        /// Provider that produced the error.
        provider: String,
        /// Details about the configuration problem.
        detail: String,
    },

    /// An unrecognized error from the provider API.
    ///
    /// Also used when a 2xx response reports `success: false` with an error code
    /// that has no dedicated variant.
    Unknown {
        /// Provider that produced the error.
        provider: String,
        /// Raw error code from the API, if available.
        raw_code: Option<String>,
        /// Raw error message from the API.
        raw_message: String,
    },
}

impl ProviderError {
    /// Whether the error is expected behavior (bad input, missing resource).
    ///
    /// Cleanup logs a failed deletion at `warn` when this returns `true` and `error` otherwise.
    /// **Update this method when adding variants.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::RecordExists { .. }
                | Self::RecordNotFound { .. }
                | Self::InvalidParameter { .. }
        )
    }

    /// Whether the request failed before any HTTP response was received.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::NetworkError { .. } | Self::Timeout { .. })
    }

    /// HTTP status code of a non-2xx response, if this error carries one.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { provider, detail } => {
                write!(f, "[{provider}] Network error: {detail}")
            }
            Self::Timeout { provider, detail } => {
                write!(f, "[{provider}] Request timeout: {detail}")
            }
            Self::ApiError {
                provider,
                status_code,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] API returned HTTP {status_code}: {msg}")
                } else {
                    write!(f, "[{provider}] API returned HTTP {status_code}")
                }
            }
            Self::InvalidCredentials {
                provider,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Invalid credentials: {msg}")
                } else {
                    write!(f, "[{provider}] Invalid credentials")
                }
            }
            Self::RecordExists {
                provider,
                record_name,
                ..
            } => {
                write!(f, "[{provider}] Record '{record_name}' already exists")
            }
            Self::RecordNotFound {
                provider,
                record_id,
                ..
            } => {
                write!(f, "[{provider}] Record '{record_id}' not found")
            }
            Self::InvalidParameter {
                provider,
                param,
                detail,
            } => {
                write!(f, "[{provider}] Invalid parameter '{param}': {detail}")
            }
            Self::ParseError { provider, detail } => {
                write!(f, "[{provider}] Parse error: {detail}")
            }
            Self::Configuration { provider, detail } => {
                write!(f, "[{provider}] Configuration error: {detail}")
            }
            Self::Unknown {
                provider,
                raw_message,
                ..
            } => {
                write!(f, "[{provider}] {raw_message}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_network_error() {
        let e = ProviderError::NetworkError {
            provider: "test".to_string(),
            detail: "connection refused".to_string(),
        };
        assert_eq!(e.to_string(), "[test] Network error: connection refused");
    }

    #[test]
    fn display_api_error_with_message() {
        let e = ProviderError::ApiError {
            provider: "cloudflare".to_string(),
            status_code: 403,
            raw_message: Some("Authentication error".to_string()),
        };
        assert_eq!(
            e.to_string(),
            "[cloudflare] API returned HTTP 403: Authentication error"
        );
    }

    #[test]
    fn display_api_error_without_message() {
        let e = ProviderError::ApiError {
            provider: "cloudflare".to_string(),
            status_code: 500,
            raw_message: None,
        };
        assert_eq!(e.to_string(), "[cloudflare] API returned HTTP 500");
    }

    #[test]
    fn display_invalid_credentials_without_message() {
        let e = ProviderError::InvalidCredentials {
            provider: "cloudflare".to_string(),
            raw_message: None,
        };
        assert_eq!(e.to_string(), "[cloudflare] Invalid credentials");
    }

    #[test]
    fn display_record_not_found() {
        let e = ProviderError::RecordNotFound {
            provider: "cf".to_string(),
            record_id: "123".to_string(),
            raw_message: None,
        };
        assert_eq!(e.to_string(), "[cf] Record '123' not found");
    }

    #[test]
    fn display_timeout() {
        let e = ProviderError::Timeout {
            provider: "test".to_string(),
            detail: "30s elapsed".to_string(),
        };
        assert_eq!(e.to_string(), "[test] Request timeout: 30s elapsed");
    }

    #[test]
    fn display_unknown() {
        let e = ProviderError::Unknown {
            provider: "test".to_string(),
            raw_code: Some("E001".to_string()),
            raw_message: "something broke".to_string(),
        };
        assert_eq!(e.to_string(), "[test] something broke");
    }

    #[test]
    fn transport_classification() {
        assert!(ProviderError::NetworkError {
            provider: "t".into(),
            detail: "x".into(),
        }
        .is_transport());
        assert!(ProviderError::Timeout {
            provider: "t".into(),
            detail: "x".into(),
        }
        .is_transport());
        assert!(!ProviderError::ApiError {
            provider: "t".into(),
            status_code: 502,
            raw_message: None,
        }
        .is_transport());
        assert!(!ProviderError::Unknown {
            provider: "t".into(),
            raw_code: None,
            raw_message: "x".into(),
        }
        .is_transport());
    }

    #[test]
    fn expected_classification() {
        assert!(ProviderError::RecordNotFound {
            provider: "t".into(),
            record_id: "rec123".into(),
            raw_message: None,
        }
        .is_expected());
        assert!(ProviderError::InvalidCredentials {
            provider: "t".into(),
            raw_message: None,
        }
        .is_expected());
        assert!(!ProviderError::NetworkError {
            provider: "t".into(),
            detail: "x".into(),
        }
        .is_expected());
        assert!(!ProviderError::ApiError {
            provider: "t".into(),
            status_code: 500,
            raw_message: None,
        }
        .is_expected());
    }

    #[test]
    fn status_code_only_for_api_errors() {
        let api = ProviderError::ApiError {
            provider: "t".into(),
            status_code: 403,
            raw_message: None,
        };
        assert_eq!(api.status_code(), Some(403));

        let net = ProviderError::NetworkError {
            provider: "t".into(),
            detail: "x".into(),
        };
        assert_eq!(net.status_code(), None);
    }

    #[test]
    fn serialize_tags_variant_code() {
        let e = ProviderError::ApiError {
            provider: "cloudflare".to_string(),
            status_code: 403,
            raw_message: None,
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"code\":\"ApiError\""));
        assert!(json.contains("\"status_code\":403"));
    }
}
