//! Provider factory functions.

use std::sync::Arc;

use crate::error::{ProviderError, Result};
use crate::traits::DnsProvider;
use crate::types::{ProviderCredentials, ProviderOptions};

#[cfg(feature = "cloudflare")]
use crate::providers::CloudflareProvider;

/// Creates a [`DnsProvider`] instance from the given credentials.
///
/// The concrete provider type is determined by the [`ProviderCredentials`] variant.
/// Incomplete credentials are rejected here rather than on the first API call.
///
/// # Examples
///
/// ```rust,no_run
/// use acme_dns_provider::{create_provider, CloudflareAuth, ProviderCredentials, ProviderOptions};
///
/// let provider = create_provider(
///     ProviderCredentials::Cloudflare {
///         zone_id: "your-zone-id".to_string(),
///         auth: CloudflareAuth::ApiToken {
///             api_token: "your-token".to_string(),
///         },
///     },
///     &ProviderOptions::default(),
/// )
/// .unwrap();
/// ```
pub fn create_provider(
    credentials: ProviderCredentials,
    options: &ProviderOptions,
) -> Result<Arc<dyn DnsProvider>> {
    match credentials {
        #[cfg(feature = "cloudflare")]
        ProviderCredentials::Cloudflare { zone_id, auth } => {
            if zone_id.is_empty() {
                return Err(ProviderError::Configuration {
                    provider: "cloudflare".to_string(),
                    detail: "zone_id must not be empty".to_string(),
                });
            }
            if !auth.is_complete() {
                return Err(ProviderError::Configuration {
                    provider: "cloudflare".to_string(),
                    detail: "incomplete credentials".to_string(),
                });
            }
            Ok(Arc::new(CloudflareProvider::with_options(
                zone_id, auth, options,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CloudflareAuth;

    #[test]
    fn creates_cloudflare_provider() {
        let provider = create_provider(
            ProviderCredentials::Cloudflare {
                zone_id: "z1".to_string(),
                auth: CloudflareAuth::ApiKey {
                    email: "ops@example.com".to_string(),
                    api_key: "key".to_string(),
                },
            },
            &ProviderOptions::default(),
        );
        assert!(matches!(provider, Ok(p) if p.id() == "cloudflare"));
    }

    #[test]
    fn rejects_empty_zone() {
        let provider = create_provider(
            ProviderCredentials::Cloudflare {
                zone_id: String::new(),
                auth: CloudflareAuth::ApiToken {
                    api_token: "t".to_string(),
                },
            },
            &ProviderOptions::default(),
        );
        assert!(matches!(provider, Err(ProviderError::Configuration { .. })));
    }

    #[test]
    fn rejects_incomplete_auth() {
        let provider = create_provider(
            ProviderCredentials::Cloudflare {
                zone_id: "z1".to_string(),
                auth: CloudflareAuth::ApiKey {
                    email: String::new(),
                    api_key: "key".to_string(),
                },
            },
            &ProviderOptions::default(),
        );
        assert!(matches!(provider, Err(ProviderError::Configuration { .. })));
    }
}
