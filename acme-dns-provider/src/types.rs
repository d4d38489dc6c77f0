use serde::{Deserialize, Serialize};

use crate::utils::log_sanitizer::mask_secret;

/// TTL (seconds) used for every challenge record.
pub const CHALLENGE_RECORD_TTL: u32 = 300;

/// A record created by [`DnsProvider::create_challenge_record`](crate::DnsProvider::create_challenge_record).
///
/// Only `record_id` is needed to delete it again; `name` is kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProvisionedRecord {
    /// Provider-assigned record identifier.
    pub record_id: String,
    /// Fully qualified record name.
    pub name: String,
}

/// Cloudflare authentication method.
///
/// `ApiKey` is the account-wide global key sent as `X-Auth-Email` / `X-Auth-Key`.
/// `ApiToken` is a scoped token sent as `Authorization: Bearer`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CloudflareAuth {
    /// Global API key bound to an account e-mail.
    ApiKey {
        /// Account e-mail (`X-Auth-Email`).
        email: String,
        /// Global API key (`X-Auth-Key`).
        api_key: String,
    },
    /// Scoped API token.
    ApiToken {
        /// Bearer token.
        api_token: String,
    },
}

impl CloudflareAuth {
    /// Whether every field of the chosen method is non-empty.
    pub fn is_complete(&self) -> bool {
        match self {
            Self::ApiKey { email, api_key } => !email.is_empty() && !api_key.is_empty(),
            Self::ApiToken { api_token } => !api_token.is_empty(),
        }
    }
}

impl std::fmt::Debug for CloudflareAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey { email, api_key } => f
                .debug_struct("ApiKey")
                .field("email", email)
                .field("api_key", &mask_secret(api_key))
                .finish(),
            Self::ApiToken { api_token } => f
                .debug_struct("ApiToken")
                .field("api_token", &mask_secret(api_token))
                .finish(),
        }
    }
}

/// Provider credentials, one variant per supported provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "provider")]
pub enum ProviderCredentials {
    /// Cloudflare credentials. Requires feature `cloudflare`.
    #[cfg(feature = "cloudflare")]
    #[serde(rename = "cloudflare")]
    Cloudflare {
        /// Zone holding the challenge records.
        zone_id: String,
        /// Authentication method.
        auth: CloudflareAuth,
    },
}

/// Transport options shared by all providers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProviderOptions {
    /// Override of the provider API base URL (tests, API gateways).
    pub base_url: Option<String>,
    /// Extra attempts for a deletion that failed at the transport level.
    pub delete_retries: u32,
}
