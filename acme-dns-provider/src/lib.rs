//! # acme-dns-provider
//!
//! DNS provider client used to publish and withdraw ACME DNS-01 challenge records.
//!
//! ## Supported Providers
//!
//! | Provider | Feature Flag | Auth Method |
//! |----------|-------------|-------------|
//! | [Cloudflare](https://www.cloudflare.com/) | `cloudflare` | Global API Key (`X-Auth-Email` + `X-Auth-Key`) or API Token |
//!
//! ## Feature Flags
//!
//! - **`cloudflare`** *(default)* — Enable the Cloudflare provider.
//! - **`native-tls`** *(default)* — Use the platform's native TLS implementation.
//! - **`rustls`** — Use rustls. Recommended for static builds.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use acme_dns_provider::{
//!     create_provider, CloudflareAuth, DnsProvider, ProviderCredentials, ProviderOptions,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = create_provider(
//!         ProviderCredentials::Cloudflare {
//!             zone_id: "your-zone-id".to_string(),
//!             auth: CloudflareAuth::ApiKey {
//!                 email: "you@example.com".to_string(),
//!                 api_key: "your-global-key".to_string(),
//!             },
//!         },
//!         &ProviderOptions::default(),
//!     )?;
//!
//!     let record = provider
//!         .create_challenge_record("_acme-challenge.example.com", "token-value")
//!         .await?;
//!
//!     // ... let the ACME server validate ...
//!
//!     provider.delete_record(&record.record_id).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All provider operations return [`Result<T, ProviderError>`](ProviderError):
//!
//! - [`ProviderError::ApiError`] — the API answered with a non-2xx status
//! - [`ProviderError::NetworkError`] / [`ProviderError::Timeout`] — no answer was received
//! - other variants — a 2xx answer whose body reported `success: false`
//!
//! Creation is never retried. Deletion retries transport failures up to
//! [`ProviderOptions::delete_retries`] times with exponential backoff.

mod error;
mod factory;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export factory functions
pub use factory::create_provider;

// Re-export core trait only (internal traits are not exported)
pub use traits::DnsProvider;

// Re-export types
pub use types::{
    CHALLENGE_RECORD_TTL, CloudflareAuth, ProviderCredentials, ProviderOptions, ProvisionedRecord,
};

// Re-export concrete providers (behind feature flags)
#[cfg(feature = "cloudflare")]
pub use providers::CloudflareProvider;
