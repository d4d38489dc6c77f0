//! Configuration file
//!
//! One JSON document, loaded once at startup and handed to each component as
//! typed settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use acme_dns_provider::{CloudflareAuth, ProviderCredentials, ProviderOptions};
use serde::Deserialize;

use crate::acme::CertbotOptions;
use crate::error::{CoreError, CoreResult};
use crate::services::{ExportSettings, RenewalSettings};

/// 10 days
pub const DEFAULT_RENEWAL_WINDOW_SECS: u64 = 86_400 * 10;
pub const DEFAULT_PROPAGATION_DELAY_SECS: u64 = 30;
pub const DEFAULT_DELETE_RETRIES: u32 = 2;
pub const DEFAULT_SMTP_PORT: u16 = 25;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub cloudflare: CloudflareConfig,
    /// ACME account contact, also the default alert recipient.
    pub contact_email: String,
    /// Zone suffix every challenge record must fall under.
    pub domain_suffix: String,
    #[serde(default = "default_renewal_window_secs")]
    pub renewal_window_secs: u64,
    #[serde(default = "default_propagation_delay_secs")]
    pub propagation_delay_secs: u64,
    #[serde(default)]
    pub process_timeout_secs: Option<u64>,
    pub domain_list_path: PathBuf,
    #[serde(default)]
    pub acme: AcmeConfig,
    pub export: ExportConfig,
    #[serde(default)]
    pub post_scripts_dir: Option<PathBuf>,
    /// Mail delivery; no notifications are sent when absent.
    #[serde(default)]
    pub notification: Option<NotificationConfig>,
}

#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CloudflareConfig {
    pub zone_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_delete_retries")]
    pub delete_retries: u32,
}

impl std::fmt::Debug for CloudflareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareConfig")
            .field("zone_id", &self.zone_id)
            .field("email", &self.email)
            .field("api_key", &self.api_key.as_ref().map(|_| "****"))
            .field("api_token", &self.api_token.as_ref().map(|_| "****"))
            .field("base_url", &self.base_url)
            .field("delete_retries", &self.delete_retries)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AcmeConfig {
    #[serde(default = "default_acme_binary")]
    pub binary: PathBuf,
    #[serde(default = "default_live_dir")]
    pub live_dir: PathBuf,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for AcmeConfig {
    fn default() -> Self {
        Self {
            binary: default_acme_binary(),
            live_dir: default_live_dir(),
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    pub cert_dir: PathBuf,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationConfig {
    pub from: String,
    /// Falls back to `contact_email` when empty or absent.
    #[serde(default)]
    pub to: String,
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
}

fn default_renewal_window_secs() -> u64 {
    DEFAULT_RENEWAL_WINDOW_SECS
}

fn default_propagation_delay_secs() -> u64 {
    DEFAULT_PROPAGATION_DELAY_SECS
}

fn default_delete_retries() -> u32 {
    DEFAULT_DELETE_RETRIES
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

fn default_acme_binary() -> PathBuf {
    PathBuf::from("certbot")
}

fn default_live_dir() -> PathBuf {
    PathBuf::from("/etc/letsencrypt/live")
}

fn non_empty(value: Option<&String>) -> Option<&String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Read, parse and validate the file at `path`.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        Self::from_json(&content)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_json(content: &str) -> CoreResult<Self> {
        let mut config: Self =
            serde_json::from_str(content).map_err(|e| CoreError::Config(e.to_string()))?;
        config.fill_alert_recipient();
        config.validate()?;
        Ok(config)
    }

    fn fill_alert_recipient(&mut self) {
        if let Some(notification) = self.notification.as_mut() {
            if notification.to.trim().is_empty() {
                notification.to.clone_from(&self.contact_email);
            }
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.cloudflare.zone_id.trim().is_empty() {
            return Err(CoreError::Config("cloudflare.zone_id is empty".to_string()));
        }
        if self.domain_suffix.trim_matches(|c: char| c == '.' || c.is_whitespace()).is_empty() {
            return Err(CoreError::Config("domain_suffix is empty".to_string()));
        }
        if self.contact_email.trim().is_empty() {
            return Err(CoreError::Config("contact_email is empty".to_string()));
        }
        if let Some(notification) = &self.notification {
            if notification.to.trim().is_empty() {
                return Err(CoreError::Config("notification.to is empty".to_string()));
            }
        }
        self.cloudflare_auth()?;
        Ok(())
    }

    /// Pick the single configured authentication method.
    fn cloudflare_auth(&self) -> CoreResult<CloudflareAuth> {
        let cf = &self.cloudflare;
        let email = non_empty(cf.email.as_ref());
        let api_key = non_empty(cf.api_key.as_ref());
        let api_token = non_empty(cf.api_token.as_ref());

        match (email, api_key, api_token) {
            (None, None, Some(token)) => Ok(CloudflareAuth::ApiToken {
                api_token: token.clone(),
            }),
            (Some(email), Some(key), None) => Ok(CloudflareAuth::ApiKey {
                email: email.clone(),
                api_key: key.clone(),
            }),
            (_, _, Some(_)) => Err(CoreError::Config(
                "cloudflare: set either api_token or email + api_key, not both".to_string(),
            )),
            (None, None, None) => Err(CoreError::Config(
                "cloudflare: no credentials, set api_token or email + api_key".to_string(),
            )),
            _ => Err(CoreError::Config(
                "cloudflare: email and api_key must be set together".to_string(),
            )),
        }
    }

    pub fn provider_credentials(&self) -> CoreResult<ProviderCredentials> {
        Ok(ProviderCredentials::Cloudflare {
            zone_id: self.cloudflare.zone_id.clone(),
            auth: self.cloudflare_auth()?,
        })
    }

    pub fn provider_options(&self) -> ProviderOptions {
        ProviderOptions {
            base_url: self.cloudflare.base_url.clone(),
            delete_retries: self.cloudflare.delete_retries,
        }
    }

    pub fn renewal_settings(&self) -> RenewalSettings {
        RenewalSettings {
            domain_suffix: self.domain_suffix.clone(),
            propagation_delay: Duration::from_secs(self.propagation_delay_secs),
            process_timeout: self.process_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn renewal_window(&self) -> Duration {
        Duration::from_secs(self.renewal_window_secs)
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            cert_dir: self.export.cert_dir.clone(),
            live_dir: self.acme.live_dir.clone(),
            owner: self.export.owner.clone(),
            group: self.export.group.clone(),
        }
    }

    pub fn certbot_options(&self) -> CertbotOptions {
        CertbotOptions {
            binary: self.acme.binary.clone(),
            contact_email: self.contact_email.clone(),
            extra_args: self.acme.extra_args.clone(),
        }
    }
}
