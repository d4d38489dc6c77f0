//! Cloudflare DNS Provider

mod error;
mod http;
mod provider;
mod types;

use reqwest::Client;

use crate::error::Result;
use crate::providers::common::create_http_client;
use crate::types::{CloudflareAuth, ProviderOptions};

pub(crate) use types::{CloudflareDnsRecord, CloudflareResponse, CreateTxtRecordBody};

pub(crate) const CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";
/// 挑战记录的备注，便于在控制台中识别残留记录
pub(crate) const CHALLENGE_RECORD_COMMENT: &str = "DNS Challenge Token for certbot";

/// Cloudflare DNS Provider
///
/// 绑定到单个 zone，所有记录操作都在该 zone 下进行。
pub struct CloudflareProvider {
    pub(crate) client: Client,
    pub(crate) zone_id: String,
    pub(crate) auth: CloudflareAuth,
    pub(crate) base_url: String,
    pub(crate) delete_retries: u32,
}

impl CloudflareProvider {
    pub fn new(zone_id: String, auth: CloudflareAuth) -> Result<Self> {
        Self::with_options(zone_id, auth, &ProviderOptions::default())
    }

    pub fn with_options(
        zone_id: String,
        auth: CloudflareAuth,
        options: &ProviderOptions,
    ) -> Result<Self> {
        let base_url = options
            .base_url
            .as_deref()
            .unwrap_or(CF_API_BASE)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: create_http_client("cloudflare")?,
            zone_id,
            auth,
            base_url,
            delete_retries: options.delete_retries,
        })
    }
}
