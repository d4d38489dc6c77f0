//! Cloudflare DnsProvider trait 实现

use async_trait::async_trait;

use crate::error::Result;
use crate::providers::common::normalize_domain_name;
use crate::traits::{DnsProvider, ErrorContext};
use crate::types::{CHALLENGE_RECORD_TTL, ProvisionedRecord};

use super::{CHALLENGE_RECORD_COMMENT, CloudflareDnsRecord, CloudflareProvider, CreateTxtRecordBody};

#[async_trait]
impl DnsProvider for CloudflareProvider {
    fn id(&self) -> &'static str {
        "cloudflare"
    }

    async fn create_challenge_record(&self, name: &str, value: &str) -> Result<ProvisionedRecord> {
        let name = normalize_domain_name(name);
        log::info!("[cloudflare] Creating TXT record {name}");

        let body = CreateTxtRecordBody {
            record_type: "TXT",
            name: &name,
            content: value,
            ttl: CHALLENGE_RECORD_TTL,
            proxied: false,
            comment: CHALLENGE_RECORD_COMMENT,
        };

        let context = ErrorContext {
            record_name: Some(name.clone()),
            ..ErrorContext::default()
        };

        let cf_record: CloudflareDnsRecord = self
            .post(&format!("/zones/{}/dns_records", self.zone_id), &body, context)
            .await?;

        log::info!("[cloudflare] Created TXT record {} ({})", cf_record.name, cf_record.id);

        Ok(ProvisionedRecord {
            record_id: cf_record.id,
            name: cf_record.name,
        })
    }

    async fn delete_record(&self, record_id: &str) -> Result<()> {
        log::info!("[cloudflare] Deleting record {record_id}");

        let context = ErrorContext {
            record_id: Some(record_id.to_string()),
            ..ErrorContext::default()
        };

        self.delete(
            &format!("/zones/{}/dns_records/{record_id}", self.zone_id),
            context,
        )
        .await
    }
}
