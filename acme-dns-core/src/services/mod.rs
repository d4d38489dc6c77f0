//! 业务逻辑服务层

mod batch_service;
mod export_service;
mod hook_service;
mod renewal_service;
mod report_service;

pub use batch_service::BatchService;
pub use export_service::{ExportService, ExportSettings};
pub use hook_service::HookService;
pub use renewal_service::{AttemptState, RenewalService, RenewalSettings};
pub use report_service::{ReportService, cleanup_alert_notification, summary_notification};

use std::sync::Arc;

use acme_dns_provider::DnsProvider;

use crate::traits::AcmeClient;

/// 服务上下文 - 持有外部依赖
///
/// 二进制层创建此上下文，并注入 ACME 客户端与 DNS Provider 实现。
pub struct RenewalContext {
    /// ACME 客户端 (certbot)
    pub acme_client: Arc<dyn AcmeClient>,
    /// 挑战记录所在区域的 DNS Provider
    pub dns_provider: Arc<dyn DnsProvider>,
}

impl RenewalContext {
    #[must_use]
    pub fn new(acme_client: Arc<dyn AcmeClient>, dns_provider: Arc<dyn DnsProvider>) -> Self {
        Self {
            acme_client,
            dns_provider,
        }
    }
}
