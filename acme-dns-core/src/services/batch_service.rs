//! Batch runner over the domain list

use std::time::Duration;

use chrono::{Local, Utc};

use crate::certificate::needs_renewal;
use crate::services::{ExportService, HookService, RenewalService};
use crate::types::{
    AttemptOutcome, BatchReport, EntryFailure, EntryResult, EntryStatus, RenewalRequest,
};

/// Runs every entry of the domain list in order, then the hooks of renewed entries.
pub struct BatchService {
    renewal: RenewalService,
    export: ExportService,
    hooks: HookService,
    renewal_window: Duration,
}

impl BatchService {
    #[must_use]
    pub fn new(
        renewal: RenewalService,
        export: ExportService,
        hooks: HookService,
        renewal_window: Duration,
    ) -> Self {
        Self {
            renewal,
            export,
            hooks,
            renewal_window,
        }
    }

    pub async fn run(&self, requests: &[RenewalRequest]) -> BatchReport {
        let mut entries = Vec::with_capacity(requests.len());
        for request in requests {
            entries.push(self.run_entry(request).await);
        }

        for entry in entries.iter_mut().filter(|e| e.is_renewed()) {
            entry.hook = Some(self.hooks.run(&entry.request.cert_identity()).await);
        }

        let report = BatchReport { entries };
        log::info!(
            "Batch finished: {} renewed, {} failed, {} skipped",
            report.renewed().count(),
            report.failed().count(),
            report.skipped_count()
        );
        report
    }

    async fn run_entry(&self, request: &RenewalRequest) -> EntryResult {
        let layout = self.export.layout(request.cert_identity());

        log::info!(
            "[{}] Checking whether {} expires within {}s",
            layout.identity,
            layout.cert_path.display(),
            self.renewal_window.as_secs()
        );
        if !needs_renewal(&layout.cert_path, self.renewal_window, Utc::now()) {
            log::info!("[{}] Certificate is not expiring, skipping", layout.identity);
            return EntryResult::skipped(request.clone());
        }

        log::info!("[{}] Renewing {request}", layout.identity);
        let attempt = self.renewal.run(request).await;

        let status = match attempt.outcome {
            AttemptOutcome::Success => {
                match self.export.export(&layout, Local::now().date_naive()).await {
                    Ok(()) => EntryStatus::Renewed,
                    Err(e) => {
                        log::error!("[{}] Export failed: {e}", layout.identity);
                        EntryStatus::Failed {
                            failure: EntryFailure::Export {
                                detail: e.to_string(),
                            },
                        }
                    }
                }
            }
            AttemptOutcome::Failure { reason } => EntryStatus::Failed {
                failure: EntryFailure::Attempt { reason },
            },
        };

        EntryResult {
            request: request.clone(),
            status,
            cleanup_alerts: attempt.cleanup_alerts,
            hook: None,
        }
    }
}
