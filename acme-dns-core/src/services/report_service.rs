//! Batch report rendering and delivery

use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::traits::{Notification, NotificationFormat, Notifier};
use crate::types::{BatchReport, CleanupAlert};

pub const SUBJECT_SUCCESS: &str = "Certbot Renewals Successful";
pub const SUBJECT_MIXED: &str = "Certbot Renewals With Errors";
pub const SUBJECT_FAILED: &str = "Certbot Renewals Failed";
pub const SUBJECT_CLEANUP: &str = "Error on Certbot Cleanup";

/// Summary mail for a batch; `None` when nothing was renewed or failed.
pub fn summary_notification(
    report: &BatchReport,
    generated_at: DateTime<Local>,
) -> Option<Notification> {
    let renewed: Vec<_> = report.renewed().collect();
    let failed: Vec<_> = report.failed().collect();

    let subject = match (renewed.is_empty(), failed.is_empty()) {
        (true, true) => return None,
        (false, true) => SUBJECT_SUCCESS,
        (false, false) => SUBJECT_MIXED,
        (true, false) => SUBJECT_FAILED,
    };

    let mut body = String::from("<html>\n");
    if !renewed.is_empty() {
        body.push_str("  The following domains were successfully renewed:\n  <ul>\n");
        for entry in &renewed {
            body.push_str(&format!(
                "    <li>{}</li>\n",
                escape_html(&entry.request.joined())
            ));
        }
        body.push_str("  </ul>\n");
    }
    if !failed.is_empty() {
        body.push_str("  The following domains failed to renew:\n  <ul>\n");
        for (entry, failure) in &failed {
            body.push_str(&format!(
                "    <li>{}\n      <ul>\n        <li>{}</li>\n      </ul>\n    </li>\n",
                escape_html(&entry.request.joined()),
                escape_html(&failure.to_string())
            ));
        }
        body.push_str("  </ul>\n");
    }
    body.push_str(&format!(
        "\n  Alert Generated: {}\n</html>\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    Some(Notification {
        subject: subject.to_string(),
        body,
        format: NotificationFormat::Html,
    })
}

/// Operator alert for a challenge record that is still published.
pub fn cleanup_alert_notification(alert: &CleanupAlert) -> Notification {
    Notification {
        subject: SUBJECT_CLEANUP.to_string(),
        body: format!(
            "Unable to delete the leftover ACME record {} (id {}), \
             this will need to be deleted manually at the DNS provider.\n\nError: {}\n",
            alert.record.name, alert.record.record_id, alert.error
        ),
        format: NotificationFormat::PlainText,
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Sends cleanup alerts and the batch summary.
pub struct ReportService {
    notifier: Arc<dyn Notifier>,
}

impl ReportService {
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Deliver every notification for `report`.
    ///
    /// Delivery failures are logged; returns how many messages could not be sent.
    pub async fn notify(&self, report: &BatchReport) -> usize {
        let mut messages: Vec<Notification> = report
            .cleanup_alerts()
            .map(cleanup_alert_notification)
            .collect();
        messages.extend(summary_notification(report, Local::now()));

        let mut failures = 0;
        for message in &messages {
            match self.notifier.send(message).await {
                Ok(()) => log::info!("Sent notification: {}", message.subject),
                Err(e) => {
                    failures += 1;
                    log::error!("Failed to send notification '{}': {e}", message.subject);
                }
            }
        }
        failures
    }
}
