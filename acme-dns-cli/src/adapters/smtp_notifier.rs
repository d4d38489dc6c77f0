//! SMTP delivery of renewal notifications

use std::time::Duration;

use acme_dns_core::config::NotificationConfig;
use acme_dns_core::{CoreError, CoreResult, Notification, NotificationFormat, Notifier};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::{message::header::ContentType, Message, SmtpTransport, Transport};

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends notifications through a plain SMTP relay.
pub struct SmtpNotifier {
    config: NotificationConfig,
}

impl SmtpNotifier {
    pub fn new(config: NotificationConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, notification: &Notification) -> CoreResult<Message> {
        let parse_address = |addr: &str| -> CoreResult<Mailbox> {
            addr.parse()
                .map_err(|e| CoreError::Notification(format!("invalid address '{addr}': {e}")))
        };

        let content_type = match notification.format {
            NotificationFormat::Html => ContentType::TEXT_HTML,
            NotificationFormat::PlainText => ContentType::TEXT_PLAIN,
        };

        Message::builder()
            .from(parse_address(&self.config.from)?)
            .to(parse_address(&self.config.to)?)
            .subject(notification.subject.clone())
            .header(content_type)
            .body(notification.body.clone())
            .map_err(|e| CoreError::Notification(format!("failed to build message: {e}")))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, notification: &Notification) -> CoreResult<()> {
        let message = self.build_message(notification)?;
        let server = self.config.smtp_server.clone();
        let port = self.config.smtp_port;

        tracing::debug!("Sending '{}' via {server}:{port}", notification.subject);

        // SmtpTransport is blocking
        tokio::task::spawn_blocking(move || {
            let transport = SmtpTransport::builder_dangerous(&server)
                .port(port)
                .timeout(Some(SMTP_TIMEOUT))
                .build();
            transport.send(&message)
        })
        .await
        .map_err(|e| CoreError::Notification(format!("mail task failed: {e}")))?
        .map_err(|e| CoreError::Notification(format!("SMTP delivery failed: {e}")))?;

        Ok(())
    }
}
