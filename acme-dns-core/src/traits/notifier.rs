//! Notification delivery abstraction

use async_trait::async_trait;

use crate::error::CoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationFormat {
    Html,
    PlainText,
}

/// A message ready to be delivered to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    pub format: NotificationFormat,
}

/// Delivers notifications (e-mail in production).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> CoreResult<()>;
}
