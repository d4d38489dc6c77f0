//! Traits at the process and notification boundaries

mod acme_client;
mod notifier;

pub use acme_client::{AcmeClient, AcmeSession};
pub use notifier::{Notification, NotificationFormat, Notifier};
