//! Platform adapters for the core traits

mod smtp_notifier;

pub use smtp_notifier::SmtpNotifier;
