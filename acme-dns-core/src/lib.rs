//! ACME DNS Orchestrator Core Library
//!
//! Drives DNS-01 certificate renewals through an external ACME client:
//! - challenge stream parsing and domain authority validation
//! - the renewal orchestrator (publish, wait, confirm, clean up)
//! - the batch runner with expiry gating, export and post-renewal hooks
//! - report rendering for the notification layer
//!
//! Process and notification boundaries are traits, so the orchestration
//! can be driven by scripted clients in tests.

pub mod acme;
pub mod certificate;
pub mod challenge;
pub mod config;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use config::AppConfig;
pub use error::{CoreError, CoreResult};
pub use services::{BatchService, RenewalContext, RenewalService, ReportService};
pub use traits::{AcmeClient, AcmeSession, Notification, NotificationFormat, Notifier};
