//! Type definitions

mod outcome;
mod report;
mod request;

pub use outcome::{AttemptOutcome, AttemptReport, ChallengeEvent, CleanupAlert, FailureReason};
pub use report::{BatchReport, EntryFailure, EntryResult, EntryStatus, HookStatus};
pub use request::{CertIdentity, RenewalRequest, parse_domain_list};
