//! Domain authority check for challenge record names

use crate::types::{ChallengeEvent, FailureReason};

/// Whether `record_name` falls under the DNS suffix we are authoritative for.
///
/// Comparison is ASCII case-insensitive and ignores one trailing root dot on
/// either side. Leading dots on the suffix are ignored, so `.example.com` and
/// `example.com` are equivalent. The suffix must match on a label boundary, so `evilexample.com`
/// is not under `example.com`. An empty suffix matches nothing.
pub fn validate(record_name: &str, required_suffix: &str) -> bool {
    let name = trim_root(record_name).to_ascii_lowercase();
    let suffix = trim_root(required_suffix)
        .trim_start_matches('.')
        .to_ascii_lowercase();
    if suffix.is_empty() {
        return false;
    }

    match name.strip_suffix(&suffix) {
        Some("") => true,
        Some(head) => head.ends_with('.'),
        None => false,
    }
}

fn trim_root(name: &str) -> &str {
    let name = name.trim();
    name.strip_suffix('.').unwrap_or(name)
}

/// Authority validator bound to the configured suffix.
#[derive(Debug, Clone)]
pub struct AuthorityValidator {
    required_suffix: String,
}

impl AuthorityValidator {
    pub fn new(required_suffix: impl Into<String>) -> Self {
        Self {
            required_suffix: required_suffix.into(),
        }
    }

    pub fn required_suffix(&self) -> &str {
        &self.required_suffix
    }

    /// Check an event, producing the failure reason on violation.
    pub fn check(&self, event: &ChallengeEvent) -> Result<(), FailureReason> {
        if validate(&event.record_name, &self.required_suffix) {
            Ok(())
        } else {
            Err(FailureReason::AuthorityViolation {
                record_name: event.record_name.clone(),
                required_suffix: self.required_suffix.clone(),
            })
        }
    }
}
