//! Renewal request and certificate identity

use std::fmt;

use serde::Serialize;

use crate::error::{CoreError, CoreResult};

/// Filesystem-safe certificate identity derived from the first domain.
///
/// A leading wildcard label `*.` becomes `_.`, so `*.example.com` is stored as
/// `_.example.com`. The identity names the ACME client's certificate lineage,
/// the exported files and the post-renewal hook.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CertIdentity(String);

impl CertIdentity {
    /// Derive the identity of a certificate whose first domain is `domain`.
    pub fn from_domain(domain: &str) -> Self {
        match domain.strip_prefix("*.") {
            Some(rest) => Self(format!("_.{rest}")),
            None => Self(domain.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CertIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, non-empty set of domains covered by one certificate.
///
/// The first domain is the certificate identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenewalRequest {
    domains: Vec<String>,
}

impl RenewalRequest {
    /// Create a request, rejecting an empty list or blank names.
    pub fn new(domains: Vec<String>) -> CoreResult<Self> {
        if domains.is_empty() {
            return Err(CoreError::InvalidRequest(
                "at least one domain is required".to_string(),
            ));
        }
        if let Some(blank) = domains.iter().find(|d| d.trim().is_empty() || d.contains(' ')) {
            return Err(CoreError::InvalidRequest(format!(
                "invalid domain name '{blank}'"
            )));
        }
        Ok(Self { domains })
    }

    /// Parse one domain list line: comma separated names, first is the identity.
    ///
    /// Returns `Ok(None)` for blank lines and `#` comments.
    pub fn parse_line(line: &str) -> CoreResult<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let domains: Vec<String> = line
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect();

        Self::new(domains).map(Some)
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn primary_domain(&self) -> &str {
        &self.domains[0]
    }

    pub fn cert_identity(&self) -> CertIdentity {
        CertIdentity::from_domain(self.primary_domain())
    }

    /// Domains joined with commas, the form the ACME client and reports expect.
    pub fn joined(&self) -> String {
        self.domains.join(",")
    }
}

impl fmt::Display for RenewalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

/// Parse a whole domain list file, one certificate per line.
///
/// Errors carry the 1-based line number.
pub fn parse_domain_list(content: &str) -> CoreResult<Vec<RenewalRequest>> {
    let mut requests = Vec::new();
    for (index, line) in content.lines().enumerate() {
        match RenewalRequest::parse_line(line) {
            Ok(Some(request)) => requests.push(request),
            Ok(None) => {}
            Err(e) => {
                return Err(CoreError::InvalidRequest(format!(
                    "line {}: {e}",
                    index + 1
                )));
            }
        }
    }
    Ok(requests)
}
