//! Certificate expiry check

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use x509_parser::pem::parse_x509_pem;

use crate::error::{CoreError, CoreResult};

/// `notAfter` of the first certificate in a PEM file.
pub fn read_not_after(path: &Path) -> CoreResult<DateTime<Utc>> {
    let data = std::fs::read(path).map_err(|e| CoreError::io(path, e))?;

    let (_, pem) = parse_x509_pem(&data).map_err(|e| {
        CoreError::Config(format!("{}: not a PEM certificate: {e}", path.display()))
    })?;
    let cert = pem.parse_x509().map_err(|e| {
        CoreError::Config(format!("{}: invalid X.509 certificate: {e}", path.display()))
    })?;

    let timestamp = cert.validity().not_after.timestamp();
    DateTime::from_timestamp(timestamp, 0).ok_or_else(|| {
        CoreError::Config(format!(
            "{}: notAfter out of range: {timestamp}",
            path.display()
        ))
    })
}

/// Whether the certificate at `path` is absent or expires within `window` of `now`.
///
/// A file that cannot be read or parsed needs renewal as well.
pub fn needs_renewal(path: &Path, window: Duration, now: DateTime<Utc>) -> bool {
    if !path.exists() {
        log::debug!("{} does not exist", path.display());
        return true;
    }

    match read_not_after(path) {
        Ok(not_after) => {
            let window = chrono::Duration::from_std(window).unwrap_or(chrono::Duration::MAX);
            let deadline = now.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC);
            log::debug!("{} expires at {not_after}", path.display());
            not_after <= deadline
        }
        Err(e) => {
            log::warn!("Cannot determine expiry, renewing: {e}");
            true
        }
    }
}
