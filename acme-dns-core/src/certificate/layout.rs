//! Identity to path derivation

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::types::CertIdentity;

/// Chain file name inside the ACME client's live directory.
const LIVE_CHAIN_FILE: &str = "fullchain.pem";
/// Private key file name inside the ACME client's live directory.
const LIVE_KEY_FILE: &str = "privkey.pem";

/// Where the files of one certificate live.
///
/// Pure function of the identity and the two configured directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateLayout {
    pub identity: CertIdentity,
    /// Exported chain, `<cert_dir>/<identity>.cer`. Also the expiry source.
    pub cert_path: PathBuf,
    /// Exported key, `<cert_dir>/<identity>.key`.
    pub key_path: PathBuf,
    /// `<live_dir>/<identity>/fullchain.pem`
    pub live_chain_path: PathBuf,
    /// `<live_dir>/<identity>/privkey.pem`
    pub live_key_path: PathBuf,
}

impl CertificateLayout {
    pub fn new(identity: CertIdentity, cert_dir: &Path, live_dir: &Path) -> Self {
        let live = live_dir.join(identity.as_str());
        Self {
            cert_path: cert_dir.join(format!("{identity}.cer")),
            key_path: cert_dir.join(format!("{identity}.key")),
            live_chain_path: live.join(LIVE_CHAIN_FILE),
            live_key_path: live.join(LIVE_KEY_FILE),
            identity,
        }
    }
}

/// `<path>.old-YYYY-MM-DD`
pub fn backup_path(path: &Path, date: NaiveDate) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".old-{}", date.format("%Y-%m-%d")));
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RenewalRequest;

    #[test]
    fn wildcard_identity_paths() {
        let request = RenewalRequest::parse_line("*.example.com,example.com")
            .unwrap()
            .unwrap();
        let layout = CertificateLayout::new(
            request.cert_identity(),
            Path::new("/etc/certs"),
            Path::new("/etc/letsencrypt/live"),
        );
        assert_eq!(layout.cert_path, Path::new("/etc/certs/_.example.com.cer"));
        assert_eq!(layout.key_path, Path::new("/etc/certs/_.example.com.key"));
        assert_eq!(
            layout.live_chain_path,
            Path::new("/etc/letsencrypt/live/_.example.com/fullchain.pem")
        );
        assert_eq!(
            layout.live_key_path,
            Path::new("/etc/letsencrypt/live/_.example.com/privkey.pem")
        );
    }

    #[test]
    fn same_identity_same_paths() {
        let a = CertIdentity::from_domain("*.example.com");
        let b = RenewalRequest::parse_line("*.example.com")
            .unwrap()
            .unwrap()
            .cert_identity();
        let dirs = (Path::new("/srv/certs"), Path::new("/live"));
        assert_eq!(
            CertificateLayout::new(a, dirs.0, dirs.1),
            CertificateLayout::new(b, dirs.0, dirs.1)
        );
    }

    #[test]
    fn backup_suffix_uses_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(
            backup_path(Path::new("/etc/certs/a.example.com.cer"), date),
            Path::new("/etc/certs/a.example.com.cer.old-2026-03-07")
        );
    }
}
