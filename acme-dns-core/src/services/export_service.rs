//! Export of renewed certificate material

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use nix::unistd::{Gid, Group, Uid, User};

use crate::certificate::{CertificateLayout, backup_path};
use crate::error::{CoreError, CoreResult};
use crate::types::CertIdentity;

#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Directory receiving `<identity>.cer` / `<identity>.key`.
    pub cert_dir: PathBuf,
    /// The ACME client's per-lineage live directory root.
    pub live_dir: PathBuf,
    /// User name to own the exported files.
    pub owner: Option<String>,
    /// Group name to own the exported files.
    pub group: Option<String>,
}

/// Copies renewed material out of the ACME client's live directory.
pub struct ExportService {
    settings: ExportSettings,
}

impl ExportService {
    #[must_use]
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    pub fn layout(&self, identity: CertIdentity) -> CertificateLayout {
        CertificateLayout::new(identity, &self.settings.cert_dir, &self.settings.live_dir)
    }

    /// Export the live chain and key of `layout`.
    ///
    /// The new files are staged next to their targets and only renamed into
    /// place once staging and backups succeeded. Existing exported files are
    /// kept as `<file>.old-<today>`. On failure the previous files stay current.
    pub async fn export(&self, layout: &CertificateLayout, today: NaiveDate) -> CoreResult<()> {
        for source in [&layout.live_chain_path, &layout.live_key_path] {
            if !tokio::fs::try_exists(source)
                .await
                .map_err(|e| CoreError::io(source, e))?
            {
                return Err(CoreError::Export(format!(
                    "{} does not exist",
                    source.display()
                )));
            }
        }

        let staged_cert = staging_path(&layout.cert_path);
        let staged_key = staging_path(&layout.key_path);
        let result = self
            .swap_in(layout, &staged_cert, &staged_key, today)
            .await;
        for staged in [&staged_cert, &staged_key] {
            if path_exists(staged).await {
                if let Err(e) = tokio::fs::remove_file(staged).await {
                    log::warn!("Failed to remove {}: {e}", staged.display());
                }
            }
        }
        result
    }

    async fn swap_in(
        &self,
        layout: &CertificateLayout,
        staged_cert: &Path,
        staged_key: &Path,
        today: NaiveDate,
    ) -> CoreResult<()> {
        log::info!(
            "[{}] Copying certificate to {}",
            layout.identity,
            layout.cert_path.display()
        );
        copy(&layout.live_chain_path, staged_cert).await?;
        copy(&layout.live_key_path, staged_key).await?;

        let (uid, gid) = self.resolve_ownership()?;
        if uid.is_some() || gid.is_some() {
            for path in [staged_cert, staged_key] {
                nix::unistd::chown(path, uid, gid).map_err(|e| {
                    CoreError::Export(format!("unable to set ownership of {} - {e}", path.display()))
                })?;
            }
        }

        // The key is only rotated together with an existing certificate.
        let old_cert = if path_exists(&layout.cert_path).await {
            log::info!("[{}] Keeping previous certificate files", layout.identity);
            let backup = backup_path(&layout.cert_path, today);
            copy(&layout.cert_path, &backup).await?;
            if path_exists(&layout.key_path).await {
                copy(&layout.key_path, &backup_path(&layout.key_path, today)).await?;
            }
            Some(backup)
        } else {
            None
        };

        rename(staged_cert, &layout.cert_path).await?;
        if let Err(e) = rename(staged_key, &layout.key_path).await {
            log::error!(
                "[{}] Key could not be installed, restoring previous certificate",
                layout.identity
            );
            let restored = match &old_cert {
                Some(backup) => copy(backup, &layout.cert_path).await,
                None => tokio::fs::remove_file(&layout.cert_path)
                    .await
                    .map_err(|e| CoreError::io(&layout.cert_path, e)),
            };
            if let Err(restore_error) = restored {
                log::error!("[{}] Restore failed: {restore_error}", layout.identity);
            }
            return Err(e);
        }

        Ok(())
    }

    fn resolve_ownership(&self) -> CoreResult<(Option<Uid>, Option<Gid>)> {
        let uid = match &self.settings.owner {
            Some(name) => Some(
                User::from_name(name)
                    .map_err(|e| CoreError::Export(format!("unable to look up user {name} - {e}")))?
                    .ok_or_else(|| CoreError::Export(format!("no such user: {name}")))?
                    .uid,
            ),
            None => None,
        };
        let gid = match &self.settings.group {
            Some(name) => Some(
                Group::from_name(name)
                    .map_err(|e| CoreError::Export(format!("unable to look up group {name} - {e}")))?
                    .ok_or_else(|| CoreError::Export(format!("no such group: {name}")))?
                    .gid,
            ),
            None => None,
        };
        Ok((uid, gid))
    }
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// `<path>.new`, next to the target so the final rename stays on one filesystem.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".new");
    PathBuf::from(name)
}

async fn rename(from: &Path, to: &Path) -> CoreResult<()> {
    tokio::fs::rename(from, to)
        .await
        .map_err(|e| CoreError::io(to, e))
}

async fn copy(from: &Path, to: &Path) -> CoreResult<()> {
    tokio::fs::copy(from, to)
        .await
        .map(|_| ())
        .map_err(|e| CoreError::io(to, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        _dir: tempfile::TempDir,
        service: ExportService,
        layout: CertificateLayout,
    }

    fn fixture(owner: Option<&str>) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let cert_dir = dir.path().join("certs");
        let live_dir = dir.path().join("live");
        std::fs::create_dir_all(&cert_dir).unwrap();
        std::fs::create_dir_all(live_dir.join("_.example.com")).unwrap();

        let service = ExportService::new(ExportSettings {
            cert_dir,
            live_dir,
            owner: owner.map(str::to_string),
            group: None,
        });
        let layout = service.layout(CertIdentity::from_domain("*.example.com"));
        Fixture {
            _dir: dir,
            service,
            layout,
        }
    }

    fn write_live(layout: &CertificateLayout) {
        std::fs::write(&layout.live_chain_path, "new chain").unwrap();
        std::fs::write(&layout.live_key_path, "new key").unwrap();
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[tokio::test]
    async fn first_export_copies_files() {
        let f = fixture(None);
        write_live(&f.layout);

        f.service.export(&f.layout, today()).await.unwrap();

        assert_eq!(std::fs::read_to_string(&f.layout.cert_path).unwrap(), "new chain");
        assert_eq!(std::fs::read_to_string(&f.layout.key_path).unwrap(), "new key");
        assert!(!backup_path(&f.layout.cert_path, today()).exists());
    }

    #[tokio::test]
    async fn previous_files_are_kept_with_date_suffix() {
        let f = fixture(None);
        write_live(&f.layout);
        std::fs::write(&f.layout.cert_path, "old chain").unwrap();
        std::fs::write(&f.layout.key_path, "old key").unwrap();

        f.service.export(&f.layout, today()).await.unwrap();

        let old_cert = backup_path(&f.layout.cert_path, today());
        let old_key = backup_path(&f.layout.key_path, today());
        assert!(old_cert.ends_with("_.example.com.cer.old-2026-10-19"));
        assert_eq!(std::fs::read_to_string(old_cert).unwrap(), "old chain");
        assert_eq!(std::fs::read_to_string(old_key).unwrap(), "old key");
        assert_eq!(std::fs::read_to_string(&f.layout.cert_path).unwrap(), "new chain");
    }

    #[tokio::test]
    async fn missing_live_material_leaves_export_untouched() {
        let f = fixture(None);
        std::fs::write(&f.layout.cert_path, "old chain").unwrap();

        let err = f.service.export(&f.layout, today()).await.unwrap_err();

        assert!(matches!(err, CoreError::Export(_)), "{err}");
        assert_eq!(std::fs::read_to_string(&f.layout.cert_path).unwrap(), "old chain");
    }

    fn assert_no_staged_files(layout: &CertificateLayout) {
        assert!(!staging_path(&layout.cert_path).exists());
        assert!(!staging_path(&layout.key_path).exists());
    }

    #[tokio::test]
    async fn unknown_owner_fails_export() {
        let f = fixture(Some("no-such-user-for-acme-dns-tests"));
        write_live(&f.layout);
        std::fs::write(&f.layout.cert_path, "old chain").unwrap();

        let err = f.service.export(&f.layout, today()).await.unwrap_err();

        assert!(err.to_string().contains("no such user"), "{err}");
        assert_eq!(std::fs::read_to_string(&f.layout.cert_path).unwrap(), "old chain");
        assert_no_staged_files(&f.layout);
    }

    #[tokio::test]
    async fn failed_key_backup_keeps_current_certificate() {
        let f = fixture(None);
        write_live(&f.layout);
        std::fs::write(&f.layout.cert_path, "old chain").unwrap();
        // A directory cannot be copied to its backup name
        std::fs::create_dir(&f.layout.key_path).unwrap();

        let err = f.service.export(&f.layout, today()).await.unwrap_err();

        assert!(matches!(err, CoreError::Io { .. }), "{err}");
        assert_eq!(std::fs::read_to_string(&f.layout.cert_path).unwrap(), "old chain");
        assert_no_staged_files(&f.layout);
    }

    #[tokio::test]
    async fn failed_key_install_removes_new_certificate() {
        let f = fixture(None);
        write_live(&f.layout);
        std::fs::create_dir(&f.layout.key_path).unwrap();
        std::fs::write(f.layout.key_path.join("keep"), "x").unwrap();

        let err = f.service.export(&f.layout, today()).await.unwrap_err();

        assert!(matches!(err, CoreError::Io { .. }), "{err}");
        assert!(!f.layout.cert_path.exists());
        assert_no_staged_files(&f.layout);
    }
}
