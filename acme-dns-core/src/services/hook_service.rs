//! Post-renewal hooks
//!
//! `<post_scripts_dir>/<identity>.sh` runs after the certificate for that
//! identity was renewed and exported. The script is executed directly, so it
//! needs an interpreter line and the executable bit.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;

use crate::types::{CertIdentity, HookStatus};

pub struct HookService {
    scripts_dir: Option<PathBuf>,
}

impl HookService {
    #[must_use]
    pub fn new(scripts_dir: Option<PathBuf>) -> Self {
        Self { scripts_dir }
    }

    pub fn script_path(&self, identity: &CertIdentity) -> Option<PathBuf> {
        self.scripts_dir
            .as_ref()
            .map(|dir| dir.join(format!("{identity}.sh")))
    }

    /// Run the hook of `identity` if one exists. Failures are only reported.
    pub async fn run(&self, identity: &CertIdentity) -> HookStatus {
        let Some(script) = self.script_path(identity) else {
            return HookStatus::NotFound;
        };
        if !tokio::fs::try_exists(&script).await.unwrap_or(false) {
            log::debug!("[{identity}] No post-renewal hook at {}", script.display());
            return HookStatus::NotFound;
        }

        log::info!("[{identity}] Running post-renewal hook {}", script.display());
        let output = Command::new(&script)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => HookStatus::Succeeded,
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let detail = match output.status.code() {
                    Some(code) => format!("{} exited with code {code}", script.display()),
                    None => format!("{} terminated by signal", script.display()),
                };
                log::warn!("[{identity}] {detail}: {}", stderr.trim());
                HookStatus::Failed { detail }
            }
            Err(e) => {
                let detail = format!("failed to run {}: {e}", script.display());
                log::warn!("[{identity}] {detail}");
                HookStatus::Failed { detail }
            }
        }
    }
}
