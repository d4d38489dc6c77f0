//! certbot `--manual` subprocess
//!
//! Standard output is read line by line, standard input receives the
//! confirmation newlines, standard error is drained in the background and
//! surfaced when the run fails.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::error::{CoreError, CoreResult};
use crate::traits::{AcmeClient, AcmeSession};
use crate::types::RenewalRequest;

/// How to invoke certbot.
#[derive(Debug, Clone)]
pub struct CertbotOptions {
    /// Executable name or path.
    pub binary: PathBuf,
    /// Account contact address passed with `-m`.
    pub contact_email: String,
    /// Appended after the generated arguments (e.g. `--staging`).
    pub extra_args: Vec<String>,
}

/// Spawns one certbot process per renewal request.
#[derive(Debug, Clone)]
pub struct CertbotClient {
    options: CertbotOptions,
}

impl CertbotClient {
    pub fn new(options: CertbotOptions) -> Self {
        Self { options }
    }

    /// Command line arguments for `request`, without the executable.
    pub fn build_args(&self, request: &RenewalRequest) -> Vec<String> {
        let mut args: Vec<String> = [
            "certonly",
            "--manual",
            "--force-renewal",
            "--preferred-challenges",
            "dns",
            "--agree-tos",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        args.push("-d".to_string());
        args.push(request.joined());
        args.push("-m".to_string());
        args.push(self.options.contact_email.clone());
        args.push("--cert-name".to_string());
        args.push(request.cert_identity().to_string());
        args.extend(self.options.extra_args.iter().cloned());
        args
    }
}

#[async_trait]
impl AcmeClient for CertbotClient {
    async fn spawn(&self, request: &RenewalRequest) -> CoreResult<Box<dyn AcmeSession>> {
        let args = self.build_args(request);
        log::debug!(
            "[certbot] {} {}",
            self.options.binary.display(),
            args.join(" ")
        );

        let mut cmd = Command::new(&self.options.binary);
        cmd.args(&args);
        let session = CertbotSession::from_command(cmd)?;
        Ok(Box::new(session))
    }
}

/// A running certbot process.
pub struct CertbotSession {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    stdin: Option<ChildStdin>,
    /// Stderr output collected by a background reader task.
    stderr_buf: Arc<Mutex<String>>,
}

impl CertbotSession {
    /// Spawn `cmd` with all three standard streams piped.
    ///
    /// The process is killed if the session is dropped while still running.
    pub fn from_command(mut cmd: Command) -> CoreResult<Self> {
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| CoreError::Process(format!("failed to start ACME client: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CoreError::Process("stdout not captured".into()))?;

        let stdin = child.stdin.take();

        let stderr_buf = Arc::new(Mutex::new(String::new()));
        if let Some(stderr) = child.stderr.take() {
            let buf = Arc::clone(&stderr_buf);
            tokio::spawn(async move {
                let mut reader = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = reader.next_line().await {
                    if let Ok(mut b) = buf.lock() {
                        if !b.is_empty() {
                            b.push('\n');
                        }
                        b.push_str(&line);
                    }
                }
            });
        }

        Ok(Self {
            child,
            lines: BufReader::new(stdout).lines(),
            stdin,
            stderr_buf,
        })
    }
}

#[async_trait]
impl AcmeSession for CertbotSession {
    async fn next_line(&mut self) -> CoreResult<Option<String>> {
        let line = self
            .lines
            .next_line()
            .await
            .map_err(|e| CoreError::Process(format!("failed to read ACME client output: {e}")))?;
        if let Some(line) = &line {
            log::trace!("[certbot] {line}");
        }
        Ok(line)
    }

    async fn send_continue(&mut self) -> CoreResult<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| CoreError::Process("stdin already closed".into()))?;

        stdin
            .write_all(b"\n")
            .await
            .map_err(|e| CoreError::Process(format!("failed to signal ACME client: {e}")))?;
        stdin
            .flush()
            .await
            .map_err(|e| CoreError::Process(format!("failed to signal ACME client: {e}")))?;
        Ok(())
    }

    async fn terminate(&mut self) {
        self.stdin.take();
        if let Err(e) = self.child.kill().await {
            log::warn!("[certbot] Failed to kill process: {e}");
        }
    }

    async fn wait(&mut self) -> CoreResult<Option<i32>> {
        self.stdin.take();
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| CoreError::Process(format!("failed to wait for ACME client: {e}")))?;
        Ok(status.code())
    }

    fn stderr_output(&self) -> String {
        self.stderr_buf
            .lock()
            .map(|b| b.clone())
            .unwrap_or_default()
    }
}
