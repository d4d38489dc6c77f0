//! ACME client process abstraction

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::RenewalRequest;

/// Starts interactive ACME client sessions.
///
/// Platform implementation:
/// - `CertbotClient` (certbot `--manual` subprocess)
/// - `ScriptedAcmeClient` (tests)
#[async_trait]
pub trait AcmeClient: Send + Sync {
    /// Start a client that requests a certificate for `request`.
    ///
    /// Errors mean nothing was started.
    async fn spawn(&self, request: &RenewalRequest) -> CoreResult<Box<dyn AcmeSession>>;
}

/// A running ACME client with a bidirectional line pipe.
///
/// Owned by exactly one attempt. The attempt either waits for it or
/// terminates it; implementations also kill the process when dropped.
#[async_trait]
pub trait AcmeSession: Send {
    /// Next line of standard output, `Ok(None)` once the stream has ended.
    async fn next_line(&mut self) -> CoreResult<Option<String>>;

    /// Confirm the current prompt by writing a newline to standard input.
    async fn send_continue(&mut self) -> CoreResult<()>;

    /// Kill the process and reap it. Best effort; never fails.
    async fn terminate(&mut self);

    /// Wait for the process to exit.
    ///
    /// Returns the exit code, `None` when killed by a signal.
    async fn wait(&mut self) -> CoreResult<Option<i32>>;

    /// Captured standard error so far, for diagnostics.
    fn stderr_output(&self) -> String {
        String::new()
    }
}
