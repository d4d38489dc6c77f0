//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use acme_dns_provider::{DnsProvider, ProviderError, ProvisionedRecord};
use async_trait::async_trait;

use crate::error::{CoreError, CoreResult};
use crate::traits::{AcmeClient, AcmeSession, Notification, Notifier};
use crate::types::RenewalRequest;

// ===== MockDnsProvider =====

/// Provider that records every call and answers from a script.
///
/// Creates without a scripted answer succeed with ids `rec1`, `rec2`, ...
#[derive(Default)]
pub struct MockDnsProvider {
    creates: Mutex<Vec<(String, String)>>,
    deletes: Mutex<Vec<String>>,
    create_results: Mutex<VecDeque<Result<String, ProviderError>>>,
    delete_errors: Mutex<HashMap<String, ProviderError>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next create with `record_id`.
    pub fn push_create_id(&self, record_id: &str) {
        self.create_results
            .lock()
            .unwrap()
            .push_back(Ok(record_id.to_string()));
    }

    /// Fail the next create with `error`.
    pub fn push_create_error(&self, error: ProviderError) {
        self.create_results.lock().unwrap().push_back(Err(error));
    }

    /// Fail every delete of `record_id`.
    pub fn fail_delete(&self, record_id: &str, error: ProviderError) {
        self.delete_errors
            .lock()
            .unwrap()
            .insert(record_id.to_string(), error);
    }

    pub fn creates(&self) -> Vec<(String, String)> {
        self.creates.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl DnsProvider for MockDnsProvider {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn create_challenge_record(
        &self,
        name: &str,
        value: &str,
    ) -> acme_dns_provider::Result<ProvisionedRecord> {
        let count = {
            let mut creates = self.creates.lock().unwrap();
            creates.push((name.to_string(), value.to_string()));
            creates.len()
        };
        let scripted = self.create_results.lock().unwrap().pop_front();
        let record_id = match scripted {
            Some(result) => result?,
            None => format!("rec{count}"),
        };
        Ok(ProvisionedRecord {
            record_id,
            name: name.to_string(),
        })
    }

    async fn delete_record(&self, record_id: &str) -> acme_dns_provider::Result<()> {
        self.deletes.lock().unwrap().push(record_id.to_string());
        match self.delete_errors.lock().unwrap().get(record_id) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

pub fn api_error(status_code: u16) -> ProviderError {
    ProviderError::ApiError {
        provider: "mock".to_string(),
        status_code,
        raw_message: None,
    }
}

pub fn transport_error() -> ProviderError {
    ProviderError::NetworkError {
        provider: "mock".to_string(),
        detail: "connection reset".to_string(),
    }
}

// ===== ScriptedAcmeClient =====

#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Emit one line of standard output.
    Line(String),
    /// Block until a confirmation newline has been sent.
    AwaitContinue,
    /// Never produce another line.
    Hang,
}

/// What one spawned session does.
#[derive(Debug, Clone, Default)]
pub struct SessionScript {
    pub steps: Vec<ScriptStep>,
    pub exit_code: Option<i32>,
    /// Fail writes to standard input.
    pub broken_stdin: bool,
}

impl SessionScript {
    pub fn new(exit_code: i32) -> Self {
        Self {
            exit_code: Some(exit_code),
            ..Self::default()
        }
    }

    /// Append a certbot style announcement for `name` followed by its prompt.
    #[must_use]
    pub fn challenge(mut self, name: &str, token: &str) -> Self {
        let lines = [
            "Please deploy a DNS TXT record under the name:".to_string(),
            String::new(),
            format!("{name}."),
            String::new(),
            "with the following value:".to_string(),
            String::new(),
            token.to_string(),
            String::new(),
            format!("Admin Toolbox: https://toolbox.googleapps.com/apps/dig/#TXT/{name}."),
            "Press Enter to Continue".to_string(),
        ];
        self.steps.extend(lines.into_iter().map(ScriptStep::Line));
        self.steps.push(ScriptStep::AwaitContinue);
        self
    }

    #[must_use]
    pub fn line(mut self, line: &str) -> Self {
        self.steps.push(ScriptStep::Line(line.to_string()));
        self
    }

    #[must_use]
    pub fn hang(mut self) -> Self {
        self.steps.push(ScriptStep::Hang);
        self
    }

    #[must_use]
    pub fn broken_stdin(mut self) -> Self {
        self.broken_stdin = true;
        self
    }
}

/// Everything scripted sessions observed.
#[derive(Debug, Default)]
pub struct AcmeLog {
    pub spawned: Vec<RenewalRequest>,
    pub continues: usize,
    pub terminated: usize,
    pub waited: usize,
}

/// ACME client replaying one [`SessionScript`] per spawn; spawn fails when none is left.
#[derive(Default)]
pub struct ScriptedAcmeClient {
    scripts: Mutex<VecDeque<SessionScript>>,
    log: Arc<Mutex<AcmeLog>>,
}

impl ScriptedAcmeClient {
    pub fn new(scripts: impl IntoIterator<Item = SessionScript>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into_iter().collect()),
            log: Arc::default(),
        }
    }

    pub fn log(&self) -> std::sync::MutexGuard<'_, AcmeLog> {
        self.log.lock().unwrap()
    }
}

#[async_trait]
impl AcmeClient for ScriptedAcmeClient {
    async fn spawn(&self, request: &RenewalRequest) -> CoreResult<Box<dyn AcmeSession>> {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CoreError::Process("failed to start ACME client: not found".into()))?;
        self.log.lock().unwrap().spawned.push(request.clone());
        Ok(Box::new(ScriptedSession {
            steps: script.steps.into(),
            exit_code: script.exit_code,
            broken_stdin: script.broken_stdin,
            pending_continues: 0,
            terminated: false,
            log: Arc::clone(&self.log),
        }))
    }
}

struct ScriptedSession {
    steps: VecDeque<ScriptStep>,
    exit_code: Option<i32>,
    broken_stdin: bool,
    pending_continues: usize,
    terminated: bool,
    log: Arc<Mutex<AcmeLog>>,
}

#[async_trait]
impl AcmeSession for ScriptedSession {
    async fn next_line(&mut self) -> CoreResult<Option<String>> {
        if self.terminated {
            return Ok(None);
        }
        loop {
            match self.steps.pop_front() {
                None => return Ok(None),
                Some(ScriptStep::Line(line)) => return Ok(Some(line)),
                Some(ScriptStep::AwaitContinue) => {
                    if self.pending_continues == 0 {
                        return Err(CoreError::Process(
                            "read while the prompt was unconfirmed".into(),
                        ));
                    }
                    self.pending_continues -= 1;
                }
                Some(ScriptStep::Hang) => std::future::pending::<()>().await,
            }
        }
    }

    async fn send_continue(&mut self) -> CoreResult<()> {
        if self.broken_stdin {
            return Err(CoreError::Process("failed to signal ACME client: Broken pipe".into()));
        }
        self.pending_continues += 1;
        self.log.lock().unwrap().continues += 1;
        Ok(())
    }

    async fn terminate(&mut self) {
        self.terminated = true;
        self.log.lock().unwrap().terminated += 1;
    }

    async fn wait(&mut self) -> CoreResult<Option<i32>> {
        self.log.lock().unwrap().waited += 1;
        if self.terminated {
            Ok(None)
        } else {
            Ok(self.exit_code)
        }
    }
}

// ===== RecordingNotifier =====

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> CoreResult<()> {
        self.sent.lock().unwrap().push(notification.clone());
        if self.fail {
            return Err(CoreError::Notification("relay refused".into()));
        }
        Ok(())
    }
}

pub fn request(line: &str) -> RenewalRequest {
    RenewalRequest::parse_line(line).unwrap().unwrap()
}
