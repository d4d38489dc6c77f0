//! Renewal orchestrator
//!
//! Drives one attempt: spawn the ACME client, turn its output into challenge
//! events, publish each record, wait for propagation, confirm, and finally
//! remove every record that was published, whatever the outcome.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use acme_dns_provider::ProvisionedRecord;
use tokio::time::Instant;

use crate::challenge::{AuthorityValidator, ChallengeParser};
use crate::services::RenewalContext;
use crate::traits::AcmeSession;
use crate::types::{AttemptOutcome, AttemptReport, CleanupAlert, FailureReason, RenewalRequest};

/// Attempt states, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Spawned,
    AwaitingChallenge,
    Validating,
    Provisioning,
    AwaitingPropagation,
    SignalingContinue,
    Completing,
    Succeeded,
    Failed,
    CleaningUp,
    Done,
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone)]
pub struct RenewalSettings {
    /// Zone suffix every challenge record must fall under.
    pub domain_suffix: String,
    /// Fixed wait between publishing a record and confirming it.
    pub propagation_delay: Duration,
    /// Upper bound for the whole challenge phase; unbounded when `None`.
    pub process_timeout: Option<Duration>,
}

/// Records published during one attempt: insertion ordered, unique by id.
#[derive(Debug, Default)]
struct ProvisionedSet {
    records: Vec<ProvisionedRecord>,
}

impl ProvisionedSet {
    fn insert(&mut self, record: ProvisionedRecord) {
        if self
            .records
            .iter()
            .any(|r| r.record_id == record.record_id)
        {
            log::warn!("Provider returned duplicate record id {}", record.record_id);
            return;
        }
        self.records.push(record);
    }
}

/// Runs renewal attempts against the context's ACME client and DNS provider.
pub struct RenewalService {
    ctx: Arc<RenewalContext>,
    validator: AuthorityValidator,
    settings: RenewalSettings,
}

impl RenewalService {
    #[must_use]
    pub fn new(ctx: Arc<RenewalContext>, settings: RenewalSettings) -> Self {
        Self {
            validator: AuthorityValidator::new(settings.domain_suffix.clone()),
            ctx,
            settings,
        }
    }

    /// Run one attempt to completion. Never fails: failures are in the outcome.
    pub async fn run(&self, request: &RenewalRequest) -> AttemptReport {
        let identity = request.cert_identity();
        let mut records = ProvisionedSet::default();

        let outcome = self.drive(request, &mut records).await;
        match &outcome {
            AttemptOutcome::Success => {
                transition(identity.as_str(), AttemptState::Succeeded);
                log::info!("[{identity}] Certificate renewal successful");
            }
            AttemptOutcome::Failure { reason } => {
                transition(identity.as_str(), AttemptState::Failed);
                log::error!("[{identity}] Certificate renewal failed: {reason}");
            }
        }

        transition(identity.as_str(), AttemptState::CleaningUp);
        let cleanup_alerts = self.cleanup(identity.as_str(), records).await;
        transition(identity.as_str(), AttemptState::Done);

        AttemptReport {
            request: request.clone(),
            outcome,
            cleanup_alerts,
        }
    }

    async fn drive(&self, request: &RenewalRequest, records: &mut ProvisionedSet) -> AttemptOutcome {
        let identity = request.cert_identity();

        let mut session = match self.ctx.acme_client.spawn(request).await {
            Ok(session) => session,
            Err(e) => {
                return AttemptOutcome::Failure {
                    reason: FailureReason::Process {
                        detail: e.to_string(),
                    },
                };
            }
        };
        transition(identity.as_str(), AttemptState::Spawned);

        if let Err(reason) = self
            .await_challenges(identity.as_str(), &mut *session, records)
            .await
        {
            session.terminate().await;
            log_stderr(identity.as_str(), &*session);
            return AttemptOutcome::Failure { reason };
        }

        transition(identity.as_str(), AttemptState::Completing);
        match session.wait().await {
            Ok(Some(0)) => AttemptOutcome::Success,
            Ok(code) => {
                log_stderr(identity.as_str(), &*session);
                AttemptOutcome::Failure {
                    reason: FailureReason::ProcessExit { code },
                }
            }
            Err(e) => AttemptOutcome::Failure {
                reason: FailureReason::Process {
                    detail: e.to_string(),
                },
            },
        }
    }

    /// Handle announcements until the client closes its output.
    ///
    /// Any error leaves the session running; the caller terminates it.
    async fn await_challenges(
        &self,
        identity: &str,
        session: &mut dyn AcmeSession,
        records: &mut ProvisionedSet,
    ) -> Result<(), FailureReason> {
        let deadline = self.settings.process_timeout.map(|t| Instant::now() + t);
        let mut parser = ChallengeParser::new();

        transition(identity, AttemptState::AwaitingChallenge);
        while let Some(line) = self.read_line(session, deadline).await? {
            let Some(event) = parser.feed(&line) else {
                continue;
            };
            log::info!(
                "[{identity}] Challenge requested for {}",
                event.record_name
            );

            transition(identity, AttemptState::Validating);
            self.validator.check(&event)?;

            transition(identity, AttemptState::Provisioning);
            let record = self
                .ctx
                .dns_provider
                .create_challenge_record(&event.record_name, &event.token)
                .await?;
            log::info!(
                "[{identity}] Published {} (id {}), waiting {}s",
                record.name,
                record.record_id,
                self.settings.propagation_delay.as_secs()
            );
            records.insert(record);

            transition(identity, AttemptState::AwaitingPropagation);
            tokio::time::sleep(self.settings.propagation_delay).await;

            transition(identity, AttemptState::SignalingContinue);
            session.send_continue().await.map_err(process_failure)?;

            transition(identity, AttemptState::AwaitingChallenge);
        }

        Ok(())
    }

    async fn read_line(
        &self,
        session: &mut dyn AcmeSession,
        deadline: Option<Instant>,
    ) -> Result<Option<String>, FailureReason> {
        let line = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, session.next_line())
                .await
                .map_err(|_| FailureReason::Process {
                    detail: format!(
                        "timed out after {}s waiting for the ACME client",
                        self.settings.process_timeout.unwrap_or_default().as_secs()
                    ),
                })?,
            None => session.next_line().await,
        };
        line.map_err(process_failure)
    }

    /// Delete every published record; failures become alerts.
    async fn cleanup(&self, identity: &str, records: ProvisionedSet) -> Vec<CleanupAlert> {
        let mut alerts = Vec::new();
        for record in records.records {
            match self.ctx.dns_provider.delete_record(&record.record_id).await {
                Ok(()) => log::debug!("[{identity}] Deleted {} (id {})", record.name, record.record_id),
                Err(error) => {
                    let level = if error.is_expected() {
                        log::Level::Warn
                    } else {
                        log::Level::Error
                    };
                    log::log!(
                        level,
                        "[{identity}] Failed to delete {} (id {}), manual removal required: {error}",
                        record.name,
                        record.record_id
                    );
                    alerts.push(CleanupAlert { record, error });
                }
            }
        }
        alerts
    }
}

fn transition(identity: &str, state: AttemptState) {
    log::debug!("[{identity}] -> {state}");
}

fn process_failure(e: crate::error::CoreError) -> FailureReason {
    FailureReason::Process {
        detail: e.to_string(),
    }
}

fn log_stderr(identity: &str, session: &dyn AcmeSession) {
    let stderr = session.stderr_output();
    if !stderr.is_empty() {
        log::warn!("[{identity}] ACME client stderr:\n{stderr}");
    }
}
