use borgmate_core::{ErrorId, OperationEvent, OperationRequest};

use crate::credentials::{CredentialError, CredentialStore, Prompt, SecretValue};
use crate::delegate::state::{CapturedError, DelegateState};
use crate::executor::{Event, EventSink, ExecutionError};
use crate::retry::{decide_retry, RetryConfig, RetryDecision, RetryReason};

/// Exit code reported when the operation vanished without an exit status.
pub const UNKNOWN_EXIT_CODE: i32 = -1;

/// What the delegate concluded from an attempt's exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Succeeded,
    /// The credential was rejected and has been forgotten; run another attempt.
    Retry,
    RetriesExhausted,
    Fatal { code: i32, message: String },
}

/// Mediates between one request's attempts and the caller.
///
/// The delegate resolves the credential before each attempt, relays
/// progress and log events, remembers the last error-level message, and on
/// the exit status decides between success, a retry with a new credential,
/// and failure. Once it reaches [`DelegateState::Done`] it ignores every
/// further event.
pub struct OperationDelegate<'a> {
    request: &'a OperationRequest,
    credentials: &'a dyn CredentialStore,
    prompt: &'a dyn Prompt,
    event_sink: &'a dyn EventSink,
    retry: &'a RetryConfig,
    state: DelegateState,
    last_error: Option<CapturedError>,
    rejected_before: bool,
}

impl<'a> OperationDelegate<'a> {
    pub fn new(
        request: &'a OperationRequest,
        credentials: &'a dyn CredentialStore,
        prompt: &'a dyn Prompt,
        event_sink: &'a dyn EventSink,
        retry: &'a RetryConfig,
    ) -> Self {
        Self {
            request,
            credentials,
            prompt,
            event_sink,
            retry,
            state: DelegateState::AwaitingCredential,
            last_error: None,
            rejected_before: false,
        }
    }

    pub fn state(&self) -> DelegateState {
        self.state
    }

    pub fn last_error(&self) -> Option<&CapturedError> {
        self.last_error.as_ref()
    }

    /// Resolve the credential for the next attempt and enter `Running`.
    ///
    /// The prompt is only consulted when the store has nothing under the
    /// request's credential name; a prompted secret is stored before use.
    pub async fn begin_attempt(&mut self) -> Result<SecretValue, ExecutionError> {
        self.last_error = None;
        let name = self.request.credential.as_str();

        let secret = match self.credentials.get(name).await {
            Ok(secret) => secret,
            Err(CredentialError::NotFound(_)) => {
                self.event_sink
                    .emit(Event::CredentialRequested {
                        request_id: self.request.id,
                        credential: name.to_string(),
                    })
                    .await;
                let secret = self.prompt.prompt(&self.prompt_message()).await?;
                self.credentials.set(name, secret.clone()).await?;
                secret
            }
            Err(e) => return Err(e.into()),
        };

        self.state = DelegateState::Running;
        Ok(secret)
    }

    /// Consume one event of the attempt numbered `attempt_no`.
    ///
    /// Returns a verdict when the event is the attempt's exit status.
    pub async fn on_event(
        &mut self,
        event: OperationEvent,
        attempt_no: u32,
    ) -> Result<Option<Verdict>, ExecutionError> {
        if self.state != DelegateState::Running {
            tracing::debug!(
                request_id = %self.request.id,
                state = self.state.as_str(),
                ?event,
                "ignoring event outside of a running attempt"
            );
            return Ok(None);
        }

        match event {
            OperationEvent::Progress { percent } => {
                self.event_sink
                    .emit(Event::Progress {
                        request_id: self.request.id,
                        percent,
                    })
                    .await;
                Ok(None)
            }
            OperationEvent::Log {
                level,
                name,
                message,
                error_id,
            } => {
                if level.is_error() {
                    self.last_error = Some(CapturedError {
                        message: message.clone(),
                        error_id: error_id.clone(),
                    });
                }
                self.event_sink
                    .emit(Event::Log {
                        request_id: self.request.id,
                        level,
                        name,
                        message,
                        error_id,
                    })
                    .await;
                Ok(None)
            }
            OperationEvent::Terminated { exit_code } => {
                self.state = DelegateState::Terminated { exit_code };
                self.event_sink
                    .emit(Event::AttemptFinished {
                        request_id: self.request.id,
                        attempt_no,
                        exit_code,
                    })
                    .await;
                self.conclude(exit_code, attempt_no).await.map(Some)
            }
        }
    }

    /// The attempt's event stream ended. If no exit status was seen the
    /// attempt is treated as a fatal failure.
    pub fn on_events_closed(&mut self) -> Option<Verdict> {
        if self.state != DelegateState::Running {
            return None;
        }
        self.state = DelegateState::Done;
        Some(Verdict::Fatal {
            code: UNKNOWN_EXIT_CODE,
            message: self
                .last_error
                .as_ref()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "operation ended without reporting an exit status".to_string()),
        })
    }

    async fn conclude(&mut self, exit_code: i32, attempt_no: u32) -> Result<Verdict, ExecutionError> {
        if exit_code == 0 {
            self.state = DelegateState::Done;
            return Ok(Verdict::Succeeded);
        }

        let error_id = self.last_error.as_ref().and_then(|e| e.error_id.clone());
        if error_id.as_ref().is_some_and(ErrorId::is_credential_rejection) {
            self.forget_credential(attempt_no).await?;
        }

        match decide_retry(self.retry, attempt_no, error_id.as_ref()) {
            RetryDecision::Retry { .. } => {
                self.state = DelegateState::AwaitingCredential;
                Ok(Verdict::Retry)
            }
            RetryDecision::Stop {
                reason: RetryReason::AttemptsExhausted,
            } => {
                self.state = DelegateState::Done;
                Ok(Verdict::RetriesExhausted)
            }
            RetryDecision::Stop { .. } => {
                self.state = DelegateState::Done;
                Ok(Verdict::Fatal {
                    code: exit_code,
                    message: self.failure_message(exit_code),
                })
            }
        }
    }

    async fn forget_credential(&mut self, attempt_no: u32) -> Result<(), ExecutionError> {
        let name = self.request.credential.as_str();
        self.credentials.unset(name).await?;
        self.rejected_before = true;
        tracing::warn!(
            request_id = %self.request.id,
            credential = name,
            attempt_no,
            "credential rejected"
        );
        self.event_sink
            .emit(Event::CredentialRejected {
                request_id: self.request.id,
                credential: name.to_string(),
                attempt_no,
            })
            .await;
        Ok(())
    }

    fn failure_message(&self, exit_code: i32) -> String {
        match &self.last_error {
            Some(e) => e.message.clone(),
            None => format!("operation exited with code {exit_code}"),
        }
    }

    fn prompt_message(&self) -> String {
        let repo = &self.request.repository;
        if self.rejected_before {
            format!("Wrong passphrase for repository '{}'. Enter passphrase: ", repo.name)
        } else {
            format!(
                "Enter passphrase for repository '{}' ({}): ",
                repo.name, repo.location
            )
        }
    }
}
