use std::sync::Arc;

use borgmate_core::{OperationOutcome, OperationReport, OperationRequest, Validate};
use borgmate_store::ConfigStore;

use crate::credentials::{CredentialStore, Prompt};
use crate::delegate::{OperationDelegate, Verdict};
use crate::executor::events::{Event, EventSink};
use crate::executor::forwarder::ResultForwarder;
use crate::executor::result::ExecutionError;
use crate::executor::runner::{AttemptEvents, OperationRunner};
use crate::executor::types::ExecutorConfig;
use crate::retry::AttemptCounter;

pub struct Executor {
    config: ExecutorConfig,
    credentials: Arc<dyn CredentialStore>,
    prompt: Arc<dyn Prompt>,
    runner: Arc<dyn OperationRunner>,
    forwarder: ResultForwarder,
    event_sink: Arc<dyn EventSink>,
}

impl Executor {
    pub fn new(
        config: ExecutorConfig,
        credentials: Arc<dyn CredentialStore>,
        prompt: Arc<dyn Prompt>,
        config_store: Arc<dyn ConfigStore>,
        runner: Arc<dyn OperationRunner>,
        event_sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            credentials,
            prompt,
            runner,
            forwarder: ResultForwarder::new(config_store),
            event_sink,
        }
    }

    /// Run `request` to completion, retrying rejected credentials up to the
    /// configured number of attempts.
    ///
    /// Returns `Err` only when no outcome can be produced: the request is
    /// invalid, the prompt failed, the operation could not be launched, or
    /// the config could not be updated after a success.
    pub async fn execute(&self, request: &OperationRequest) -> Result<OperationReport, ExecutionError> {
        request.validate()?;

        self.event_sink
            .emit(Event::OperationStarted {
                request_id: request.id,
                kind: request.kind.as_str(),
                repository: request.repository.name.clone(),
            })
            .await;

        let mut attempts = AttemptCounter::new(self.config.retry.max_attempts);
        let mut delegate = OperationDelegate::new(
            request,
            self.credentials.as_ref(),
            self.prompt.as_ref(),
            self.event_sink.as_ref(),
            &self.config.retry,
        );

        let outcome = loop {
            if !attempts.try_begin() {
                break OperationOutcome::RetriesExhausted;
            }
            let attempt_no = attempts.current();

            let credential = delegate.begin_attempt().await?;
            tracing::info!(
                request_id = %request.id,
                kind = request.kind.as_str(),
                repository = %request.repository.name,
                attempt_no,
                max_attempts = attempts.max(),
                "starting attempt"
            );
            self.event_sink
                .emit(Event::AttemptStarted {
                    request_id: request.id,
                    attempt_no,
                })
                .await;

            let events = self.runner.start(request, &credential).await?;
            drop(credential);

            match consume_attempt(&mut delegate, events, attempt_no).await? {
                Verdict::Retry => continue,
                Verdict::Succeeded => {
                    self.forwarder.forward_success(request).await?;
                    break OperationOutcome::Success;
                }
                Verdict::RetriesExhausted => break OperationOutcome::RetriesExhausted,
                Verdict::Fatal { code, message } => {
                    break OperationOutcome::FatalError { code, message }
                }
            }
        };

        tracing::info!(
            request_id = %request.id,
            outcome = outcome.as_str(),
            attempts = attempts.current(),
            "operation finished"
        );
        self.event_sink
            .emit(Event::OperationFinished {
                request_id: request.id,
                outcome: outcome.clone(),
                attempts: attempts.current(),
            })
            .await;

        Ok(OperationReport {
            request_id: request.id,
            kind: request.kind.as_str(),
            repository: request.repository.name.clone(),
            outcome,
            attempts: attempts.current(),
        })
    }
}

/// Feed one attempt's events to the delegate until it reaches a verdict,
/// then drain whatever the attempt still sends so that late or duplicated
/// events never leak into the next attempt.
async fn consume_attempt(
    delegate: &mut OperationDelegate<'_>,
    mut events: AttemptEvents,
    attempt_no: u32,
) -> Result<Verdict, ExecutionError> {
    let mut verdict = None;
    while let Some(event) = events.recv().await {
        let decided = delegate.on_event(event, attempt_no).await?;
        if verdict.is_none() {
            verdict = decided;
        }
    }
    Ok(match verdict {
        Some(v) => v,
        None => delegate
            .on_events_closed()
            .unwrap_or(Verdict::Fatal {
                code: crate::delegate::UNKNOWN_EXIT_CODE,
                message: "operation ended without reporting an exit status".to_string(),
            }),
    })
}
