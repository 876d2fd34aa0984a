use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use borgmate_core::{ErrorId, LogLevel, OperationOutcome};

#[derive(Debug, Clone)]
pub enum Event {
    OperationStarted {
        request_id: Uuid,
        kind: &'static str,
        repository: String,
    },
    OperationFinished {
        request_id: Uuid,
        outcome: OperationOutcome,
        attempts: u32,
    },
    CredentialRequested {
        request_id: Uuid,
        credential: String,
    },
    CredentialRejected {
        request_id: Uuid,
        credential: String,
        attempt_no: u32,
    },
    AttemptStarted {
        request_id: Uuid,
        attempt_no: u32,
    },
    AttemptFinished {
        request_id: Uuid,
        attempt_no: u32,
        exit_code: i32,
    },
    Progress {
        request_id: Uuid,
        percent: f64,
    },
    Log {
        request_id: Uuid,
        level: LogLevel,
        name: String,
        message: String,
        error_id: Option<ErrorId>,
    },
}

impl Event {
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::OperationStarted { .. } => "operation.started",
            Event::OperationFinished { .. } => "operation.finished",
            Event::CredentialRequested { .. } => "credential.requested",
            Event::CredentialRejected { .. } => "credential.rejected",
            Event::AttemptStarted { .. } => "attempt.started",
            Event::AttemptFinished { .. } => "attempt.finished",
            Event::Progress { .. } => "progress",
            Event::Log { .. } => "log",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let ty = self.event_type();
        match self {
            Event::OperationStarted {
                request_id,
                kind,
                repository,
            } => {
                json!({ "type": ty, "request_id": request_id.to_string(), "kind": kind, "repository": repository })
            }
            Event::OperationFinished {
                request_id,
                outcome,
                attempts,
            } => {
                let mut v = json!({ "type": ty, "request_id": request_id.to_string(), "attempts": attempts });
                if let (Some(obj), Ok(serde_json::Value::Object(o))) =
                    (v.as_object_mut(), serde_json::to_value(outcome))
                {
                    obj.extend(o);
                }
                v
            }
            Event::CredentialRequested {
                request_id,
                credential,
            } => {
                json!({ "type": ty, "request_id": request_id.to_string(), "credential": credential })
            }
            Event::CredentialRejected {
                request_id,
                credential,
                attempt_no,
            } => {
                json!({ "type": ty, "request_id": request_id.to_string(), "credential": credential, "attempt_no": attempt_no })
            }
            Event::AttemptStarted {
                request_id,
                attempt_no,
            } => {
                json!({ "type": ty, "request_id": request_id.to_string(), "attempt_no": attempt_no })
            }
            Event::AttemptFinished {
                request_id,
                attempt_no,
                exit_code,
            } => {
                json!({ "type": ty, "request_id": request_id.to_string(), "attempt_no": attempt_no, "exit_code": exit_code })
            }
            Event::Progress {
                request_id,
                percent,
            } => {
                json!({ "type": ty, "request_id": request_id.to_string(), "percent": percent })
            }
            Event::Log {
                request_id,
                level,
                name,
                message,
                error_id,
            } => {
                let mut v = json!({ "type": ty, "request_id": request_id.to_string(), "level": level.as_str(), "name": name, "message": message });
                if let (Some(obj), Some(id)) = (v.as_object_mut(), error_id) {
                    obj.insert("error_id".to_string(), json!(id.as_str()));
                }
                v
            }
        }
    }
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

pub struct CompositeEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl Default for CompositeEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl EventSink for CompositeEventSink {
    async fn emit(&self, event: Event) {
        for sink in &self.sinks {
            sink.emit(event.clone()).await;
        }
    }
}

/// One JSON object per line on stdout.
pub struct StdoutEventSink;

#[async_trait]
impl EventSink for StdoutEventSink {
    async fn emit(&self, event: Event) {
        println!("{}", serde_json::to_string(&event.to_json()).unwrap_or_default());
    }
}

/// Forwards events to `tracing`. Operation log lines keep their level.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: Event) {
        match &event {
            Event::Log {
                request_id,
                level,
                name,
                message,
                ..
            } => match level {
                LogLevel::Debug => tracing::debug!(%request_id, logger = %name, "{message}"),
                LogLevel::Info => tracing::info!(%request_id, logger = %name, "{message}"),
                LogLevel::Warning => tracing::warn!(%request_id, logger = %name, "{message}"),
                LogLevel::Error | LogLevel::Critical => {
                    tracing::error!(%request_id, logger = %name, "{message}")
                }
            },
            Event::Progress {
                request_id,
                percent,
            } => tracing::trace!(%request_id, percent, "progress"),
            Event::CredentialRejected { .. } => {
                tracing::warn!(event = %event.to_json(), "{}", event.event_type())
            }
            _ => tracing::info!(event = %event.to_json(), "{}", event.event_type()),
        }
    }
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {}
}
