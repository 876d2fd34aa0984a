use async_trait::async_trait;
use tokio::sync::mpsc;

use borgmate_core::{OperationEvent, OperationRequest};

use crate::credentials::SecretValue;

pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Events of one attempt. The sender side is dropped once the operation has
/// reported its exit status.
pub type AttemptEvents = mpsc::Receiver<OperationEvent>;

/// Starts the external operation for one attempt.
#[async_trait]
pub trait OperationRunner: Send + Sync {
    async fn start(
        &self,
        request: &OperationRequest,
        credential: &SecretValue,
    ) -> Result<AttemptEvents, LaunchError>;
}

#[derive(Debug, thiserror::Error)]
#[error("failed to launch {program}: {message}")]
pub struct LaunchError {
    pub program: String,
    pub message: String,
}

impl LaunchError {
    pub fn new(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            message: message.into(),
        }
    }
}
