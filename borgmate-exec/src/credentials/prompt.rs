use async_trait::async_trait;

use crate::credentials::{PromptError, SecretValue};

/// Caller-supplied source of secrets that are not yet stored.
#[async_trait]
pub trait Prompt: Send + Sync {
    async fn prompt(&self, message: &str) -> Result<SecretValue, PromptError>;
}

/// Never produces a secret. Used when there is nobody to ask.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractivePrompt;

#[async_trait]
impl Prompt for NonInteractivePrompt {
    async fn prompt(&self, message: &str) -> Result<SecretValue, PromptError> {
        Err(PromptError::Unavailable(format!(
            "running non-interactively ({message})"
        )))
    }
}
