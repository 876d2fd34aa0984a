use borgmate_core::ValidationError;
use borgmate_store::StoreError;

use crate::credentials::{CredentialError, PromptError};
use crate::executor::runner::LaunchError;

/// Failures that prevent the executor from producing an outcome at all.
///
/// Expected operation failures (rejected passphrase, exhausted attempts,
/// non-zero exit) are reported as an outcome, never as an error.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error(transparent)]
    InvalidRequest(#[from] ValidationError),
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error("operation succeeded but the config could not be updated: {0}")]
    Store(#[from] StoreError),
}
