use borgmate_core::ErrorId;

use crate::retry::config::RetryConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { reason: RetryReason },
    Stop { reason: RetryReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryReason {
    NotRetryable,
    AttemptsExhausted,
    CredentialRejected,
}

/// Decide whether a failed attempt is retried.
///
/// - `attempt_no`: 1-based number of the attempt that just failed.
/// - `error_id`: identifier of the last error-level message the attempt logged.
///
/// Only credential rejections are retried; everything else is final.
pub fn decide_retry(cfg: &RetryConfig, attempt_no: u32, error_id: Option<&ErrorId>) -> RetryDecision {
    if !error_id.is_some_and(ErrorId::is_credential_rejection) {
        return RetryDecision::Stop {
            reason: RetryReason::NotRetryable,
        };
    }

    if attempt_no >= cfg.max_attempts {
        return RetryDecision::Stop {
            reason: RetryReason::AttemptsExhausted,
        };
    }

    RetryDecision::Retry {
        reason: RetryReason::CredentialRejected,
    }
}
