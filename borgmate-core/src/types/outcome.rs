use serde::Serialize;
use uuid::Uuid;

/// Terminal result of one operation request. Produced exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OperationOutcome {
    Success,
    RetriesExhausted,
    FatalError { code: i32, message: String },
}

impl OperationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::RetriesExhausted => "retries_exhausted",
            Self::FatalError { .. } => "fatal_error",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationReport {
    pub request_id: Uuid,
    pub kind: &'static str,
    pub repository: String,
    #[serde(flatten)]
    pub outcome: OperationOutcome,
    pub attempts: u32,
}
