use borgmate_core::ErrorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegateState {
    /// No usable credential yet for the next attempt.
    AwaitingCredential,
    /// An attempt is in flight; progress and log events are relayed.
    Running,
    /// The attempt reported its exit status and a verdict is being reached.
    Terminated { exit_code: i32 },
    /// Terminal for the request. Every further event is ignored.
    Done,
}

impl DelegateState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DelegateState::AwaitingCredential => "awaiting_credential",
            DelegateState::Running => "running",
            DelegateState::Terminated { .. } => "terminated",
            DelegateState::Done => "done",
        }
    }
}

/// Most recent error-level log line of the current attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedError {
    pub message: String,
    pub error_id: Option<ErrorId>,
}
