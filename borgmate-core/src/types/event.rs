use serde::{Deserialize, Serialize};

use crate::types::ErrorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Parses Python-style level names (`DEBUG`, `WARNING`, ...). Unknown
    /// names fall back to `Info`.
    pub fn parse(levelname: &str) -> Self {
        match levelname.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Self::Debug,
            "WARNING" | "WARN" => Self::Warning,
            "ERROR" => Self::Error,
            "CRITICAL" | "FATAL" => Self::Critical,
            _ => Self::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }

    pub fn is_error(&self) -> bool {
        *self >= Self::Error
    }
}

/// Events emitted by an external operation while it runs.
///
/// A well-behaved operation emits any number of `Progress` and `Log` events
/// followed by exactly one `Terminated`.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationEvent {
    Progress {
        percent: f64,
    },
    Log {
        level: LogLevel,
        name: String,
        message: String,
        error_id: Option<ErrorId>,
    },
    Terminated {
        exit_code: i32,
    },
}

impl OperationEvent {
    pub fn progress(percent: f64) -> Self {
        Self::Progress { percent }
    }

    pub fn log(level: LogLevel, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Log {
            level,
            name: name.into(),
            message: message.into(),
            error_id: None,
        }
    }

    pub fn error(name: impl Into<String>, message: impl Into<String>, error_id: ErrorId) -> Self {
        Self::Log {
            level: LogLevel::Error,
            name: name.into(),
            message: message.into(),
            error_id: Some(error_id),
        }
    }

    pub fn terminated(exit_code: i32) -> Self {
        Self::Terminated { exit_code }
    }
}
