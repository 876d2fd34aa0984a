use serde::Deserialize;

use borgmate_core::{ErrorId, LogLevel, OperationEvent};

/// One line of `borg --log-json` output on stderr.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LogLine {
    LogMessage {
        levelname: String,
        #[serde(default)]
        name: String,
        message: String,
        #[serde(default)]
        msgid: Option<String>,
    },
    ProgressPercent {
        #[serde(default)]
        current: Option<f64>,
        #[serde(default)]
        total: Option<f64>,
        #[serde(default)]
        finished: bool,
    },
    ProgressMessage {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        finished: bool,
    },
    ArchiveProgress {
        #[serde(default)]
        path: Option<String>,
        #[serde(default)]
        finished: bool,
    },
    FileStatus {
        status: String,
        path: String,
    },
    #[serde(other)]
    Unknown,
}

/// Translate one stderr line into an operation event.
///
/// Lines that are not JSON are relayed as info-level log messages. Progress
/// records without a usable percentage, finished markers and unknown record
/// types yield `None`.
pub fn parse_log_line(line: &str) -> Option<OperationEvent> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }

    let parsed = if line.trim_start().starts_with('{') {
        serde_json::from_str::<LogLine>(line).ok()
    } else {
        None
    };
    let Some(parsed) = parsed else {
        return Some(OperationEvent::log(LogLevel::Info, "borg", line));
    };

    match parsed {
        LogLine::LogMessage {
            levelname,
            name,
            message,
            msgid,
        } => Some(OperationEvent::Log {
            level: LogLevel::parse(&levelname),
            name,
            message,
            error_id: msgid.as_deref().map(ErrorId::parse),
        }),
        LogLine::ProgressPercent {
            current,
            total,
            finished,
        } => {
            if finished {
                return None;
            }
            match (current, total) {
                (Some(current), Some(total)) if total > 0.0 => Some(OperationEvent::progress(
                    (current / total * 100.0).clamp(0.0, 100.0),
                )),
                _ => None,
            }
        }
        LogLine::ProgressMessage { message, finished } => match message {
            Some(m) if !finished => Some(OperationEvent::log(LogLevel::Debug, "borg.progress", m)),
            _ => None,
        },
        LogLine::ArchiveProgress { path, finished } => match path {
            Some(p) if !finished => Some(OperationEvent::log(LogLevel::Debug, "borg.archive", p)),
            _ => None,
        },
        LogLine::FileStatus { status, path } => Some(OperationEvent::log(
            LogLevel::Debug,
            "borg.file",
            format!("{status} {path}"),
        )),
        LogLine::Unknown => None,
    }
}
