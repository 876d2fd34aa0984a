use std::fmt;

use serde::{Deserialize, Serialize};

/// Bumped whenever a variant is added, removed or reinterpreted.
pub const ERROR_ID_VERSION: u32 = 1;

/// Machine-readable error identifiers reported by the backup tool.
///
/// Borg tags its error-level log lines with a `msgid`. Only the identifiers
/// the executor acts on are named here; everything else is carried through
/// as [`ErrorId::Other`] so the message can still be surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorId {
    PassphraseWrong,
    PasswordRetriesExceeded,
    RepositoryDoesNotExist,
    RepositoryAlreadyExists,
    LockTimeout,
    ArchiveDoesNotExist,
    ArchiveAlreadyExists,
    Other(String),
}

impl ErrorId {
    pub fn parse(msgid: &str) -> Self {
        match msgid.trim() {
            "PassphraseWrong" => Self::PassphraseWrong,
            "PasswordRetriesExceeded" => Self::PasswordRetriesExceeded,
            "Repository.DoesNotExist" => Self::RepositoryDoesNotExist,
            "Repository.AlreadyExists" => Self::RepositoryAlreadyExists,
            "LockTimeout" => Self::LockTimeout,
            "Archive.DoesNotExist" => Self::ArchiveDoesNotExist,
            "Archive.AlreadyExists" => Self::ArchiveAlreadyExists,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::PassphraseWrong => "PassphraseWrong",
            Self::PasswordRetriesExceeded => "PasswordRetriesExceeded",
            Self::RepositoryDoesNotExist => "Repository.DoesNotExist",
            Self::RepositoryAlreadyExists => "Repository.AlreadyExists",
            Self::LockTimeout => "LockTimeout",
            Self::ArchiveDoesNotExist => "Archive.DoesNotExist",
            Self::ArchiveAlreadyExists => "Archive.AlreadyExists",
            Self::Other(s) => s,
        }
    }

    /// True when the tool rejected the supplied passphrase.
    ///
    /// `PasswordRetriesExceeded` is deliberately excluded: it is raised by
    /// the tool's own interactive prompt, which borgmate never uses.
    pub fn is_credential_rejection(&self) -> bool {
        matches!(self, Self::PassphraseWrong)
    }
}

impl From<String> for ErrorId {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<ErrorId> for String {
    fn from(id: ErrorId) -> Self {
        id.as_str().to_string()
    }
}

impl fmt::Display for ErrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
