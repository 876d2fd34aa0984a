use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The repository an operation acts on, as named in the repository config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoTarget {
    pub name: String,
    pub location: String,
}

impl RepoTarget {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationKind {
    Init { encryption: String },
    Create { archive: String, paths: Vec<PathBuf> },
    Rename { archive: String, new_name: String },
    Delete,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Create { .. } => "create",
            Self::Rename { .. } => "rename",
            Self::Delete => "delete",
        }
    }
}

/// Immutable description of one piece of work. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRequest {
    pub id: Uuid,
    pub kind: OperationKind,
    pub repository: RepoTarget,
    /// Name under which the repository passphrase is stored.
    pub credential: String,
}

impl OperationRequest {
    pub fn new(kind: OperationKind, repository: RepoTarget, credential: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            repository,
            credential: credential.into(),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}
