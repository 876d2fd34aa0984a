use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEntry {
    pub name: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl RepoEntry {
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        encryption: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            encryption,
            added_at: Utc::now(),
        }
    }

    /// Same repository, ignoring when it was added.
    pub fn same_repository(&self, other: &RepoEntry) -> bool {
        self.name == other.name
            && self.location == other.location
            && self.encryption == other.encryption
    }
}
