use std::path::PathBuf;

use async_trait::async_trait;

use crate::store::types::RepoEntry;

/// Repository configuration, keyed by repository name.
///
/// Mutations are held in memory until [`ConfigStore::save`] is called.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<RepoEntry>, StoreError>;

    async fn list(&self) -> Result<Vec<RepoEntry>, StoreError>;

    /// Insert or replace an entry. Returns `false` when an equivalent entry
    /// was already present and nothing changed.
    async fn upsert(&self, entry: RepoEntry) -> Result<bool, StoreError>;

    /// Remove an entry. Removing an absent entry is a no-op returning `false`.
    async fn remove(&self, name: &str) -> Result<bool, StoreError>;

    async fn save(&self) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(serde_yaml::Error),
    #[error("unsupported config version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
}
