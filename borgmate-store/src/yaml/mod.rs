use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::memory::upsert_entry;
use crate::store::{ConfigStore, RepoEntry, StoreError};

const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ConfigFile {
    version: u32,
    #[serde(default)]
    repositories: Vec<RepoEntry>,
}

/// Config store backed by a single YAML file.
///
/// The file is read once on [`YamlConfigStore::open`]; `save` rewrites it
/// through a temporary sibling file and a rename, and is skipped when nothing
/// changed since the last save.
pub struct YamlConfigStore {
    path: PathBuf,
    state: Mutex<State>,
}

struct State {
    entries: BTreeMap<String, RepoEntry>,
    dirty: bool,
}

impl YamlConfigStore {
    /// Load the config at `path`. A missing file yields an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => parse_config(&path, &raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file absent, starting empty");
                BTreeMap::new()
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        Ok(Self {
            path,
            state: Mutex::new(State {
                entries,
                dirty: false,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_config(path: &Path, raw: &str) -> Result<BTreeMap<String, RepoEntry>, StoreError> {
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let file: ConfigFile = serde_yaml::from_str(raw).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if file.version != CONFIG_VERSION {
        return Err(StoreError::Version {
            found: file.version,
            expected: CONFIG_VERSION,
        });
    }
    Ok(file
        .repositories
        .into_iter()
        .map(|e| (e.name.clone(), e))
        .collect())
}

#[async_trait]
impl ConfigStore for YamlConfigStore {
    async fn get(&self, name: &str) -> Result<Option<RepoEntry>, StoreError> {
        Ok(self.state.lock().await.entries.get(name).cloned())
    }

    async fn list(&self) -> Result<Vec<RepoEntry>, StoreError> {
        Ok(self.state.lock().await.entries.values().cloned().collect())
    }

    async fn upsert(&self, entry: RepoEntry) -> Result<bool, StoreError> {
        let mut s = self.state.lock().await;
        let changed = upsert_entry(&mut s.entries, entry);
        s.dirty |= changed;
        Ok(changed)
    }

    async fn remove(&self, name: &str) -> Result<bool, StoreError> {
        let mut s = self.state.lock().await;
        let removed = s.entries.remove(name).is_some();
        s.dirty |= removed;
        Ok(removed)
    }

    async fn save(&self) -> Result<(), StoreError> {
        let mut s = self.state.lock().await;
        if !s.dirty {
            return Ok(());
        }

        let file = ConfigFile {
            version: CONFIG_VERSION,
            repositories: s.entries.values().cloned().collect(),
        };
        let raw = serde_yaml::to_string(&file).map_err(StoreError::Serialize)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.write_error(source))?;
        }
        let tmp = self.path.with_extension("yaml.tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|source| self.write_error(source))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| self.write_error(source))?;

        s.dirty = false;
        tracing::debug!(path = %self.path.display(), entries = s.entries.len(), "config saved");
        Ok(())
    }
}

impl YamlConfigStore {
    fn write_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}
