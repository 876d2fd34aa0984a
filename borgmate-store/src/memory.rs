use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::store::{ConfigStore, RepoEntry, StoreError};

/// Non-persistent config store. `save` only counts calls.
#[derive(Default)]
pub struct MemoryConfigStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    entries: BTreeMap<String, RepoEntry>,
    saves: usize,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: impl IntoIterator<Item = RepoEntry>) -> Self {
        let entries = entries.into_iter().map(|e| (e.name.clone(), e)).collect();
        Self {
            state: Mutex::new(State { entries, saves: 0 }),
        }
    }

    pub async fn save_count(&self) -> usize {
        self.state.lock().await.saves
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn get(&self, name: &str) -> Result<Option<RepoEntry>, StoreError> {
        Ok(self.state.lock().await.entries.get(name).cloned())
    }

    async fn list(&self) -> Result<Vec<RepoEntry>, StoreError> {
        Ok(self.state.lock().await.entries.values().cloned().collect())
    }

    async fn upsert(&self, entry: RepoEntry) -> Result<bool, StoreError> {
        let mut s = self.state.lock().await;
        Ok(upsert_entry(&mut s.entries, entry))
    }

    async fn remove(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.state.lock().await.entries.remove(name).is_some())
    }

    async fn save(&self) -> Result<(), StoreError> {
        self.state.lock().await.saves += 1;
        Ok(())
    }
}

pub(crate) fn upsert_entry(entries: &mut BTreeMap<String, RepoEntry>, entry: RepoEntry) -> bool {
    match entries.get(&entry.name) {
        Some(existing) if existing.same_repository(&entry) => false,
        _ => {
            entries.insert(entry.name.clone(), entry);
            true
        }
    }
}
