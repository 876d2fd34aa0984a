use std::sync::Arc;

use borgmate_core::{OperationKind, OperationRequest};
use borgmate_store::{ConfigStore, RepoEntry, StoreError};

/// Config change that follows a successful operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigMutation {
    UpsertEntry(RepoEntry),
    RemoveEntry(String),
}

impl ConfigMutation {
    /// The mutation a request's kind calls for on success, if any.
    ///
    /// Archive-level operations leave the repository config alone; their
    /// effects live in the repository itself.
    pub fn for_request(request: &OperationRequest) -> Option<Self> {
        match &request.kind {
            OperationKind::Init { encryption } => Some(Self::UpsertEntry(RepoEntry::new(
                request.repository.name.clone(),
                request.repository.location.clone(),
                Some(encryption.clone()),
            ))),
            OperationKind::Delete => Some(Self::RemoveEntry(request.repository.name.clone())),
            OperationKind::Create { .. } | OperationKind::Rename { .. } => None,
        }
    }
}

/// Applies the config side effects of successful operations.
///
/// Every mutation is idempotent: re-adding an identical entry and removing
/// an absent one are both no-ops.
pub struct ResultForwarder {
    store: Arc<dyn ConfigStore>,
}

impl ResultForwarder {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// Returns the mutation that was applied, or `None` if the request's
    /// kind has no config side effect.
    pub async fn forward_success(
        &self,
        request: &OperationRequest,
    ) -> Result<Option<ConfigMutation>, StoreError> {
        let Some(mutation) = ConfigMutation::for_request(request) else {
            return Ok(None);
        };

        let changed = match &mutation {
            ConfigMutation::UpsertEntry(entry) => self.store.upsert(entry.clone()).await?,
            ConfigMutation::RemoveEntry(name) => self.store.remove(name).await?,
        };
        if changed {
            self.store.save().await?;
        }
        tracing::debug!(
            request_id = %request.id,
            repository = %request.repository.name,
            changed,
            "config mutation applied: {mutation:?}"
        );
        Ok(Some(mutation))
    }
}
