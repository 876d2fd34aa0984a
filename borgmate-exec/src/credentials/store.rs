use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::credentials::{CredentialError, CredentialSource, SecretValue};

/// Named secrets, shared across the attempts of one request.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<SecretValue, CredentialError>;

    async fn set(&self, name: &str, secret: SecretValue) -> Result<(), CredentialError>;

    /// Forget a credential. Unsetting an absent name is not an error.
    async fn unset(&self, name: &str) -> Result<(), CredentialError>;
}

/// In-memory credential cache, optionally backed by a read-only source.
///
/// The source is consulted on a miss and its answer is cached. Once a name
/// has been unset the source is no longer consulted for it, so a rejected
/// value from the environment is not handed out again.
pub struct MemoryCredentialStore {
    source: Option<Box<dyn CredentialSource>>,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    values: HashMap<String, SecretValue>,
    suppressed: HashSet<String>,
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            source: None,
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_source(source: Box<dyn CredentialSource>) -> Self {
        Self {
            source: Some(source),
            state: Mutex::new(State::default()),
        }
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.state.lock().await.values.contains_key(name)
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, name: &str) -> Result<SecretValue, CredentialError> {
        {
            let s = self.state.lock().await;
            if let Some(v) = s.values.get(name) {
                return Ok(v.clone());
            }
            if s.suppressed.contains(name) {
                return Err(CredentialError::NotFound(name.to_string()));
            }
        }

        let Some(source) = &self.source else {
            return Err(CredentialError::NotFound(name.to_string()));
        };

        // Fetch outside lock.
        let value = source.get(name).await?;
        tracing::debug!(credential = name, "credential loaded from source");
        self.state
            .lock()
            .await
            .values
            .insert(name.to_string(), value.clone());
        Ok(value)
    }

    async fn set(&self, name: &str, secret: SecretValue) -> Result<(), CredentialError> {
        self.state
            .lock()
            .await
            .values
            .insert(name.to_string(), secret);
        Ok(())
    }

    async fn unset(&self, name: &str) -> Result<(), CredentialError> {
        let mut s = self.state.lock().await;
        s.values.remove(name);
        s.suppressed.insert(name.to_string());
        Ok(())
    }
}
