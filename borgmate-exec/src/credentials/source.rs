use std::path::PathBuf;

use async_trait::async_trait;

use crate::credentials::{CredentialError, SecretValue};

/// Read-only place credentials can be looked up from on a store miss.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn get(&self, name: &str) -> Result<SecretValue, CredentialError>;
}

/// Looks credentials up in environment variables.
///
/// The variable name is `prefix` followed by the credential name upper-cased,
/// with every character outside `[A-Z0-9]` replaced by `_`.
#[derive(Debug, Clone)]
pub struct EnvCredentialSource {
    pub prefix: String,
}

impl Default for EnvCredentialSource {
    fn default() -> Self {
        Self {
            prefix: "BORGMATE_PASSPHRASE_".to_string(),
        }
    }
}

pub fn env_key(prefix: &str, name: &str) -> String {
    let normalized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{prefix}{normalized}")
}

#[async_trait]
impl CredentialSource for EnvCredentialSource {
    async fn get(&self, name: &str) -> Result<SecretValue, CredentialError> {
        let key = env_key(&self.prefix, name);
        match std::env::var(&key) {
            Ok(v) => Ok(SecretValue::from_string(v)),
            Err(std::env::VarError::NotPresent) => Err(CredentialError::NotFound(name.to_string())),
            Err(e) => Err(CredentialError::source(name, e.to_string())),
        }
    }
}

/// One file per credential under `base_dir`.
///
/// Path separators and other unusual characters in the name map to `_`, so a
/// name can never escape `base_dir`. A single trailing newline is stripped.
#[derive(Debug, Clone)]
pub struct FileCredentialSource {
    pub base_dir: PathBuf,
}

impl FileCredentialSource {
    fn path_for(&self, name: &str) -> PathBuf {
        let file: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_dir.join(file)
    }
}

#[async_trait]
impl CredentialSource for FileCredentialSource {
    async fn get(&self, name: &str) -> Result<SecretValue, CredentialError> {
        let path = self.path_for(name);
        let mut bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CredentialError::NotFound(name.to_string()))
            }
            Err(e) => return Err(CredentialError::source(name, e.to_string())),
        };
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
        }
        Ok(SecretValue::from_bytes(bytes))
    }
}
