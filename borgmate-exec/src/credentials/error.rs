#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("credential not found: {0}")]
    NotFound(String),
    #[error("credential source error for {name}: {message}")]
    Source { name: String, message: String },
}

impl CredentialError {
    pub fn source(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("passphrase prompt aborted")]
    Aborted,
    #[error("passphrase prompt unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read passphrase: {0}")]
    Io(#[from] std::io::Error),
}
