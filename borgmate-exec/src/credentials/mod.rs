mod error;
mod prompt;
mod source;
mod store;
mod value;

pub use error::{CredentialError, PromptError};
pub use prompt::{NonInteractivePrompt, Prompt};
pub use source::{env_key, CredentialSource, EnvCredentialSource, FileCredentialSource};
pub use store::{CredentialStore, MemoryCredentialStore};
pub use value::SecretValue;
