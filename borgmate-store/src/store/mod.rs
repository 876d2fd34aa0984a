mod trait_store;
mod types;

pub use trait_store::{ConfigStore, StoreError};
pub use types::RepoEntry;
