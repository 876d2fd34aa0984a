#![forbid(unsafe_code)]

pub mod memory;
pub mod store;
pub mod yaml;

pub use crate::memory::MemoryConfigStore;
pub use crate::store::{ConfigStore, RepoEntry, StoreError};
pub use crate::yaml::YamlConfigStore;
