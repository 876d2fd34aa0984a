#![forbid(unsafe_code)]

//! Retry-bounded execution of borg operations.
//!
//! An [`Executor`] resolves the repository passphrase, starts the external
//! operation through an [`executor::OperationRunner`] and feeds the events it
//! emits into an [`delegate::OperationDelegate`], which decides whether a
//! failed attempt is retried with a freshly prompted passphrase.

pub mod borg;
pub mod credentials;
pub mod delegate;
pub mod executor;
pub mod retry;

pub use crate::borg::{BorgConfig, BorgRunner};
pub use crate::executor::Executor;
