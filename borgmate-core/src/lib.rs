#![forbid(unsafe_code)]

//! Operation requests, outcomes and the event vocabulary shared by the
//! borgmate executor, store and CLI.

pub mod error;
pub mod types;
pub mod validate;

pub use crate::error::{ValidationError, Violation};
pub use crate::types::{
    ErrorId, LogLevel, OperationEvent, OperationKind, OperationOutcome, OperationReport,
    OperationRequest, RepoTarget, ERROR_ID_VERSION,
};
pub use crate::validate::{validate_request, Validate};
