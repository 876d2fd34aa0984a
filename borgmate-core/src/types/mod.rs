mod error_id;
mod event;
mod outcome;
mod request;

pub use error_id::{ErrorId, ERROR_ID_VERSION};
pub use event::{LogLevel, OperationEvent};
pub use outcome::{OperationOutcome, OperationReport};
pub use request::{OperationKind, OperationRequest, RepoTarget};
