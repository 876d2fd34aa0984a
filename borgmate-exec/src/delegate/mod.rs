mod operation;
mod state;

pub use operation::{OperationDelegate, Verdict, UNKNOWN_EXIT_CODE};
pub use state::{CapturedError, DelegateState};
