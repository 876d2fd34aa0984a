mod config;
mod counter;
mod decision;

pub use config::RetryConfig;
pub use counter::AttemptCounter;
pub use decision::{decide_retry, RetryDecision, RetryReason};
