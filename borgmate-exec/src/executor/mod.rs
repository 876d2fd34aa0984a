pub mod events;
mod engine;
pub mod forwarder;
mod result;
pub mod runner;
mod types;

pub use engine::Executor;
pub use events::{
    CompositeEventSink, Event, EventSink, NoOpEventSink, StdoutEventSink, TracingEventSink,
};
pub use forwarder::{ConfigMutation, ResultForwarder};
pub use result::ExecutionError;
pub use runner::{AttemptEvents, LaunchError, OperationRunner, EVENT_CHANNEL_CAPACITY};
pub use types::ExecutorConfig;
