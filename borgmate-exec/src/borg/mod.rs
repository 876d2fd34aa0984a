mod command;
mod log_json;
mod runner;

pub use command::{borg_args, borg_env};
pub use log_json::parse_log_line;
pub use runner::{BorgConfig, BorgRunner};
