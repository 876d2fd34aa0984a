use std::path::PathBuf;

use clap::Args;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ConfigArgs {
    /// Repository config file. Defaults to `BORGMATE_CONFIG`, then
    /// `~/.config/borgmate/repos.yaml`.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct CredentialArgs {
    /// Where stored passphrases come from: `env`, `file:DIR` or `none`.
    #[arg(long, default_value = "env")]
    pub credentials: String,
    #[arg(long, default_value = "BORGMATE_PASSPHRASE_")]
    pub credentials_env_prefix: String,
    /// Fail instead of prompting when a passphrase is missing.
    #[arg(long)]
    pub non_interactive: bool,
}

#[derive(Debug, Args, Clone)]
pub struct RetryArgs {
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: u32,
}

#[derive(Debug, Args, Clone)]
pub struct BorgArgs {
    #[arg(long, default_value = "borg")]
    pub borg_binary: PathBuf,
    #[arg(long)]
    pub remote_path: Option<String>,
    /// Do not ask borg for progress records.
    #[arg(long)]
    pub no_progress: bool,
    /// Extra environment for borg, e.g. `BORG_RSH=ssh -i key`.
    #[arg(long = "borg-env", value_name = "KEY=VALUE")]
    pub borg_env: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EventsMode {
    None,
    Stdout,
}

#[derive(Debug, Args, Clone)]
pub struct EventsArgs {
    #[arg(long, value_enum, default_value_t = EventsMode::None, global = true)]
    pub events: EventsMode,
}

/// Everything an operation command needs besides its own arguments.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub output: OutputArgs,
    #[command(flatten)]
    pub events: EventsArgs,
    #[command(flatten)]
    pub config: ConfigArgs,
    #[command(flatten)]
    pub credentials: CredentialArgs,
    #[command(flatten)]
    pub retry: RetryArgs,
    #[command(flatten)]
    pub borg: BorgArgs,
}
