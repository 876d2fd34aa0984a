use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Initialize a new repository and add it to the config.
    Init {
        name: String,
        location: String,
        #[arg(long, default_value = "repokey")]
        encryption: String,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Create an archive in a configured repository.
    Create {
        repo: String,
        archive: String,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Rename an archive.
    Rename {
        repo: String,
        archive: String,
        new_name: String,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Delete a repository and remove it from the config.
    Delete {
        repo: String,
        #[command(flatten)]
        run: RunArgs,
    },
    /// List configured repositories.
    Repos {
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Remove a repository from the config without touching its data.
    Forget {
        repo: String,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        config: ConfigArgs,
    },
}
