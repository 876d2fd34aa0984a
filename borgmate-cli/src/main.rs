use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod output;
mod prompt;
mod utils;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "borgmate", version, about = "Retrying front-end for borg repository operations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Init {
            name,
            location,
            encryption,
            run,
        } => cmd::init::init_cmd(&name, &location, &encryption, run).await,
        Command::Create {
            repo,
            archive,
            paths,
            run,
        } => cmd::create::create_cmd(&repo, &archive, paths, run).await,
        Command::Rename {
            repo,
            archive,
            new_name,
            run,
        } => cmd::rename::rename_cmd(&repo, &archive, &new_name, run).await,
        Command::Delete { repo, run } => cmd::delete::delete_cmd(&repo, run).await,
        Command::Repos { output, config } => cmd::repos::repos_cmd(output, config).await,
        Command::Forget {
            repo,
            output,
            config,
        } => cmd::forget::forget_cmd(&repo, output, config).await,
    }
}
