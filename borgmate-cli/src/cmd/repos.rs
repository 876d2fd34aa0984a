use borgmate_store::{ConfigStore, RepoEntry};
use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_error, print_result};
use crate::utils::open_config;
use crate::{ConfigArgs, OutputArgs};

#[derive(Serialize)]
struct ReposResult {
    config: String,
    repositories: Vec<RepoEntry>,
}

pub async fn repos_cmd(output: OutputArgs, config: ConfigArgs) -> i32 {
    let store = match open_config(&config).await {
        Ok(s) => s,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::RUNTIME_ERROR;
        }
    };
    let repositories = match store.list().await {
        Ok(r) => r,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let result = ReposResult {
        config: store.path().display().to_string(),
        repositories,
    };

    print_result(output.format, output.quiet, &result, |result| {
        if result.repositories.is_empty() {
            println!("No repositories configured in {}", result.config);
        }
        for repo in &result.repositories {
            println!(
                "{}\t{}\t{}\t{}",
                repo.name,
                repo.location,
                repo.encryption.as_deref().unwrap_or("-"),
                repo.added_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
    });

    exit_codes::SUCCESS
}
