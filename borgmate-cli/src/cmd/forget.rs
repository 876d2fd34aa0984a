use borgmate_store::ConfigStore;
use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_error, print_result};
use crate::utils::open_config;
use crate::{ConfigArgs, OutputArgs};

#[derive(Serialize)]
struct ForgetResult {
    repository: String,
    removed: bool,
}

pub async fn forget_cmd(repo: &str, output: OutputArgs, config: ConfigArgs) -> i32 {
    let store = match open_config(&config).await {
        Ok(s) => s,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let removed = match store.remove(repo).await {
        Ok(removed) => removed,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };
    if !removed {
        print_error(
            output.format,
            output.quiet,
            &format!("repository '{repo}' is not configured"),
        );
        return exit_codes::RUNTIME_ERROR;
    }
    if let Err(e) = store.save().await {
        print_error(output.format, output.quiet, &e.to_string());
        return exit_codes::RUNTIME_ERROR;
    }

    let result = ForgetResult {
        repository: repo.to_string(),
        removed,
    };
    print_result(output.format, output.quiet, &result, |result| {
        println!(
            "Removed '{}' from the config. Its data was not touched.",
            result.repository
        )
    });
    exit_codes::SUCCESS
}
