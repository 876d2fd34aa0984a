use borgmate_core::{OperationKind, OperationRequest, RepoTarget};
use borgmate_store::ConfigStore;

use crate::cmd::{open_store, run_operation};
use crate::exit_codes;
use crate::output::print_error;
use crate::utils::credential_name;
use crate::RunArgs;

pub async fn init_cmd(name: &str, location: &str, encryption: &str, run: RunArgs) -> i32 {
    let store = match open_store(&run).await {
        Ok(s) => s,
        Err(code) => return code,
    };

    match store.get(name).await {
        Ok(None) => {}
        Ok(Some(existing)) => {
            print_error(
                run.output.format,
                run.output.quiet,
                &format!(
                    "repository '{name}' is already configured at {}",
                    existing.location
                ),
            );
            return exit_codes::RUNTIME_ERROR;
        }
        Err(e) => {
            print_error(run.output.format, run.output.quiet, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    }

    let request = OperationRequest::new(
        OperationKind::Init {
            encryption: encryption.to_string(),
        },
        RepoTarget::new(name, location),
        credential_name(name),
    );
    run_operation(request, store, run).await
}
