use std::path::PathBuf;

use borgmate_core::{OperationKind, OperationRequest};

use crate::cmd::{open_store, resolve_repo, run_operation};
use crate::utils::credential_name;
use crate::RunArgs;

pub async fn create_cmd(repo: &str, archive: &str, paths: Vec<PathBuf>, run: RunArgs) -> i32 {
    let store = match open_store(&run).await {
        Ok(s) => s,
        Err(code) => return code,
    };
    let target = match resolve_repo(&store, repo, &run.output).await {
        Ok(t) => t,
        Err(code) => return code,
    };

    let request = OperationRequest::new(
        OperationKind::Create {
            archive: archive.to_string(),
            paths,
        },
        target,
        credential_name(repo),
    );
    run_operation(request, store, run).await
}
