use borgmate_core::{OperationKind, OperationRequest};

use crate::cmd::{open_store, resolve_repo, run_operation};
use crate::utils::credential_name;
use crate::RunArgs;

pub async fn rename_cmd(repo: &str, archive: &str, new_name: &str, run: RunArgs) -> i32 {
    let store = match open_store(&run).await {
        Ok(s) => s,
        Err(code) => return code,
    };
    let target = match resolve_repo(&store, repo, &run.output).await {
        Ok(t) => t,
        Err(code) => return code,
    };

    let request = OperationRequest::new(
        OperationKind::Rename {
            archive: archive.to_string(),
            new_name: new_name.to_string(),
        },
        target,
        credential_name(repo),
    );
    run_operation(request, store, run).await
}
