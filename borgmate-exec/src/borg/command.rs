use std::ffi::OsString;

use borgmate_core::{OperationKind, OperationRequest};

use crate::borg::runner::BorgConfig;

/// Command line for `request`, without the program name.
///
/// Common options follow the subcommand, which every borg 1.x release
/// accepts.
pub fn borg_args(request: &OperationRequest, config: &BorgConfig) -> Vec<OsString> {
    let location = request.repository.location.as_str();
    let mut args: Vec<OsString> = vec![request.kind.as_str().into(), "--log-json".into()];
    if config.progress {
        args.push("--progress".into());
    }
    if let Some(remote_path) = &config.remote_path {
        args.push("--remote-path".into());
        args.push(remote_path.into());
    }

    match &request.kind {
        OperationKind::Init { encryption } => {
            args.push(format!("--encryption={encryption}").into());
            args.push(location.into());
        }
        OperationKind::Create { archive, paths } => {
            args.push(format!("{location}::{archive}").into());
            args.extend(paths.iter().map(|p| p.as_os_str().to_os_string()));
        }
        OperationKind::Rename { archive, new_name } => {
            args.push(format!("{location}::{archive}").into());
            args.push(new_name.into());
        }
        OperationKind::Delete => {
            args.push(location.into());
        }
    }
    args
}

/// Environment borg needs to run `request` without asking questions on the
/// terminal. The passphrase itself is added by the runner.
pub fn borg_env(request: &OperationRequest) -> Vec<(&'static str, &'static str)> {
    match request.kind {
        OperationKind::Init { .. } => vec![("BORG_DISPLAY_PASSPHRASE", "no")],
        OperationKind::Delete => vec![("BORG_DELETE_I_KNOW_WHAT_I_AM_DOING", "YES")],
        OperationKind::Create { .. } | OperationKind::Rename { .. } => Vec::new(),
    }
}
