pub mod create;
pub mod delete;
pub mod forget;
pub mod init;
pub mod rename;
pub mod repos;

use std::sync::Arc;

use borgmate_core::{OperationOutcome, OperationReport, OperationRequest, RepoTarget};
use borgmate_exec::executor::{ExecutionError, ExecutorConfig};
use borgmate_exec::{BorgRunner, Executor};
use borgmate_store::{ConfigStore, YamlConfigStore};

use crate::exit_codes;
use crate::output::{print_error, print_result};
use crate::utils::{
    build_borg_config, build_credentials, build_event_sink, build_prompt, open_config,
};
use crate::{OutputArgs, RunArgs};

/// Look a configured repository up by name, reporting the failure itself.
pub(crate) async fn resolve_repo(
    store: &YamlConfigStore,
    name: &str,
    output: &OutputArgs,
) -> Result<RepoTarget, i32> {
    match store.get(name).await {
        Ok(Some(entry)) => Ok(RepoTarget::new(entry.name, entry.location)),
        Ok(None) => {
            print_error(
                output.format,
                output.quiet,
                &format!(
                    "repository '{name}' is not configured in {}",
                    store.path().display()
                ),
            );
            Err(exit_codes::RUNTIME_ERROR)
        }
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            Err(exit_codes::RUNTIME_ERROR)
        }
    }
}

/// Open the config named by `run`, or report why it cannot be opened.
pub(crate) async fn open_store(run: &RunArgs) -> Result<YamlConfigStore, i32> {
    open_config(&run.config).await.map_err(|e| {
        print_error(run.output.format, run.output.quiet, &e);
        exit_codes::RUNTIME_ERROR
    })
}

/// Run `request` through a borg-backed executor and report the outcome.
pub(crate) async fn run_operation(
    request: OperationRequest,
    store: YamlConfigStore,
    run: RunArgs,
) -> i32 {
    let output = &run.output;

    let credentials = match build_credentials(&run.credentials) {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::INVALID_REQUEST;
        }
    };
    let borg = match build_borg_config(&run.borg) {
        Ok(b) => b,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::INVALID_REQUEST;
        }
    };

    let executor = Executor::new(
        ExecutorConfig::with_max_attempts(run.retry.max_attempts),
        Arc::new(credentials),
        build_prompt(&run.credentials),
        Arc::new(store),
        Arc::new(BorgRunner::new(borg)),
        build_event_sink(run.events.events),
    );

    match executor.execute(&request).await {
        Ok(report) => {
            print_report(output, &report);
            exit_code_for(&report.outcome)
        }
        Err(ExecutionError::InvalidRequest(e)) => {
            let lines: Vec<String> = e.violations.iter().map(|v| v.to_string()).collect();
            print_error(
                output.format,
                output.quiet,
                &format!("invalid request: {}", lines.join("; ")),
            );
            exit_codes::INVALID_REQUEST
        }
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            exit_codes::RUNTIME_ERROR
        }
    }
}

fn print_report(output: &OutputArgs, report: &OperationReport) {
    print_result(output.format, output.quiet, report, |report| {
        let plural = if report.attempts == 1 { "" } else { "s" };
        match &report.outcome {
            OperationOutcome::Success => println!(
                "{} {}: succeeded after {} attempt{plural}",
                report.kind, report.repository, report.attempts
            ),
            OperationOutcome::RetriesExhausted => println!(
                "{} {}: passphrase rejected, gave up after {} attempt{plural}",
                report.kind, report.repository, report.attempts
            ),
            OperationOutcome::FatalError { code, message } => println!(
                "{} {}: failed with exit code {code}: {message}",
                report.kind, report.repository
            ),
        }
    });
}

fn exit_code_for(outcome: &OperationOutcome) -> i32 {
    match outcome {
        OperationOutcome::Success => exit_codes::SUCCESS,
        OperationOutcome::RetriesExhausted => exit_codes::RETRIES_EXHAUSTED,
        OperationOutcome::FatalError { .. } => exit_codes::OPERATION_FAILED,
    }
}
