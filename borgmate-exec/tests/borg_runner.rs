#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use borgmate_core::{OperationEvent, OperationKind, OperationOutcome, OperationRequest, RepoTarget};
use borgmate_exec::borg::{borg_args, borg_env};
use borgmate_exec::credentials::{CredentialStore, MemoryCredentialStore, SecretValue};
use borgmate_exec::executor::{ExecutorConfig, NoOpEventSink, OperationRunner};
use borgmate_exec::{BorgConfig, BorgRunner, Executor};
use borgmate_store::{ConfigStore, MemoryConfigStore, RepoEntry};
use tempfile::TempDir;

const FAKE_BORG: &str = r#"#!/bin/sh
echo "$@" > "$(dirname "$0")/args.txt"
echo '{"type": "progress_percent", "current": 1, "total": 4, "finished": false}' >&2
if [ "$BORG_PASSPHRASE" = "good" ]; then
  exit 0
fi
echo '{"type": "log_message", "levelname": "ERROR", "name": "borg.archiver", "message": "passphrase supplied in BORG_PASSPHRASE is incorrect.", "msgid": "PassphraseWrong"}' >&2
exit 2
"#;

// Leaves a background child holding stderr open, like an ssh master would.
const LINGERING_BORG: &str = r#"#!/bin/sh
echo '{"type": "log_message", "levelname": "INFO", "name": "borg.archiver", "message": "done"}' >&2
(sleep 10) &
exit 0
"#;

fn install_script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn command_lines_per_kind() {
    let cfg = BorgConfig {
        remote_path: Some("borg1".to_string()),
        ..Default::default()
    };
    let repo = RepoTarget::new("photos", "ssh://nas/./photos");

    let create = OperationRequest::new(
        OperationKind::Create {
            archive: "a1".to_string(),
            paths: vec![PathBuf::from("/etc"), PathBuf::from("/home")],
        },
        repo.clone(),
        "borg/photos",
    );
    let args: Vec<String> = borg_args(&create, &cfg)
        .into_iter()
        .map(|a| a.into_string().unwrap())
        .collect();
    assert_eq!(
        args,
        vec![
            "create",
            "--log-json",
            "--progress",
            "--remote-path",
            "borg1",
            "ssh://nas/./photos::a1",
            "/etc",
            "/home"
        ]
    );

    let delete = OperationRequest::new(OperationKind::Delete, repo.clone(), "borg/photos");
    let args: Vec<String> = borg_args(&delete, &BorgConfig::default())
        .into_iter()
        .map(|a| a.into_string().unwrap())
        .collect();
    assert_eq!(args, vec!["delete", "--log-json", "--progress", "ssh://nas/./photos"]);
    assert_eq!(
        borg_env(&delete),
        vec![("BORG_DELETE_I_KNOW_WHAT_I_AM_DOING", "YES")]
    );

    let init = OperationRequest::new(
        OperationKind::Init {
            encryption: "repokey".to_string(),
        },
        repo,
        "borg/photos",
    );
    let args: Vec<String> = borg_args(
        &init,
        &BorgConfig {
            progress: false,
            ..Default::default()
        },
    )
    .into_iter()
    .map(|a| a.into_string().unwrap())
    .collect();
    assert_eq!(
        args,
        vec!["init", "--log-json", "--encryption=repokey", "ssh://nas/./photos"]
    );
}

// One test drives the scripts so none is written while another test forks.
#[tokio::test]
async fn fake_borg_process_end_to_end() {
    let dir = TempDir::new().unwrap();
    let binary = install_script(&dir, "borg", FAKE_BORG);
    let lingering = install_script(&dir, "borg-lingering", LINGERING_BORG);

    // Exit is reported even though a leftover child still holds stderr.
    let request = OperationRequest::new(
        OperationKind::Delete,
        RepoTarget::new("photos", "/srv/borg/photos"),
        "borg/photos",
    );
    let mut events = BorgRunner::new(BorgConfig {
        binary: lingering,
        ..Default::default()
    })
    .start(&request, &SecretValue::from_string("good".to_string()))
    .await
    .unwrap();
    let collected = tokio::time::timeout(Duration::from_secs(5), async {
        let mut seen = Vec::new();
        while let Some(e) = events.recv().await {
            seen.push(e);
        }
        seen
    })
    .await
    .unwrap();
    assert_eq!(
        collected,
        vec![
            OperationEvent::log(borgmate_core::LogLevel::Info, "borg.archiver", "done"),
            OperationEvent::terminated(0),
        ]
    );

    let runner = BorgRunner::new(BorgConfig {
        binary,
        ..Default::default()
    });
    let request = OperationRequest::new(
        OperationKind::Delete,
        RepoTarget::new("photos", "/srv/borg/photos"),
        "borg/photos",
    );

    // Raw event stream of a rejected attempt.
    let mut events = runner
        .start(&request, &SecretValue::from_string("bad".to_string()))
        .await
        .unwrap();
    let mut seen = Vec::new();
    while let Some(e) = events.recv().await {
        seen.push(e);
    }
    assert_eq!(seen.first(), Some(&OperationEvent::progress(25.0)));
    assert_eq!(seen.last(), Some(&OperationEvent::terminated(2)));
    assert_eq!(seen.len(), 3);
    let args = std::fs::read_to_string(dir.path().join("args.txt")).unwrap();
    assert_eq!(args.trim(), "delete --log-json --progress /srv/borg/photos");

    // Through the executor: the stale credential is rejected, the good one
    // is already cached under the name by the time of the retry.
    let credentials = Arc::new(MemoryCredentialStore::new());
    credentials
        .set("borg/photos", SecretValue::from_string("bad".to_string()))
        .await
        .unwrap();
    let config = Arc::new(MemoryConfigStore::with_entries([RepoEntry::new(
        "photos",
        "/srv/borg/photos",
        None,
    )]));

    struct GoodPrompt;
    #[async_trait::async_trait]
    impl borgmate_exec::credentials::Prompt for GoodPrompt {
        async fn prompt(
            &self,
            _message: &str,
        ) -> Result<SecretValue, borgmate_exec::credentials::PromptError> {
            Ok(SecretValue::from_string("good".to_string()))
        }
    }

    let executor = Executor::new(
        ExecutorConfig::default(),
        credentials.clone(),
        Arc::new(GoodPrompt),
        config.clone(),
        Arc::new(runner),
        Arc::new(NoOpEventSink),
    );
    let report = executor.execute(&request).await.unwrap();

    assert_eq!(report.outcome, OperationOutcome::Success);
    assert_eq!(report.attempts, 2);
    assert!(config.get("photos").await.unwrap().is_none());
}
