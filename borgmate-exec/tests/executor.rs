use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use borgmate_core::{
    ErrorId, LogLevel, OperationEvent, OperationKind, OperationOutcome, OperationRequest,
    RepoTarget,
};
use borgmate_exec::credentials::{
    CredentialStore, MemoryCredentialStore, NonInteractivePrompt, Prompt, PromptError, SecretValue,
};
use borgmate_exec::executor::{
    AttemptEvents, Event, EventSink, ExecutionError, ExecutorConfig, LaunchError, OperationRunner,
};
use borgmate_exec::Executor;
use borgmate_store::{ConfigStore, MemoryConfigStore, RepoEntry, StoreError};

const CREDENTIAL: &str = "borg/photos";

// Scripted runner: each invocation replays the next script, then the fallback.
struct FakeRunner {
    scripts: Mutex<VecDeque<Vec<OperationEvent>>>,
    fallback: Vec<OperationEvent>,
    invocations: AtomicUsize,
    seen_credentials: Mutex<Vec<String>>,
}

impl FakeRunner {
    fn new(scripts: Vec<Vec<OperationEvent>>, fallback: Vec<OperationEvent>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            fallback,
            invocations: AtomicUsize::new(0),
            seen_credentials: Mutex::new(Vec::new()),
        }
    }

    fn always(events: Vec<OperationEvent>) -> Self {
        Self::new(Vec::new(), events)
    }

    fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    fn seen_credentials(&self) -> Vec<String> {
        self.seen_credentials.lock().unwrap().clone()
    }
}

#[async_trait]
impl OperationRunner for FakeRunner {
    async fn start(
        &self,
        _request: &OperationRequest,
        credential: &SecretValue,
    ) -> Result<AttemptEvents, LaunchError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.seen_credentials
            .lock()
            .unwrap()
            .push(credential.expose_str().unwrap().to_string());
        let events = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for e in events {
            tx.try_send(e).unwrap();
        }
        Ok(rx)
    }
}

struct FailingRunner;

#[async_trait]
impl OperationRunner for FailingRunner {
    async fn start(
        &self,
        _request: &OperationRequest,
        _credential: &SecretValue,
    ) -> Result<AttemptEvents, LaunchError> {
        Err(LaunchError::new("borg", "No such file or directory (os error 2)"))
    }
}

// Answers p1, p2, p3, ... and counts calls.
struct CountingPrompt {
    calls: AtomicUsize,
    messages: Mutex<Vec<String>>,
}

impl CountingPrompt {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            messages: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prompt for CountingPrompt {
    async fn prompt(&self, message: &str) -> Result<SecretValue, PromptError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.messages.lock().unwrap().push(message.to_string());
        Ok(SecretValue::from_string(format!("p{n}")))
    }
}

// Counts mutations on top of the in-memory store.
struct CountingConfigStore {
    inner: MemoryConfigStore,
    removes: AtomicUsize,
    upserts: AtomicUsize,
}

impl CountingConfigStore {
    fn new(entries: Vec<RepoEntry>) -> Self {
        Self {
            inner: MemoryConfigStore::with_entries(entries),
            removes: AtomicUsize::new(0),
            upserts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ConfigStore for CountingConfigStore {
    async fn get(&self, name: &str) -> Result<Option<RepoEntry>, StoreError> {
        self.inner.get(name).await
    }

    async fn list(&self) -> Result<Vec<RepoEntry>, StoreError> {
        self.inner.list().await
    }

    async fn upsert(&self, entry: RepoEntry) -> Result<bool, StoreError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(entry).await
    }

    async fn remove(&self, name: &str) -> Result<bool, StoreError> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(name).await
    }

    async fn save(&self) -> Result<(), StoreError> {
        self.inner.save().await
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    fn types(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type())
            .collect()
    }

    fn logs(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, Event::Log { .. }))
            .cloned()
            .collect()
    }

    fn progress(&self) -> Vec<f64> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Event::Progress { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn emit(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

fn wrong_passphrase() -> Vec<OperationEvent> {
    vec![
        OperationEvent::error(
            "borg.archiver",
            "passphrase supplied in BORG_PASSPHRASE is incorrect.",
            ErrorId::PassphraseWrong,
        ),
        OperationEvent::terminated(2),
    ]
}

fn success() -> Vec<OperationEvent> {
    vec![OperationEvent::progress(50.0), OperationEvent::terminated(0)]
}

fn photos() -> RepoTarget {
    RepoTarget::new("photos", "/srv/borg/photos")
}

fn delete_request() -> OperationRequest {
    OperationRequest::new(OperationKind::Delete, photos(), CREDENTIAL)
}

fn create_request() -> OperationRequest {
    OperationRequest::new(
        OperationKind::Create {
            archive: "photos-2024-05-01".to_string(),
            paths: vec![PathBuf::from("/home/me/Pictures")],
        },
        photos(),
        CREDENTIAL,
    )
}

struct Harness {
    credentials: Arc<MemoryCredentialStore>,
    prompt: Arc<CountingPrompt>,
    config: Arc<CountingConfigStore>,
    runner: Arc<FakeRunner>,
    sink: Arc<RecordingSink>,
    executor: Executor,
}

fn harness(max_attempts: u32, runner: FakeRunner, entries: Vec<RepoEntry>) -> Harness {
    let credentials = Arc::new(MemoryCredentialStore::new());
    let prompt = Arc::new(CountingPrompt::new());
    let config = Arc::new(CountingConfigStore::new(entries));
    let runner = Arc::new(runner);
    let sink = Arc::new(RecordingSink::default());
    let executor = Executor::new(
        ExecutorConfig::with_max_attempts(max_attempts),
        credentials.clone(),
        prompt.clone(),
        config.clone(),
        runner.clone(),
        sink.clone(),
    );
    Harness {
        credentials,
        prompt,
        config,
        runner,
        sink,
        executor,
    }
}

#[tokio::test]
async fn always_wrong_passphrase_exhausts_attempts() {
    let h = harness(3, FakeRunner::always(wrong_passphrase()), vec![]);

    let report = h.executor.execute(&create_request()).await.unwrap();

    assert_eq!(report.outcome, OperationOutcome::RetriesExhausted);
    assert_eq!(report.attempts, 3);
    assert_eq!(h.runner.invocations(), 3);
    assert_eq!(h.prompt.calls(), 3);
    assert!(!h.credentials.contains(CREDENTIAL).await);
    assert_eq!(h.runner.seen_credentials(), vec!["p1", "p2", "p3"]);
}

#[tokio::test]
async fn wrong_passphrases_below_the_ceiling_are_retried() {
    for wrong in 0..=3usize {
        let scripts = std::iter::repeat_with(wrong_passphrase).take(wrong).collect();
        let h = harness(3, FakeRunner::new(scripts, success()), vec![]);

        let report = h.executor.execute(&create_request()).await.unwrap();

        if wrong < 3 {
            assert_eq!(report.outcome, OperationOutcome::Success, "wrong = {wrong}");
            assert_eq!(h.runner.invocations(), wrong + 1, "wrong = {wrong}");
            assert_eq!(h.prompt.calls(), wrong + 1, "wrong = {wrong}");
        } else {
            assert_eq!(report.outcome, OperationOutcome::RetriesExhausted);
            assert_eq!(h.runner.invocations(), 3);
        }
    }
}

#[tokio::test]
async fn retry_prompt_mentions_the_rejection() {
    let h = harness(2, FakeRunner::new(vec![wrong_passphrase()], success()), vec![]);
    h.executor.execute(&create_request()).await.unwrap();

    let messages = h.prompt.messages.lock().unwrap().clone();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].starts_with("Enter passphrase for repository 'photos'"));
    assert!(messages[1].starts_with("Wrong passphrase for repository 'photos'"));
}

#[tokio::test]
async fn delete_success_removes_entry_exactly_once() {
    let runner = FakeRunner::always(vec![
        OperationEvent::terminated(0),
        OperationEvent::terminated(0),
    ]);
    let h = harness(
        3,
        runner,
        vec![RepoEntry::new("photos", "/srv/borg/photos", None)],
    );

    let report = h.executor.execute(&delete_request()).await.unwrap();

    assert_eq!(report.outcome, OperationOutcome::Success);
    assert_eq!(h.runner.invocations(), 1);
    assert_eq!(h.config.removes.load(Ordering::SeqCst), 1);
    assert!(h.config.get("photos").await.unwrap().is_none());
    assert_eq!(h.config.inner.save_count().await, 1);
}

#[tokio::test]
async fn non_credential_failure_is_fatal_without_retry() {
    let message = "Repository /srv/borg/photos does not exist.";
    let runner = FakeRunner::always(vec![
        OperationEvent::log(LogLevel::Warning, "borg.repository", "lock is stale"),
        OperationEvent::error("borg.archiver", message, ErrorId::RepositoryDoesNotExist),
        OperationEvent::terminated(5),
    ]);
    let h = harness(
        3,
        runner,
        vec![RepoEntry::new("photos", "/srv/borg/photos", None)],
    );

    let report = h.executor.execute(&delete_request()).await.unwrap();

    assert_eq!(
        report.outcome,
        OperationOutcome::FatalError {
            code: 5,
            message: message.to_string()
        }
    );
    assert_eq!(h.runner.invocations(), 1);
    assert_eq!(h.config.removes.load(Ordering::SeqCst), 0);
    assert!(h.config.get("photos").await.unwrap().is_some());
    // The credential was not the problem and stays cached.
    assert!(h.credentials.contains(CREDENTIAL).await);
}

#[tokio::test]
async fn failure_without_error_message_reports_exit_code() {
    let h = harness(3, FakeRunner::always(vec![OperationEvent::terminated(2)]), vec![]);
    let report = h.executor.execute(&create_request()).await.unwrap();
    assert_eq!(
        report.outcome,
        OperationOutcome::FatalError {
            code: 2,
            message: "operation exited with code 2".to_string()
        }
    );
}

#[tokio::test]
async fn stored_credential_skips_the_prompt() {
    let h = harness(3, FakeRunner::always(success()), vec![]);
    h.credentials
        .set(CREDENTIAL, SecretValue::from_string("stored".to_string()))
        .await
        .unwrap();

    let report = h.executor.execute(&create_request()).await.unwrap();

    assert_eq!(report.outcome, OperationOutcome::Success);
    assert_eq!(h.prompt.calls(), 0);
    assert_eq!(h.runner.seen_credentials(), vec!["stored"]);
    assert!(!h.sink.types().contains(&"credential.requested"));
}

#[tokio::test]
async fn rejection_invalidates_only_the_credential_used() {
    let h = harness(3, FakeRunner::new(vec![wrong_passphrase()], success()), vec![]);
    h.credentials
        .set(CREDENTIAL, SecretValue::from_string("stale".to_string()))
        .await
        .unwrap();
    h.credentials
        .set("borg/mail", SecretValue::from_string("mail-secret".to_string()))
        .await
        .unwrap();

    let report = h.executor.execute(&create_request()).await.unwrap();

    assert_eq!(report.outcome, OperationOutcome::Success);
    assert_eq!(h.prompt.calls(), 1);
    assert_eq!(h.runner.seen_credentials(), vec!["stale", "p1"]);
    let mail = h.credentials.get("borg/mail").await.unwrap();
    assert_eq!(mail.expose_bytes(), b"mail-secret");
    let photos = h.credentials.get(CREDENTIAL).await.unwrap();
    assert_eq!(photos.expose_bytes(), b"p1");
}

#[tokio::test]
async fn create_success_leaves_config_alone() {
    let h = harness(
        3,
        FakeRunner::always(success()),
        vec![RepoEntry::new("photos", "/srv/borg/photos", None)],
    );
    let report = h.executor.execute(&create_request()).await.unwrap();

    assert!(report.outcome.is_success());
    assert_eq!(h.config.removes.load(Ordering::SeqCst), 0);
    assert_eq!(h.config.upserts.load(Ordering::SeqCst), 0);
    assert_eq!(h.config.inner.save_count().await, 0);
}

#[tokio::test]
async fn init_success_adds_entry() {
    let h = harness(3, FakeRunner::always(success()), vec![]);
    let request = OperationRequest::new(
        OperationKind::Init {
            encryption: "repokey".to_string(),
        },
        photos(),
        CREDENTIAL,
    );

    h.executor.execute(&request).await.unwrap();

    let entry = h.config.get("photos").await.unwrap().unwrap();
    assert_eq!(entry.location, "/srv/borg/photos");
    assert_eq!(entry.encryption.as_deref(), Some("repokey"));
}

#[tokio::test]
async fn progress_is_relayed_and_late_events_ignored() {
    let runner = FakeRunner::always(vec![
        OperationEvent::progress(10.0),
        OperationEvent::log(LogLevel::Info, "borg.archiver", "Creating archive"),
        OperationEvent::terminated(0),
        OperationEvent::progress(99.0),
        OperationEvent::terminated(1),
    ]);
    let h = harness(3, runner, vec![]);

    let report = h.executor.execute(&create_request()).await.unwrap();

    assert_eq!(report.outcome, OperationOutcome::Success);
    assert_eq!(h.sink.progress(), vec![10.0]);
    assert_eq!(
        h.sink.types(),
        vec![
            "operation.started",
            "credential.requested",
            "attempt.started",
            "progress",
            "log",
            "attempt.finished",
            "operation.finished",
        ]
    );
}

#[tokio::test]
async fn stream_without_exit_status_is_fatal() {
    let runner = FakeRunner::always(vec![OperationEvent::progress(5.0)]);
    let h = harness(3, runner, vec![]);

    let report = h.executor.execute(&create_request()).await.unwrap();

    match report.outcome {
        OperationOutcome::FatalError { code, .. } => assert_eq!(code, -1),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(h.runner.invocations(), 1);
}

#[tokio::test]
async fn zero_attempt_budget_never_invokes() {
    let h = harness(0, FakeRunner::always(success()), vec![]);
    let report = h.executor.execute(&create_request()).await.unwrap();

    assert_eq!(report.outcome, OperationOutcome::RetriesExhausted);
    assert_eq!(report.attempts, 0);
    assert_eq!(h.runner.invocations(), 0);
    assert_eq!(h.prompt.calls(), 0);
}

#[tokio::test]
async fn invalid_request_is_an_error() {
    let h = harness(3, FakeRunner::always(success()), vec![]);
    let request = OperationRequest::new(OperationKind::Delete, photos(), "");

    let err = h.executor.execute(&request).await.unwrap_err();

    assert!(matches!(err, ExecutionError::InvalidRequest(_)));
    assert_eq!(h.runner.invocations(), 0);
}

#[tokio::test]
async fn unavailable_prompt_is_an_error() {
    let executor = Executor::new(
        ExecutorConfig::default(),
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(NonInteractivePrompt),
        Arc::new(MemoryConfigStore::new()),
        Arc::new(FakeRunner::always(success())),
        Arc::new(RecordingSink::default()),
    );

    let err = executor.execute(&create_request()).await.unwrap_err();
    assert!(matches!(err, ExecutionError::Prompt(_)));
}

#[tokio::test]
async fn launch_failure_is_an_error() {
    let credentials = Arc::new(MemoryCredentialStore::new());
    credentials
        .set(CREDENTIAL, SecretValue::from_string("x".to_string()))
        .await
        .unwrap();
    let executor = Executor::new(
        ExecutorConfig::default(),
        credentials,
        Arc::new(CountingPrompt::new()),
        Arc::new(MemoryConfigStore::new()),
        Arc::new(FailingRunner),
        Arc::new(RecordingSink::default()),
    );

    let err = executor.execute(&create_request()).await.unwrap_err();
    assert!(matches!(err, ExecutionError::Launch(_)));
}

#[tokio::test]
async fn relayed_log_keeps_error_id() {
    let runner = FakeRunner::new(vec![wrong_passphrase()], success());
    let h = harness(3, runner, vec![]);

    let report = h.executor.execute(&delete_request()).await.unwrap();
    assert_eq!(report.outcome, OperationOutcome::Success);

    let logs = h.sink.logs();
    assert_eq!(logs.len(), 1);
    match &logs[0] {
        Event::Log {
            level, error_id, ..
        } => {
            assert_eq!(*level, LogLevel::Error);
            assert_eq!(error_id, &Some(ErrorId::PassphraseWrong));
        }
        other => panic!("unexpected event {other:?}"),
    }
    let json = logs[0].to_json();
    assert_eq!(json["type"], "log");
    assert_eq!(json["error_id"], "PassphraseWrong");
}
