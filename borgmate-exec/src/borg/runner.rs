use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use uuid::Uuid;

use borgmate_core::{OperationEvent, OperationRequest};

use crate::borg::command::{borg_args, borg_env};
use crate::borg::log_json::parse_log_line;
use crate::credentials::SecretValue;
use crate::delegate::UNKNOWN_EXIT_CODE;
use crate::executor::{AttemptEvents, LaunchError, OperationRunner, EVENT_CHANNEL_CAPACITY};

/// How long stderr is still read once borg itself has exited.
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct BorgConfig {
    pub binary: PathBuf,
    pub remote_path: Option<String>,
    pub progress: bool,
    /// Extra variables for every invocation, e.g. `BORG_RSH`.
    pub env: BTreeMap<String, String>,
}

impl Default for BorgConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("borg"),
            remote_path: None,
            progress: true,
            env: BTreeMap::new(),
        }
    }
}

/// Runs operations through the `borg` binary.
///
/// The passphrase travels in `BORG_PASSPHRASE`; structured output is read
/// from stderr, and the process exit status becomes the final
/// [`OperationEvent::Terminated`].
pub struct BorgRunner {
    config: BorgConfig,
}

impl BorgRunner {
    pub fn new(config: BorgConfig) -> Self {
        Self { config }
    }

    fn program(&self) -> String {
        self.config.binary.display().to_string()
    }
}

#[async_trait]
impl OperationRunner for BorgRunner {
    async fn start(
        &self,
        request: &OperationRequest,
        credential: &SecretValue,
    ) -> Result<AttemptEvents, LaunchError> {
        let passphrase = credential
            .expose_str()
            .ok_or_else(|| LaunchError::new(self.program(), "passphrase is not valid UTF-8"))?;

        let mut cmd = Command::new(&self.config.binary);
        cmd.args(borg_args(request, &self.config))
            .envs(&self.config.env)
            .envs(borg_env(request))
            .env("BORG_PASSPHRASE", passphrase)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| LaunchError::new(self.program(), e.to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| LaunchError::new(self.program(), "stderr was not captured"))?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let request_id = request.id;
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut reading = true;

            // Processes borg leaves behind (an ssh master, say) may keep the
            // pipe open, so the exit status is awaited alongside the output.
            let status = loop {
                tokio::select! {
                    status = child.wait() => break status,
                    line = lines.next_line(), if reading => {
                        reading = forward_line(line, &tx, request_id).await;
                    }
                }
            };

            if reading {
                let drain = async {
                    while forward_line(lines.next_line().await, &tx, request_id).await {}
                };
                if tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, drain).await.is_err() {
                    tracing::debug!(%request_id, "borg output still open after exit");
                }
            }

            let exit_code = match status {
                Ok(status) => status.code().unwrap_or(UNKNOWN_EXIT_CODE),
                Err(e) => {
                    tracing::warn!(%request_id, error = %e, "failed to wait for borg");
                    UNKNOWN_EXIT_CODE
                }
            };
            tracing::debug!(%request_id, exit_code, "borg exited");
            let _ = tx.send(OperationEvent::terminated(exit_code)).await;
        });

        Ok(rx)
    }
}

/// Relay one stderr line. Returns `false` once there is nothing more to read
/// or nobody left to read the events.
async fn forward_line(
    line: std::io::Result<Option<String>>,
    tx: &mpsc::Sender<OperationEvent>,
    request_id: Uuid,
) -> bool {
    match line {
        Ok(Some(line)) => match parse_log_line(&line) {
            Some(event) => tx.send(event).await.is_ok(),
            None => true,
        },
        Ok(None) => false,
        Err(e) => {
            tracing::warn!(%request_id, error = %e, "failed to read borg output");
            false
        }
    }
}
