use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use borgmate_exec::credentials::{
    EnvCredentialSource, FileCredentialSource, MemoryCredentialStore, NonInteractivePrompt, Prompt,
};
use borgmate_exec::executor::{CompositeEventSink, EventSink, StdoutEventSink, TracingEventSink};
use borgmate_exec::BorgConfig;
use borgmate_store::YamlConfigStore;

use crate::prompt::StdinPrompt;
use crate::{BorgArgs, ConfigArgs, CredentialArgs, EventsMode};

/// Name under which a repository's passphrase is stored.
pub fn credential_name(repo: &str) -> String {
    format!("borg/{repo}")
}

pub fn resolve_config_path(config: &ConfigArgs) -> Result<PathBuf, String> {
    if let Some(path) = &config.config {
        return Ok(path.clone());
    }
    if let Some(path) = std::env::var_os("BORGMATE_CONFIG").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    match std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        Some(home) => Ok(PathBuf::from(home).join(".config/borgmate/repos.yaml")),
        None => Err(
            "cannot locate the repository config. Set --config <path>, BORGMATE_CONFIG, or HOME"
                .to_string(),
        ),
    }
}

pub async fn open_config(config: &ConfigArgs) -> Result<YamlConfigStore, String> {
    let path = resolve_config_path(config)?;
    YamlConfigStore::open(path).await.map_err(|e| e.to_string())
}

pub fn build_credentials(args: &CredentialArgs) -> Result<MemoryCredentialStore, String> {
    match args.credentials.as_str() {
        "env" => Ok(MemoryCredentialStore::with_source(Box::new(
            EnvCredentialSource {
                prefix: args.credentials_env_prefix.clone(),
            },
        ))),
        "none" => Ok(MemoryCredentialStore::new()),
        other => match other.strip_prefix("file:") {
            Some(dir) if !dir.is_empty() => Ok(MemoryCredentialStore::with_source(Box::new(
                FileCredentialSource {
                    base_dir: PathBuf::from(dir),
                },
            ))),
            _ => Err(format!(
                "invalid --credentials value '{other}': expected env, file:DIR or none"
            )),
        },
    }
}

pub fn build_prompt(args: &CredentialArgs) -> Arc<dyn Prompt> {
    if args.non_interactive {
        Arc::new(NonInteractivePrompt)
    } else {
        Arc::new(StdinPrompt)
    }
}

/// Events always reach `tracing`; `--events stdout` also prints them as
/// JSON lines.
pub fn build_event_sink(mode: EventsMode) -> Arc<dyn EventSink> {
    let mut sink = CompositeEventSink::new();
    sink.add(Box::new(TracingEventSink));
    if mode == EventsMode::Stdout {
        sink.add(Box::new(StdoutEventSink));
    }
    Arc::new(sink)
}

pub fn build_borg_config(args: &BorgArgs) -> Result<BorgConfig, String> {
    let mut env = BTreeMap::new();
    for pair in &args.borg_env {
        match pair.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                env.insert(key.to_string(), value.to_string());
            }
            _ => return Err(format!("invalid --borg-env '{pair}': expected KEY=VALUE")),
        }
    }
    Ok(BorgConfig {
        binary: args.borg_binary.clone(),
        remote_path: args.remote_path.clone(),
        progress: !args.no_progress,
        env,
    })
}
