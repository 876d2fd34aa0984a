use std::io::IsTerminal;

use async_trait::async_trait;
use borgmate_exec::credentials::{Prompt, PromptError, SecretValue};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Asks on the terminal without echo, or reads one line from stdin when it
/// is not a terminal. An empty answer or end of input aborts.
pub struct StdinPrompt;

#[async_trait]
impl Prompt for StdinPrompt {
    async fn prompt(&self, message: &str) -> Result<SecretValue, PromptError> {
        let answer = if std::io::stdin().is_terminal() {
            let message = message.to_string();
            tokio::task::spawn_blocking(move || rpassword::prompt_password(message))
                .await
                .map_err(|e| PromptError::Unavailable(e.to_string()))??
                .into_bytes()
        } else {
            let mut stderr = tokio::io::stderr();
            stderr.write_all(message.as_bytes()).await?;
            stderr.flush().await?;
            read_line_unbuffered().await?
        };

        if answer.is_empty() {
            return Err(PromptError::Aborted);
        }
        Ok(SecretValue::from_bytes(answer))
    }
}

// Byte at a time so a later prompt still sees the following lines.
async fn read_line_unbuffered() -> Result<Vec<u8>, PromptError> {
    let mut stdin = tokio::io::stdin();
    let mut line = Vec::new();
    loop {
        match stdin.read_u8().await {
            Ok(b'\n') => break,
            Ok(b) => line.push(b),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                if line.is_empty() {
                    return Err(PromptError::Aborted);
                }
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Ok(line)
}
