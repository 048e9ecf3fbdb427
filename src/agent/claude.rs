use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

use super::{AgentOptions, AgentStream, GenerationAgent};
use crate::config::API_KEY_VAR;
use crate::errors::AgentError;
use crate::stream::StreamEvent;

/// Drives the Claude CLI in `--print --output-format stream-json` mode.
///
/// The prompt is written to stdin; stdout is parsed line by line into
/// stream events. Dropping the returned stream kills the process.
#[derive(Debug, Clone, Default)]
pub struct ClaudeCliAgent;

impl ClaudeCliAgent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GenerationAgent for ClaudeCliAgent {
    async fn query(&self, prompt: &str, options: &AgentOptions) -> Result<AgentStream, AgentError> {
        let mut cmd = Command::new(&options.claude_cmd);
        cmd.args(options.claude_flags())
            .current_dir(&options.cwd)
            // A nested session refuses to start when this is inherited.
            .env_remove("CLAUDECODE")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(key) = &options.api_key {
            cmd.env(API_KEY_VAR, key);
        }

        tracing::debug!(cmd = %options.claude_cmd, model = %options.model, "spawning Claude process");
        let mut child = cmd.spawn().map_err(AgentError::SpawnFailed)?;
        tracing::debug!(pid = child.id().unwrap_or(0), "Claude process spawned");

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(prompt.as_bytes()).await.map_err(AgentError::StdinWrite)?;
            stdin.shutdown().await.map_err(AgentError::StdinWrite)?;
        }

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AgentError::Io(std::io::Error::other("Claude stdout not captured")))?;

        // Drain stderr concurrently so a chatty process cannot block on a full pipe.
        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf).await;
                buf
            })
        });

        let stream = async_stream::try_stream! {
            let mut lines = BufReader::new(stdout).lines();
            let mut reported: Option<String> = None;

            while let Some(line) = lines.next_line().await? {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<StreamEvent>(&line) {
                    Ok(StreamEvent::Assistant { message, .. }) => {
                        yield message;
                    }
                    Ok(StreamEvent::Result { result, is_error, subtype }) => {
                        tracing::debug!(%subtype, is_error, "Claude run finished");
                        if is_error {
                            reported = Some(result.unwrap_or(subtype));
                        }
                    }
                    Ok(StreamEvent::User { .. }) | Ok(StreamEvent::System { .. }) => {}
                    Err(e) => tracing::trace!(error = %e, "ignoring non-event output line"),
                }
            }

            let status = child.wait().await?;
            let stderr = match stderr_task {
                Some(task) => task.await.unwrap_or_default(),
                None => String::new(),
            };

            if let Some(message) = reported {
                Err::<(), _>(AgentError::Reported(message))?;
            }
            if !status.success() {
                let exit_code = status.code().unwrap_or(-1);
                tracing::warn!(exit_code, stderr = %stderr.trim(), "Claude exited with failure");
                Err::<(), _>(AgentError::NonZeroExit { exit_code })?;
            }
        };

        Ok(Box::pin(stream))
    }
}
