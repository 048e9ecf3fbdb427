//! The external generation agent.
//!
//! The agent receives a prompt plus an [`AgentOptions`] bundle and answers
//! with a stream of [`AgentMessage`]s. Progress tracking only ever sees that
//! stream, so the concrete agent is swappable.

mod claude;
mod scripted;

pub use claude::ClaudeCliAgent;
pub use scripted::ScriptedAgent;

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::path::PathBuf;

use crate::config::Config;
use crate::errors::AgentError;
use crate::stream::AgentMessage;
use crate::writer_config::PermissionMode;

/// Messages produced by one agent query. The stream ends after the last
/// message; a failure is delivered as the final item.
pub type AgentStream = BoxStream<'static, Result<AgentMessage, AgentError>>;

/// Everything the agent needs besides the prompt itself.
#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub claude_cmd: String,
    pub system_prompt: String,
    pub model: String,
    pub allowed_tools: Vec<String>,
    pub permission_mode: PermissionMode,
    pub setting_sources: Vec<String>,
    pub cwd: PathBuf,
    pub api_key: Option<String>,
}

impl AgentOptions {
    /// Options for `config`, with the given system prompt and credential.
    pub fn from_config(config: &Config, system_prompt: String, api_key: Option<String>) -> Self {
        Self {
            claude_cmd: config.claude_cmd.clone(),
            system_prompt,
            model: config.model.clone(),
            allowed_tools: config.allowed_tools.clone(),
            permission_mode: config.permission_mode,
            setting_sources: config.setting_sources.clone(),
            cwd: config.work_dir.clone(),
            api_key,
        }
    }

    /// Command-line flags for a streaming, non-interactive Claude CLI run.
    pub fn claude_flags(&self) -> Vec<String> {
        let mut flags = vec![
            "--print".to_string(),
            "--output-format".to_string(),
            "stream-json".to_string(),
            "--verbose".to_string(),
            "--model".to_string(),
            self.model.clone(),
            "--permission-mode".to_string(),
            self.permission_mode.to_string(),
        ];
        if !self.allowed_tools.is_empty() {
            flags.push("--allowedTools".to_string());
            flags.push(self.allowed_tools.join(","));
        }
        if !self.setting_sources.is_empty() {
            flags.push("--setting-sources".to_string());
            flags.push(self.setting_sources.join(","));
        }
        if !self.system_prompt.is_empty() {
            flags.push("--system-prompt".to_string());
            flags.push(self.system_prompt.clone());
        }
        flags
    }
}

/// Abstraction over the generation agent for testability.
/// Real implementation: `ClaudeCliAgent`. Test double: `ScriptedAgent`.
#[async_trait]
pub trait GenerationAgent: Send + Sync {
    /// Start a query and return its message stream.
    ///
    /// Errors returned here mean the agent could not be started at all;
    /// failures after start arrive through the stream.
    async fn query(&self, prompt: &str, options: &AgentOptions) -> Result<AgentStream, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> AgentOptions {
        AgentOptions {
            claude_cmd: "claude".into(),
            system_prompt: "Be precise.".into(),
            model: "claude-sonnet-4-20250514".into(),
            allowed_tools: vec!["Read".into(), "Write".into()],
            permission_mode: PermissionMode::BypassPermissions,
            setting_sources: vec!["project".into()],
            cwd: PathBuf::from("/work"),
            api_key: None,
        }
    }

    #[test]
    fn test_claude_flags_stream_json() {
        let flags = options().claude_flags();
        assert_eq!(&flags[..4], ["--print", "--output-format", "stream-json", "--verbose"]);
        let joined = flags.join(" ");
        assert!(joined.contains("--model claude-sonnet-4-20250514"));
        assert!(joined.contains("--permission-mode bypassPermissions"));
        assert!(joined.contains("--allowedTools Read,Write"));
        assert!(joined.contains("--setting-sources project"));
        assert_eq!(flags.last().map(String::as_str), Some("Be precise."));
    }

    #[test]
    fn test_claude_flags_skip_empty_lists() {
        let mut opts = options();
        opts.allowed_tools.clear();
        opts.setting_sources.clear();
        opts.system_prompt.clear();
        let flags = opts.claude_flags();
        assert!(!flags.iter().any(|f| f == "--allowedTools"));
        assert!(!flags.iter().any(|f| f == "--setting-sources"));
        assert!(!flags.iter().any(|f| f == "--system-prompt"));
    }

    #[test]
    fn test_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path(), None, Some("opus")).unwrap();
        let opts = AgentOptions::from_config(&config, "sys".into(), Some("key".into()));
        assert_eq!(opts.model, "opus");
        assert_eq!(opts.cwd, config.work_dir);
        assert_eq!(opts.api_key.as_deref(), Some("key"));
        assert_eq!(opts.permission_mode, PermissionMode::BypassPermissions);
    }
}
