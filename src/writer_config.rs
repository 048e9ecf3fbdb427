//! File-level configuration for the scientific writer.
//!
//! Settings are read from `writer.toml` in the working directory and layered
//! with environment variables and CLI arguments (file → environment → CLI).
//!
//! # Configuration File Format
//!
//! ```toml
//! [agent]
//! claude_cmd = "claude"
//! model = "claude-sonnet-4-20250514"
//! allowed_tools = ["Read", "Write", "Edit", "Bash", "research-lookup"]
//! permission_mode = "bypassPermissions"
//! setting_sources = ["project"]
//!
//! [output]
//! dir = "paper_outputs"
//! discovery_skew_secs = 5
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "writer.toml";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_ALLOWED_TOOLS: &[&str] = &["Read", "Write", "Edit", "Bash", "research-lookup"];

/// Permission modes understood by the Claude CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionMode {
    /// Prompt for every tool use
    Default,
    /// Auto-accept file edits, prompt for the rest
    AcceptEdits,
    /// Execute every allowed tool without prompting (default for unattended runs)
    #[default]
    BypassPermissions,
    /// Plan only, no modifications
    Plan,
}

impl std::fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionMode::Default => write!(f, "default"),
            PermissionMode::AcceptEdits => write!(f, "acceptEdits"),
            PermissionMode::BypassPermissions => write!(f, "bypassPermissions"),
            PermissionMode::Plan => write!(f, "plan"),
        }
    }
}

impl std::str::FromStr for PermissionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(PermissionMode::Default),
            "acceptedits" => Ok(PermissionMode::AcceptEdits),
            "bypasspermissions" => Ok(PermissionMode::BypassPermissions),
            "plan" => Ok(PermissionMode::Plan),
            _ => anyhow::bail!(
                "Invalid permission mode '{}'. Valid values: default, acceptEdits, bypassPermissions, plan",
                s
            ),
        }
    }
}

/// Generation agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSection {
    /// Claude CLI command (default: "claude")
    #[serde(default)]
    pub claude_cmd: Option<String>,
    /// Model identifier passed to the agent
    #[serde(default)]
    pub model: Option<String>,
    /// Tools the agent may use
    #[serde(default = "default_allowed_tools")]
    pub allowed_tools: Vec<String>,
    #[serde(default)]
    pub permission_mode: PermissionMode,
    /// Setting sources the agent loads skills from
    #[serde(default = "default_setting_sources")]
    pub setting_sources: Vec<String>,
}

fn default_allowed_tools() -> Vec<String> {
    DEFAULT_ALLOWED_TOOLS.iter().map(|t| t.to_string()).collect()
}

fn default_setting_sources() -> Vec<String> {
    vec!["project".to_string()]
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            claude_cmd: None,
            model: None,
            allowed_tools: default_allowed_tools(),
            permission_mode: PermissionMode::default(),
            setting_sources: default_setting_sources(),
        }
    }
}

/// Output folder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    /// Output root, relative to the working directory unless absolute
    #[serde(default)]
    pub dir: Option<String>,
    /// Clock-skew tolerance when locating the directory produced by a run
    #[serde(default = "default_discovery_skew_secs")]
    pub discovery_skew_secs: u64,
}

fn default_discovery_skew_secs() -> u64 {
    5
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: None,
            discovery_skew_secs: default_discovery_skew_secs(),
        }
    }
}

/// The complete writer.toml configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriterToml {
    #[serde(default)]
    pub agent: AgentSection,
    #[serde(default)]
    pub output: OutputSection,
}

impl WriterToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse writer.toml")
    }

    /// Load `writer.toml` from the working directory, or defaults if absent.
    pub fn load_or_default(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the Claude command, with fallback to environment variable.
    pub fn claude_cmd(&self) -> String {
        self.agent
            .claude_cmd
            .clone()
            .or_else(|| std::env::var("CLAUDE_CMD").ok())
            .unwrap_or_else(|| "claude".to_string())
    }

    /// Get the model (file → WRITER_MODEL → default).
    pub fn model(&self) -> String {
        self.agent
            .model
            .clone()
            .or_else(|| std::env::var("WRITER_MODEL").ok())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.agent.allowed_tools.is_empty() {
            warnings.push("agent.allowed_tools is empty: the agent cannot write any files".to_string());
        } else if !self.agent.allowed_tools.iter().any(|t| t.eq_ignore_ascii_case("write")) {
            warnings.push("agent.allowed_tools does not include Write".to_string());
        }

        if self.output.discovery_skew_secs > 300 {
            warnings.push(format!(
                "output.discovery_skew_secs = {} may pick up directories from earlier runs",
                self.output.discovery_skew_secs
            ));
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_permission_mode_display_round_trips() {
        for mode in [
            PermissionMode::Default,
            PermissionMode::AcceptEdits,
            PermissionMode::BypassPermissions,
            PermissionMode::Plan,
        ] {
            assert_eq!(mode.to_string().parse::<PermissionMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_permission_mode_from_str_invalid() {
        let result = "yolo".parse::<PermissionMode>();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid permission mode"));
    }

    #[test]
    fn test_writer_toml_parse_empty() {
        let config = WriterToml::parse("").unwrap();
        assert!(config.agent.claude_cmd.is_none());
        assert_eq!(config.agent.allowed_tools, default_allowed_tools());
        assert_eq!(config.agent.permission_mode, PermissionMode::BypassPermissions);
        assert_eq!(config.agent.setting_sources, vec!["project".to_string()]);
        assert_eq!(config.output.discovery_skew_secs, 5);
    }

    #[test]
    fn test_writer_toml_parse_sections() {
        let config = WriterToml::parse(
            r#"
[agent]
claude_cmd = "/opt/claude"
model = "opus"
allowed_tools = ["Read", "Write"]
permission_mode = "acceptEdits"

[output]
dir = "out"
discovery_skew_secs = 10
"#,
        )
        .unwrap();
        assert_eq!(config.claude_cmd(), "/opt/claude");
        assert_eq!(config.model(), "opus");
        assert_eq!(config.agent.allowed_tools, vec!["Read", "Write"]);
        assert_eq!(config.agent.permission_mode, PermissionMode::AcceptEdits);
        assert_eq!(config.output.dir.as_deref(), Some("out"));
        assert_eq!(config.output.discovery_skew_secs, 10);
    }

    #[test]
    fn test_writer_toml_parse_invalid() {
        let result = WriterToml::parse("[agent\nmodel = 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempdir().unwrap();
        let config = WriterToml::load_or_default(dir.path()).unwrap();
        assert!(config.output.dir.is_none());
    }

    #[test]
    fn test_validate_warns_without_write_tool() {
        let mut config = WriterToml::default();
        assert!(config.validate().is_empty());

        config.agent.allowed_tools = vec!["Read".to_string()];
        let warnings = config.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Write"));
    }
}
