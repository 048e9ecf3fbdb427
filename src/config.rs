use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::GenerationError;
use crate::writer_config::{PermissionMode, WriterToml};

pub const DEFAULT_OUTPUT_DIR: &str = "paper_outputs";
pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Environment lookup used for credentials. Injectable so tests never read
/// or mutate the process environment.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

pub fn process_env() -> EnvLookup {
    Arc::new(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
}

/// Load `<work_dir>/.env`, overriding variables already set.
///
/// Returns whether a file was loaded. A malformed file is logged and ignored.
pub fn load_env_file(work_dir: &Path) -> bool {
    let env_file = work_dir.join(".env");
    if !env_file.exists() {
        return false;
    }
    match dotenvy::from_path_override(&env_file) {
        Ok(()) => {
            tracing::debug!(path = %env_file.display(), "loaded environment file");
            true
        }
        Err(e) => {
            tracing::warn!(path = %env_file.display(), error = %e, "failed to load environment file");
            false
        }
    }
}

/// Resolve the API credential: explicit value first, then the environment.
pub fn resolve_api_key(explicit: Option<&str>, env: &EnvLookup) -> Result<String, GenerationError> {
    if let Some(key) = explicit.filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    env(API_KEY_VAR).ok_or(GenerationError::MissingCredential)
}

/// Runtime configuration for a working directory.
///
/// Bridges `writer.toml` with CLI overrides and resolves every path the
/// generator touches.
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: PathBuf,
    pub output_root: PathBuf,
    pub claude_cmd: String,
    pub model: String,
    pub allowed_tools: Vec<String>,
    pub permission_mode: PermissionMode,
    pub setting_sources: Vec<String>,
    pub discovery_skew: Duration,
    writer_toml: WriterToml,
}

impl Config {
    /// Build the configuration for `work_dir`.
    ///
    /// `output_dir` and `model` override the file settings when given.
    pub fn new(work_dir: &Path, output_dir: Option<&Path>, model: Option<&str>) -> Result<Self> {
        let work_dir = work_dir
            .canonicalize()
            .with_context(|| format!("Failed to resolve working directory {}", work_dir.display()))?;
        let writer_toml = WriterToml::load_or_default(&work_dir)?;

        let output_root = match output_dir {
            Some(dir) => absolutize(&work_dir, dir),
            None => match writer_toml.output.dir.as_deref() {
                Some(dir) => absolutize(&work_dir, Path::new(dir)),
                None => work_dir.join(DEFAULT_OUTPUT_DIR),
            },
        };

        let model = model
            .map(str::to_string)
            .unwrap_or_else(|| writer_toml.model());

        Ok(Self {
            output_root,
            claude_cmd: writer_toml.claude_cmd(),
            model,
            allowed_tools: writer_toml.agent.allowed_tools.clone(),
            permission_mode: writer_toml.agent.permission_mode,
            setting_sources: writer_toml.agent.setting_sources.clone(),
            discovery_skew: Duration::from_secs(writer_toml.output.discovery_skew_secs),
            work_dir,
            writer_toml,
        })
    }

    pub fn writer_toml(&self) -> &WriterToml {
        &self.writer_toml
    }

    /// Create the output root if absent.
    pub fn ensure_output_root(&self) -> Result<&Path, GenerationError> {
        std::fs::create_dir_all(&self.output_root).map_err(|source| GenerationError::OutputFolder {
            path: self.output_root.clone(),
            source,
        })?;
        Ok(&self.output_root)
    }

    /// Final path component of the output root, used to recognise the agent
    /// creating paper directories.
    pub fn output_dir_name(&self) -> String {
        self.output_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string())
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn no_env() -> EnvLookup {
        Arc::new(|_| None)
    }

    #[test]
    fn test_config_defaults_to_paper_outputs() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path(), None, Some("sonnet")).unwrap();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(config.work_dir, root);
        assert_eq!(config.output_root, root.join("paper_outputs"));
        assert_eq!(config.model, "sonnet");
        assert_eq!(config.output_dir_name(), "paper_outputs");
        assert_eq!(config.discovery_skew, Duration::from_secs(5));
    }

    #[test]
    fn test_config_reads_writer_toml() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("writer.toml"),
            "[output]\ndir = \"docs/out\"\ndiscovery_skew_secs = 2\n[agent]\nmodel = \"opus\"\n",
        )
        .unwrap();
        let config = Config::new(dir.path(), None, None).unwrap();
        assert!(config.output_root.ends_with("docs/out"));
        assert_eq!(config.model, "opus");
        assert_eq!(config.discovery_skew, Duration::from_secs(2));
        assert_eq!(config.output_dir_name(), "out");
    }

    #[test]
    fn test_cli_output_dir_overrides_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("writer.toml"), "[output]\ndir = \"from_file\"\n").unwrap();
        let config = Config::new(dir.path(), Some(Path::new("from_cli")), None).unwrap();
        assert!(config.output_root.ends_with("from_cli"));
    }

    #[test]
    fn test_ensure_output_root_creates_directory() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path(), None, None).unwrap();
        assert!(!config.output_root.exists());
        config.ensure_output_root().unwrap();
        assert!(config.output_root.is_dir());
    }

    #[test]
    fn test_config_missing_work_dir_is_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(Config::new(&missing, None, None).is_err());
    }

    #[test]
    fn test_resolve_api_key_prefers_explicit() {
        let env: EnvLookup = Arc::new(|_| Some("from-env".to_string()));
        assert_eq!(resolve_api_key(Some("explicit"), &env).unwrap(), "explicit");
        assert_eq!(resolve_api_key(None, &env).unwrap(), "from-env");
        assert_eq!(resolve_api_key(Some(""), &env).unwrap(), "from-env");
    }

    #[test]
    fn test_resolve_api_key_missing() {
        let err = resolve_api_key(None, &no_env()).unwrap_err();
        assert!(matches!(err, GenerationError::MissingCredential));
    }

    #[test]
    fn test_load_env_file_absent() {
        let dir = tempdir().unwrap();
        assert!(!load_env_file(dir.path()));
    }
}
