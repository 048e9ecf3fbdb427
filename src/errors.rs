//! Typed error hierarchy for the scientific writer.
//!
//! Two enums cover the two failure domains:
//! - `AgentError` — failures of the external Claude CLI process and its stream
//! - `GenerationError` — the conditions that abort a generation run

use thiserror::Error;

/// Errors raised while driving the external generation agent.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Failed to spawn Claude process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Failed to write prompt to Claude stdin: {0}")]
    StdinWrite(#[source] std::io::Error),

    #[error("Failed to read Claude output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Claude reported an error: {0}")]
    Reported(String),

    #[error("Claude exited with non-zero code {exit_code}")]
    NonZeroExit { exit_code: i32 },

    #[error("Scripted agent failure: {0}")]
    Scripted(String),
}

/// Conditions that end a generation run with a `failed` terminal record.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(
        "ANTHROPIC_API_KEY not found. Either pass an API key or set the ANTHROPIC_API_KEY environment variable."
    )]
    MissingCredential,

    #[error("Output directory not found after generation")]
    OutputNotFound,

    #[error("Failed to prepare output folder at {path}: {source}")]
    OutputFolder {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error during document generation: {0}")]
    Agent(#[from] AgentError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_error_spawn_failed_is_matchable() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "claude not found");
        let err = AgentError::SpawnFailed(io_err);
        match &err {
            AgentError::SpawnFailed(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            _ => panic!("Expected SpawnFailed variant"),
        }
    }

    #[test]
    fn generation_error_wraps_agent_error_with_prefix() {
        let err: GenerationError = AgentError::Reported("rate limited".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Error during document generation: Claude reported an error: rate limited"
        );
    }

    #[test]
    fn missing_credential_mentions_variable() {
        let err = GenerationError::MissingCredential;
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn non_zero_exit_carries_code() {
        let err = AgentError::NonZeroExit { exit_code: 2 };
        assert!(err.to_string().contains('2'));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&AgentError::Reported("x".into()));
        assert_std_error(&GenerationError::OutputNotFound);
    }
}
