//! Document generation with live progress.
//!
//! [`Generator::generate`] drives the generation agent and turns what it
//! says and does into a stream of [`GenerationRecord`]s: progress updates in
//! observation order, then exactly one terminal result. The stream is lazy;
//! nothing happens until the caller polls it, and dropping it stops the run.
//!
//! Failures never escape as errors. A missing credential, an agent failure,
//! or a run that produced no output directory each end the stream with a
//! single `failed` result.

mod context;
mod lock;

pub use context::RunContext;
pub use lock::{LOCK_FILE, RunLock};

use futures::StreamExt;
use futures::stream::BoxStream;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use crate::agent::{AgentOptions, ClaudeCliAgent, GenerationAgent};
use crate::config::{self, Config, EnvLookup};
use crate::data_files::{get_data_files, process_data_files};
use crate::errors::GenerationError;
use crate::instructions::{load_system_instructions, new_run_instructions};
use crate::models::GenerationRecord;
use crate::progress::{Checkpoint, Stage, ToolClassifier};
use crate::writer_config::PermissionMode;
use crate::stream::ContentBlock;
use crate::workspace::{OutputLocator, RecentDirectoryLocator, build_paper_result, scan_paper_directory};

/// Input of one generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub query: String,
    pub output_dir: Option<PathBuf>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub data_files: Vec<PathBuf>,
    pub cwd: Option<PathBuf>,
    /// Overrides `[agent] permission_mode` from `writer.toml`.
    pub permission_mode: Option<PermissionMode>,
}

impl GenerationRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_data_files(mut self, files: Vec<PathBuf>) -> Self {
        self.data_files = files;
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_permission_mode(mut self, mode: PermissionMode) -> Self {
        self.permission_mode = Some(mode);
        self
    }
}

/// Runs generation requests against an agent.
#[derive(Clone)]
pub struct Generator {
    agent: Arc<dyn GenerationAgent>,
    locator: Option<Arc<dyn OutputLocator>>,
    env: EnvLookup,
}

impl Generator {
    pub fn new(agent: Arc<dyn GenerationAgent>) -> Self {
        Self {
            agent,
            locator: None,
            env: config::process_env(),
        }
    }

    /// Generator backed by the Claude CLI.
    pub fn claude() -> Self {
        Self::new(Arc::new(ClaudeCliAgent::new()))
    }

    /// Replace output discovery. Defaults to [`RecentDirectoryLocator`] with
    /// the configured clock-skew buffer.
    pub fn with_locator(mut self, locator: Arc<dyn OutputLocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Replace the environment used for credential lookup.
    pub fn with_env(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    pub fn generate(&self, request: GenerationRequest) -> BoxStream<'static, GenerationRecord> {
        let agent = Arc::clone(&self.agent);
        let locator = self.locator.clone();
        let env = Arc::clone(&self.env);

        let stream = async_stream::stream! {
            let started = SystemTime::now();
            let run_id = uuid::Uuid::new_v4();
            let span = tracing::info_span!("generate", %run_id);

            // 1. Working directory, environment, credential.
            let work_dir = match request.cwd.clone() {
                Some(dir) => dir,
                None => match std::env::current_dir() {
                    Ok(dir) => dir,
                    Err(e) => {
                        yield GenerationRecord::failed(format!("Failed to resolve working directory: {e}"));
                        return;
                    }
                },
            };
            config::load_env_file(&work_dir);

            let api_key = match config::resolve_api_key(request.api_key.as_deref(), &env) {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!(parent: &span, error = %e, "refusing to start generation");
                    yield GenerationRecord::failed(e.to_string());
                    return;
                }
            };

            let mut config = match Config::new(&work_dir, request.output_dir.as_deref(), request.model.as_deref()) {
                Ok(config) => config,
                Err(e) => {
                    yield GenerationRecord::failed(format!("{e:#}"));
                    return;
                }
            };
            if let Some(mode) = request.permission_mode {
                config.permission_mode = mode;
            }
            for warning in config.writer_toml().validate() {
                tracing::warn!(parent: &span, "{warning}");
            }

            // 2. Output root.
            let output_root = match config.ensure_output_root() {
                Ok(root) => root.to_path_buf(),
                Err(e) => {
                    yield GenerationRecord::failed(e.to_string());
                    return;
                }
            };
            let _lock = RunLock::acquire(&output_root);
            tracing::info!(
                parent: &span,
                work_dir = %config.work_dir.display(),
                output_root = %output_root.display(),
                model = %config.model,
                "starting generation"
            );

            let mut ctx = RunContext::new();

            // 3. Initial update.
            yield ctx.announce("Initializing document generation", Checkpoint::default()).into();

            // 4. Data files are only counted now; they are copied once the
            // output directory is known.
            let data_files = if request.data_files.is_empty() {
                Vec::new()
            } else {
                get_data_files(&config.work_dir, &request.data_files)
            };
            if !data_files.is_empty() {
                yield ctx
                    .announce(
                        format!("Found {} data file(s) to process", data_files.len()),
                        ctx.checkpoint(),
                    )
                    .into();
            }

            // 5. Agent options.
            let system_prompt = new_run_instructions(
                &load_system_instructions(&config.work_dir),
                &config.work_dir,
                &output_root,
            );
            let options = AgentOptions::from_config(&config, system_prompt, Some(api_key));
            let classifier = ToolClassifier::new(config.output_dir_name());

            yield ctx
                .announce("Starting document generation with Claude", ctx.checkpoint())
                .with_detail("model", config.model.as_str())
                .with_detail("query_length", request.query.chars().count())
                .into();

            // 6. Consume the agent stream.
            let mut messages = match agent.query(&request.query, &options).await {
                Ok(messages) => messages,
                Err(e) => {
                    let error = GenerationError::from(e);
                    tracing::error!(parent: &span, error = %error, "agent failed to start");
                    yield GenerationRecord::failed(error.to_string());
                    return;
                }
            };

            while let Some(item) = messages.next().await {
                let message = match item {
                    Ok(message) => message,
                    Err(e) => {
                        let error = GenerationError::from(e);
                        tracing::error!(parent: &span, error = %error, "generation failed");
                        yield GenerationRecord::failed(error.to_string());
                        return;
                    }
                };
                for block in &message.content {
                    let update = match block {
                        ContentBlock::Text { text } => ctx.observe_text(text),
                        ContentBlock::ToolUse { .. } => block
                            .as_tool_event()
                            .and_then(|event| ctx.observe_tool(&event, &classifier)),
                        ContentBlock::Other => None,
                    };
                    if let Some(update) = update {
                        tracing::debug!(
                            parent: &span,
                            stage = %update.stage,
                            percentage = update.percentage,
                            "{}",
                            update.message
                        );
                        yield update.into();
                    }
                }
            }
            drop(messages);

            // 7. Locate the output directory.
            yield ctx
                .announce("Scanning output directory", Checkpoint::new(Stage::Complete, Stage::Complete.floor()))
                .into();

            let locator: Arc<dyn OutputLocator> = match locator {
                Some(locator) => locator,
                None => Arc::new(RecentDirectoryLocator::new(config.discovery_skew)),
            };
            let Some(paper_dir) = locator.locate(&output_root, started) else {
                let error = GenerationError::OutputNotFound;
                tracing::warn!(parent: &span, output_root = %output_root.display(), "{error}");
                yield GenerationRecord::failed(error.to_string());
                return;
            };

            // 8. Stage data files next to the generated document.
            if let Some(manifest) = process_data_files(&data_files, &paper_dir, false) {
                yield ctx
                    .announce(format!("Processed {} file(s)", manifest.len()), ctx.checkpoint())
                    .into();
            }

            // 9-10. Scan and build the result.
            let files = scan_paper_directory(&paper_dir);
            let result = build_paper_result(&paper_dir, files);
            tracing::info!(
                parent: &span,
                status = %result.status,
                paper = %result.paper_name,
                tool_calls = ctx.tool_calls(),
                files_written = ctx.files_written().len(),
                "generation finished"
            );

            // 11. Final update and terminal record.
            yield ctx
                .announce("Document generation complete", Checkpoint::new(Stage::Complete, 100))
                .into();
            yield result.into();
        };

        Box::pin(stream)
    }
}

/// Generate a document with the Claude CLI agent.
pub fn generate_paper(request: GenerationRequest) -> BoxStream<'static, GenerationRecord> {
    Generator::claude().generate(request)
}
