//! One-shot document generation, `scientific-writer generate`.

use anyhow::{Context, Result};
use futures::StreamExt;
use std::path::{Path, PathBuf};

use scientific_writer::generate::{GenerationRequest, Generator};
use scientific_writer::models::{GenerationRecord, ResultStatus};
use scientific_writer::ui::GenerationUI;
use scientific_writer::writer_config::PermissionMode;

pub struct GenerateArgs {
    pub query: String,
    pub output_dir: Option<PathBuf>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub data: Vec<PathBuf>,
    pub permission_mode: Option<PermissionMode>,
    pub json: bool,
}

impl GenerateArgs {
    fn into_request(self, work_dir: &Path) -> GenerationRequest {
        let mut request = GenerationRequest::new(self.query)
            .with_cwd(work_dir)
            .with_data_files(self.data);
        if let Some(dir) = self.output_dir {
            request = request.with_output_dir(dir);
        }
        if let Some(model) = self.model {
            request = request.with_model(model);
        }
        if let Some(key) = self.api_key {
            request = request.with_api_key(key);
        }
        if let Some(mode) = self.permission_mode {
            request = request.with_permission_mode(mode);
        }
        request
    }
}

pub async fn cmd_generate(work_dir: &Path, args: GenerateArgs, verbose: bool) -> Result<()> {
    let json = args.json;
    let request = args.into_request(work_dir);
    let mut records = Generator::claude().generate(request);

    let ui = (!json).then(|| GenerationUI::new(verbose));
    let mut final_status = None;

    while let Some(record) = records.next().await {
        if json {
            let line = serde_json::to_string(&record).context("Failed to serialize generation record")?;
            println!("{}", line);
        }

        match &record {
            GenerationRecord::Progress(update) => {
                if let Some(ui) = &ui {
                    ui.show_update(update);
                }
            }
            GenerationRecord::Result(result) => {
                if let Some(ui) = &ui {
                    ui.show_result(result);
                }
                final_status = Some(result.status);
            }
        }
    }

    match final_status {
        Some(ResultStatus::Failed) => anyhow::bail!("Document generation failed"),
        Some(_) => Ok(()),
        None => anyhow::bail!("Generation ended without a result"),
    }
}
