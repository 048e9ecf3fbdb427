use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use scientific_writer::logging::{self, LogFormat};
use scientific_writer::writer_config::PermissionMode;

mod cmd;

#[derive(Parser)]
#[command(name = "scientific-writer")]
#[command(version, about = "Scientific document generation with staged progress tracking")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Working directory (defaults to the current directory)
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Log output format, written to stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a document from a request and report progress
    Generate {
        /// What to write
        query: String,

        /// Output root for paper directories (default: paper_outputs)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Model passed to the agent
        #[arg(long)]
        model: Option<String>,

        /// API key (default: ANTHROPIC_API_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Data file or image to stage into the paper (repeatable)
        #[arg(long = "data", value_name = "FILE")]
        data: Vec<PathBuf>,

        /// Agent permission mode: default, acceptEdits, bypassPermissions, plan
        #[arg(long)]
        permission_mode: Option<PermissionMode>,

        /// Print every record as a JSON line instead of the progress UI
        #[arg(long)]
        json: bool,
    },
    /// List existing paper directories, most recent first
    Papers {
        /// Output root to list (default: paper_outputs)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the result summary of an existing paper directory as JSON
    Scan {
        /// Paper directory to scan
        dir: PathBuf,
    },
    /// Start an interactive writing session
    Chat {
        /// Output root for paper directories (default: paper_outputs)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Model passed to the agent
        #[arg(long)]
        model: Option<String>,

        /// Agent permission mode: default, acceptEdits, bypassPermissions, plan
        #[arg(long)]
        permission_mode: Option<PermissionMode>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_format);

    let work_dir = match cli.cwd.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match cli.command {
        Commands::Generate {
            query,
            output_dir,
            model,
            api_key,
            data,
            permission_mode,
            json,
        } => {
            let args = cmd::GenerateArgs {
                query,
                output_dir,
                model,
                api_key,
                data,
                permission_mode,
                json,
            };
            cmd::cmd_generate(&work_dir, args, cli.verbose).await?;
        }
        Commands::Papers { output_dir } => cmd::cmd_papers(&work_dir, output_dir.as_deref())?,
        Commands::Scan { dir } => cmd::cmd_scan(&work_dir, &dir)?,
        Commands::Chat {
            output_dir,
            model,
            permission_mode,
        } => cmd::cmd_chat(&work_dir, output_dir.as_deref(), model.as_deref(), permission_mode).await?,
    }

    Ok(())
}
