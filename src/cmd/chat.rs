//! Interactive writing session, `scientific-writer chat`.
//!
//! Each prompt is sent to the agent as its own query. The session tracks the
//! paper currently being worked on and pins later prompts to it until the
//! user asks for a new paper.

use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use futures::StreamExt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use scientific_writer::agent::{AgentOptions, ClaudeCliAgent, GenerationAgent};
use scientific_writer::config::{Config, load_env_file, process_env, resolve_api_key};
use scientific_writer::data_files::{DataManifest, data_context_message, get_data_files, process_data_files};
use scientific_writer::instructions::{continuation_prompt, load_system_instructions, session_instructions};
use scientific_writer::stream::ContentBlock;
use scientific_writer::ui::icons::{CHECK, DOCUMENT, FOLDER, PACKAGE, SEARCH, WARN};
use scientific_writer::workspace::{
    detect_paper_reference, find_existing_papers, is_new_paper_request, recently_modified_paper,
};
use scientific_writer::writer_config::PermissionMode;

/// How recently a directory must have changed to count as created by the
/// last prompt.
const NEW_PAPER_WINDOW: Duration = Duration::from_secs(10);

pub async fn cmd_chat(
    work_dir: &Path,
    output_dir: Option<&Path>,
    model: Option<&str>,
    permission_mode: Option<PermissionMode>,
) -> Result<()> {
    load_env_file(work_dir);
    let api_key = resolve_api_key(None, &process_env())?;

    let mut config = Config::new(work_dir, output_dir, model)?;
    if let Some(mode) = permission_mode {
        config.permission_mode = mode;
    }
    let output_root = config.ensure_output_root()?.to_path_buf();
    let system_prompt = session_instructions(&load_system_instructions(&config.work_dir));
    let options = AgentOptions::from_config(&config, system_prompt, Some(api_key));
    let agent = ClaudeCliAgent::new();

    print_welcome(&output_root);

    let mut current_paper: Option<PathBuf> = None;

    loop {
        let line: String = match Input::<String>::new().with_prompt(">").allow_empty(true).interact_text() {
            Ok(line) => line,
            Err(e) => {
                tracing::debug!(error = %e, "prompt closed");
                println!("\nExiting...");
                break;
            }
        };
        let user_input = line.trim();

        match user_input.to_lowercase().as_str() {
            "" => continue,
            "exit" | "quit" => {
                println!("\nThank you for using Scientific Writer. Goodbye!");
                break;
            }
            "help" => {
                print_help();
                continue;
            }
            _ => {}
        }

        let new_paper = is_new_paper_request(user_input);
        if !new_paper {
            let papers = find_existing_papers(&output_root);
            if let Some(detected) = detect_paper_reference(user_input, &papers) {
                if current_paper.as_ref() == Some(&detected) {
                    println!("{}Continuing with: {}\n", FOLDER, dir_name(&detected));
                } else {
                    println!("\n{}Detected reference to existing paper: {}", SEARCH, dir_name(&detected));
                    println!("{}Working on: {}\n", FOLDER, detected.display());
                    current_paper = Some(detected);
                }
            }
        }

        let mut data_context = String::new();
        let pending = get_data_files(&config.work_dir, &[]);
        match (&current_paper, new_paper) {
            (Some(paper), false) if !pending.is_empty() => {
                println!("{}Found {} file(s) in data folder. Processing...", PACKAGE, pending.len());
                let manifest = process_data_files(&pending, paper, true);
                report_staged(manifest.as_ref());
                data_context = data_context_message(manifest.as_ref());
            }
            (None, _) if !pending.is_empty() => {
                println!("\n{}Found {} file(s) in data folder.", PACKAGE, pending.len());
                println!("   They will be processed once the paper directory is created.\n");
            }
            _ => {}
        }

        let prompt = if new_paper {
            current_paper = None;
            println!("{}Starting a new paper...\n", DOCUMENT);
            user_input.to_string()
        } else if let Some(paper) = &current_paper {
            continuation_prompt(paper, &data_context, user_input)
        } else {
            user_input.to_string()
        };

        println!();
        if let Err(e) = stream_response(&agent, &prompt, &options).await {
            eprintln!("\n{} {:#}", style("Error:").red().bold(), e);
            println!("Please try again or type 'exit' to quit.");
            continue;
        }
        println!();

        if (current_paper.is_none() || new_paper)
            && let Some(created) = recently_modified_paper(&output_root, NEW_PAPER_WINDOW, SystemTime::now())
        {
            println!("\n{}Working on: {}", FOLDER, dir_name(&created));
            let remaining = get_data_files(&config.work_dir, &[]);
            if !remaining.is_empty() {
                println!("\n{}Processing {} data file(s)...", PACKAGE, remaining.len());
                report_staged(process_data_files(&remaining, &created, true).as_ref());
            }
            current_paper = Some(created);
        }
    }

    Ok(())
}

/// Print the agent's text blocks as they arrive.
async fn stream_response(agent: &ClaudeCliAgent, prompt: &str, options: &AgentOptions) -> Result<()> {
    let mut messages = agent.query(prompt, options).await?;
    let mut stdout = std::io::stdout();
    while let Some(message) = messages.next().await {
        let message = message.context("Agent stream failed")?;
        for block in &message.content {
            if let ContentBlock::Text { text } = block {
                write!(stdout, "{}", text).ok();
                stdout.flush().ok();
            }
        }
    }
    Ok(())
}

fn report_staged(manifest: Option<&DataManifest>) {
    for line in staged_report_lines(manifest) {
        println!("{}", line);
    }
}

fn staged_report_lines(manifest: Option<&DataManifest>) -> Vec<String> {
    let Some(manifest) = manifest else {
        return Vec::new();
    };
    let mut lines = Vec::new();
    let data = manifest.data().count();
    let images = manifest.images().count();
    if data > 0 {
        lines.push(format!("   {}Copied {} data file(s) to data/", CHECK, data));
    }
    if images > 0 {
        lines.push(format!("   {}Copied {} image(s) to figures/", CHECK, images));
    }

    let retained: Vec<&str> = manifest.retained().map(|f| f.name.as_str()).collect();
    let deleted = manifest.len() - retained.len();
    if deleted > 0 {
        lines.push(format!("   {}Deleted {} original file(s) from data folder", CHECK, deleted));
    }
    if !retained.is_empty() {
        lines.push(format!(
            "   {}Could not remove from data folder: {}",
            WARN,
            retained.join(", ")
        ));
    }
    lines.push(String::new());
    lines
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_welcome(output_root: &Path) {
    let rule = "=".repeat(70);
    println!("{}", rule);
    println!("{}", style("Scientific Writer").bold());
    println!("{}", rule);
    println!("\nI can help you with:");
    println!("  • Writing scientific papers (IMRaD structure)");
    println!("  • Literature reviews and citation management");
    println!("  • Peer review feedback");
    println!("  • Real-time research lookup");
    println!("\nAll outputs are saved to: {}", output_root.display());
    println!("\nData files:");
    println!("  • Place files in the 'data/' folder to include them in your paper");
    println!("  • Images are copied to the paper's figures/ folder, other files to data/");
    println!("  • Original files are deleted after copying");
    println!("\nType 'exit' or 'quit' to end the session, 'help' for usage tips.");
    println!("{}\n", rule);
}

fn print_help() {
    let rule = "=".repeat(70);
    println!("\n{}", rule);
    println!("{}", style("Help").bold());
    println!("{}", rule);
    println!("\nExample requests:");
    println!("  'Create a NeurIPS paper on transformer attention mechanisms'");
    println!("  'Write a literature review on CRISPR gene editing'");
    println!("  'Format 20 citations in IEEE style'");
    println!("\nOutput layout (<output>/<timestamp>_<description>/):");
    println!("  drafts/      working versions");
    println!("  final/       completed documents");
    println!("  references/  bibliography files");
    println!("  figures/     images and charts");
    println!("  data/        data files for the paper");
    println!("  progress.md  progress log");
    println!("\nPaper detection:");
    println!("  • 'continue', 'update', 'edit' or 'the paper' resume the most recent paper");
    println!("  • 'find', 'look for' or 'show me' plus a topic search existing papers");
    println!("  • 'new paper' or 'start fresh' begins a new one");
    println!("{}", rule);
}
