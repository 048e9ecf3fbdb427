//! Listing of existing output directories, `scientific-writer papers`.

use anyhow::Result;
use chrono::{DateTime, Local};
use console::style;
use std::path::Path;

use scientific_writer::config::Config;
use scientific_writer::ui::icons::{FOLDER, SEARCH};
use scientific_writer::workspace::{find_existing_papers, metadata::topic_from_dir_name};

pub fn cmd_papers(work_dir: &Path, output_dir: Option<&Path>) -> Result<()> {
    let config = Config::new(work_dir, output_dir, None)?;
    let papers = find_existing_papers(&config.output_root);

    if papers.is_empty() {
        println!("{}No papers found in {}", SEARCH, config.output_root.display());
        return Ok(());
    }

    println!();
    println!("{}", style(format!("Papers in {}", config.output_root.display())).bold());
    println!();
    for paper in &papers {
        let modified: DateTime<Local> = paper.modified.into();
        println!(
            "  {}{}  {}  {}",
            FOLDER,
            style(&paper.name).cyan(),
            style(modified.format("%Y-%m-%d %H:%M")).dim(),
            topic_from_dir_name(&paper.name)
        );
    }
    println!();
    println!("{} paper(s)", papers.len());

    Ok(())
}
