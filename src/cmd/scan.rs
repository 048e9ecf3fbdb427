//! Result summary for an existing output directory, `scientific-writer scan`.

use anyhow::{Context, Result};
use std::path::Path;

use scientific_writer::workspace::{build_paper_result, scan_paper_directory};

pub fn cmd_scan(work_dir: &Path, dir: &Path) -> Result<()> {
    let paper_dir = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        work_dir.join(dir)
    };
    if !paper_dir.is_dir() {
        anyhow::bail!("Not a directory: {}", paper_dir.display());
    }
    let paper_dir = paper_dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", paper_dir.display()))?;

    let result = build_paper_result(&paper_dir, scan_paper_directory(&paper_dir));
    let json = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
    println!("{}", json);
    Ok(())
}
