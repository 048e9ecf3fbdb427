use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::models::PaperFiles;

/// Conventional bibliography file inside `references/`.
pub const BIBLIOGRAPHY_FILE: &str = "references.bib";

/// Regular files directly inside `dir`, sorted by name. Missing or
/// unreadable directories yield an empty list.
pub(crate) fn list_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Collect the categorized artifacts of one paper directory.
///
/// Layout: `final/` and `drafts/` hold rendered PDFs and LaTeX sources,
/// `references/` the bibliography, `figures/` and `data/` supporting files,
/// plus `progress.md` and `SUMMARY.md` at the top level.
pub fn scan_paper_directory(paper_dir: &Path) -> PaperFiles {
    let mut files = PaperFiles::default();
    if !paper_dir.is_dir() {
        return files;
    }

    let final_files = list_files(&paper_dir.join("final"));
    files.pdf_final = final_files.iter().find(|p| has_extension(p, "pdf")).map(|p| display(p));
    files.tex_final = final_files.iter().find(|p| has_extension(p, "tex")).map(|p| display(p));

    for file in list_files(&paper_dir.join("drafts")) {
        if has_extension(&file, "pdf") {
            files.pdf_drafts.push(display(&file));
        } else if has_extension(&file, "tex") {
            files.tex_drafts.push(display(&file));
        }
    }

    let references_dir = paper_dir.join("references");
    let conventional = references_dir.join(BIBLIOGRAPHY_FILE);
    files.bibliography = if conventional.is_file() {
        Some(display(&conventional))
    } else {
        list_files(&references_dir)
            .into_iter()
            .find(|p| has_extension(p, "bib"))
            .map(|p| display(&p))
    };

    files.figures = list_files(&paper_dir.join("figures")).iter().map(|p| display(p)).collect();
    files.data = list_files(&paper_dir.join("data")).iter().map(|p| display(p)).collect();

    let progress = paper_dir.join("progress.md");
    if progress.is_file() {
        files.progress_log = Some(display(&progress));
    }
    let summary = paper_dir.join("SUMMARY.md");
    if summary.is_file() {
        files.summary = Some(display(&summary));
    }

    files
}
