//! Output directories on disk: scanning, metadata, and discovery.

mod discovery;
pub mod metadata;
mod scan;

use std::path::Path;
use std::time::SystemTime;

pub use discovery::{
    OutputLocator, PaperEntry, RecentDirectoryLocator, detect_paper_reference, find_existing_papers,
    is_new_paper_request, recently_modified_paper,
};
pub(crate) use scan::list_files;
pub use scan::{BIBLIOGRAPHY_FILE, scan_paper_directory};

use crate::models::{Citations, GenerationResult, PaperFiles, PaperMetadata, ResultStatus};

fn creation_time(path: &Path) -> Option<SystemTime> {
    let meta = std::fs::metadata(path).ok()?;
    meta.created().or_else(|_| meta.modified()).ok()
}

/// Derive the run outcome from the artifacts present.
pub fn result_status(files: &PaperFiles) -> ResultStatus {
    if files.pdf_final.is_some() {
        ResultStatus::Success
    } else if files.tex_final.is_some() || !files.tex_drafts.is_empty() {
        ResultStatus::Partial
    } else {
        ResultStatus::Failed
    }
}

/// Assemble the terminal result for a scanned output directory.
///
/// Metadata comes from the final LaTeX source, or the first draft when no
/// final source exists. Extraction failures leave fields at their defaults.
pub fn build_paper_result(paper_dir: &Path, files: PaperFiles) -> GenerationResult {
    let paper_name = paper_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let source = files
        .tex_final
        .as_deref()
        .or_else(|| files.tex_drafts.first().map(String::as_str))
        .map(Path::new);

    let mut paper_metadata = PaperMetadata {
        title: metadata::extract_title_from_tex(source),
        topic: metadata::topic_from_dir_name(&paper_name),
        word_count: metadata::count_words_in_tex(source),
        ..PaperMetadata::default()
    };
    if let Some(created) = creation_time(paper_dir) {
        paper_metadata.created_at = chrono::DateTime::<chrono::Utc>::from(created)
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    }

    let bibliography = files.bibliography.as_deref().map(Path::new);
    let citations = Citations {
        count: metadata::count_citations_in_bib(bibliography),
        style: metadata::citation_style(source),
        file: files.bibliography.clone(),
    };

    let status = result_status(&files);
    GenerationResult {
        status,
        paper_directory: paper_dir.to_string_lossy().into_owned(),
        paper_name,
        metadata: paper_metadata,
        figures_count: files.figures.len(),
        compilation_success: files.pdf_final.is_some(),
        citations,
        files,
        errors: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_result_status_rules() {
        let mut files = PaperFiles::default();
        assert_eq!(result_status(&files), ResultStatus::Failed);

        files.tex_drafts.push("drafts/v1_draft.tex".into());
        assert_eq!(result_status(&files), ResultStatus::Partial);

        files.tex_final = Some("final/paper.tex".into());
        assert_eq!(result_status(&files), ResultStatus::Partial);

        files.pdf_final = Some("final/paper.pdf".into());
        assert_eq!(result_status(&files), ResultStatus::Success);
    }

    #[test]
    fn test_build_paper_result_success() {
        let root = tempdir().unwrap();
        let paper = root.path().join("20250101_120000_crispr_base_editing");
        write(
            &paper.join("final/paper.tex"),
            "\\title{CRISPR Review}\n\\begin{document}\nBase editing works.\n\\bibliographystyle{plain}\n\\end{document}\n",
        );
        write(&paper.join("final/paper.pdf"), "%PDF");
        write(&paper.join("references/references.bib"), "@article{a,}\n@article{b,}\n");
        write(&paper.join("figures/fig1.png"), "png");

        let result = build_paper_result(&paper, scan_paper_directory(&paper));
        assert_eq!(result.status, ResultStatus::Success);
        assert!(result.compilation_success);
        assert_eq!(result.paper_name, "20250101_120000_crispr_base_editing");
        assert_eq!(result.metadata.title.as_deref(), Some("CRISPR Review"));
        assert_eq!(result.metadata.topic, "crispr base editing");
        assert_eq!(result.metadata.word_count, Some(3));
        assert!(result.metadata.created_at.ends_with('Z'));
        assert_eq!(result.citations.count, 2);
        assert_eq!(result.citations.style, "plain");
        assert_eq!(result.figures_count, 1);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_build_paper_result_uses_first_draft() {
        let root = tempdir().unwrap();
        let paper = root.path().join("scratch");
        write(&paper.join("drafts/v1_draft.tex"), "\\title{Draft One}\nSome words here.\n");

        let result = build_paper_result(&paper, scan_paper_directory(&paper));
        assert_eq!(result.status, ResultStatus::Partial);
        assert!(!result.compilation_success);
        assert_eq!(result.metadata.title.as_deref(), Some("Draft One"));
        assert_eq!(result.metadata.topic, "");
        assert_eq!(result.citations.count, 0);
        assert_eq!(result.citations.style, metadata::DEFAULT_CITATION_STYLE);
    }

    #[test]
    fn test_build_paper_result_empty_directory() {
        let root = tempdir().unwrap();
        let result = build_paper_result(root.path(), scan_paper_directory(root.path()));
        assert_eq!(result.status, ResultStatus::Failed);
        assert_eq!(result.metadata.word_count, None);
    }
}
