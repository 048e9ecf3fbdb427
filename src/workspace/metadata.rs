//! Best-effort metadata extraction from LaTeX and BibTeX files.
//!
//! Every function degrades to a default value when the file is missing or
//! unreadable; none of them fail a run.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static LATEX_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[a-zA-Z]+(\[.*?\])?(\{.*?\})?").unwrap());

static LATEX_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%.*").unwrap());

static LATEX_SPECIAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[{}$\\]").unwrap());

static TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\title\s*\{([^}]+)\}").unwrap());

static BIB_ENTRY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@\w+\s*\{").unwrap());

static BIBLIOGRAPHY_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\bibliographystyle\s*\{([^}]+)\}").unwrap());

static BIBLATEX_STYLE: LazyLock<Regex> =
    LazyLock::new(|| {
        Regex::new(r"\\usepackage\s*\[[^\]]*\bstyle\s*=\s*([A-Za-z0-9_-]+)[^\]]*\]\s*\{biblatex\}")
            .unwrap()
    });

pub const DEFAULT_CITATION_STYLE: &str = "BibTeX";

fn read(path: Option<&Path>) -> Option<String> {
    let path = path?;
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "metadata source unreadable");
            None
        }
    }
}

/// Title from `\title{...}` with nested LaTeX commands stripped.
pub fn extract_title_from_tex(tex_file: Option<&Path>) -> Option<String> {
    let content = read(tex_file)?;
    let raw = TITLE.captures(&content)?.get(1)?.as_str();
    let title = LATEX_COMMAND.replace_all(raw, "");
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Approximate word count of a LaTeX source: commands, comments and special
/// characters are removed before splitting on whitespace.
pub fn count_words_in_tex(tex_file: Option<&Path>) -> Option<usize> {
    let content = read(tex_file)?;
    let content = LATEX_COMMAND.replace_all(&content, "");
    let content = LATEX_COMMENT.replace_all(&content, "");
    let content = LATEX_SPECIAL.replace_all(&content, "");
    Some(content.split_whitespace().count())
}

/// Number of `@type{` entries in a BibTeX file.
pub fn count_citations_in_bib(bib_file: Option<&Path>) -> usize {
    read(bib_file)
        .map(|content| BIB_ENTRY.find_iter(&content).count())
        .unwrap_or(0)
}

/// Citation style declared by the source document, or [`DEFAULT_CITATION_STYLE`].
pub fn citation_style(tex_file: Option<&Path>) -> String {
    read(tex_file)
        .and_then(|content| {
            BIBLIOGRAPHY_STYLE
                .captures(&content)
                .or_else(|| BIBLATEX_STYLE.captures(&content))
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
        })
        .filter(|style| !style.is_empty())
        .unwrap_or_else(|| DEFAULT_CITATION_STYLE.to_string())
}

/// Topic encoded in a `YYYYMMDD_HHMMSS_topic_words` directory name.
pub fn topic_from_dir_name(name: &str) -> String {
    let mut parts = name.splitn(3, '_');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(_), Some(topic)) => topic.replace('_', " "),
        _ => String::new(),
    }
}
