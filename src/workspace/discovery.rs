//! Locating output directories: the one a run just produced, and the ones a
//! user refers to in an interactive session.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use super::metadata::topic_from_dir_name;

const CONTINUATION_KEYWORDS: &[&str] = &[
    "continue",
    "update",
    "edit",
    "revise",
    "modify",
    "change",
    "add to",
    "fix",
    "improve",
    "review",
    "the paper",
    "this paper",
    "my paper",
    "current paper",
    "previous paper",
    "last paper",
    "poster",
    "the poster",
    "my poster",
    "compile",
    "generate pdf",
];

const SEARCH_KEYWORDS: &[&str] = &[
    "look for",
    "find",
    "search for",
    "where is",
    "which paper",
    "show me",
    "open",
    "locate",
    "get",
];

const NEW_PAPER_KEYWORDS: &[&str] = &[
    "new paper",
    "start fresh",
    "start afresh",
    "create new",
    "different paper",
    "another paper",
    "write a new",
];

/// An existing output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperEntry {
    pub path: PathBuf,
    pub name: String,
    pub modified: SystemTime,
}

fn modified_time(path: &Path) -> std::io::Result<SystemTime> {
    std::fs::metadata(path)?.modified()
}

/// Subdirectories of `output_root` with their modification times. Entries whose
/// metadata cannot be read are skipped.
fn subdirectories(output_root: &Path) -> std::io::Result<Vec<PaperEntry>> {
    let mut papers = Vec::new();
    for entry in std::fs::read_dir(output_root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Ok(modified) = modified_time(&path) else {
            continue;
        };
        papers.push(PaperEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            modified,
        });
    }
    Ok(papers)
}

/// All output directories under `output_root`, most recently modified first.
pub fn find_existing_papers(output_root: &Path) -> Vec<PaperEntry> {
    let mut papers = match subdirectories(output_root) {
        Ok(papers) => papers,
        Err(e) => {
            if output_root.exists() {
                tracing::warn!(path = %output_root.display(), error = %e, "failed to list output directories");
            }
            return Vec::new();
        }
    };
    papers.sort_by(|a, b| b.modified.cmp(&a.modified));
    papers
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Whether the user explicitly asks to start a fresh paper.
pub fn is_new_paper_request(user_input: &str) -> bool {
    contains_any(&user_input.to_lowercase(), NEW_PAPER_KEYWORDS)
}

/// Guess which existing paper, if any, `user_input` is about.
///
/// `papers` must be ordered most recent first, as returned by
/// [`find_existing_papers`].
pub fn detect_paper_reference(user_input: &str, papers: &[PaperEntry]) -> Option<PathBuf> {
    if papers.is_empty() {
        return None;
    }

    if is_new_paper_request(user_input) {
        return None;
    }
    let input = user_input.to_lowercase();

    let wants_continuation = contains_any(&input, CONTINUATION_KEYWORDS);
    let wants_search = contains_any(&input, SEARCH_KEYWORDS);

    let mut best: Option<(&PaperEntry, usize)> = None;
    for paper in papers {
        let topic = topic_from_dir_name(&paper.name.to_lowercase());
        if topic.is_empty() {
            continue;
        }
        let matches = topic
            .split_whitespace()
            .filter(|word| word.chars().count() > 3 && input.contains(word))
            .count();

        if matches > best.map(|(_, score)| score).unwrap_or(0) {
            best = Some((paper, matches));
        }
        if matches >= 2 && (wants_search || wants_continuation) {
            return Some(paper.path.clone());
        }
    }

    if wants_search && let Some((paper, _)) = best {
        return Some(paper.path.clone());
    }
    if wants_continuation {
        return Some(papers[0].path.clone());
    }
    None
}

/// The most recently modified output directory, if it changed within
/// `window` of `now`. Used by the interactive session to pick up a directory
/// the agent just created.
pub fn recently_modified_paper(output_root: &Path, window: Duration, now: SystemTime) -> Option<PathBuf> {
    let newest = find_existing_papers(output_root).into_iter().next()?;
    let age = now.duration_since(newest.modified).unwrap_or(Duration::ZERO);
    (age < window).then_some(newest.path)
}

/// Finds the directory a generation run produced.
pub trait OutputLocator: Send + Sync {
    /// The output directory produced by a run that started at `started`, or
    /// `None` when there is no such directory.
    fn locate(&self, output_root: &Path, started: SystemTime) -> Option<PathBuf>;
}

/// Picks the most recently modified subdirectory modified no earlier than
/// the run start minus a clock-skew buffer. Listing failures count as
/// "not found".
#[derive(Debug, Clone, Copy)]
pub struct RecentDirectoryLocator {
    pub skew: Duration,
}

impl RecentDirectoryLocator {
    pub fn new(skew: Duration) -> Self {
        Self { skew }
    }
}

impl Default for RecentDirectoryLocator {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl OutputLocator for RecentDirectoryLocator {
    fn locate(&self, output_root: &Path, started: SystemTime) -> Option<PathBuf> {
        let threshold = started.checked_sub(self.skew).unwrap_or(SystemTime::UNIX_EPOCH);
        let papers = match subdirectories(output_root) {
            Ok(papers) => papers,
            Err(e) => {
                tracing::debug!(path = %output_root.display(), error = %e, "output discovery failed");
                return None;
            }
        };
        papers
            .into_iter()
            .filter(|paper| paper.modified >= threshold)
            .max_by_key(|paper| paper.modified)
            .map(|paper| paper.path)
    }
}
