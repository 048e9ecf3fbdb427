//! Classification of individual agent tool invocations.

use super::{Checkpoint, Stage, StageSignal};
use crate::stream::{ToolEvent, file_name, truncate_str};

const BIBLIOGRAPHY_EXTENSIONS: &[&str] = &["bib"];
const SOURCE_EXTENSIONS: &[&str] = &["tex"];
const MARKUP_EXTENSIONS: &[&str] = &["md"];
const DATA_EXTENSIONS: &[&str] = &["pdf", "csv", "json"];

const PDF_COMPILERS: &[&str] = &["pdflatex", "latexmk", "xelatex"];
const BIB_PROCESSORS: &[&str] = &["bibtex", "biber"];

/// Percentage at which a source file counts as the main manuscript draft.
const SOURCE_DRAFT_FLOOR: u8 = 50;

/// Maps tool events onto stage signals using file extensions and command text.
#[derive(Debug, Clone)]
pub struct ToolClassifier {
    output_dir_name: String,
}

impl Default for ToolClassifier {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_OUTPUT_DIR)
    }
}

impl ToolClassifier {
    /// `output_dir_name` is the final component of the output root; a shell
    /// `mkdir` mentioning it marks the run as initializing its workspace.
    pub fn new(output_dir_name: impl Into<String>) -> Self {
        Self {
            output_dir_name: output_dir_name.into(),
        }
    }

    /// Returns `None` for tools that carry no progress information.
    pub fn classify(&self, event: &ToolEvent, current: Checkpoint) -> Option<StageSignal> {
        let tool = event.tool_name.to_lowercase();
        let path = event.file_path().unwrap_or("");
        let name = file_name(path);

        let at = |stage: Stage, floor: u8, message: String| {
            Some(StageSignal::new(stage, current.percentage.max(floor), message))
        };
        let stay = |message: String| Some(StageSignal::new(current.stage, current.percentage, message));

        match tool.as_str() {
            "read" => {
                if has_extension(path, BIBLIOGRAPHY_EXTENSIONS) {
                    at(Stage::Writing, 35, format!("Reading bibliography: {}", name))
                } else if has_extension(path, SOURCE_EXTENSIONS) {
                    at(Stage::Compilation, 75, format!("Reading LaTeX file: {}", name))
                } else if has_extension(path, DATA_EXTENSIONS) {
                    at(Stage::Research, 15, format!("Reading data file: {}", name))
                } else {
                    stay(format!("Reading: {}", name))
                }
            }
            "write" => {
                if has_extension(path, BIBLIOGRAPHY_EXTENSIONS) {
                    at(Stage::Writing, 40, format!("Creating bibliography: {}", name))
                } else if has_extension(path, SOURCE_EXTENSIONS) {
                    if name.to_lowercase().contains("main") || current.percentage < SOURCE_DRAFT_FLOOR {
                        at(
                            Stage::Writing,
                            SOURCE_DRAFT_FLOOR,
                            format!("Writing LaTeX document: {}", name),
                        )
                    } else {
                        at(Stage::Compilation, 75, format!("Updating LaTeX: {}", name))
                    }
                } else if has_extension(path, MARKUP_EXTENSIONS) {
                    at(Stage::Writing, 35, format!("Writing document: {}", name))
                } else {
                    stay(format!("Writing: {}", name))
                }
            }
            "edit" => {
                if has_extension(path, SOURCE_EXTENSIONS) {
                    at(Stage::Writing, SOURCE_DRAFT_FLOOR, format!("Editing LaTeX: {}", name))
                } else {
                    stay(format!("Editing: {}", name))
                }
            }
            "bash" | "shell" => self.classify_command(event.command(), current),
            t if t.contains("research") || t.contains("lookup") => {
                let query = truncate_str(event.query(), 40);
                at(Stage::Research, 20, format!("Researching: {}...", query))
            }
            _ => None,
        }
    }

    fn classify_command(&self, command: &str, current: Checkpoint) -> Option<StageSignal> {
        let lower = command.to_lowercase();
        let signal = if PDF_COMPILERS.iter().any(|c| lower.contains(c)) {
            StageSignal::new(Stage::Compilation, current.percentage.max(80), "Compiling LaTeX to PDF")
        } else if BIB_PROCESSORS.iter().any(|c| lower.contains(c)) {
            StageSignal::new(
                Stage::Compilation,
                current.percentage.max(85),
                "Processing bibliography with BibTeX",
            )
        } else if lower.contains("mkdir") && lower.contains(&self.output_dir_name.to_lowercase()) {
            StageSignal::new(Stage::Initialization, current.percentage.max(2), "Creating output directory")
        } else if lower.contains("cp ") || lower.contains("mv ") {
            StageSignal::new(Stage::Complete, current.percentage.max(97), "Organizing output files")
        } else {
            StageSignal::new(
                current.stage,
                current.percentage,
                format!("Running: {}...", truncate_str(command, 50)),
            )
        };
        Some(signal)
    }
}

fn has_extension(path: &str, extensions: &[&str]) -> bool {
    std::path::Path::new(path)
        .extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            extensions.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classifier() -> ToolClassifier {
        ToolClassifier::new("paper_outputs")
    }

    fn file_event(tool: &str, path: &str) -> ToolEvent {
        ToolEvent::new(tool, json!({ "file_path": path }))
    }

    fn bash(command: &str) -> ToolEvent {
        ToolEvent::new("Bash", json!({ "command": command }))
    }

    #[test]
    fn bibliography_never_classified_before_writing() {
        let starts = [
            Checkpoint::default(),
            Checkpoint::new(Stage::Research, 25),
            Checkpoint::new(Stage::Compilation, 80),
        ];
        for current in starts {
            for tool in ["Read", "Write", "READ"] {
                let signal = classifier()
                    .classify(&file_event(tool, "/p/references/references.bib"), current)
                    .expect("bibliography signal");
                assert!(signal.stage >= Stage::Writing);
                assert!(signal.percentage >= current.percentage);
            }
        }
    }

    #[test]
    fn read_dispatches_on_extension() {
        let c = classifier();
        let start = Checkpoint::default();

        let tex = c.classify(&file_event("Read", "/p/drafts/v1.tex"), start).unwrap();
        assert_eq!(tex.stage, Stage::Compilation);
        assert_eq!(tex.message, "Reading LaTeX file: v1.tex");

        let csv = c.classify(&file_event("Read", "/data/results.csv"), start).unwrap();
        assert_eq!(csv.stage, Stage::Research);
        assert_eq!(csv.percentage, 15);

        let other = c
            .classify(&file_event("Read", "/p/notes.txt"), Checkpoint::new(Stage::Planning, 8))
            .unwrap();
        assert_eq!(other.stage, Stage::Planning);
        assert_eq!(other.percentage, 8);
        assert_eq!(other.message, "Reading: notes.txt");
    }

    #[test]
    fn write_source_is_writing_while_drafting() {
        let current = Checkpoint::new(Stage::Writing, 45);
        let signal = classifier()
            .classify(&file_event("Write", "draft.tex"), current)
            .unwrap();
        assert_eq!(signal.stage, Stage::Writing);
        assert_eq!(signal.percentage, 50);
        assert_eq!(signal.message, "Writing LaTeX document: draft.tex");
    }

    #[test]
    fn write_source_after_drafting_is_an_update() {
        let current = Checkpoint::new(Stage::Writing, 60);
        let signal = classifier()
            .classify(&file_event("Write", "/p/drafts/v2_draft.tex"), current)
            .unwrap();
        assert_eq!(signal.stage, Stage::Compilation);
        assert_eq!(signal.percentage, 75);
        assert_eq!(signal.message, "Updating LaTeX: v2_draft.tex");

        let main = classifier()
            .classify(&file_event("Write", "/p/final/main.tex"), current)
            .unwrap();
        assert_eq!(main.stage, Stage::Writing);
        assert_eq!(main.percentage, 60);
    }

    #[test]
    fn write_markdown_and_other_files() {
        let c = classifier();
        let md = c
            .classify(&file_event("Write", "/p/progress.md"), Checkpoint::default())
            .unwrap();
        assert_eq!(md.stage, Stage::Writing);

        let current = Checkpoint::new(Stage::Research, 20);
        let png = c.classify(&file_event("Write", "/p/figures/fig1.png"), current).unwrap();
        assert_eq!(png.checkpoint(), current);
        assert_eq!(png.message, "Writing: fig1.png");
    }

    #[test]
    fn edit_source_is_writing() {
        let signal = classifier()
            .classify(&file_event("Edit", "/p/drafts/v1.tex"), Checkpoint::default())
            .unwrap();
        assert_eq!(signal.stage, Stage::Writing);
        assert_eq!(signal.message, "Editing LaTeX: v1.tex");
    }

    #[test]
    fn pdf_compilation_command_meets_floor() {
        for cmd in ["pdflatex -interaction=nonstopmode main.tex", "cd drafts && latexmk -pdf v1.tex"] {
            for current in [Checkpoint::default(), Checkpoint::new(Stage::Complete, 96)] {
                let signal = classifier().classify(&bash(cmd), current).unwrap();
                assert_eq!(signal.stage, Stage::Compilation);
                assert!(signal.percentage >= 80);
                assert!(signal.percentage >= current.percentage);
            }
        }
    }

    #[test]
    fn bibtex_command_has_higher_floor() {
        let signal = classifier().classify(&bash("bibtex main"), Checkpoint::default()).unwrap();
        assert_eq!(signal.stage, Stage::Compilation);
        assert_eq!(signal.percentage, 85);
    }

    #[test]
    fn mkdir_of_output_folder_is_initialization() {
        let signal = classifier()
            .classify(
                &bash("mkdir -p paper_outputs/20250101_120000_crispr/drafts"),
                Checkpoint::default(),
            )
            .unwrap();
        assert_eq!(signal.stage, Stage::Initialization);
        assert_eq!(signal.message, "Creating output directory");

        let unrelated = classifier()
            .classify(&bash("mkdir /tmp/scratch"), Checkpoint::default())
            .unwrap();
        assert!(unrelated.message.starts_with("Running: "));
    }

    #[test]
    fn copy_and_move_are_organizing() {
        let signal = classifier()
            .classify(&bash("cp drafts/v3.pdf final/paper.pdf"), Checkpoint::new(Stage::Compilation, 90))
            .unwrap();
        assert_eq!(signal.stage, Stage::Complete);
        assert_eq!(signal.percentage, 97);
    }

    #[test]
    fn other_commands_echo_truncated_text() {
        let long = "python scripts/generate_figures.py --input data/results.csv --output figures/";
        let current = Checkpoint::new(Stage::Writing, 55);
        let signal = classifier().classify(&bash(long), current).unwrap();
        assert_eq!(signal.checkpoint(), current);
        assert!(signal.message.starts_with("Running: python scripts/"));
        assert!(signal.message.ends_with("......"));
    }

    #[test]
    fn research_tool_echoes_query() {
        let event = ToolEvent::new("research-lookup", json!({ "query": "CRISPR base editing" }));
        let signal = classifier().classify(&event, Checkpoint::default()).unwrap();
        assert_eq!(signal.stage, Stage::Research);
        assert_eq!(signal.percentage, 20);
        assert_eq!(signal.message, "Researching: CRISPR base editing...");
    }

    #[test]
    fn unknown_tool_yields_nothing() {
        let event = ToolEvent::new("Glob", json!({ "pattern": "**/*.tex" }));
        assert!(classifier().classify(&event, Checkpoint::default()).is_none());
    }
}
