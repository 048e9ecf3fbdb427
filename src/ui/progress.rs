use console::{StyledObject, style};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::models::{GenerationResult, ProgressUpdate, ResultStatus};
use crate::progress::Stage;
use crate::stream::tool_emoji;
use crate::ui::icons::{BOOKS, CHECK, CROSS, DOCUMENT, FOLDER, IMAGE, PROGRESS, SPARKLE, WARN};

/// Terminal UI for a generation run, rendered via `indicatif` progress bars.
///
/// Two bars are stacked vertically:
/// - Progress bar: percentage of the run, labelled with the current stage
/// - Activity spinner: the latest progress message
///
/// Every update is also printed as a log line above the bars so the run
/// leaves a readable transcript.
pub struct GenerationUI {
    multi: MultiProgress,
    progress_bar: ProgressBar,
    activity_bar: ProgressBar,
    verbose: bool,
}

impl GenerationUI {
    pub fn new(verbose: bool) -> Self {
        let multi = MultiProgress::new();

        let progress_style = ProgressStyle::default_bar()
            .template("{prefix:.bold.dim} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .expect("progress bar template is a valid static string")
            .progress_chars("█▓▒░");

        let progress_bar = multi.add(ProgressBar::new(100));
        progress_bar.set_style(progress_style);
        progress_bar.set_prefix("Progress");

        let activity_style = ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {msg}")
            .expect("progress bar template is a valid static string");

        let activity_bar = multi.add(ProgressBar::new_spinner());
        activity_bar.set_style(activity_style);
        activity_bar.set_prefix("     Now");
        activity_bar.enable_steady_tick(Duration::from_millis(100));

        Self {
            multi,
            progress_bar,
            activity_bar,
            verbose,
        }
    }

    /// Print a line via `MultiProgress`, falling back to `eprintln!` if the rich UI fails.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.multi.println(msg.as_ref()).is_err() {
            eprintln!("{}", msg.as_ref());
        }
    }

    /// Move the bars to `update` and print it as a transcript line.
    pub fn show_update(&self, update: &ProgressUpdate) {
        self.progress_bar.set_position(u64::from(update.percentage));
        self.progress_bar.set_message(stage_label(update.stage).to_string());
        self.activity_bar.set_message(update.message.clone());

        let icon = update
            .details
            .get("tool")
            .and_then(|tool| tool.as_str())
            .map(tool_emoji)
            .unwrap_or("•");
        self.print_line(format!(
            "  {} {} {}",
            style(format!("{:>3}%", update.percentage)).cyan(),
            icon,
            update.message
        ));

        if self.verbose && !update.details.is_empty() {
            let details = update
                .details
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect::<Vec<_>>()
                .join(" ");
            self.print_line(format!("      {}", style(details).dim()));
        }
    }

    /// Stop the bars and print the result summary.
    pub fn show_result(&self, result: &GenerationResult) {
        self.activity_bar.finish_and_clear();
        match result.status {
            ResultStatus::Failed => self.progress_bar.abandon_with_message(format!("{}", style("failed").red())),
            _ => self.progress_bar.finish_with_message(format!("{}", style("complete").green())),
        }

        for line in summary_lines(result) {
            self.print_line(line);
        }
    }
}

fn stage_label(stage: Stage) -> StyledObject<&'static str> {
    let label = style(stage.as_str());
    match stage {
        Stage::Initialization | Stage::Planning => label.dim(),
        Stage::Research => label.blue(),
        Stage::Writing => label.yellow(),
        Stage::Compilation => label.magenta(),
        Stage::Complete => label.green(),
    }
}

/// Human-readable summary of a terminal result.
pub fn summary_lines(result: &GenerationResult) -> Vec<String> {
    let mut lines = vec![String::new()];

    match result.status {
        ResultStatus::Success => lines.push(format!("{}{}", SPARKLE, style("Document generated").green().bold())),
        ResultStatus::Partial => lines.push(format!(
            "{}{}",
            WARN,
            style("Document source generated, PDF compilation incomplete").yellow().bold()
        )),
        ResultStatus::Failed => {
            lines.push(format!("{}{}", CROSS, style("Generation failed").red().bold()));
            for error in &result.errors {
                lines.push(format!("   {}", style(error).red()));
            }
            return lines;
        }
    }

    lines.push(format!("{}{}", FOLDER, result.paper_directory));
    if let Some(title) = &result.metadata.title {
        lines.push(format!("   Title: {}", style(title).bold()));
    }
    if let Some(pdf) = &result.files.pdf_final {
        lines.push(format!("{}PDF: {}", CHECK, pdf));
    }
    if let Some(tex) = result.files.tex_final.as_ref().or(result.files.tex_drafts.last()) {
        lines.push(format!("{}LaTeX: {}", DOCUMENT, tex));
    }
    if let Some(words) = result.metadata.word_count {
        lines.push(format!("{}Words: {}", PROGRESS, words));
    }
    if result.citations.count > 0 {
        lines.push(format!(
            "{}Citations: {} ({})",
            BOOKS, result.citations.count, result.citations.style
        ));
    }
    if result.figures_count > 0 {
        lines.push(format!("{}Figures: {}", IMAGE, result.figures_count));
    }
    lines
}
