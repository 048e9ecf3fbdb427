//! Keyword classification of accumulated assistant text.

use super::{Checkpoint, Stage, StageSignal};

/// Message returned when the text carries no evidence of further progress.
pub const PROCESSING_MESSAGE: &str = "Processing...";

/// One keyword rule: any keyword found in the lower-cased text is evidence
/// that the run has reached `stage` at `percentage`.
#[derive(Debug)]
pub struct StageRule {
    pub stage: Stage,
    pub percentage: u8,
    pub message: &'static str,
    pub keywords: &'static [&'static str],
}

impl StageRule {
    fn matches(&self, text_lower: &str) -> bool {
        self.keywords.iter().any(|kw| text_lower.contains(kw))
    }

    fn signal(&self) -> StageSignal {
        StageSignal::new(self.stage, self.percentage, self.message)
    }
}

const fn rule(
    stage: Stage,
    percentage: u8,
    message: &'static str,
    keywords: &'static [&'static str],
) -> StageRule {
    StageRule {
        stage,
        percentage,
        message,
        keywords,
    }
}

/// Fine-grained rules, ascending by percentage within ascending stage.
pub static STAGE_RULES: &[StageRule] = &[
    rule(Stage::Planning, 8, "Analyzing requirements and scope", &["analyzing", "requirements", "scope"]),
    rule(Stage::Planning, 12, "Creating outline and structure", &["outline", "structure", "plan", "sections"]),
    rule(Stage::Research, 20, "Searching literature databases", &["searching", "pubmed", "arxiv", "scholar", "database"]),
    rule(Stage::Research, 25, "Gathering relevant publications", &["publications", "references", "citations"]),
    rule(Stage::Research, 30, "Synthesizing research findings", &["synthesiz", "review", "findings"]),
    rule(Stage::Writing, 40, "Writing abstract", &["abstract"]),
    rule(Stage::Writing, 45, "Writing introduction section", &["introduction", "background"]),
    rule(Stage::Writing, 50, "Writing methods section", &["methods", "methodology", "materials"]),
    rule(Stage::Writing, 55, "Writing results section", &["results", "findings", "analysis"]),
    rule(Stage::Writing, 60, "Writing discussion section", &["discussion", "implications"]),
    rule(Stage::Writing, 65, "Writing conclusion", &["conclusion", "concluding", "summary"]),
    rule(Stage::Writing, 70, "Formatting bibliography", &["bibliography", "bibtex", "references.bib"]),
    rule(Stage::Compilation, 76, "Creating LaTeX document", &["\\documentclass", "\\begin{document}", ".tex"]),
    rule(Stage::Compilation, 80, "Running pdflatex compilation", &["pdflatex", "latexmk", "compiling"]),
    rule(Stage::Compilation, 85, "Processing bibliography with BibTeX", &["bibtex", "processing citations"]),
    rule(Stage::Compilation, 90, "Final PDF compilation", &["final compilation", "recompiling"]),
    rule(Stage::Complete, 96, "Verifying output files", &["verifying", "checking", "output"]),
    rule(Stage::Complete, 98, "Organizing output directory", &["organizing", "directory", "files"]),
];

/// Coarse rules consulted when no fine rule advances the run. Each sits at
/// its stage floor and only fires while the run is still below that floor.
pub static COARSE_RULES: &[StageRule] = &[
    rule(Stage::Research, 15, "Conducting literature research", &["research", "literature"]),
    rule(Stage::Writing, 35, "Writing document sections", &["writing"]),
    rule(Stage::Compilation, 75, "Compiling LaTeX to PDF", &["compil", "latex", "pdf"]),
    rule(Stage::Complete, 95, "Finalizing document", &["complete", "finished", "done"]),
];

/// Classify the full text accumulated so far in a run.
///
/// Returns the most advanced fine rule supported by the text when it lies
/// beyond `current`. Failing that, the first coarse rule in table order that
/// matches and sits above `current`, so coarse fallbacks advance one stage at
/// a time. Otherwise `current` unchanged with [`PROCESSING_MESSAGE`].
pub fn classify_text(text: &str, current: Checkpoint) -> StageSignal {
    let text_lower = text.to_lowercase();

    // Later entries win ties, so `>=` keeps the last best match.
    let best = STAGE_RULES
        .iter()
        .filter(|r| r.matches(&text_lower))
        .fold(None::<&StageRule>, |best, r| match best {
            Some(b) if b.percentage > r.percentage => Some(b),
            _ => Some(r),
        });

    if let Some(best) = best
        && best.percentage > current.percentage
    {
        return best.signal();
    }

    if let Some(coarse) = COARSE_RULES
        .iter()
        .find(|r| current.percentage < r.percentage && r.matches(&text_lower))
    {
        return coarse.signal();
    }

    StageSignal::new(current.stage, current.percentage, PROCESSING_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> Checkpoint {
        Checkpoint::default()
    }

    #[test]
    fn tables_are_ordered_and_within_stage_bounds() {
        for table in [STAGE_RULES, COARSE_RULES] {
            for pair in table.windows(2) {
                assert!(pair[0].stage <= pair[1].stage);
                assert!(pair[0].percentage < pair[1].percentage);
            }
            for r in table {
                assert!(r.percentage >= r.stage.floor(), "{} below floor", r.message);
            }
        }
    }

    #[test]
    fn picks_most_advanced_match() {
        let signal = classify_text("Writing the abstract, then the introduction", start());
        assert_eq!(signal.stage, Stage::Writing);
        assert_eq!(signal.percentage, 45);
        assert_eq!(signal.message, "Writing introduction section");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let signal = classify_text("Running PDFLATEX now", start());
        assert_eq!(signal.stage, Stage::Compilation);
        assert_eq!(signal.percentage, 80);
    }

    #[test]
    fn no_match_keeps_current_with_processing() {
        let current = Checkpoint::new(Stage::Research, 20);
        let signal = classify_text("hmm", current);
        assert_eq!(signal.checkpoint(), current);
        assert_eq!(signal.message, PROCESSING_MESSAGE);
    }

    #[test]
    fn never_regresses_below_current() {
        let current = Checkpoint::new(Stage::Compilation, 80);
        let signal = classify_text("Now the abstract and the outline", current);
        assert_eq!(signal.checkpoint(), current);
        assert_eq!(signal.message, PROCESSING_MESSAGE);
    }

    #[test]
    fn coarse_rule_fires_when_no_fine_rule_matches() {
        let signal = classify_text("Let me do some literature work", start());
        assert_eq!(signal.stage, Stage::Research);
        assert_eq!(signal.percentage, 15);
        assert_eq!(signal.message, "Conducting literature research");
    }

    #[test]
    fn coarse_rule_is_gated_by_floor() {
        let current = Checkpoint::new(Stage::Writing, 40);
        let signal = classify_text("more research on this", current);
        assert_eq!(signal.message, PROCESSING_MESSAGE);
        assert_eq!(signal.checkpoint(), current);
    }

    #[test]
    fn coarse_rules_advance_one_stage_at_a_time() {
        let signal = classify_text("research done", start());
        assert_eq!(signal.stage, Stage::Research);
        assert_eq!(signal.percentage, 15);
        assert_eq!(signal.message, "Conducting literature research");
    }

    #[test]
    fn incidental_done_does_not_skip_to_complete() {
        let signal = classify_text(
            "I will start the literature research and report back when done",
            start(),
        );
        assert_eq!(signal.stage, Stage::Research);
        assert_eq!(signal.percentage, 15);
        assert_eq!(signal.message, "Conducting literature research");

        // Once research is behind the run, the same text moves to the next eligible fallback.
        let next = classify_text("research and writing are done", signal.checkpoint());
        assert_eq!(next.stage, Stage::Writing);
        assert_eq!(next.percentage, 35);
    }

    #[test]
    fn coarse_rule_used_when_fine_match_is_behind() {
        // "abstract" (40) does not beat 50, but "pdf" clears the compilation floor.
        let current = Checkpoint::new(Stage::Writing, 50);
        let signal = classify_text("abstract exported to pdf", current);
        assert_eq!(signal.stage, Stage::Compilation);
        assert_eq!(signal.percentage, 75);
    }

    #[test]
    fn repeated_classification_is_stable() {
        let text = "Searching PubMed for sources";
        let first = classify_text(text, start());
        let second = classify_text(text, first.checkpoint());
        assert_eq!(second.checkpoint(), first.checkpoint());
        assert_eq!(second.message, PROCESSING_MESSAGE);
    }

    #[test]
    fn monotone_over_growing_text() {
        let fragments = [
            "Analyzing the scope. ",
            "Searching arXiv. ",
            "Drafting the methods. ",
            "Now the outline again. ",
            "Running latexmk. ",
            "All done.",
        ];
        let mut text = String::new();
        let mut current = start();
        for fragment in fragments {
            text.push_str(fragment);
            let signal = classify_text(&text, current);
            assert!(signal.stage >= current.stage);
            assert!(signal.percentage >= current.percentage);
            current = signal.checkpoint();
        }
        // "done" clears the complete floor once compilation has been seen.
        assert_eq!(current.stage, Stage::Complete);
        assert_eq!(current.percentage, 95);
    }
}
