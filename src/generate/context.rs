use crate::models::ProgressUpdate;
use crate::progress::{Checkpoint, StageSignal, ToolClassifier, classify_text};
use crate::stream::ToolEvent;

/// Mutable state of one generation run, owned by the driving loop.
///
/// Every update leaves through [`RunContext::observe_text`],
/// [`RunContext::observe_tool`] or [`RunContext::announce`], all of which
/// merge forward only, so emitted stage and percentage never decrease.
#[derive(Debug, Default)]
pub struct RunContext {
    checkpoint: Checkpoint,
    last_message: String,
    tool_calls: usize,
    files_written: Vec<String>,
    accumulated_text: String,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.checkpoint
    }

    pub fn tool_calls(&self) -> usize {
        self.tool_calls
    }

    pub fn files_written(&self) -> &[String] {
        &self.files_written
    }

    /// Feed a text fragment. Emits when the classifier moves the run forward
    /// with a message different from the last one emitted.
    pub fn observe_text(&mut self, text: &str) -> Option<ProgressUpdate> {
        self.accumulated_text.push_str(text);
        let signal = classify_text(&self.accumulated_text, self.checkpoint);
        let next = self.checkpoint.advance_to(signal.checkpoint());

        if next == self.checkpoint || signal.message == self.last_message {
            return None;
        }
        Some(self.accept(signal, next))
    }

    /// Feed a tool invocation. Emits when the classifier has something new
    /// to say or the percentage moves forward.
    pub fn observe_tool(&mut self, event: &ToolEvent, classifier: &ToolClassifier) -> Option<ProgressUpdate> {
        self.tool_calls += 1;
        if event.tool_name.eq_ignore_ascii_case("write")
            && let Some(path) = event.file_path()
        {
            self.files_written.push(path.to_string());
        }

        let signal = classifier.classify(event, self.checkpoint)?;
        let next = self.checkpoint.advance_to(signal.checkpoint());
        if signal.message == self.last_message && next.percentage <= self.checkpoint.percentage {
            return None;
        }

        let update = self
            .accept(signal, next)
            .with_detail("tool", event.tool_name.as_str())
            .with_detail("tool_calls", self.tool_calls)
            .with_detail("files_created", self.files_written.len());
        Some(update)
    }

    /// An update raised by the driving loop itself rather than a classifier.
    pub fn announce(&mut self, message: impl Into<String>, target: Checkpoint) -> ProgressUpdate {
        let next = self.checkpoint.advance_to(target);
        let signal = StageSignal::new(next.stage, next.percentage, message);
        self.accept(signal, next)
    }

    fn accept(&mut self, signal: StageSignal, next: Checkpoint) -> ProgressUpdate {
        self.checkpoint = next;
        self.last_message.clone_from(&signal.message);
        ProgressUpdate::new(signal.message, next)
    }
}
