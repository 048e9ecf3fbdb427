//! Records produced by a generation run.
//!
//! Every run yields a sequence of [`GenerationRecord::Progress`] records and
//! ends with exactly one [`GenerationRecord::Result`]. Records serialize as
//! flat JSON objects tagged with `"type": "progress" | "result"`.

use crate::progress::{Checkpoint, Stage};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn utc_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// One observation of a run's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub timestamp: String,
    pub message: String,
    pub stage: Stage,
    pub percentage: u8,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl ProgressUpdate {
    pub fn new(message: impl Into<String>, checkpoint: Checkpoint) -> Self {
        Self {
            timestamp: utc_timestamp(),
            message: message.into(),
            stage: checkpoint.stage,
            percentage: checkpoint.percentage,
            details: Map::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Partial,
    #[default]
    Failed,
}

impl std::fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultStatus::Success => write!(f, "success"),
            ResultStatus::Partial => write!(f, "partial"),
            ResultStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperMetadata {
    pub title: Option<String>,
    pub created_at: String,
    pub topic: String,
    pub word_count: Option<usize>,
}

impl Default for PaperMetadata {
    fn default() -> Self {
        Self {
            title: None,
            created_at: utc_timestamp(),
            topic: String::new(),
            word_count: None,
        }
    }
}

/// Categorized artifact paths of one output directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperFiles {
    pub pdf_final: Option<String>,
    pub tex_final: Option<String>,
    pub pdf_drafts: Vec<String>,
    pub tex_drafts: Vec<String>,
    pub bibliography: Option<String>,
    pub figures: Vec<String>,
    pub data: Vec<String>,
    pub progress_log: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Citations {
    pub count: usize,
    pub style: String,
    pub file: Option<String>,
}

/// Terminal record of a run. Built once, after the agent stream ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub status: ResultStatus,
    pub paper_directory: String,
    pub paper_name: String,
    pub metadata: PaperMetadata,
    pub files: PaperFiles,
    pub citations: Citations,
    pub figures_count: usize,
    pub compilation_success: bool,
    pub errors: Vec<String>,
}

impl GenerationResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Failed,
            errors: vec![error.into()],
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GenerationRecord {
    Progress(ProgressUpdate),
    Result(Box<GenerationResult>),
}

impl GenerationRecord {
    pub fn failed(error: impl Into<String>) -> Self {
        GenerationRecord::Result(Box::new(GenerationResult::failed(error)))
    }

    pub fn as_progress(&self) -> Option<&ProgressUpdate> {
        match self {
            GenerationRecord::Progress(update) => Some(update),
            GenerationRecord::Result(_) => None,
        }
    }

    pub fn as_result(&self) -> Option<&GenerationResult> {
        match self {
            GenerationRecord::Result(result) => Some(result.as_ref()),
            GenerationRecord::Progress(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationRecord::Result(_))
    }
}

impl From<ProgressUpdate> for GenerationRecord {
    fn from(update: ProgressUpdate) -> Self {
        GenerationRecord::Progress(update)
    }
}

impl From<GenerationResult> for GenerationRecord {
    fn from(result: GenerationResult) -> Self {
        GenerationRecord::Result(Box::new(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_record_serializes_flat_with_type_tag() {
        let update = ProgressUpdate::new("Writing abstract", Checkpoint::new(Stage::Writing, 40))
            .with_detail("tool", "Write")
            .with_detail("tool_calls", 3);
        let value = serde_json::to_value(GenerationRecord::from(update)).unwrap();

        assert_eq!(value["type"], "progress");
        assert_eq!(value["stage"], "writing");
        assert_eq!(value["percentage"], 40);
        assert_eq!(value["details"]["tool"], "Write");
        assert_eq!(value["details"]["tool_calls"], 3);
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn empty_details_are_omitted() {
        let update = ProgressUpdate::new("Scanning", Checkpoint::new(Stage::Complete, 95));
        let value = serde_json::to_value(&update).unwrap();
        assert!(value.get("details").is_none());
    }

    #[test]
    fn failed_result_record_shape() {
        let value = serde_json::to_value(GenerationRecord::failed("boom")).unwrap();
        assert_eq!(value["type"], "result");
        assert_eq!(value["status"], "failed");
        assert_eq!(value["paper_directory"], "");
        assert_eq!(value["compilation_success"], false);
        assert_eq!(value["errors"][0], "boom");
        assert_eq!(value["files"]["pdf_drafts"], serde_json::json!([]));
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = GenerationRecord::failed("Output directory not found after generation");
        let text = serde_json::to_string(&record).unwrap();
        let parsed: GenerationRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, record);
        assert!(parsed.is_terminal());
    }
}
