//! Progress classification for document generation runs.
//!
//! Two pure classifiers map agent activity onto a fixed ordered set of stages:
//!
//! - [`classify_text`] scans the accumulated assistant text for keywords
//! - [`ToolClassifier`] inspects individual tool invocations
//!
//! Neither classifier enforces monotonicity. The driving loop in
//! [`crate::generate`] clamps every accepted signal so that stage and
//! percentage never move backwards within one run.

mod stage;
mod tool;

pub use stage::{COARSE_RULES, PROCESSING_MESSAGE, STAGE_RULES, StageRule, classify_text};
pub use tool::ToolClassifier;

use serde::{Deserialize, Serialize};

/// Coarse phase of document generation. Declaration order is progress order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Initialization,
    Planning,
    Research,
    Writing,
    Compilation,
    Complete,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Initialization,
        Stage::Planning,
        Stage::Research,
        Stage::Writing,
        Stage::Compilation,
        Stage::Complete,
    ];

    /// Lowest percentage associated with this stage.
    pub fn floor(self) -> u8 {
        match self {
            Stage::Initialization => 0,
            Stage::Planning => 5,
            Stage::Research => 15,
            Stage::Writing => 35,
            Stage::Compilation => 75,
            Stage::Complete => 95,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Initialization => "initialization",
            Stage::Planning => "planning",
            Stage::Research => "research",
            Stage::Writing => "writing",
            Stage::Compilation => "compilation",
            Stage::Complete => "complete",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s.to_lowercase())
            .ok_or_else(|| anyhow::anyhow!("Invalid stage '{}'", s))
    }
}

/// Where a run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Checkpoint {
    pub stage: Stage,
    pub percentage: u8,
}

impl Checkpoint {
    pub fn new(stage: Stage, percentage: u8) -> Self {
        Self {
            stage,
            percentage: percentage.min(100),
        }
    }

    /// Forward-only merge: never lowers stage or percentage.
    pub fn advance_to(self, other: Checkpoint) -> Checkpoint {
        Checkpoint {
            stage: self.stage.max(other.stage),
            percentage: self.percentage.max(other.percentage),
        }
    }
}

/// A classifier's proposal for the next progress state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSignal {
    pub stage: Stage,
    pub percentage: u8,
    pub message: String,
}

impl StageSignal {
    pub fn new(stage: Stage, percentage: u8, message: impl Into<String>) -> Self {
        Self {
            stage,
            percentage: percentage.min(100),
            message: message.into(),
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint::new(self.stage, self.percentage)
    }
}
