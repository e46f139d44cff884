//! Stage identity, pipeline states and status events.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::request::RunId;

/// One of the three reasoning stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Analyzer,
    Classifier,
    Advisor,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Analyzer => f.write_str("analyzer"),
            Stage::Classifier => f.write_str("classifier"),
            Stage::Advisor => f.write_str("advisor"),
        }
    }
}

/// Orchestrator state machine.
///
/// `Analyzing → Classifying → (NeedsClarification | Advising) → Done`, with a
/// direct `Analyzing → Done` edge for the not-a-plant case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    Analyzing,
    Classifying,
    NeedsClarification,
    Advising,
    Done,
}

impl PipelineState {
    /// Human-readable label shown while the state is active.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::Analyzing => "Examining the photo",
            PipelineState::Classifying => "Consulting trusted sources",
            PipelineState::NeedsClarification => "Waiting for more details",
            PipelineState::Advising => "Preparing a treatment plan",
            PipelineState::Done => "Analysis complete",
        }
    }

    /// The stage that runs in this state, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineState::Analyzing => Some(Stage::Analyzer),
            PipelineState::Classifying => Some(Stage::Classifier),
            PipelineState::Advising => Some(Stage::Advisor),
            PipelineState::NeedsClarification | PipelineState::Done => None,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Emitted by the orchestrator on every state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub run_id: RunId,
    pub state: PipelineState,
    pub label: String,
    pub at: DateTime<Utc>,
}

impl StatusEvent {
    pub fn new(run_id: RunId, state: PipelineState) -> Self {
        Self {
            run_id,
            state,
            label: state.label().to_string(),
            at: Utc::now(),
        }
    }
}
