//! Stage outputs and the merged pipeline result.
//!
//! `VisualObservation`, `ClassificationOutcome` and `AdviceOutcome` live only
//! for the duration of one run. `AnalysisResult` is what the orchestrator
//! hands back to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::request::{AnalysisMode, RunId};

/// Diagnosis label used for the not-a-plant terminal outcome.
pub const NOT_A_PLANT: &str = "Not a Plant";

/// Diagnosis label used when the image cannot support any answer.
pub const INCONCLUSIVE: &str = "Inconclusive";

/// Output of the Analyzer stage.
///
/// The not-a-plant decision is made once, at the response boundary, and
/// carried as a variant so downstream stages never inspect the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VisualObservation {
    /// The subject is not a plant. `raw` keeps whatever the model said.
    NotAPlant { raw: String },
    /// A clinical, diagnosis-free description of the subject.
    Observed { text: String },
}

impl VisualObservation {
    pub fn is_not_a_plant(&self) -> bool {
        matches!(self, VisualObservation::NotAPlant { .. })
    }

    /// The observation text (the raw text for `NotAPlant`).
    pub fn text(&self) -> &str {
        match self {
            VisualObservation::NotAPlant { raw } => raw,
            VisualObservation::Observed { text } => text,
        }
    }
}

/// Authority tier of a grounding source.
///
/// Ordered so that `Primary < Secondary < Tertiary`; sorting ascending puts
/// the most authoritative sources first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceAuthority {
    /// Educational, government and research domains.
    Primary,
    /// Established horticultural publications.
    Secondary,
    /// Everything else.
    #[default]
    Tertiary,
}

/// A deduplicated, ranked grounding citation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub uri: String,
    pub authority: SourceAuthority,
}

/// Output of the Classifier stage.
///
/// When `clarification_questions` is `Some`, the list is non-empty and the
/// outcome is provisional: it must not be handed to the Advisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    pub diagnosis: String,
    /// Normalized confidence, 0–100.
    pub confidence: u8,
    pub confidence_rationale: String,
    pub citations: Vec<Citation>,
    pub clarification_questions: Option<Vec<String>>,
    /// Candidate diagnoses the model could not separate, if any.
    #[serde(default)]
    pub differential: Vec<String>,
}

impl ClassificationOutcome {
    /// The local short-circuit outcome for a not-a-plant observation.
    pub fn not_a_plant() -> Self {
        Self {
            diagnosis: NOT_A_PLANT.to_string(),
            confidence: 0,
            confidence_rationale: "The subject of the image is not a plant.".to_string(),
            citations: Vec::new(),
            clarification_questions: None,
            differential: Vec::new(),
        }
    }

    /// True when the Classifier could not support any answer from the image.
    pub fn is_inconclusive(&self) -> bool {
        self.diagnosis == INCONCLUSIVE
    }

    pub fn is_provisional(&self) -> bool {
        self.clarification_questions
            .as_ref()
            .is_some_and(|q| !q.is_empty())
    }
}

/// Output of the Advisor stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceOutcome {
    pub treatment: Vec<String>,
    pub prevention: Vec<String>,
}

/// How the run ended. Lets the caller pick its message without comparing
/// diagnosis strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    /// Full pipeline completed.
    Diagnosed,
    /// The Analyzer rejected the subject; retake the photo.
    NotAPlant,
    /// The pipeline halted; `missing_info` holds the questions.
    NeedsClarification,
    /// The image could not support any answer; retake the photo. No advice
    /// is requested.
    Inconclusive,
}

/// The merged pipeline output handed to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub run_id: RunId,
    pub captured_at: DateTime<Utc>,
    pub mode: AnalysisMode,
    pub outcome: ResultKind,
    pub diagnosis: String,
    pub confidence: u8,
    pub confidence_rationale: String,
    pub treatment: Vec<String>,
    pub prevention: Vec<String>,
    pub citations: Vec<Citation>,
    /// Questions the user must answer before the run can finish.
    pub missing_info: Option<Vec<String>>,
}

impl AnalysisResult {
    pub fn needs_clarification(&self) -> bool {
        self.outcome == ResultKind::NeedsClarification
    }
}
