//! Analysis request types.
//!
//! An `AnalysisRequest` is the input bundle for one pipeline run. It is
//! immutable once built; the clarification re-entry path produces a fresh
//! request through `answer_clarification()` rather than mutating the old one.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LeafLensError, LeafLensResult};

/// Unique identifier for a single `analyze()` run.
///
/// Appears in every status event and log line emitted for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub uuid::Uuid);

impl RunId {
    /// Create a new, unique run ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One encoded image as produced by the capture surface.
///
/// The pipeline never decodes the bytes; `mime_type` is forwarded to the
/// generation client alongside them.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Convenience constructor for the common JPEG capture format.
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self::new(bytes, "image/jpeg")
    }
}

// Image bytes are large and meaningless in logs.
impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// What the caller wants out of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisMode {
    /// Disease / disorder diagnosis with a treatment plan.
    #[default]
    Diagnosis,
    /// Species identification with care advice.
    Identification,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMode::Diagnosis => f.write_str("diagnosis"),
            AnalysisMode::Identification => f.write_str("identification"),
        }
    }
}

impl FromStr for AnalysisMode {
    type Err = LeafLensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "diagnosis" | "diagnose" => Ok(AnalysisMode::Diagnosis),
            "identification" | "identify" => Ok(AnalysisMode::Identification),
            other => Err(LeafLensError::InvalidRequest {
                reason: format!("unknown analysis mode '{other}'"),
            }),
        }
    }
}

/// Crop growth stage. Free text that does not match a known stage is kept
/// verbatim in `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStage {
    Seedling,
    #[default]
    Vegetative,
    Flowering,
    Fruiting,
    Mature,
    Other(String),
}

impl fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrowthStage::Seedling => f.write_str("seedling"),
            GrowthStage::Vegetative => f.write_str("vegetative"),
            GrowthStage::Flowering => f.write_str("flowering"),
            GrowthStage::Fruiting => f.write_str("fruiting"),
            GrowthStage::Mature => f.write_str("mature"),
            GrowthStage::Other(text) => f.write_str(text),
        }
    }
}

impl FromStr for GrowthStage {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stage = match s.trim().to_ascii_lowercase().as_str() {
            "seedling" => GrowthStage::Seedling,
            "vegetative" => GrowthStage::Vegetative,
            "flowering" => GrowthStage::Flowering,
            "fruiting" => GrowthStage::Fruiting,
            "mature" => GrowthStage::Mature,
            _ => GrowthStage::Other(s.trim().to_string()),
        };
        Ok(stage)
    }
}

/// Optional sensor readings taken alongside the capture. No ranges are
/// enforced; absent readings are simply omitted from the model context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub soil_moisture_pct: Option<f64>,
}

impl EnvironmentSnapshot {
    /// True when no reading is present.
    pub fn is_empty(&self) -> bool {
        self.temperature_c.is_none()
            && self.humidity_pct.is_none()
            && self.soil_moisture_pct.is_none()
    }
}

impl fmt::Display for EnvironmentSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(t) = self.temperature_c {
            parts.push(format!("temperature {t:.1}°C"));
        }
        if let Some(h) = self.humidity_pct {
            parts.push(format!("humidity {h:.0}%"));
        }
        if let Some(m) = self.soil_moisture_pct {
            parts.push(format!("soil moisture {m:.0}%"));
        }
        f.write_str(&parts.join(", "))
    }
}

/// A user's answer to one clarification question from a previous round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationAnswer {
    pub question: String,
    pub answer: String,
}

impl ClarificationAnswer {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// The input bundle for one `analyze()` run.
///
/// `prior_answers` and `clarification_round` replace the old convention of
/// embedding answers in the notes text: a request with answers attached is a
/// re-entry, and the round counter lets the orchestrator force finalization
/// without parsing free text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub run_id: RunId,
    /// Capture time; the caller uses it as the history key.
    pub captured_at: DateTime<Utc>,
    images: Vec<ImagePayload>,
    pub crop_type: String,
    pub growth_stage: GrowthStage,
    pub notes: String,
    pub mode: AnalysisMode,
    pub environment: Option<EnvironmentSnapshot>,
    pub prior_answers: Vec<ClarificationAnswer>,
    pub clarification_round: u32,
}

impl AnalysisRequest {
    /// Build a first-round request.
    ///
    /// Returns `LeafLensError::InvalidRequest` when `images` is empty.
    pub fn new(images: Vec<ImagePayload>, mode: AnalysisMode) -> LeafLensResult<Self> {
        if images.is_empty() {
            return Err(LeafLensError::InvalidRequest {
                reason: "at least one image is required".to_string(),
            });
        }
        Ok(Self {
            run_id: RunId::new(),
            captured_at: Utc::now(),
            images,
            crop_type: String::new(),
            growth_stage: GrowthStage::default(),
            notes: String::new(),
            mode,
            environment: None,
            prior_answers: Vec::new(),
            clarification_round: 0,
        })
    }

    pub fn with_crop(mut self, crop_type: impl Into<String>, growth_stage: GrowthStage) -> Self {
        self.crop_type = crop_type.into();
        self.growth_stage = growth_stage;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_environment(mut self, environment: EnvironmentSnapshot) -> Self {
        self.environment = if environment.is_empty() {
            None
        } else {
            Some(environment)
        };
        self
    }

    /// The ordered, non-empty image sequence.
    pub fn images(&self) -> &[ImagePayload] {
        &self.images
    }

    /// True when this request carries answers to a previous clarification round.
    pub fn has_prior_answers(&self) -> bool {
        !self.prior_answers.is_empty()
    }

    /// Build the re-entry request for the clarification loop.
    ///
    /// Keeps images, capture time and metadata, attaches `answers`, assigns a
    /// fresh run ID and increments the round counter.
    pub fn answer_clarification(&self, answers: Vec<ClarificationAnswer>) -> Self {
        let mut prior_answers = self.prior_answers.clone();
        prior_answers.extend(answers);
        Self {
            run_id: RunId::new(),
            prior_answers,
            clarification_round: self.clarification_round + 1,
            ..self.clone()
        }
    }
}
