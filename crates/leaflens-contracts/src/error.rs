//! Error types for the LeafLens analysis pipeline.
//!
//! Stages return `StageError`; the orchestrator attaches the failing stage
//! with `StageError::at()` and surfaces a `LeafLensError`. Not-a-plant and
//! clarification-required are outcomes carried in `AnalysisResult`, never
//! errors.

use thiserror::Error;

use crate::status::Stage;

/// A failure inside one stage, before stage context is attached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    /// The generation call failed (transport, quota, or content policy).
    #[error("generation failed: {reason}")]
    Generation { reason: String },

    /// A response arrived but the required fields could not be extracted.
    #[error("unparseable response: {reason}")]
    Parse { reason: String },

    /// The caller cancelled the run while this stage was suspended.
    #[error("cancelled")]
    Cancelled,
}

impl StageError {
    /// Attach the stage that failed.
    pub fn at(self, stage: Stage) -> LeafLensError {
        match self {
            StageError::Generation { reason } => {
                LeafLensError::StageGenerationFailure { stage, reason }
            }
            StageError::Parse { reason } => LeafLensError::StageParseFailure { stage, reason },
            StageError::Cancelled => LeafLensError::Cancelled { stage },
        }
    }
}

/// The unified error type for LeafLens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeafLensError {
    #[error("analysis failed in {stage} stage: generation failed: {reason}")]
    StageGenerationFailure { stage: Stage, reason: String },

    #[error("analysis failed in {stage} stage: unparseable response: {reason}")]
    StageParseFailure { stage: Stage, reason: String },

    #[error("analysis cancelled during {stage} stage")]
    Cancelled { stage: Stage },

    /// The request violates an input precondition (e.g. no images).
    #[error("invalid analysis request: {reason}")]
    InvalidRequest { reason: String },

    /// A configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// Reading input from, or writing results to, the terminal failed.
    #[error("i/o error: {reason}")]
    Io { reason: String },

    /// A response shape document itself is unusable.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },
}

impl LeafLensError {
    /// The stage the run failed in, for stage-attributed failures.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            LeafLensError::StageGenerationFailure { stage, .. }
            | LeafLensError::StageParseFailure { stage, .. }
            | LeafLensError::Cancelled { stage } => Some(*stage),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, LeafLensError::Cancelled { .. })
    }
}

/// Convenience alias used throughout the LeafLens crates.
pub type LeafLensResult<T> = Result<T, LeafLensError>;
