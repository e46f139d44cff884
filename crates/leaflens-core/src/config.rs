//! Pipeline configuration.
//!
//! `PipelineConfig` is plain serde data with defaults for every field, so a
//! TOML file only needs the keys it wants to change:
//!
//! ```toml
//! citation_cap = 3
//! citation_order = "authority"
//! max_clarification_rounds = 1
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use leaflens_contracts::error::{LeafLensError, LeafLensResult};

/// How deduplicated citations are ordered before truncation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CitationOrder {
    /// Order in which the backend reported the sources.
    #[default]
    Discovery,
    /// Stable sort by authority tier (primary first), ties in discovery order.
    Authority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum citations kept on a classification (3–5).
    pub citation_cap: usize,
    pub citation_order: CitationOrder,
    /// Maximum clarification questions surfaced per round (1–3).
    pub max_clarification_questions: usize,
    /// Clarification rounds per analysis. Must be 1: the answered re-entry
    /// is always forced to commit. Kept as a key so old configs still parse.
    pub max_clarification_rounds: u32,
    /// Treatment steps and prevention tips requested from the Advisor.
    pub advice_items: usize,
    pub analyzer_temperature: f32,
    pub classifier_temperature: f32,
    pub advisor_temperature: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            citation_cap: 5,
            citation_order: CitationOrder::Discovery,
            max_clarification_questions: 3,
            max_clarification_rounds: 1,
            advice_items: 3,
            analyzer_temperature: 0.1,
            classifier_temperature: 0.2,
            advisor_temperature: 0.4,
        }
    }
}

impl PipelineConfig {
    /// Parse `s` as TOML and validate the result.
    pub fn from_toml_str(s: &str) -> LeafLensResult<Self> {
        let config: PipelineConfig = toml::from_str(s).map_err(|e| LeafLensError::ConfigError {
            reason: format!("failed to parse pipeline TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse the pipeline configuration at `path`.
    pub fn from_file(path: &Path) -> LeafLensResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| LeafLensError::ConfigError {
            reason: format!("failed to read pipeline config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Reject values the pipeline cannot honor.
    pub fn validate(&self) -> LeafLensResult<()> {
        let bad = |reason: String| -> LeafLensResult<()> { Err(LeafLensError::ConfigError { reason }) };

        if !(3..=5).contains(&self.citation_cap) {
            return bad(format!("citation_cap must be between 3 and 5, got {}", self.citation_cap));
        }
        if !(1..=3).contains(&self.max_clarification_questions) {
            return bad(format!(
                "max_clarification_questions must be between 1 and 3, got {}",
                self.max_clarification_questions
            ));
        }
        if self.max_clarification_rounds != 1 {
            return bad(format!(
                "max_clarification_rounds must be 1, got {}",
                self.max_clarification_rounds
            ));
        }
        if self.advice_items == 0 {
            return bad("advice_items must be at least 1".to_string());
        }
        for (name, t) in [
            ("analyzer_temperature", self.analyzer_temperature),
            ("classifier_temperature", self.classifier_temperature),
            ("advisor_temperature", self.advisor_temperature),
        ] {
            if !(0.0..=2.0).contains(&t) {
                return bad(format!("{name} must be between 0.0 and 2.0, got {t}"));
            }
        }
        Ok(())
    }
}
