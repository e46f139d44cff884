//! Analyzer stage: images in, diagnosis-free observation report out.

use serde_json::json;
use tracing::debug;

use leaflens_contracts::{
    error::StageError,
    generation::GenerationRequest,
    outcome::VisualObservation,
    request::{AnalysisMode, ImagePayload},
    shape::{ResponseShape, ShapeRule, ShapeRuleType},
};

use crate::{
    config::PipelineConfig,
    prompts::{analyzer_prompt, NOT_A_PLANT_SENTINEL, OBSERVATION_DIAGNOSIS_MARKER},
    stages::call_structured,
    traits::{GenerationClient, ResponseVerifier},
};

pub const OBSERVATION_SHAPE_ID: &str = "observation-v1";

pub fn observation_shape() -> ResponseShape {
    ResponseShape {
        shape_id: OBSERVATION_SHAPE_ID.to_string(),
        json_schema: json!({
            "type": "object",
            "properties": {
                "subject": { "type": "string", "enum": ["plant", "not_plant"] },
                "observation": { "type": "string" }
            },
            "required": ["subject", "observation"]
        }),
        rules: vec![
            ShapeRule {
                rule_id: "subject-tag".to_string(),
                description: "Subject must be tagged plant or not_plant".to_string(),
                rule_type: ShapeRuleType::AllowedValues {
                    field_path: "subject".to_string(),
                    allowed: vec![json!("plant"), json!("not_plant")],
                },
            },
            ShapeRule {
                rule_id: "no-diagnosis".to_string(),
                description: "The observation report must not carry a diagnosis".to_string(),
                rule_type: ShapeRuleType::ForbiddenPattern {
                    field_path: "observation".to_string(),
                    pattern: OBSERVATION_DIAGNOSIS_MARKER.to_string(),
                },
            },
        ],
    }
}

/// Produces the visual observation report for a set of images.
pub struct Analyzer<'a> {
    client: &'a dyn GenerationClient,
    verifier: &'a dyn ResponseVerifier,
    config: &'a PipelineConfig,
}

impl<'a> Analyzer<'a> {
    pub fn new(
        client: &'a dyn GenerationClient,
        verifier: &'a dyn ResponseVerifier,
        config: &'a PipelineConfig,
    ) -> Self {
        Self { client, verifier, config }
    }

    /// One low-temperature call; no retries.
    pub async fn observe(
        &self,
        images: &[ImagePayload],
        mode: AnalysisMode,
    ) -> Result<VisualObservation, StageError> {
        if images.is_empty() {
            return Err(StageError::Parse {
                reason: "analyzer requires at least one image".to_string(),
            });
        }

        let request = GenerationRequest::text(analyzer_prompt(mode))
            .with_images(images.to_vec())
            .with_shape(observation_shape())
            .with_temperature(self.config.analyzer_temperature);

        let response = call_structured(self.client, self.verifier, request).await?;

        let subject = response.value["subject"].as_str().unwrap_or_default();
        let text = response.value["observation"]
            .as_str()
            .unwrap_or_default()
            .trim()
            .to_string();

        if subject == "not_plant" || text.contains(NOT_A_PLANT_SENTINEL) {
            debug!(subject, "analyzer rejected subject as not a plant");
            return Ok(VisualObservation::NotAPlant { raw: text });
        }

        if text.is_empty() {
            return Err(StageError::Parse {
                reason: "observation text is empty".to_string(),
            });
        }

        Ok(VisualObservation::Observed { text })
    }
}
