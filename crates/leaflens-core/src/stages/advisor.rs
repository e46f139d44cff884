//! Advisor stage: treatment and prevention for a committed diagnosis.

use serde_json::json;
use tracing::{debug, warn};

use leaflens_contracts::{
    error::StageError,
    generation::GenerationRequest,
    outcome::{AdviceOutcome, VisualObservation, NOT_A_PLANT},
    shape::{ResponseShape, ShapeRule, ShapeRuleType},
};

use crate::{
    config::PipelineConfig,
    prompts::advisor_prompt,
    stages::{call_structured, string_list, StageContext},
    traits::{GenerationClient, ResponseVerifier},
};

pub const ADVICE_SHAPE_ID: &str = "advice-v1";

const DEFAULT_TREATMENT: [&str; 3] = [
    "Remove and dispose of visibly affected leaves.",
    "Water at the base of the plant in the morning to keep foliage dry.",
    "Monitor the plant every few days and consult a local extension office if symptoms spread.",
];

const DEFAULT_PREVENTION: [&str; 3] = [
    "Space plants for good air circulation.",
    "Rotate crops and clean tools between plants.",
    "Inspect new plants before introducing them to the garden.",
];

pub fn advice_shape() -> ResponseShape {
    ResponseShape {
        shape_id: ADVICE_SHAPE_ID.to_string(),
        json_schema: json!({
            "type": "object",
            "properties": {
                "treatment": { "type": "array", "items": { "type": "string" } },
                "prevention": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["treatment", "prevention"]
        }),
        rules: vec![
            ShapeRule {
                rule_id: "treatment-present".to_string(),
                description: "Treatment list must be present".to_string(),
                rule_type: ShapeRuleType::RequiredField {
                    field_path: "treatment".to_string(),
                },
            },
            ShapeRule {
                rule_id: "prevention-present".to_string(),
                description: "Prevention list must be present".to_string(),
                rule_type: ShapeRuleType::RequiredField {
                    field_path: "prevention".to_string(),
                },
            },
        ],
    }
}

pub struct Advisor<'a> {
    client: &'a dyn GenerationClient,
    verifier: &'a dyn ResponseVerifier,
    config: &'a PipelineConfig,
}

impl<'a> Advisor<'a> {
    pub fn new(
        client: &'a dyn GenerationClient,
        verifier: &'a dyn ResponseVerifier,
        config: &'a PipelineConfig,
    ) -> Self {
        Self { client, verifier, config }
    }

    /// Produce advice for a final diagnosis. Must never see a provisional one.
    pub async fn advise(
        &self,
        diagnosis: &str,
        observation: &VisualObservation,
        context: &StageContext,
    ) -> Result<AdviceOutcome, StageError> {
        if diagnosis == NOT_A_PLANT || observation.is_not_a_plant() {
            debug!("advisor short-circuit: not a plant");
            return Ok(AdviceOutcome::default());
        }

        let items = self.config.advice_items;
        let prompt = advisor_prompt(context.mode, diagnosis, observation.text(), &context.text, items);
        let request = GenerationRequest::text(prompt)
            .with_shape(advice_shape())
            .with_temperature(self.config.advisor_temperature);

        let response = call_structured(self.client, self.verifier, request).await?;
        let value = &response.value;

        for field in ["treatment", "prevention"] {
            if !value[field].is_array() {
                return Err(StageError::Parse {
                    reason: format!("'{field}' is not a list"),
                });
            }
        }

        Ok(AdviceOutcome {
            treatment: fill_list(string_list(value, "treatment"), &DEFAULT_TREATMENT, items, "treatment"),
            prevention: fill_list(string_list(value, "prevention"), &DEFAULT_PREVENTION, items, "prevention"),
        })
    }
}

fn fill_list(mut list: Vec<String>, defaults: &[&str], items: usize, field: &str) -> Vec<String> {
    if list.is_empty() {
        warn!(field, "advisor returned an empty list, using general guidance");
        list = defaults.iter().map(|s| s.to_string()).collect();
    }
    list.truncate(items);
    list
}
