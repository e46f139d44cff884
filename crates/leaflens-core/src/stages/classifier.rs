//! Classifier stage: grounded diagnosis or identification.
//!
//! Either commits to an answer with confidence and citations, or returns a
//! provisional answer together with the questions that would separate the
//! remaining candidates. A forced run never carries questions.
//!
//! An image too poor to support any answer comes back as the fixed
//! [`INCONCLUSIVE`] label: either the model says so directly, or it leaves
//! the diagnosis empty, asks nothing, and explains why in the rationale.

use serde_json::json;
use tracing::{debug, info};

use leaflens_contracts::{
    error::StageError,
    generation::GenerationRequest,
    outcome::{ClassificationOutcome, VisualObservation, INCONCLUSIVE},
    shape::{ResponseShape, ShapeRule, ShapeRuleType},
};

use crate::{
    citations::rank_citations,
    config::PipelineConfig,
    confidence::{normalize_confidence, raw_confidence},
    prompts::classifier_prompt,
    stages::{call_structured, string_list, StageContext},
    traits::{AuthorityRanker, GenerationClient, ResponseVerifier},
};

pub const CLASSIFICATION_SHAPE_ID: &str = "classification-v1";

pub fn classification_shape() -> ResponseShape {
    ResponseShape {
        shape_id: CLASSIFICATION_SHAPE_ID.to_string(),
        json_schema: json!({
            "type": "object",
            "properties": {
                "diagnosis": { "type": "string" },
                "confidence": { "type": ["number", "string"] },
                "confidence_rationale": { "type": "string" },
                "clarification_questions": { "type": "array", "items": { "type": "string" } },
                "differential": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["diagnosis", "confidence"]
        }),
        rules: vec![
            ShapeRule {
                rule_id: "diagnosis-present".to_string(),
                description: "A diagnosis field must be present".to_string(),
                rule_type: ShapeRuleType::RequiredField {
                    field_path: "diagnosis".to_string(),
                },
            },
            ShapeRule {
                rule_id: "confidence-scale".to_string(),
                description: "Confidence must be numeric on the 0-1 or 0-100 scale".to_string(),
                rule_type: ShapeRuleType::Custom {
                    function_name: "confidence-scale".to_string(),
                },
            },
        ],
    }
}

pub struct Classifier<'a> {
    client: &'a dyn GenerationClient,
    verifier: &'a dyn ResponseVerifier,
    ranker: &'a dyn AuthorityRanker,
    config: &'a PipelineConfig,
}

impl<'a> Classifier<'a> {
    pub fn new(
        client: &'a dyn GenerationClient,
        verifier: &'a dyn ResponseVerifier,
        ranker: &'a dyn AuthorityRanker,
        config: &'a PipelineConfig,
    ) -> Self {
        Self {
            client,
            verifier,
            ranker,
            config,
        }
    }

    /// Classify an observation.
    ///
    /// A not-a-plant observation short-circuits locally without a call.
    pub async fn classify(
        &self,
        observation: &VisualObservation,
        context: &StageContext,
    ) -> Result<ClassificationOutcome, StageError> {
        let text = match observation {
            VisualObservation::NotAPlant { .. } => {
                debug!("classifier short-circuit: not a plant");
                return Ok(ClassificationOutcome::not_a_plant());
            }
            VisualObservation::Observed { text } => text,
        };

        let prompt = classifier_prompt(
            context.mode,
            text,
            &context.text,
            context.forced,
            self.config.max_clarification_questions,
        );
        let request = GenerationRequest::text(prompt)
            .with_shape(classification_shape())
            .with_temperature(self.config.classifier_temperature)
            .grounded();

        let response = call_structured(self.client, self.verifier, request).await?;
        let value = &response.value;

        let raw = raw_confidence(&value["confidence"]).ok_or_else(|| StageError::Parse {
            reason: "confidence is missing or not numeric".to_string(),
        })?;
        let confidence = normalize_confidence(raw);

        let mut diagnosis = value["diagnosis"].as_str().unwrap_or_default().trim().to_string();
        if diagnosis.eq_ignore_ascii_case(INCONCLUSIVE) {
            diagnosis = INCONCLUSIVE.to_string();
        }
        let confidence_rationale = value["confidence_rationale"]
            .as_str()
            .unwrap_or_default()
            .trim()
            .to_string();

        let mut questions = string_list(value, "clarification_questions");
        questions.truncate(self.config.max_clarification_questions);
        let clarification_questions = if context.forced {
            if !questions.is_empty() {
                info!(
                    dropped = questions.len(),
                    "forced classification returned questions, ignoring them"
                );
            }
            None
        } else if questions.is_empty() {
            None
        } else {
            Some(questions)
        };

        if diagnosis.is_empty() && clarification_questions.is_none() {
            if confidence_rationale.is_empty() {
                return Err(StageError::Parse {
                    reason: "classification has no diagnosis".to_string(),
                });
            }
            info!(
                confidence,
                rationale = %confidence_rationale,
                "classification declined to answer, marking inconclusive"
            );
            diagnosis = INCONCLUSIVE.to_string();
        }

        let citations = rank_citations(
            &response.citations,
            self.ranker,
            self.config.citation_cap,
            self.config.citation_order,
        );

        debug!(
            diagnosis = %diagnosis,
            confidence,
            citations = citations.len(),
            provisional = clarification_questions.is_some(),
            "classification parsed"
        );

        Ok(ClassificationOutcome {
            diagnosis,
            confidence,
            confidence_rationale,
            citations,
            clarification_questions,
            differential: string_list(value, "differential"),
        })
    }
}
