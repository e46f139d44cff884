//! Schema-based response verifier for the LeafLens pipeline.
//!
//! `SchemaVerifier` implements the `ResponseVerifier` trait from
//! `leaflens-core`. Verification runs in two phases:
//!
//! 1. **Structural**: the parsed response is validated against the shape's
//!    JSON Schema document using the `jsonschema` crate.
//! 2. **Rules**: each `ShapeRule` is evaluated in order. All failures are
//!    collected before returning so the stage error lists them together.
//!
//! Custom rules delegate to named functions registered via `register_rule`.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use leaflens_contracts::{
    error::{LeafLensError, LeafLensResult},
    shape::{ResponseShape, ShapeRuleType, VerificationFailure, VerificationReport},
};
use leaflens_core::traits::ResponseVerifier;

use crate::rules;

/// A caller-supplied check on the whole parsed response.
///
/// Returns `Some(message)` when the check fails, `None` on success.
pub type CustomRuleFn = Box<dyn Fn(&Value) -> Option<String> + Send + Sync>;

pub struct SchemaVerifier {
    custom_rules: HashMap<String, CustomRuleFn>,
}

impl SchemaVerifier {
    /// A verifier with no custom rules registered.
    pub fn new() -> Self {
        Self {
            custom_rules: HashMap::new(),
        }
    }

    /// A verifier with the rules the built-in stage shapes reference.
    pub fn with_standard_rules() -> Self {
        let mut verifier = Self::new();
        verifier.register_rule(rules::CONFIDENCE_SCALE, Box::new(rules::confidence_scale));
        verifier
    }

    /// Register a custom rule under `name`, replacing any previous one.
    ///
    /// The name must match `function_name` in `ShapeRuleType::Custom`.
    pub fn register_rule(&mut self, name: impl Into<String>, f: CustomRuleFn) {
        self.custom_rules.insert(name.into(), f);
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    /// Resolve a dotted path (e.g. `"advice.treatment"`). `None` when any
    /// segment is missing or the value is JSON `null`.
    fn resolve_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
        let mut current = value;
        for segment in path.split('.') {
            match current.get(segment) {
                Some(v) if !v.is_null() => current = v,
                _ => return None,
            }
        }
        Some(current)
    }

    fn check_rule(&self, response: &Value, rule_type: &ShapeRuleType) -> Option<String> {
        match rule_type {
            ShapeRuleType::RequiredField { field_path } => Self::resolve_path(response, field_path)
                .is_none()
                .then(|| format!("required field '{field_path}' is missing or null")),

            ShapeRuleType::AllowedValues { field_path, allowed } => {
                match Self::resolve_path(response, field_path) {
                    None => Some(format!(
                        "field '{field_path}' is missing; cannot check allowed values"
                    )),
                    Some(actual) if allowed.contains(actual) => None,
                    Some(actual) => Some(format!(
                        "field '{field_path}' has value {actual} which is not in the allowed set"
                    )),
                }
            }

            // Only string values are checked; an absent field passes.
            ShapeRuleType::ForbiddenPattern { field_path, pattern } => {
                Self::resolve_path(response, field_path)
                    .and_then(Value::as_str)
                    .filter(|s| s.contains(pattern.as_str()))
                    .map(|_| format!("field '{field_path}' contains forbidden pattern '{pattern}'"))
            }

            // An unregistered name fails so misconfigured shapes surface.
            ShapeRuleType::Custom { function_name } => {
                match self.custom_rules.get(function_name.as_str()) {
                    Some(f) => f(response),
                    None => Some(format!(
                        "no custom rule registered for function name '{function_name}'"
                    )),
                }
            }
        }
    }
}

impl Default for SchemaVerifier {
    fn default() -> Self {
        Self::with_standard_rules()
    }
}

impl ResponseVerifier for SchemaVerifier {
    /// Verify `response` against `shape`, accumulating every failure.
    ///
    /// A JSON Schema document that does not compile is an `Err`, not a
    /// failed report: the shape is broken, not the response.
    fn verify(&self, response: &Value, shape: &ResponseShape) -> LeafLensResult<VerificationReport> {
        let mut failures: Vec<VerificationFailure> = Vec::new();

        // ── Phase 1: JSON Schema structural validation ────────────────────────
        if !shape.json_schema.is_null() {
            let validator = jsonschema::validator_for(&shape.json_schema).map_err(|e| {
                LeafLensError::SchemaValidation {
                    reason: format!("shape '{}' has an invalid JSON Schema: {e}", shape.shape_id),
                }
            })?;
            for error in validator.iter_errors(response) {
                let message = format!("JSON Schema violation at {}: {}", error.instance_path, error);
                warn!(shape_id = %shape.shape_id, %message, "structural validation failure");
                failures.push(VerificationFailure {
                    rule_id: "json-schema".to_string(),
                    message,
                });
            }
        }

        // ── Phase 2: Shape rules ─────────────────────────────────────────────
        for rule in &shape.rules {
            debug!(rule_id = %rule.rule_id, description = %rule.description, "evaluating shape rule");
            if let Some(message) = self.check_rule(response, &rule.rule_type) {
                warn!(rule_id = %rule.rule_id, %message, "shape rule failed");
                failures.push(VerificationFailure {
                    rule_id: rule.rule_id.clone(),
                    message,
                });
            }
        }

        let passed = failures.is_empty();
        debug!(
            shape_id = %shape.shape_id,
            passed,
            failure_count = failures.len(),
            "verification complete"
        );

        Ok(VerificationReport { passed, failures })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use leaflens_contracts::shape::ShapeRule;
    use leaflens_core::stages::{
        advisor::advice_shape, analyzer::observation_shape, classifier::classification_shape,
    };

    use super::*;

    fn make_shape(json_schema: Value, rules: Vec<ShapeRule>) -> ResponseShape {
        ResponseShape {
            shape_id: "test-shape-v1".to_string(),
            json_schema,
            rules,
        }
    }

    fn rule(id: &str, rule_type: ShapeRuleType) -> ShapeRule {
        ShapeRule {
            rule_id: id.to_string(),
            description: format!("{id} rule"),
            rule_type,
        }
    }

    // ── JSON Schema ──────────────────────────────────────────────────────────

    #[test]
    fn schema_pass() {
        let verifier = SchemaVerifier::new();
        let shape = make_shape(
            json!({
                "type": "object",
                "properties": { "observation": { "type": "string" } },
                "required": ["observation"]
            }),
            vec![],
        );

        let report = verifier.verify(&json!({ "observation": "spots" }), &shape).unwrap();
        assert!(report.passed, "expected pass, failures: {:?}", report.failures);
    }

    #[test]
    fn schema_fail_reports_json_schema_rule() {
        let verifier = SchemaVerifier::new();
        let shape = make_shape(
            json!({
                "type": "object",
                "properties": { "observation": { "type": "string" } },
                "required": ["observation"]
            }),
            vec![],
        );

        let report = verifier.verify(&json!({ "other": 42 }), &shape).unwrap();
        assert!(!report.passed);
        assert_eq!(report.failures[0].rule_id, "json-schema");
    }

    #[test]
    fn invalid_schema_document_is_an_error() {
        let verifier = SchemaVerifier::new();
        let shape = make_shape(json!({ "type": "not-a-type" }), vec![]);

        let err = verifier.verify(&json!({}), &shape).unwrap_err();
        match err {
            LeafLensError::SchemaValidation { reason } => assert!(reason.contains("test-shape-v1")),
            other => panic!("expected SchemaValidation, got {:?}", other),
        }
    }

    // ── Rules ────────────────────────────────────────────────────────────────

    #[test]
    fn required_field_resolves_dotted_paths() {
        let verifier = SchemaVerifier::new();
        let shape = make_shape(
            Value::Null,
            vec![rule(
                "req-treatment",
                ShapeRuleType::RequiredField {
                    field_path: "advice.treatment".to_string(),
                },
            )],
        );

        let ok = verifier.verify(&json!({ "advice": { "treatment": [] } }), &shape).unwrap();
        assert!(ok.passed);

        let missing = verifier.verify(&json!({ "advice": null }), &shape).unwrap();
        assert!(!missing.passed);
        assert_eq!(missing.failures[0].rule_id, "req-treatment");
        assert!(missing.failures[0].message.contains("advice.treatment"));
    }

    #[test]
    fn allowed_values() {
        let verifier = SchemaVerifier::new();
        let shape = make_shape(
            Value::Null,
            vec![rule(
                "subject-tag",
                ShapeRuleType::AllowedValues {
                    field_path: "subject".to_string(),
                    allowed: vec![json!("plant"), json!("not_plant")],
                },
            )],
        );

        assert!(verifier.verify(&json!({ "subject": "plant" }), &shape).unwrap().passed);
        let report = verifier.verify(&json!({ "subject": "mug" }), &shape).unwrap();
        assert!(!report.passed);
        assert_eq!(report.failures[0].rule_id, "subject-tag");
    }

    #[test]
    fn forbidden_pattern_checks_strings_only() {
        let verifier = SchemaVerifier::new();
        let shape = make_shape(
            Value::Null,
            vec![rule(
                "no-placeholder",
                ShapeRuleType::ForbiddenPattern {
                    field_path: "diagnosis".to_string(),
                    pattern: "unknown".to_string(),
                },
            )],
        );

        let report = verifier.verify(&json!({ "diagnosis": "unknown fungus" }), &shape).unwrap();
        assert!(!report.passed);
        assert!(report.failures[0].message.contains("unknown"));

        assert!(verifier.verify(&json!({ "diagnosis": 5 }), &shape).unwrap().passed);
        assert!(verifier.verify(&json!({}), &shape).unwrap().passed);
    }

    #[test]
    fn custom_rule_pass_and_fail() {
        let mut verifier = SchemaVerifier::new();
        verifier.register_rule("always-pass", Box::new(|_| None));
        verifier.register_rule("always-fail", Box::new(|_| Some("condition not met".to_string())));

        let pass = make_shape(
            Value::Null,
            vec![rule("custom", ShapeRuleType::Custom { function_name: "always-pass".to_string() })],
        );
        assert!(verifier.verify(&json!({}), &pass).unwrap().passed);

        let fail = make_shape(
            Value::Null,
            vec![rule("custom", ShapeRuleType::Custom { function_name: "always-fail".to_string() })],
        );
        let report = verifier.verify(&json!({}), &fail).unwrap();
        assert_eq!(report.failures[0].rule_id, "custom");
        assert!(report.failures[0].message.contains("condition not met"));
    }

    #[test]
    fn unregistered_custom_rule_fails() {
        let verifier = SchemaVerifier::new();
        let shape = make_shape(
            Value::Null,
            vec![rule(
                "phantom",
                ShapeRuleType::Custom { function_name: "does-not-exist".to_string() },
            )],
        );

        let report = verifier.verify(&json!({}), &shape).unwrap();
        assert!(!report.passed);
        assert!(report.failures[0].message.contains("does-not-exist"));
    }

    #[test]
    fn failures_accumulate() {
        let verifier = SchemaVerifier::new();
        let report = verifier.verify(&json!({ "subject": "mug" }), &observation_shape()).unwrap();
        assert!(!report.passed);
        assert!(report.failures.len() >= 2, "schema and rule failures: {:?}", report.failures);
    }

    // ── Stage shapes ─────────────────────────────────────────────────────────

    #[test]
    fn stage_shapes_accept_well_formed_responses() {
        let verifier = SchemaVerifier::with_standard_rules();

        let observation = json!({ "subject": "plant", "observation": "Yellowing margins." });
        assert!(verifier.verify(&observation, &observation_shape()).unwrap().passed);

        let classification = json!({
            "diagnosis": "Early blight",
            "confidence": "85%",
            "confidence_rationale": "Matches sources",
            "clarification_questions": [],
            "differential": []
        });
        let report = verifier.verify(&classification, &classification_shape()).unwrap();
        assert!(report.passed, "failures: {:?}", report.failures);

        let advice = json!({ "treatment": ["a"], "prevention": [] });
        assert!(verifier.verify(&advice, &advice_shape()).unwrap().passed);
    }

    #[test]
    fn observation_shape_rejects_a_diagnosis_line() {
        let verifier = SchemaVerifier::with_standard_rules();
        let observation = json!({
            "subject": "plant",
            "observation": "Brown concentric rings on lower leaves.\nDiagnosis: early blight"
        });

        let report = verifier.verify(&observation, &observation_shape()).unwrap();
        assert!(!report.passed);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].rule_id, "no-diagnosis");
        assert!(report.failures[0].message.contains("Diagnosis:"));
    }

    #[test]
    fn classification_shape_rejects_bad_confidence() {
        let verifier = SchemaVerifier::with_standard_rules();
        let classification = json!({ "diagnosis": "Rust", "confidence": "very sure" });

        let report = verifier.verify(&classification, &classification_shape()).unwrap();
        assert!(!report.passed);
        assert!(report.summary().contains(rules::CONFIDENCE_SCALE));
    }
}
