//! Response shape and verification report types.
//!
//! Every stage that asks for structured output attaches a `ResponseShape` to
//! its generation request and runs the parsed response through the verifier
//! before trusting any field of it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The structure a stage expects back from the generation capability.
///
/// Combines a JSON Schema document (also forwarded to the backend) with
/// domain rules JSON Schema cannot express cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseShape {
    /// Unique identifier (e.g. "classification-v1").
    pub shape_id: String,
    /// JSON Schema used for structural validation.
    pub json_schema: Value,
    /// Rules evaluated after structural validation.
    pub rules: Vec<ShapeRule>,
}

/// A single rule applied to a parsed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeRule {
    /// Referenced in failure reports.
    pub rule_id: String,
    pub description: String,
    pub rule_type: ShapeRuleType,
}

/// The rule kinds the verifier understands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ShapeRuleType {
    /// The field at `field_path` must be present and non-null.
    RequiredField {
        /// Dotted path, e.g. "advice.treatment".
        field_path: String,
    },

    /// The field at `field_path` must equal one of `allowed`.
    AllowedValues {
        field_path: String,
        allowed: Vec<Value>,
    },

    /// The string at `field_path` must not contain `pattern` (substring match).
    ForbiddenPattern {
        field_path: String,
        pattern: String,
    },

    /// Delegate to a function registered with the verifier under this name.
    Custom {
        function_name: String,
    },
}

/// The result of checking one response against a `ResponseShape`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True only if every check passed.
    pub passed: bool,
    /// Empty on pass.
    pub failures: Vec<VerificationFailure>,
}

impl VerificationReport {
    /// One-line summary of all failures, `"[rule] message; ..."`.
    pub fn summary(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("[{}] {}", f.rule_id, f.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A single failed check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationFailure {
    pub rule_id: String,
    pub message: String,
}
