//! The three reasoning stages.
//!
//! Each stage makes at most one generation call, parses the response at the
//! boundary into a typed outcome, and reports failure as a `StageError`
//! without stage context. The orchestrator attaches the stage.

pub mod advisor;
pub mod analyzer;
pub mod classifier;

use serde_json::Value;
use tracing::{debug, warn};

use leaflens_contracts::{
    error::StageError,
    generation::{GenerationRequest, RawCitation},
    request::AnalysisMode,
};

use crate::traits::{GenerationClient, ResponseVerifier};

pub use advisor::Advisor;
pub use analyzer::Analyzer;
pub use classifier::Classifier;

/// Free-text context shared by the Classifier and Advisor, plus the
/// structured forced-finalization marker.
#[derive(Debug, Clone)]
pub struct StageContext {
    pub mode: AnalysisMode,
    pub text: String,
    /// The caller already answered a clarification round; the Classifier
    /// must commit to an answer.
    pub forced: bool,
}

/// A verified JSON response and the citations that came with it.
pub(crate) struct StructuredResponse {
    pub value: Value,
    pub citations: Vec<RawCitation>,
}

/// Issue one generation call and verify the response against the request's
/// shape.
pub(crate) async fn call_structured(
    client: &dyn GenerationClient,
    verifier: &dyn ResponseVerifier,
    request: GenerationRequest,
) -> Result<StructuredResponse, StageError> {
    let shape = request.response_shape.clone().ok_or_else(|| StageError::Parse {
        reason: "structured call issued without a response shape".to_string(),
    })?;

    debug!(
        shape_id = %shape.shape_id,
        images = request.images.len(),
        grounded = request.grounded,
        "issuing generation call"
    );

    let generation = client
        .generate(request)
        .await
        .map_err(|e| StageError::Generation { reason: e.to_string() })?;

    let value = parse_json_response(&generation.text).ok_or_else(|| StageError::Parse {
        reason: format!(
            "response for '{}' is not a JSON object: {}",
            shape.shape_id,
            excerpt(&generation.text)
        ),
    })?;

    let report = verifier
        .verify(&value, &shape)
        .map_err(|e| StageError::Parse { reason: e.to_string() })?;
    if !report.passed {
        let summary = report.summary();
        warn!(shape_id = %shape.shape_id, failures = %summary, "response failed verification");
        return Err(StageError::Parse { reason: summary });
    }

    Ok(StructuredResponse {
        value,
        citations: generation.citations,
    })
}

/// Extract a JSON object from model text.
///
/// Tolerates Markdown code fences and prose around the object by falling
/// back to the outermost `{ … }` span.
pub fn parse_json_response(text: &str) -> Option<Value> {
    let trimmed = strip_code_fence(text.trim());
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&trimmed[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening fence line.
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Trimmed, non-blank strings from a JSON array field.
pub(crate) fn string_list(value: &Value, field: &str) -> Vec<String> {
    value[field]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn excerpt(text: &str) -> String {
    const MAX: usize = 120;
    let text = text.trim();
    if text.chars().count() <= MAX {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX).collect();
    format!("{cut}…")
}
