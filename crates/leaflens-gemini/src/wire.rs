//! `generateContent` request and response bodies.
//!
//! Kept free of I/O so the JSON mapping can be tested without a network.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Map, Value};

use leaflens_contracts::generation::{Generation, GenerationError, GenerationRequest, RawCitation};

/// Finish reasons that mean the answer was withheld on content grounds.
const POLICY_FINISH_REASONS: [&str; 4] = ["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];

/// Build the JSON body for one request.
///
/// Images go first as `inlineData` parts, the prompt text last. A response
/// shape is forwarded as `responseJsonSchema` only for ungrounded calls; the
/// search tool cannot be combined with a JSON response mode.
pub fn build_body(request: &GenerationRequest) -> Value {
    let mut parts: Vec<Value> = request
        .images
        .iter()
        .map(|image| {
            json!({
                "inlineData": {
                    "mimeType": image.mime_type,
                    "data": BASE64.encode(&image.bytes),
                }
            })
        })
        .collect();
    parts.push(json!({ "text": request.prompt }));

    let mut generation_config = Map::new();
    if let Some(temperature) = request.temperature {
        generation_config.insert("temperature".to_string(), json!(temperature));
    }
    if let (Some(shape), false) = (&request.response_shape, request.grounded) {
        generation_config.insert("responseMimeType".to_string(), json!("application/json"));
        generation_config.insert("responseJsonSchema".to_string(), shape.json_schema.clone());
    }

    let mut body = json!({
        "contents": [{ "role": "user", "parts": parts }],
    });
    if !generation_config.is_empty() {
        body["generationConfig"] = Value::Object(generation_config);
    }
    if request.grounded {
        body["tools"] = json!([{ "google_search": {} }]);
    }
    body
}

/// Extract the answer text and grounding citations from a success body.
pub fn parse_response(payload: &Value) -> Result<Generation, GenerationError> {
    if let Some(reason) = payload["promptFeedback"]["blockReason"].as_str() {
        return Err(GenerationError::policy_rejected(format!("prompt blocked: {reason}")));
    }

    let candidate = payload["candidates"]
        .as_array()
        .and_then(|c| c.first())
        .ok_or_else(|| GenerationError::transport("gemini response has no candidates"))?;

    if let Some(reason) = candidate["finishReason"].as_str() {
        if POLICY_FINISH_REASONS.contains(&reason) {
            return Err(GenerationError::policy_rejected(format!(
                "response withheld: finish reason {reason}"
            )));
        }
    }

    let text: String = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter(|p| !p["thought"].as_bool().unwrap_or(false))
                .filter_map(|p| p["text"].as_str())
                .collect()
        })
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(GenerationError::transport("gemini candidate has no text"));
    }

    let citations: Vec<RawCitation> = candidate["groundingMetadata"]["groundingChunks"]
        .as_array()
        .map(|chunks| {
            chunks
                .iter()
                .filter_map(|chunk| {
                    let web = &chunk["web"];
                    let uri = web["uri"].as_str()?;
                    Some(RawCitation::new(web["title"].as_str().unwrap_or_default(), uri))
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Generation { text, citations })
}

/// Map a non-success HTTP response to a `GenerationError`.
pub fn http_error(status: u16, body: &str) -> GenerationError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let api_status = parsed
        .as_ref()
        .and_then(|v| v["error"]["status"].as_str())
        .unwrap_or_default()
        .to_string();
    let message = parsed
        .as_ref()
        .and_then(|v| v["error"]["message"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| truncate_text(body.trim(), 512));

    let detail = format!("gemini request failed ({status} {api_status}): {message}");
    if status == 429 || api_status == "RESOURCE_EXHAUSTED" {
        GenerationError::rate_limited(detail)
    } else {
        GenerationError::transport(detail)
    }
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}
