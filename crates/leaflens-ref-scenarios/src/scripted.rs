//! A `GenerationClient` that replays canned responses.
//!
//! Responses are queued per response-shape id, so a script reads like the
//! pipeline itself: "the observation call returns X, the classification call
//! returns Y". Every call is recorded for assertions.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use leaflens_contracts::generation::{Generation, GenerationError, GenerationRequest, RawCitation};
use leaflens_core::traits::GenerationClient;

/// What the scripted client saw for one call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub shape_id: String,
    pub grounded: bool,
    pub images: usize,
    pub prompt: String,
}

#[derive(Default)]
pub struct ScriptedClient {
    script: Mutex<HashMap<String, VecDeque<Result<Generation, GenerationError>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a plain text answer for calls with `shape_id`.
    pub fn on(self, shape_id: &str, text: &str) -> Self {
        self.push(shape_id, Ok(Generation::text(text)))
    }

    /// Queue an answer that carries grounding citations.
    pub fn on_with_citations(self, shape_id: &str, text: &str, citations: Vec<RawCitation>) -> Self {
        self.push(shape_id, Ok(Generation::text(text).with_citations(citations)))
    }

    /// Queue a failure for calls with `shape_id`.
    pub fn fail_on(self, shape_id: &str, error: GenerationError) -> Self {
        self.push(shape_id, Err(error))
    }

    fn push(self, shape_id: &str, entry: Result<Generation, GenerationError>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.entry(shape_id.to_string()).or_default().push_back(entry);
        }
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn calls_for(&self, shape_id: &str) -> usize {
        self.calls().iter().filter(|c| c.shape_id == shape_id).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls().len()
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, GenerationError> {
        let shape_id = request.shape_id().unwrap_or("unshaped").to_string();
        debug!(shape_id = %shape_id, grounded = request.grounded, "scripted generation call");

        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                shape_id: shape_id.clone(),
                grounded: request.grounded,
                images: request.images.len(),
                prompt: request.prompt.clone(),
            });
        }

        self.script
            .lock()
            .ok()
            .and_then(|mut script| script.get_mut(&shape_id).and_then(VecDeque::pop_front))
            .unwrap_or_else(|| {
                Err(GenerationError::transport(format!(
                    "no scripted response left for '{shape_id}'"
                )))
            })
    }
}

#[cfg(test)]
mod tests {
    use leaflens_contracts::generation::GenerationErrorKind;

    use super::*;

    fn shaped(shape_id: &str) -> GenerationRequest {
        let mut request = GenerationRequest::text("prompt");
        request.response_shape = Some(leaflens_contracts::shape::ResponseShape {
            shape_id: shape_id.to_string(),
            json_schema: serde_json::Value::Null,
            rules: vec![],
        });
        request
    }

    #[tokio::test]
    async fn answers_are_routed_by_shape() {
        let client = ScriptedClient::new().on("a", "first a").on("b", "only b").on("a", "second a");

        assert_eq!(client.generate(shaped("b")).await.unwrap().text, "only b");
        assert_eq!(client.generate(shaped("a")).await.unwrap().text, "first a");
        assert_eq!(client.generate(shaped("a")).await.unwrap().text, "second a");
        assert_eq!(client.calls_for("a"), 2);
        assert_eq!(client.total_calls(), 3);
    }

    #[tokio::test]
    async fn exhausted_script_is_transport_error() {
        let client = ScriptedClient::new();
        let err = client.generate(shaped("a")).await.unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::Transport);
        assert_eq!(client.total_calls(), 1);
    }
}
