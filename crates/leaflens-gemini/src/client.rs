//! The async `generateContent` client.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use leaflens_contracts::{
    error::{LeafLensError, LeafLensResult},
    generation::{Generation, GenerationError, GenerationRequest},
};
use leaflens_core::traits::GenerationClient;

use crate::{
    config::GeminiConfig,
    wire::{build_body, http_error, parse_response},
};

/// `GenerationClient` backed by the Gemini REST API.
///
/// One `reqwest::Client` is shared by all calls, so a single `GeminiClient`
/// can serve concurrent runs. Each call is independent and never retried.
pub struct GeminiClient {
    config: GeminiConfig,
    endpoint: String,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> LeafLensResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LeafLensError::ConfigError {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            endpoint: config.endpoint(),
            config,
            http,
        })
    }

    /// Build a client from `GEMINI_*` environment variables.
    pub fn from_env() -> LeafLensResult<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn response_json_or_error(response: reqwest::Response) -> Result<Value, GenerationError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::transport(format!("gemini response body read failed: {e}")))?;
        if !status.is_success() {
            return Err(http_error(status.as_u16(), &body));
        }
        serde_json::from_str(&body)
            .map_err(|e| GenerationError::transport(format!("gemini returned invalid JSON payload: {e}")))
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, GenerationError> {
        let body = build_body(&request);
        debug!(
            model = %self.config.model,
            shape_id = request.shape_id().unwrap_or("none"),
            images = request.images.len(),
            grounded = request.grounded,
            "sending generateContent request"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() { "timed out" } else { "failed" };
                warn!(error = %e, "gemini request {kind}");
                GenerationError::transport(format!("gemini request {kind}: {e}"))
            })?;

        let payload = Self::response_json_or_error(response).await?;
        let generation = parse_response(&payload)?;
        debug!(
            chars = generation.text.len(),
            citations = generation.citations.len(),
            "gemini response parsed"
        );
        Ok(generation)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use leaflens_contracts::generation::GenerationErrorKind;

    use super::*;

    #[test]
    fn endpoint_comes_from_config() {
        let client = GeminiClient::new(GeminiConfig::new("k").with_model("gemini-2.0-flash")).unwrap();
        assert!(client.endpoint.ends_with("/models/gemini-2.0-flash:generateContent"));
        assert_eq!(client.model(), "gemini-2.0-flash");
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        let mut config = GeminiConfig::new("k").with_api_base("http://127.0.0.1:9");
        config.timeout = Duration::from_secs(2);
        let client = GeminiClient::new(config).unwrap();

        let err = client
            .generate(GenerationRequest::text("hello"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::Transport);
    }
}
