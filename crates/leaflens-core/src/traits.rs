//! Core trait definitions for the LeafLens pipeline.
//!
//! These four traits are the seams the orchestrator is built around:
//!
//! - `GenerationClient`: the external multimodal model (untrusted output)
//! - `ResponseVerifier`: checks parsed responses against a `ResponseShape`
//! - `AuthorityRanker`: assigns an authority tier to a grounding source
//! - `StatusObserver`: receives stage-transition events
//!
//! Every dependency is injected at construction; nothing in the core reaches
//! for a process-wide client.

use async_trait::async_trait;
use serde_json::Value;

use leaflens_contracts::{
    error::LeafLensResult,
    generation::{Generation, GenerationError, GenerationRequest, RawCitation},
    outcome::SourceAuthority,
    shape::{ResponseShape, VerificationReport},
    status::StatusEvent,
};

/// The generation capability: given a prompt, optional images and an
/// optional response shape, return text plus any grounding citations.
///
/// Implementations own their connection handling and per-call timeouts. The
/// pipeline treats every call as stateless and never retries.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, GenerationError>;
}

/// Checks a parsed response before any stage reads fields out of it.
///
/// Return a report with `passed = false` for a response that does not fit
/// the shape. Reserve `Err` for an unusable shape document.
pub trait ResponseVerifier: Send + Sync {
    fn verify(&self, response: &Value, shape: &ResponseShape) -> LeafLensResult<VerificationReport>;
}

/// Classifies a grounding source into the primary/secondary/tertiary
/// authority hierarchy. Must be deterministic.
pub trait AuthorityRanker: Send + Sync {
    fn authority(&self, citation: &RawCitation) -> SourceAuthority;
}

/// Receives one event per orchestrator state transition.
///
/// Observers are notified synchronously and cannot influence control flow;
/// keep implementations cheap and non-blocking.
pub trait StatusObserver: Send + Sync {
    fn on_status(&self, event: &StatusEvent);
}

impl<F> StatusObserver for F
where
    F: Fn(&StatusEvent) + Send + Sync,
{
    fn on_status(&self, event: &StatusEvent) {
        self(event)
    }
}
