//! The generation capability contract.
//!
//! These are the request/response types exchanged with whatever backs the
//! `GenerationClient` trait. LeafLens never runs inference itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{request::ImagePayload, shape::ResponseShape};

/// One call to the generation capability.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Images sent with the prompt, in capture order. Empty for text-only calls.
    pub images: Vec<ImagePayload>,
    /// When present, the response text must be parseable against this shape.
    pub response_shape: Option<ResponseShape>,
    /// Sampling temperature. Low values request near-deterministic output.
    pub temperature: Option<f32>,
    /// Ask the backend to ground the answer in web search and return citations.
    pub grounded: bool,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            images: Vec::new(),
            response_shape: None,
            temperature: None,
            grounded: false,
        }
    }

    pub fn with_images(mut self, images: Vec<ImagePayload>) -> Self {
        self.images = images;
        self
    }

    pub fn with_shape(mut self, shape: ResponseShape) -> Self {
        self.response_shape = Some(shape);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn grounded(mut self) -> Self {
        self.grounded = true;
        self
    }

    /// The shape id, if a shape was attached.
    pub fn shape_id(&self) -> Option<&str> {
        self.response_shape.as_ref().map(|s| s.shape_id.as_str())
    }
}

/// A web source the backend reports having consulted. Unranked and possibly
/// duplicated; the Classifier stage cleans these up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCitation {
    pub title: String,
    pub uri: String,
}

impl RawCitation {
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
        }
    }
}

/// The backend's answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub citations: Vec<RawCitation>,
}

impl Generation {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }

    pub fn with_citations(mut self, citations: Vec<RawCitation>) -> Self {
        self.citations = citations;
        self
    }
}

/// Why the backend failed. The pipeline treats all kinds alike; the kind is
/// kept for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationErrorKind {
    Transport,
    RateLimited,
    PolicyRejected,
}

/// A failed generation call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {message}")]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    pub message: String,
}

impl GenerationError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: GenerationErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: GenerationErrorKind::RateLimited,
            message: message.into(),
        }
    }

    pub fn policy_rejected(message: impl Into<String>) -> Self {
        Self {
            kind: GenerationErrorKind::PolicyRejected,
            message: message.into(),
        }
    }
}
