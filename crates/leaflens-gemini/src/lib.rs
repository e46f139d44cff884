//! # leaflens-gemini
//!
//! A [`GenerationClient`](leaflens_core::traits::GenerationClient) backed by
//! the Gemini `generateContent` REST endpoint.
//!
//! - Images are sent inline as base64, ahead of the prompt text.
//! - Ungrounded calls with a response shape use JSON response mode.
//! - Grounded calls enable the Google Search tool and return the grounding
//!   chunks as raw citations.
//! - Quota errors map to `RateLimited`, blocked content to `PolicyRejected`,
//!   everything else to `Transport`.
//!
//! ```rust,ignore
//! use leaflens_gemini::GeminiClient;
//!
//! let client = std::sync::Arc::new(GeminiClient::from_env()?);
//! ```

pub mod client;
pub mod config;
pub mod wire;

pub use client::GeminiClient;
pub use config::GeminiConfig;
