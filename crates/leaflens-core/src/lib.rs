//! # leaflens-core
//!
//! The staged plant analysis runtime.
//!
//! This crate provides:
//! - The four seams (`GenerationClient`, `ResponseVerifier`,
//!   `AuthorityRanker`, `StatusObserver`)
//! - The Analyzer, Classifier and Advisor stages
//! - The `Orchestrator` that chains them with the clarification branch
//! - Confidence normalization and citation ranking
//!
//! ## Usage
//!
//! ```rust,ignore
//! use leaflens_core::{Orchestrator, PipelineConfig, StatusObservers};
//! use tokio_util::sync::CancellationToken;
//!
//! let orchestrator = Orchestrator::new(client, verifier, ranker, PipelineConfig::default())?;
//! let result = orchestrator.analyze(&request, &StatusObservers::none(), &CancellationToken::new()).await?;
//! ```

pub mod citations;
pub mod confidence;
pub mod config;
pub mod orchestrator;
pub mod prompts;
pub mod stages;
pub mod status;
pub mod traits;

pub use config::{CitationOrder, PipelineConfig};
pub use orchestrator::Orchestrator;
pub use status::{ChannelObserver, StatusObservers};
