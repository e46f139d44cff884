//! # leaflens-sources
//!
//! TOML-driven authority ranking of grounding sources.
//!
//! ## Overview
//!
//! This crate provides [`TomlAuthorityRanker`], which implements the
//! [`AuthorityRanker`](leaflens_core::traits::AuthorityRanker) trait. Host
//! rules are declared in a TOML file, evaluated in order, and the first
//! matching rule decides the tier. Unmatched sources are tertiary.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use leaflens_sources::TomlAuthorityRanker;
//!
//! let ranker = TomlAuthorityRanker::builtin()?;
//! // Pass `Box::new(ranker)` to `leaflens_core::Orchestrator::new(...)`.
//! ```

pub mod engine;
pub mod rule;

pub use engine::TomlAuthorityRanker;
