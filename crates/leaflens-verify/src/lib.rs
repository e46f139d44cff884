//! # leaflens-verify
//!
//! Response verification for the LeafLens pipeline.
//!
//! This crate provides [`engine::SchemaVerifier`], which implements the
//! [`leaflens_core::traits::ResponseVerifier`] trait. It checks parsed model
//! responses in two phases:
//!
//! 1. **Structural**: JSON Schema validation via the `jsonschema` crate.
//! 2. **Rules**: `RequiredField`, `AllowedValues`, `ForbiddenPattern` and
//!    `Custom` evaluated against the response.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use leaflens_verify::engine::SchemaVerifier;
//!
//! let mut verifier = SchemaVerifier::with_standard_rules();
//! verifier.register_rule("short-diagnosis", Box::new(|response| {
//!     let len = response["diagnosis"].as_str().map_or(0, str::len);
//!     (len > 120).then(|| "diagnosis is too long".to_string())
//! }));
//! ```

pub mod engine;
pub mod rules;

pub use engine::SchemaVerifier;
