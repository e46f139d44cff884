//! # leaflens-contracts
//!
//! Shared types, response shapes, and error contracts for the LeafLens plant
//! analysis pipeline.
//!
//! All crates in the workspace import from here. No pipeline logic lives in
//! this crate, only data definitions and error types.

pub mod error;
pub mod generation;
pub mod outcome;
pub mod request;
pub mod shape;
pub mod status;
