//! # leaflens-ref-scenarios
//!
//! Reference runs of the LeafLens pipeline against scripted model output.
//!
//! Demonstrates four scenarios with canned responses:
//!
//! 1. **Healthy leaf**: the full Analyzer → Classifier → Advisor chain.
//! 2. **Blurry leaf**: the Classifier asks for clarification, the grower
//!    answers, and the forced re-entry commits to a diagnosis.
//! 3. **Not a plant**: the Analyzer rejects the subject and the run ends
//!    without further calls.
//! 4. **Quota failure**: the Classifier call fails and the error names the
//!    stage.
//!
//! All data is hardcoded. No external API calls are made.

pub mod mock_data;
pub mod scenarios;
pub mod scripted;

pub use scripted::ScriptedClient;
