//! Scenario 4: Quota Failure
//!
//! The generation backend runs out of quota during the grounded search.
//! The run fails and the error names the Classifier stage.
//!
//! Pipeline walk-through for the demo run:
//!   1. Analyzer succeeds
//!   2. Classifier call fails with a rate-limit error
//!   3. Orchestrator aborts; no Advisor call, no Done event
//!   4. The caller gets `StageGenerationFailure { stage: Classifier, .. }`

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use leaflens_contracts::{
    error::LeafLensResult,
    generation::GenerationError,
    request::{AnalysisMode, AnalysisRequest, GrowthStage},
};
use leaflens_core::stages::{analyzer::OBSERVATION_SHAPE_ID, classifier::CLASSIFICATION_SHAPE_ID};

use super::{orchestrator, print_result, printing_observers};
use crate::{mock_data, scripted::ScriptedClient};

pub fn scripted_client() -> ScriptedClient {
    ScriptedClient::new()
        .on(OBSERVATION_SHAPE_ID, mock_data::SPOTTED_OBSERVATION)
        .fail_on(
            CLASSIFICATION_SHAPE_ID,
            GenerationError::rate_limited(
                "RESOURCE_EXHAUSTED: quota exceeded for generate_content requests per minute",
            ),
        )
}

pub fn request() -> LeafLensResult<AnalysisRequest> {
    Ok(AnalysisRequest::new(vec![mock_data::photo(4)], AnalysisMode::Diagnosis)?
        .with_crop("potato", GrowthStage::Vegetative))
}

/// Run Scenario 4: Quota Failure.
pub async fn run_scenario() -> LeafLensResult<()> {
    println!("=== Scenario 4: Quota Failure ===");
    println!();
    println!("  Photo: 1 image, potato, vegetative");
    println!("  Backend: quota exhausted for grounded calls");
    println!();

    let client = Arc::new(scripted_client());
    let result = orchestrator(&client)?
        .analyze(&request()?, &printing_observers(), &CancellationToken::new())
        .await;

    match result {
        Err(err) => {
            warn!(error = %err, "quota scenario failed as expected");
            println!();
            println!("  Error:  {err}");
            if let Some(stage) = err.stage() {
                println!("  Failed stage: {stage}");
            }
            println!("  The grower sees a retry prompt; no partial diagnosis is shown.");
        }
        Ok(result) => {
            println!("  UNEXPECTED: run completed despite the quota failure");
            print_result(&result);
        }
    }
    println!();
    Ok(())
}
