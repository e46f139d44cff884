//! Scenario 3: Not a Plant
//!
//! The grower photographs their cat by mistake. The Analyzer flags the
//! subject and the run ends before any grounded search is spent.
//!
//! Pipeline walk-through for the demo run:
//!   1. Analyzer returns the not-a-plant sentinel
//!   2. Orchestrator emits Done straight from Analyzing
//!   3. Result carries the "Not a Plant" diagnosis with zero confidence
//!   4. Classifier and Advisor are never called

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use leaflens_contracts::{
    error::LeafLensResult,
    outcome::AnalysisResult,
    request::{AnalysisMode, AnalysisRequest},
};
use leaflens_core::stages::analyzer::OBSERVATION_SHAPE_ID;

use super::{orchestrator, print_result, printing_observers};
use crate::{mock_data, scripted::ScriptedClient};

/// Only the Analyzer is scripted. A later call would fail with a transport
/// error and surface as a stage failure.
pub fn scripted_client() -> ScriptedClient {
    ScriptedClient::new().on(OBSERVATION_SHAPE_ID, mock_data::NOT_A_PLANT_OBSERVATION)
}

async fn run(client: &Arc<ScriptedClient>) -> LeafLensResult<AnalysisResult> {
    let request = AnalysisRequest::new(vec![mock_data::photo(9)], AnalysisMode::Identification)?;
    orchestrator(client)?
        .analyze(&request, &printing_observers(), &CancellationToken::new())
        .await
}

/// Run Scenario 3: Not a Plant.
pub async fn run_scenario() -> LeafLensResult<()> {
    println!("=== Scenario 3: Not a Plant ===");
    println!();
    println!("  Photo: 1 image, identification mode, no crop metadata");
    println!();

    let client = Arc::new(scripted_client());
    let result = run(&client).await?;
    info!(run_id = %result.run_id, outcome = ?result.outcome, "not-a-plant scenario finished");

    print_result(&result);
    println!();
    println!("  Generation calls: {} (analyzer only)", client.total_calls());
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use leaflens_contracts::{
        outcome::{ResultKind, NOT_A_PLANT},
        status::PipelineState,
    };

    use super::*;
    use crate::scenarios::recording_observers;

    #[tokio::test]
    async fn run_ends_after_the_analyzer() {
        let client = Arc::new(scripted_client());
        let result = run(&client).await.unwrap();

        assert_eq!(result.outcome, ResultKind::NotAPlant);
        assert_eq!(result.diagnosis, NOT_A_PLANT);
        assert_eq!(result.confidence, 0);
        assert!(result.treatment.is_empty());
        assert!(result.prevention.is_empty());
        assert!(result.citations.is_empty());
        assert!(result.missing_info.is_none());
        assert_eq!(client.total_calls(), 1);
    }

    #[tokio::test]
    async fn status_goes_straight_to_done() {
        let client = Arc::new(scripted_client());
        let (observers, seen) = recording_observers();
        let request =
            AnalysisRequest::new(vec![mock_data::photo(9)], AnalysisMode::Diagnosis).unwrap();

        orchestrator(&client)
            .unwrap()
            .analyze(&request, &observers, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![PipelineState::Analyzing, PipelineState::Done]
        );
    }

    #[tokio::test]
    async fn scenario_runs_to_completion() {
        run_scenario().await.unwrap();
    }
}
