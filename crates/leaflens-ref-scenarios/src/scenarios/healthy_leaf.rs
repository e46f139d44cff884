//! Scenario 1: Healthy Leaf
//!
//! A sharp photo of a healthy tomato plant runs through all three stages.
//!
//! Pipeline walk-through for the demo run:
//!   1. Analyzer describes uniform green foliage with no symptoms
//!   2. Classifier answers "Healthy Plant" at 0.93, normalized to 93%
//!   3. Duplicate citations are dropped and the rest ordered by authority
//!   4. Advisor returns three care steps and three prevention tips
//!   5. Status events run Analyzing → Classifying → Advising → Done

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use leaflens_contracts::{
    error::LeafLensResult,
    outcome::AnalysisResult,
    request::{AnalysisMode, AnalysisRequest, EnvironmentSnapshot, GrowthStage},
};
use leaflens_core::stages::{
    advisor::ADVICE_SHAPE_ID, analyzer::OBSERVATION_SHAPE_ID, classifier::CLASSIFICATION_SHAPE_ID,
};

use super::{orchestrator, print_result, printing_observers};
use crate::{mock_data, scripted::ScriptedClient};

pub fn scripted_client() -> ScriptedClient {
    ScriptedClient::new()
        .on(OBSERVATION_SHAPE_ID, mock_data::HEALTHY_OBSERVATION)
        .on_with_citations(
            CLASSIFICATION_SHAPE_ID,
            mock_data::HEALTHY_CLASSIFICATION,
            mock_data::healthy_citations(),
        )
        .on(ADVICE_SHAPE_ID, mock_data::HEALTHY_ADVICE)
}

pub fn request() -> LeafLensResult<AnalysisRequest> {
    Ok(AnalysisRequest::new(vec![mock_data::photo(1)], AnalysisMode::Diagnosis)?
        .with_crop("tomato", GrowthStage::Flowering)
        .with_notes("Checking before the heat wave; plants look fine to me.")
        .with_environment(EnvironmentSnapshot {
            temperature_c: Some(24.5),
            humidity_pct: Some(58.0),
            soil_moisture_pct: Some(41.0),
        }))
}

async fn run(client: &Arc<ScriptedClient>) -> LeafLensResult<AnalysisResult> {
    let orchestrator = orchestrator(client)?;
    orchestrator
        .analyze(&request()?, &printing_observers(), &CancellationToken::new())
        .await
}

/// Run Scenario 1: Healthy Leaf.
pub async fn run_scenario() -> LeafLensResult<()> {
    println!("=== Scenario 1: Healthy Leaf ===");
    println!();
    println!("  Photo:   1 image, tomato, flowering");
    println!("  Sensors: 24.5 °C, 58% humidity, 41% soil moisture");
    println!();

    let client = Arc::new(scripted_client());
    let result = run(&client).await?;
    info!(run_id = %result.run_id, calls = client.total_calls(), "healthy leaf scenario finished");

    print_result(&result);
    println!();
    println!("  Generation calls: {} (analyzer, classifier, advisor)", client.total_calls());
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use leaflens_contracts::{
        outcome::{ResultKind, SourceAuthority},
        status::PipelineState,
    };
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::scenarios::recording_observers;

    #[tokio::test]
    async fn full_chain_produces_a_diagnosis() {
        let client = Arc::new(scripted_client());
        let result = run(&client).await.unwrap();

        assert_eq!(result.outcome, ResultKind::Diagnosed);
        assert_eq!(result.diagnosis, "Healthy Plant");
        assert_eq!(result.confidence, 93);
        assert_eq!(result.treatment.len(), 3);
        assert_eq!(result.prevention.len(), 3);
        assert!(result.missing_info.is_none());
    }

    #[tokio::test]
    async fn each_stage_called_once_and_only_classifier_grounded() {
        let client = Arc::new(scripted_client());
        run(&client).await.unwrap();

        let calls = client.calls();
        let shapes: Vec<&str> = calls.iter().map(|c| c.shape_id.as_str()).collect();
        assert_eq!(shapes, vec![OBSERVATION_SHAPE_ID, CLASSIFICATION_SHAPE_ID, ADVICE_SHAPE_ID]);
        assert_eq!(calls.iter().filter(|c| c.grounded).count(), 1);
        assert!(calls[1].grounded);
        assert_eq!(calls[0].images, 1);
    }

    #[tokio::test]
    async fn classifier_context_carries_request_metadata() {
        let client = Arc::new(scripted_client());
        run(&client).await.unwrap();

        let prompt = &client.calls()[1].prompt;
        assert!(prompt.contains("tomato"));
        assert!(prompt.contains("flowering"));
        assert!(prompt.contains("heat wave"));
    }

    #[tokio::test]
    async fn citations_are_deduplicated_and_ranked() {
        let client = Arc::new(scripted_client());
        let result = run(&client).await.unwrap();

        let tiers: Vec<SourceAuthority> = result.citations.iter().map(|c| c.authority).collect();
        assert_eq!(
            tiers,
            vec![SourceAuthority::Primary, SourceAuthority::Secondary, SourceAuthority::Tertiary]
        );
        assert!(result.citations[0].uri.contains("extension.umn.edu"));
    }

    #[tokio::test]
    async fn status_events_follow_the_full_path() {
        let client = Arc::new(scripted_client());
        let orchestrator = orchestrator(&client).unwrap();
        let (observers, seen) = recording_observers();

        orchestrator
            .analyze(&request().unwrap(), &observers, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                PipelineState::Analyzing,
                PipelineState::Classifying,
                PipelineState::Advising,
                PipelineState::Done,
            ]
        );
    }

    #[tokio::test]
    async fn concurrent_runs_share_one_orchestrator() {
        let client = Arc::new(
            ScriptedClient::new()
                .on(OBSERVATION_SHAPE_ID, mock_data::HEALTHY_OBSERVATION)
                .on(OBSERVATION_SHAPE_ID, mock_data::HEALTHY_OBSERVATION)
                .on(CLASSIFICATION_SHAPE_ID, mock_data::HEALTHY_CLASSIFICATION)
                .on(CLASSIFICATION_SHAPE_ID, mock_data::HEALTHY_CLASSIFICATION)
                .on(ADVICE_SHAPE_ID, mock_data::HEALTHY_ADVICE)
                .on(ADVICE_SHAPE_ID, mock_data::HEALTHY_ADVICE),
        );
        let orchestrator = orchestrator(&client).unwrap();
        let (first_req, second_req) = (request().unwrap(), request().unwrap());
        let cancel = CancellationToken::new();
        let (first_obs, first_seen) = recording_observers();
        let (second_obs, second_seen) = recording_observers();

        let (first, second) = tokio::join!(
            orchestrator.analyze(&first_req, &first_obs, &cancel),
            orchestrator.analyze(&second_req, &second_obs, &cancel),
        );
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_eq!(first.outcome, ResultKind::Diagnosed);
        assert_eq!(second.outcome, ResultKind::Diagnosed);
        assert_eq!(first.run_id, first_req.run_id);
        assert_eq!(second.run_id, second_req.run_id);
        assert_ne!(first.run_id, second.run_id);
        for shape in [OBSERVATION_SHAPE_ID, CLASSIFICATION_SHAPE_ID, ADVICE_SHAPE_ID] {
            assert_eq!(client.calls_for(shape), 2);
        }
        let full_path = vec![
            PipelineState::Analyzing,
            PipelineState::Classifying,
            PipelineState::Advising,
            PipelineState::Done,
        ];
        assert_eq!(*first_seen.lock().unwrap(), full_path);
        assert_eq!(*second_seen.lock().unwrap(), full_path);
    }

    #[tokio::test]
    async fn scenario_runs_to_completion() {
        run_scenario().await.unwrap();
    }
}
