//! Scenario 2: Blurry Leaf
//!
//! An out-of-focus photo leaves two diseases equally plausible. The first
//! run halts with questions; the grower answers and the re-entry is forced
//! to commit.
//!
//! Pipeline walk-through for the demo run:
//!   1. Round 0: Analyzer notes the blur and small brown spots
//!   2. Classifier returns a provisional answer with three questions
//!   3. The run halts in NeedsClarification; the Advisor is not called
//!   4. The grower's answers are attached with `answer_clarification`
//!   5. Round 1: the Classifier prompt demands a committed answer
//!   6. The stray follow-up question in the response is discarded
//!   7. Advisor produces the Septoria treatment plan

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use leaflens_contracts::{
    error::LeafLensResult,
    outcome::AnalysisResult,
    request::{AnalysisMode, AnalysisRequest, ClarificationAnswer, GrowthStage},
};
use leaflens_core::{
    orchestrator::Orchestrator,
    stages::{advisor::ADVICE_SHAPE_ID, analyzer::OBSERVATION_SHAPE_ID, classifier::CLASSIFICATION_SHAPE_ID},
};

use super::{orchestrator, print_result, printing_observers};
use crate::{mock_data, scripted::ScriptedClient};

/// The grower's replies, in question order.
const ANSWERS: [&str; 3] = [
    "Yes, gray centers with tiny black dots.",
    "It rained most days last week.",
    "Yes, bottom leaves first.",
];

/// Script for both rounds. The Analyzer runs again on re-entry.
pub fn scripted_client() -> ScriptedClient {
    ScriptedClient::new()
        .on(OBSERVATION_SHAPE_ID, mock_data::BLURRY_OBSERVATION)
        .on_with_citations(
            CLASSIFICATION_SHAPE_ID,
            mock_data::BLURRY_CLASSIFICATION,
            mock_data::septoria_citations(),
        )
        .on(OBSERVATION_SHAPE_ID, mock_data::BLURRY_OBSERVATION)
        .on_with_citations(
            CLASSIFICATION_SHAPE_ID,
            mock_data::FORCED_CLASSIFICATION,
            mock_data::septoria_citations(),
        )
        .on(ADVICE_SHAPE_ID, mock_data::SEPTORIA_ADVICE)
}

pub fn request() -> LeafLensResult<AnalysisRequest> {
    Ok(AnalysisRequest::new(
        vec![mock_data::photo(2), mock_data::photo(3)],
        AnalysisMode::Diagnosis,
    )?
    .with_crop("tomato", GrowthStage::Fruiting))
}

/// Pair each question with the scripted reply.
pub fn answer(questions: &[String]) -> Vec<ClarificationAnswer> {
    questions
        .iter()
        .zip(ANSWERS)
        .map(|(question, reply)| ClarificationAnswer::new(question.clone(), reply))
        .collect()
}

/// Both rounds: the halted first result and the committed second one.
async fn run(
    orchestrator: &Orchestrator,
) -> LeafLensResult<(AnalysisRequest, AnalysisResult, AnalysisResult)> {
    let cancel = CancellationToken::new();
    let first_request = request()?;
    let first = orchestrator
        .analyze(&first_request, &printing_observers(), &cancel)
        .await?;

    let questions = first.missing_info.clone().unwrap_or_default();
    let second_request = first_request.answer_clarification(answer(&questions));
    let second = orchestrator
        .analyze(&second_request, &printing_observers(), &cancel)
        .await?;
    Ok((second_request, first, second))
}

/// Run Scenario 2: Blurry Leaf.
pub async fn run_scenario() -> LeafLensResult<()> {
    println!("=== Scenario 2: Blurry Leaf (clarification loop) ===");
    println!();
    println!("  Photos: 2 images, tomato, fruiting, out of focus");
    println!();

    let client = Arc::new(scripted_client());
    let orchestrator = orchestrator(&client)?;

    println!("  -- Round 0 --");
    let (second_request, first, second) = run(&orchestrator).await?;
    print_result(&first);
    println!();
    println!("  Grower answers:");
    for qa in &second_request.prior_answers {
        println!("    Q: {}", qa.question);
        println!("    A: {}", qa.answer);
    }
    println!();

    println!("  -- Round {} (forced) --", second_request.clarification_round);
    print_result(&second);
    info!(
        first_run = %first.run_id,
        second_run = %second.run_id,
        classifier_calls = client.calls_for(CLASSIFICATION_SHAPE_ID),
        "clarification loop finished"
    );
    println!();
    println!(
        "  Classifier calls: {}   Advisor calls: {}",
        client.calls_for(CLASSIFICATION_SHAPE_ID),
        client.calls_for(ADVICE_SHAPE_ID)
    );
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use leaflens_contracts::{
        outcome::{ResultKind, SourceAuthority},
        status::PipelineState,
    };

    use super::*;
    use crate::scenarios::recording_observers;

    #[tokio::test]
    async fn first_round_halts_with_questions() {
        let client = Arc::new(scripted_client());
        let orchestrator = orchestrator(&client).unwrap();
        let (observers, seen) = recording_observers();

        let result = orchestrator
            .analyze(&request().unwrap(), &observers, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.outcome, ResultKind::NeedsClarification);
        assert_eq!(result.confidence, 38);
        assert_eq!(result.missing_info.as_ref().map(Vec::len), Some(3));
        assert!(result.treatment.is_empty());
        assert!(result.citations.is_empty());
        assert_eq!(client.calls_for(ADVICE_SHAPE_ID), 0);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                PipelineState::Analyzing,
                PipelineState::Classifying,
                PipelineState::NeedsClarification,
                PipelineState::Done,
            ]
        );
    }

    #[tokio::test]
    async fn forced_reentry_commits_to_a_diagnosis() {
        let client = Arc::new(scripted_client());
        let orchestrator = orchestrator(&client).unwrap();
        let (second_request, first, second) = run(&orchestrator).await.unwrap();

        assert_ne!(first.run_id, second.run_id);
        assert_eq!(first.captured_at, second.captured_at);
        assert_eq!(second_request.clarification_round, 1);
        assert_eq!(second_request.prior_answers.len(), 3);

        assert_eq!(second.outcome, ResultKind::Diagnosed);
        assert_eq!(second.diagnosis, "Septoria leaf spot");
        assert_eq!(second.confidence, 72);
        assert!(second.missing_info.is_none());
        assert_eq!(second.treatment.len(), 3);

        assert_eq!(client.calls_for(CLASSIFICATION_SHAPE_ID), 2);
        assert_eq!(client.calls_for(ADVICE_SHAPE_ID), 1);
    }

    #[tokio::test]
    async fn forced_prompt_carries_answers_and_commit_instruction() {
        let client = Arc::new(scripted_client());
        let orchestrator = orchestrator(&client).unwrap();
        run(&orchestrator).await.unwrap();

        let classifier_prompts: Vec<String> = client
            .calls()
            .into_iter()
            .filter(|c| c.shape_id == CLASSIFICATION_SHAPE_ID)
            .map(|c| c.prompt)
            .collect();
        assert!(!classifier_prompts[0].contains("MUST commit"));
        assert!(classifier_prompts[1].contains("MUST commit"));
        assert!(classifier_prompts[1].contains("gray centers with tiny black dots"));
        assert!(classifier_prompts[1].contains("tiny dark specks"));
    }

    #[tokio::test]
    async fn committed_citations_are_capped_and_primary_first() {
        let client = Arc::new(scripted_client());
        let orchestrator = orchestrator(&client).unwrap();
        let (_, _, second) = run(&orchestrator).await.unwrap();

        assert_eq!(second.citations.len(), 5);
        let tiers: Vec<SourceAuthority> = second.citations.iter().map(|c| c.authority).collect();
        assert_eq!(
            tiers,
            vec![
                SourceAuthority::Primary,
                SourceAuthority::Primary,
                SourceAuthority::Primary,
                SourceAuthority::Secondary,
                SourceAuthority::Tertiary,
            ]
        );
        // The redirect URI is ranked through its title.
        assert!(second.citations[1].uri.contains("grounding-api-redirect"));
    }

    #[test]
    fn answers_pair_with_questions_in_order() {
        let questions = vec!["first?".to_string(), "second?".to_string()];
        let answers = answer(&questions);
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].question, "first?");
        assert_eq!(answers[1].answer, ANSWERS[1]);
    }

    #[tokio::test]
    async fn scenario_runs_to_completion() {
        run_scenario().await.unwrap();
    }
}
