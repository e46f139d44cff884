//! The LeafLens orchestrator: the staged analysis state machine.
//!
//!   Analyzing → Classifying → (NeedsClarification | Advising) → Done
//!
//! with a direct `Analyzing → Done` edge when the subject is not a plant,
//! and a `Classifying → Done` edge when the image cannot support any answer.
//! The Advisor is only reachable with a committed (non-provisional)
//! classification. That is enforced structurally: the code path to
//! `Advisor::advise()` lies after the clarification branch has returned.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use leaflens_contracts::{
    error::{LeafLensResult, StageError},
    outcome::{AnalysisResult, ClassificationOutcome, ResultKind},
    request::AnalysisRequest,
    status::{PipelineState, Stage, StatusEvent},
};

use crate::{
    config::PipelineConfig,
    prompts::synthesize_context,
    stages::{Advisor, Analyzer, Classifier, StageContext},
    status::StatusObservers,
    traits::{AuthorityRanker, GenerationClient, ResponseVerifier},
};

/// Drives one analysis run per call to `analyze()`.
///
/// Holds only injected collaborators and configuration. Independent runs
/// may execute concurrently against the same orchestrator.
pub struct Orchestrator {
    client: Arc<dyn GenerationClient>,
    verifier: Box<dyn ResponseVerifier>,
    ranker: Box<dyn AuthorityRanker>,
    config: PipelineConfig,
}

impl Orchestrator {
    /// Build an orchestrator. Fails with `ConfigError` for an invalid config.
    pub fn new(
        client: Arc<dyn GenerationClient>,
        verifier: Box<dyn ResponseVerifier>,
        ranker: Box<dyn AuthorityRanker>,
        config: PipelineConfig,
    ) -> LeafLensResult<Self> {
        config.validate()?;
        Ok(Self {
            client,
            verifier,
            ranker,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline for one request.
    ///
    /// # Outcomes
    ///
    /// - `ResultKind::NotAPlant`: the Analyzer rejected the subject; no
    ///   further calls were made.
    /// - `ResultKind::NeedsClarification`: the Classifier needs answers.
    ///   Re-enter with `request.answer_clarification(..)`; the re-entry is
    ///   forced to commit.
    /// - `ResultKind::Inconclusive`: the image could not support any answer;
    ///   the Advisor was not called.
    /// - `ResultKind::Diagnosed`: the full pipeline ran.
    ///
    /// # Errors
    ///
    /// Any stage failure aborts the run with the failing stage attached.
    /// Cancelling `cancel` fails whichever stage is suspended with
    /// `LeafLensError::Cancelled`. Failed runs emit no `Done` event.
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
        observers: &StatusObservers,
        cancel: &CancellationToken,
    ) -> LeafLensResult<AnalysisResult> {
        let run_id = request.run_id;
        // Answers already supplied means this is the single re-entry.
        let forced = request.has_prior_answers()
            || request.clarification_round >= self.config.max_clarification_rounds;
        let emit = |state: PipelineState| observers.emit(&StatusEvent::new(run_id, state));

        info!(
            run_id = %run_id,
            mode = %request.mode,
            images = request.images().len(),
            round = request.clarification_round,
            forced,
            "analysis run starting"
        );

        // ── Analyzing ────────────────────────────────────────────────────────
        emit(PipelineState::Analyzing);
        let analyzer = Analyzer::new(self.client.as_ref(), self.verifier.as_ref(), &self.config);
        let observation = guarded(
            Stage::Analyzer,
            cancel,
            analyzer.observe(request.images(), request.mode),
        )
        .await?;

        if observation.is_not_a_plant() {
            info!(run_id = %run_id, "subject is not a plant, run complete");
            emit(PipelineState::Done);
            return Ok(self.merge(
                request,
                ResultKind::NotAPlant,
                ClassificationOutcome::not_a_plant(),
                Vec::new(),
                Vec::new(),
            ));
        }

        // ── Classifying ──────────────────────────────────────────────────────
        emit(PipelineState::Classifying);
        let context = StageContext {
            mode: request.mode,
            text: synthesize_context(request),
            forced,
        };
        let classifier = Classifier::new(
            self.client.as_ref(),
            self.verifier.as_ref(),
            self.ranker.as_ref(),
            &self.config,
        );
        let mut classification =
            guarded(Stage::Classifier, cancel, classifier.classify(&observation, &context)).await?;

        // ── Clarification branch ─────────────────────────────────────────────
        //
        // A forced run never halts here, whatever the Classifier returned.
        if forced {
            classification.clarification_questions = None;
        }
        if let Some(questions) = classification.clarification_questions.take() {
            if !questions.is_empty() {
                info!(
                    run_id = %run_id,
                    questions = questions.len(),
                    "classification needs clarification, halting"
                );
                emit(PipelineState::NeedsClarification);
                emit(PipelineState::Done);
                let mut result = self.merge(
                    request,
                    ResultKind::NeedsClarification,
                    classification,
                    Vec::new(),
                    Vec::new(),
                );
                result.citations.clear();
                result.missing_info = Some(questions);
                return Ok(result);
            }
        }

        if classification.is_inconclusive() {
            info!(
                run_id = %run_id,
                confidence = classification.confidence,
                "image cannot support an answer, skipping advice"
            );
            emit(PipelineState::Done);
            return Ok(self.merge(
                request,
                ResultKind::Inconclusive,
                classification,
                Vec::new(),
                Vec::new(),
            ));
        }

        // ── Advising ─────────────────────────────────────────────────────────
        emit(PipelineState::Advising);
        let advisor = Advisor::new(self.client.as_ref(), self.verifier.as_ref(), &self.config);
        let advice = guarded(
            Stage::Advisor,
            cancel,
            advisor.advise(&classification.diagnosis, &observation, &context),
        )
        .await?;

        info!(
            run_id = %run_id,
            diagnosis = %classification.diagnosis,
            confidence = classification.confidence,
            citations = classification.citations.len(),
            "analysis run complete"
        );
        emit(PipelineState::Done);

        Ok(self.merge(
            request,
            ResultKind::Diagnosed,
            classification,
            advice.treatment,
            advice.prevention,
        ))
    }

    fn merge(
        &self,
        request: &AnalysisRequest,
        outcome: ResultKind,
        classification: ClassificationOutcome,
        treatment: Vec<String>,
        prevention: Vec<String>,
    ) -> AnalysisResult {
        AnalysisResult {
            run_id: request.run_id,
            captured_at: request.captured_at,
            mode: request.mode,
            outcome,
            diagnosis: classification.diagnosis,
            confidence: classification.confidence,
            confidence_rationale: classification.confidence_rationale,
            treatment,
            prevention,
            citations: classification.citations,
            missing_info: None,
        }
    }
}

/// Race one stage against the cancellation token and attach the stage to
/// any failure. An already-cancelled token wins before the stage is polled.
async fn guarded<T>(
    stage: Stage,
    cancel: &CancellationToken,
    work: impl Future<Output = Result<T, StageError>>,
) -> LeafLensResult<T> {
    debug!(stage = %stage, "stage starting");
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StageError::Cancelled),
        result = work => result,
    };
    result.map_err(|e| {
        warn!(stage = %stage, error = %e, "stage failed");
        e.at(stage)
    })
}
