//! Reference scenarios.
//!
//! Each scenario wires real LeafLens components (orchestrator, schema
//! verifier, built-in source rules) to a `ScriptedClient` and walks through
//! one outcome of the pipeline.

pub mod blurry_leaf;
pub mod healthy_leaf;
pub mod not_a_plant;
pub mod quota_failure;

use std::sync::{Arc, Mutex};

use leaflens_contracts::{
    error::LeafLensResult,
    outcome::{AnalysisResult, ResultKind},
    status::{PipelineState, StatusEvent},
};
use leaflens_core::{
    config::{CitationOrder, PipelineConfig},
    orchestrator::Orchestrator,
    status::StatusObservers,
    traits::GenerationClient,
};
use leaflens_sources::TomlAuthorityRanker;
use leaflens_verify::SchemaVerifier;

use crate::scripted::ScriptedClient;

// ── Wiring ───────────────────────────────────────────────────────────────────

/// Settings shared by every scenario: authority-ordered citations, the rest
/// left at defaults.
pub fn scenario_config() -> PipelineConfig {
    PipelineConfig {
        citation_order: CitationOrder::Authority,
        ..PipelineConfig::default()
    }
}

/// Build an orchestrator over `client`. The caller keeps its own `Arc` so
/// recorded calls stay inspectable after the run.
pub fn orchestrator(client: &Arc<ScriptedClient>) -> LeafLensResult<Orchestrator> {
    Orchestrator::new(
        Arc::clone(client) as Arc<dyn GenerationClient>,
        Box::new(SchemaVerifier::with_standard_rules()),
        Box::new(TomlAuthorityRanker::builtin()?),
        scenario_config(),
    )
}

/// Observers that print each status label as the run advances.
pub fn printing_observers() -> StatusObservers {
    StatusObservers::none().with(Arc::new(|event: &StatusEvent| {
        println!("  [status] {}", event.label);
    }))
}

/// Observers that record every state, for assertions.
pub fn recording_observers() -> (StatusObservers, Arc<Mutex<Vec<PipelineState>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let observers = StatusObservers::none().with(Arc::new(move |event: &StatusEvent| {
        if let Ok(mut states) = sink.lock() {
            states.push(event.state);
        }
    }));
    (observers, seen)
}

// ── Output ───────────────────────────────────────────────────────────────────

pub fn print_result(result: &AnalysisResult) {
    println!();
    match result.outcome {
        ResultKind::NotAPlant => {
            println!("  Result: {}", result.diagnosis);
            println!("  Retake the photo with a leaf or plant filling the frame.");
            return;
        }
        ResultKind::NeedsClarification => {
            println!("  Provisional: {} ({}%)", result.diagnosis, result.confidence);
            println!("  More information needed:");
            for question in result.missing_info.iter().flatten() {
                println!("    ? {question}");
            }
            return;
        }
        ResultKind::Inconclusive => {
            println!("  Result: {} ({}%)", result.diagnosis, result.confidence);
            println!("  Rationale:  {}", result.confidence_rationale);
            println!("  Retake the photo in focus and closer to the affected area.");
            return;
        }
        ResultKind::Diagnosed => {}
    }

    println!("  Diagnosis:  {} ({}%)", result.diagnosis, result.confidence);
    println!("  Rationale:  {}", result.confidence_rationale);
    println!("  Treatment:");
    for step in &result.treatment {
        println!("    - {step}");
    }
    println!("  Prevention:");
    for tip in &result.prevention {
        println!("    - {tip}");
    }
    if !result.citations.is_empty() {
        println!("  Sources:");
        for citation in &result.citations {
            println!("    [{:?}] {} <{}>", citation.authority, citation.title, citation.uri);
        }
    }
}
