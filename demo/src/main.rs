//! LeafLens demo CLI
//!
//! Runs the scripted reference scenarios, or analyzes real photos through
//! the Gemini API.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- blurry-leaf
//!   GEMINI_API_KEY=... cargo run -p demo -- analyze --image leaf.jpg --crop tomato

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use leaflens_contracts::{
    error::{LeafLensError, LeafLensResult},
    outcome::{AnalysisResult, ResultKind},
    request::{
        AnalysisMode, AnalysisRequest, ClarificationAnswer, EnvironmentSnapshot, GrowthStage,
        ImagePayload,
    },
    status::StatusEvent,
};
use leaflens_core::{traits::GenerationClient, Orchestrator, PipelineConfig, StatusObservers};
use leaflens_gemini::GeminiClient;
use leaflens_ref_scenarios::scenarios::{
    blurry_leaf, healthy_leaf, not_a_plant, print_result, quota_failure,
};
use leaflens_sources::TomlAuthorityRanker;
use leaflens_verify::SchemaVerifier;

// ── CLI definition ────────────────────────────────────────────────────────────

/// LeafLens: photo-based plant diagnosis.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "LeafLens plant analysis demo",
    long_about = "Runs the LeafLens reference scenarios against scripted model output,\n\
                  or analyzes real photos through the Gemini API."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all four reference scenarios in sequence.
    RunAll,
    /// Scenario 1: healthy leaf, full pipeline.
    HealthyLeaf,
    /// Scenario 2: blurry leaf, clarification then forced commit.
    BlurryLeaf,
    /// Scenario 3: photo of something that is not a plant.
    NotAPlant,
    /// Scenario 4: quota exhausted during the grounded search.
    QuotaFailure,
    /// Analyze photos through Gemini (needs GEMINI_API_KEY).
    Analyze(AnalyzeArgs),
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Photo to analyze. Repeat for several angles of the same plant.
    #[arg(long = "image", required = true)]
    images: Vec<PathBuf>,

    /// Crop or plant type, e.g. "tomato".
    #[arg(long)]
    crop: Option<String>,

    /// seedling, vegetative, flowering, fruiting, mature, or free text.
    #[arg(long)]
    growth_stage: Option<GrowthStage>,

    /// Anything else the grower noticed.
    #[arg(long)]
    notes: Option<String>,

    /// diagnosis or identification.
    #[arg(long, default_value = "diagnosis")]
    mode: AnalysisMode,

    /// Air temperature in °C.
    #[arg(long)]
    temperature: Option<f64>,

    /// Relative humidity in percent.
    #[arg(long)]
    humidity: Option<f64>,

    /// Soil moisture in percent.
    #[arg(long)]
    soil_moisture: Option<f64>,

    /// Pipeline settings TOML (see demo/config/leaflens.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Source authority rules TOML. Defaults to the built-in rules.
    #[arg(long)]
    sources: Option<PathBuf>,

    /// Print the final result as JSON.
    #[arg(long)]
    json: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=debug for per-stage logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::RunAll => {
            print_banner();
            run_all().await
        }
        Command::HealthyLeaf => {
            print_banner();
            healthy_leaf::run_scenario().await
        }
        Command::BlurryLeaf => {
            print_banner();
            blurry_leaf::run_scenario().await
        }
        Command::NotAPlant => {
            print_banner();
            not_a_plant::run_scenario().await
        }
        Command::QuotaFailure => {
            print_banner();
            quota_failure::run_scenario().await
        }
        Command::Analyze(args) => analyze(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_all() -> LeafLensResult<()> {
    healthy_leaf::run_scenario().await?;
    blurry_leaf::run_scenario().await?;
    not_a_plant::run_scenario().await?;
    quota_failure::run_scenario().await?;
    println!("All scenarios completed.");
    Ok(())
}

// ── Live analysis ─────────────────────────────────────────────────────────────

async fn analyze(args: AnalyzeArgs) -> LeafLensResult<()> {
    let config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    let ranker = match &args.sources {
        Some(path) => TomlAuthorityRanker::from_file(path)?,
        None => TomlAuthorityRanker::builtin()?,
    };
    let client = GeminiClient::from_env()?;
    info!(model = client.model(), "using gemini backend");

    let orchestrator = Orchestrator::new(
        Arc::new(client) as Arc<dyn GenerationClient>,
        Box::new(SchemaVerifier::with_standard_rules()),
        Box::new(ranker),
        config,
    )?;

    let mut request = build_request(&args).await?;
    let observers = StatusObservers::none().with(Arc::new(|event: &StatusEvent| {
        eprintln!("... {}", event.label);
    }));

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling analysis");
            on_ctrl_c.cancel();
        }
    });

    let mut result = orchestrator.analyze(&request, &observers, &cancel).await?;
    // One clarification round; the answered re-entry always commits.
    if result.outcome == ResultKind::NeedsClarification {
        print_result(&result);
        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        let answers = ask(&mut stdin, result.missing_info.as_deref().unwrap_or_default()).await?;
        request = request.answer_clarification(answers);
        result = orchestrator.analyze(&request, &observers, &cancel).await?;
    }

    report(&result, args.json)
}

async fn build_request(args: &AnalyzeArgs) -> LeafLensResult<AnalysisRequest> {
    let mut images = Vec::with_capacity(args.images.len());
    for path in &args.images {
        images.push(load_image(path).await?);
    }

    let mut request = AnalysisRequest::new(images, args.mode)?;
    if let Some(crop) = &args.crop {
        request.crop_type = crop.trim().to_string();
    }
    if let Some(stage) = &args.growth_stage {
        request.growth_stage = stage.clone();
    }
    if let Some(notes) = &args.notes {
        request = request.with_notes(notes.trim());
    }
    Ok(request.with_environment(EnvironmentSnapshot {
        temperature_c: args.temperature,
        humidity_pct: args.humidity,
        soil_moisture_pct: args.soil_moisture,
    }))
}

async fn load_image(path: &Path) -> LeafLensResult<ImagePayload> {
    let mime_type = mime_type_for(path).ok_or_else(|| LeafLensError::InvalidRequest {
        reason: format!("unsupported image type: {}", path.display()),
    })?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| LeafLensError::InvalidRequest {
            reason: format!("failed to read image '{}': {}", path.display(), e),
        })?;
    Ok(ImagePayload::new(bytes, mime_type))
}

fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

/// Ask each question on stdin. A blank line is sent as "not sure".
async fn ask<R: AsyncBufRead + Unpin>(
    lines: &mut Lines<R>,
    questions: &[String],
) -> LeafLensResult<Vec<ClarificationAnswer>> {
    let mut answers = Vec::with_capacity(questions.len());
    println!();
    for question in questions {
        print!("  {question}\n  > ");
        let _ = std::io::stdout().flush();
        let line = lines
            .next_line()
            .await
            .map_err(|e| LeafLensError::Io {
                reason: format!("failed to read answer: {e}"),
            })?
            .unwrap_or_default();
        let reply = match line.trim() {
            "" => "not sure",
            text => text,
        };
        answers.push(ClarificationAnswer::new(question.clone(), reply));
    }
    Ok(answers)
}

fn report(result: &AnalysisResult, json: bool) -> LeafLensResult<()> {
    if json {
        println!("{}", render_json(result)?);
    } else {
        print_result(result);
        println!();
    }
    Ok(())
}

fn render_json(result: &AnalysisResult) -> LeafLensResult<String> {
    serde_json::to_string_pretty(result).map_err(|e| LeafLensError::Io {
        reason: format!("failed to render result: {e}"),
    })
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("LeafLens: Plant Analysis Pipeline");
    println!("Reference Scenarios (scripted model output)");
    println!("===========================================");
    println!();
    println!("Pipeline per run:");
    println!("  [1] Analyzer describes the photo, or rejects a non-plant subject");
    println!("  [2] Classifier diagnoses with grounded search and ranked citations");
    println!("  [3] Low confidence halts with questions; the answered re-entry must commit");
    println!("  [4] Advisor turns the diagnosis into treatment and prevention steps");
    println!();
}
