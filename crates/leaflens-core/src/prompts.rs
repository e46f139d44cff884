//! Prompt text for the three stages and the shared context block.

use std::fmt::Write as _;

use leaflens_contracts::{
    outcome::INCONCLUSIVE,
    request::{AnalysisMode, AnalysisRequest},
};

/// Literal the Analyzer may emit instead of (or inside) an observation when
/// the subject is not a plant.
pub const NOT_A_PLANT_SENTINEL: &str = "NOT_A_PLANT";

/// Text the observation report must never contain.
pub const OBSERVATION_DIAGNOSIS_MARKER: &str = "Diagnosis:";

/// Build the free-text context handed to the Classifier and Advisor.
///
/// Lists crop metadata, notes, the environmental snapshot when present, and
/// any question/answer pairs from a previous clarification round.
pub fn synthesize_context(request: &AnalysisRequest) -> String {
    let mut out = String::new();
    let crop = request.crop_type.trim();
    let _ = writeln!(
        out,
        "Crop: {}",
        if crop.is_empty() { "unspecified" } else { crop }
    );
    let _ = writeln!(out, "Growth stage: {}", request.growth_stage);

    let notes = request.notes.trim();
    if !notes.is_empty() {
        let _ = writeln!(out, "Grower notes: {notes}");
    }

    if let Some(env) = request.environment.as_ref().filter(|e| !e.is_empty()) {
        let _ = writeln!(out, "Sensor snapshot: {env}");
    }

    if request.has_prior_answers() {
        let _ = writeln!(out, "Answers to earlier clarification questions:");
        for qa in &request.prior_answers {
            let _ = writeln!(out, "- Q: {}", qa.question.trim());
            let _ = writeln!(out, "  A: {}", qa.answer.trim());
        }
    }

    out.trim_end().to_string()
}

pub fn analyzer_prompt(mode: AnalysisMode) -> String {
    let focus = match mode {
        AnalysisMode::Diagnosis => {
            "- leaf, stem and fruit color, including chlorosis and necrosis patterns\n\
             - lesions: shape, size, margins, halos, concentric rings, distribution on the plant\n\
             - visible pests, eggs, webbing, frass or fungal growth\n\
             - wilting, curling, distortion or stunting"
        }
        AnalysisMode::Identification => {
            "- leaf shape, arrangement, margin, venation and texture\n\
             - stem, flower and fruit characteristics\n\
             - growth habit and overall size cues\n\
             - any visible signs of stress or damage"
        }
    };

    format!(
        "You are a plant pathology field technician writing a visual observation report.\n\
         \n\
         First decide whether the main subject of the image(s) is a plant or part of a plant. \
         If it is not, set \"subject\" to \"not_plant\" and put {NOT_A_PLANT_SENTINEL} in \"observation\".\n\
         \n\
         Otherwise set \"subject\" to \"plant\" and write a clinical description in \"observation\" covering:\n\
         {focus}\n\
         - image quality: focus, lighting, framing, and whether the affected area is clearly visible\n\
         \n\
         Describe only what is visible. Do NOT name a disease, pest species, disorder or plant species, \
         and do NOT suggest treatments. Never write a \"{OBSERVATION_DIAGNOSIS_MARKER}\" line.\n\
         \n\
         Respond with JSON only: {{\"subject\": \"plant\" | \"not_plant\", \"observation\": string}}"
    )
}

const SOURCE_HIERARCHY: &str = "Source authority, strongest first:\n\
     1. Primary: university extension services, government agriculture agencies, research institutes \
        (.edu, .gov, .ac.*, cgiar.org and similar).\n\
     2. Secondary: established horticultural publications and societies.\n\
     3. Tertiary: everything else. Never rely on tertiary sources alone.";

pub fn classifier_prompt(
    mode: AnalysisMode,
    observation: &str,
    context: &str,
    forced: bool,
    max_questions: usize,
) -> String {
    let task = match mode {
        AnalysisMode::Diagnosis => "diagnose the disease, pest or disorder affecting the plant",
        AnalysisMode::Identification => "identify the plant species (common and botanical name)",
    };

    let decision = if forced {
        format!(
            "The grower has already answered clarification questions (see context). You MUST commit \
             to your single best-supported answer now. Do NOT ask further questions: \
             \"clarification_questions\" must be an empty array. Reflect any remaining uncertainty \
             in \"confidence\" and \"confidence_rationale\". Only if the image supports no answer \
             at all, set \"diagnosis\" to \"{INCONCLUSIVE}\" and say why."
        )
    } else {
        format!(
            "Apply exactly one of these outcomes:\n\
             - Clear match: the visual evidence agrees with primary or secondary sources. Give the \
               answer, a confidence, and a rationale citing the agreement.\n\
             - Evidence gap: two or more plausible answers can only be told apart by facts not \
               visible in the image (watering history, recent weather, spread pattern, treatments \
               already applied). List them in \"differential\", give your provisional best answer, \
               and ask up to {max_questions} short yes/no style questions in \
               \"clarification_questions\".\n\
             - Insufficient image: if the image is too blurry, dark or distant to support any \
               answer, set \"diagnosis\" to \"{INCONCLUSIVE}\", report a low confidence and say \
               why in the rationale instead of forcing an answer."
        )
    };

    format!(
        "You are a plant health specialist. Using web search, {task} from the observation report below.\n\
         \n\
         {SOURCE_HIERARCHY}\n\
         \n\
         {decision}\n\
         \n\
         Observation report:\n{observation}\n\
         \n\
         Context:\n{context}\n\
         \n\
         Respond with JSON only: {{\"diagnosis\": string, \"confidence\": number (0-100), \
         \"confidence_rationale\": string, \"clarification_questions\": [string], \"differential\": [string]}}"
    )
}

pub fn advisor_prompt(
    mode: AnalysisMode,
    diagnosis: &str,
    observation: &str,
    context: &str,
    items: usize,
) -> String {
    let (subject, treatment_kind) = match mode {
        AnalysisMode::Diagnosis => (
            format!("The plant has been diagnosed with: {diagnosis}."),
            "treatment steps, organic and cultural measures before any chemical option",
        ),
        AnalysisMode::Identification => (
            format!("The plant has been identified as: {diagnosis}."),
            "care steps for keeping this plant healthy",
        ),
    };

    format!(
        "You are an integrated pest management advisor.\n\
         {subject}\n\
         \n\
         Observation report:\n{observation}\n\
         \n\
         Context:\n{context}\n\
         \n\
         Give exactly {items} {treatment_kind}, and exactly {items} prevention tips. \
         Keep each item to one actionable sentence suited to a home grower. \
         Never return an empty array, even for a healthy plant or a generic diagnosis: give general \
         care and monitoring advice instead.\n\
         \n\
         Respond with JSON only: {{\"treatment\": [string], \"prevention\": [string]}}"
    )
}
