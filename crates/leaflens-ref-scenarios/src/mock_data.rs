//! Canned photos and model responses for the reference scenarios.
//!
//! All data in this module is hardcoded. The "photos" are a few bytes of
//! JPEG header; nothing ever decodes them.

use leaflens_contracts::{generation::RawCitation, request::ImagePayload};

// ── Photos ───────────────────────────────────────────────────────────────────

/// A stand-in JPEG. `tag` only makes the payloads distinguishable.
pub fn photo(tag: u8) -> ImagePayload {
    ImagePayload::jpeg(vec![0xFF, 0xD8, 0xFF, 0xE0, tag, 0xFF, 0xD9])
}

// ── Analyzer responses ───────────────────────────────────────────────────────

pub const HEALTHY_OBSERVATION: &str = r#"{
  "subject": "plant",
  "observation": "Compound leaves with serrated leaflets, uniformly medium green on both surfaces. No spots, lesions, discoloration, wilting or visible pests. Image is sharp and evenly lit."
}"#;

pub const BLURRY_OBSERVATION: &str = r#"```json
{
  "subject": "plant",
  "observation": "Image is out of focus and backlit. Several small dark brown spots, roughly 2-5 mm, on a lower leaf; margins and any halo cannot be resolved. Some yellowing near the spots."
}
```"#;

pub const NOT_A_PLANT_OBSERVATION: &str = r#"{
  "subject": "not_plant",
  "observation": "NOT_A_PLANT"
}"#;

pub const SPOTTED_OBSERVATION: &str = r#"{
  "subject": "plant",
  "observation": "Circular brown lesions with concentric rings on the oldest leaves, surrounded by yellow tissue. Lesions up to 1 cm. Upper canopy unaffected."
}"#;

// ── Classifier responses ─────────────────────────────────────────────────────

pub const HEALTHY_CLASSIFICATION: &str = r#"{
  "diagnosis": "Healthy Plant",
  "confidence": 0.93,
  "confidence_rationale": "No symptoms described; foliage color and form match healthy tomato references from extension sources.",
  "clarification_questions": [],
  "differential": []
}"#;

pub const BLURRY_CLASSIFICATION: &str = r#"{
  "diagnosis": "Early blight",
  "confidence": 38,
  "confidence_rationale": "Small brown spots fit early blight and Septoria leaf spot; lesion detail is not visible.",
  "clarification_questions": [
    "Do the spots have light gray or tan centers with tiny dark specks?",
    "Has there been frequent rain or overhead watering in the past two weeks?",
    "Did the spots start on the lowest leaves and move upward?"
  ],
  "differential": ["Early blight", "Septoria leaf spot"]
}"#;

/// The forced re-entry answer. The model asks again anyway; the pipeline
/// must drop the question.
pub const FORCED_CLASSIFICATION: &str = r#"{
  "diagnosis": "Septoria leaf spot",
  "confidence": "72%",
  "confidence_rationale": "Gray centers with dark specks (pycnidia) after wet weather, spreading upward from the lowest leaves, match Septoria descriptions from extension guides.",
  "clarification_questions": ["Is there also fruit damage?"],
  "differential": ["Septoria leaf spot", "Early blight"]
}"#;

pub fn healthy_citations() -> Vec<RawCitation> {
    vec![
        RawCitation::new("Growing tomatoes in the home garden", "https://extension.umn.edu/vegetables/growing-tomatoes"),
        RawCitation::new("my tomato blog", "https://tomato-fans.example.com/healthy-leaves"),
        RawCitation::new("Tomatoes: growing guide", "https://www.rhs.org.uk/vegetables/tomatoes/grow-your-own"),
        RawCitation::new("Growing tomatoes in the home garden", "https://extension.umn.edu/vegetables/growing-tomatoes"),
    ]
}

pub fn septoria_citations() -> Vec<RawCitation> {
    vec![
        RawCitation::new("garden forum thread", "https://forum.example.net/t/spots-on-tomato"),
        RawCitation::new("Septoria leaf spot of tomato", "https://extension.wvu.edu/lawn-gardening-pests/plant-disease/tomato-diseases/septoria-leaf-spot"),
        RawCitation::new("ucanr.edu", "https://vertexaisearch.cloud.google.com/grounding-api-redirect/ipm-septoria"),
        RawCitation::new("Septoria leaf spot", "https://www.apsnet.org/edcenter/disandpath/fungalasco/pdlessons/Pages/Septoria.aspx"),
        RawCitation::new("Tomato leaf spot diseases", "https://www.canr.msu.edu/news/tomato-leaf-spots"),
        RawCitation::new("garden forum thread", "https://forum.example.net/t/spots-on-tomato"),
        RawCitation::new("Identifying tomato problems", "https://hortnews.example.com/tomato-problems"),
    ]
}

// ── Advisor responses ────────────────────────────────────────────────────────

pub const HEALTHY_ADVICE: &str = r#"{
  "treatment": [
    "No treatment is needed; keep watering deeply at the base once or twice a week.",
    "Side-dress with compost when the first fruits set.",
    "Pinch out suckers below the first flower cluster to keep airflow open."
  ],
  "prevention": [
    "Mulch around the base to stop soil splashing onto lower leaves.",
    "Stake or cage plants so foliage stays off the ground.",
    "Check the undersides of leaves weekly for early signs of pests or spots."
  ]
}"#;

pub const SEPTORIA_ADVICE: &str = r#"{
  "treatment": [
    "Remove and bag the spotted lower leaves; do not compost them.",
    "Switch to drip or base watering in the morning so leaves dry quickly.",
    "If spots keep spreading, apply a copper or chlorothalonil fungicide labeled for tomatoes, following label intervals."
  ],
  "prevention": [
    "Rotate tomatoes and other nightshades out of this bed for at least one year.",
    "Clear and destroy plant debris at the end of the season.",
    "Space and prune plants to improve air circulation."
  ]
}"#;
