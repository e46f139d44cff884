//! Gemini connection settings, read from the environment.
//!
//! | Variable               | Default                                            |
//! |------------------------|----------------------------------------------------|
//! | `GEMINI_API_KEY`       | falls back to `GOOGLE_API_KEY`; one is required    |
//! | `GEMINI_API_BASE`      | `https://generativelanguage.googleapis.com/v1beta` |
//! | `GEMINI_MODEL`         | `gemini-2.5-flash`                                 |
//! | `GEMINI_TIMEOUT_SECS`  | `60`                                               |

use std::time::Duration;

use leaflens_contracts::error::{LeafLensError, LeafLensResult};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    /// Per-call timeout. The pipeline itself never times out a stage.
    pub timeout: Duration,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim().trim_end_matches('/').to_string();
        self
    }

    /// Read settings from the process environment.
    pub fn from_env() -> LeafLensResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> LeafLensResult<Self> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("GEMINI_API_KEY")
            .or_else(|| get("GOOGLE_API_KEY"))
            .ok_or_else(|| LeafLensError::ConfigError {
                reason: "GEMINI_API_KEY or GOOGLE_API_KEY not set".to_string(),
            })?;

        let mut config = Self::new(api_key);
        if let Some(base) = get("GEMINI_API_BASE") {
            config = config.with_api_base(base);
        }
        if let Some(model) = get("GEMINI_MODEL") {
            config = config.with_model(model);
        }
        if let Some(secs) = get("GEMINI_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| LeafLensError::ConfigError {
                reason: format!("GEMINI_TIMEOUT_SECS must be a whole number of seconds, got '{secs}'"),
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// `{api_base}/models/{model}:generateContent`. Accepts model ids with
    /// or without the `models/` prefix.
    pub fn endpoint(&self) -> String {
        let model = self.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }
}
