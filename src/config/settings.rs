//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across request
//! handlers.  Every section is `#[serde(default)]`, so a settings file only
//! needs to name the values it changes.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::normalize::Rule;

/// Environment variable holding the model provider credential.
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

/// Environment variable overriding [`ServerConfig::bind`].
pub const BIND_ENV_VAR: &str = "ROBOTALK_BIND";

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// Listener settings for the HTTP surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the server binds to.
    pub bind: String,
    /// Name reported by `GET /health`.
    pub service_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".into(),
            service_name: "Robotalk API".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the OpenAI-compatible model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the API endpoint (no trailing `/v1`).
    pub base_url: String,
    /// API key.  Usually left unset in the file and supplied through
    /// `OPENAI_API_KEY`.
    pub api_key: Option<String>,
    /// Chat model used for drafting (e.g. `"gpt-4o-mini"`).
    pub model: String,
    /// Upper bound on completion tokens per draft.
    pub max_tokens: u32,
    /// Maximum seconds to wait for any provider response before timing out.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "gpt-4o-mini".into(),
            max_tokens: 1200,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// TranscriptionConfig
// ---------------------------------------------------------------------------

/// Settings for the speech-to-text call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Transcription model sent to `/v1/audio/transcriptions`.
    pub model: String,
    /// Largest accepted audio upload, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini-transcribe".into(),
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

// ---------------------------------------------------------------------------
// DraftingConfig
// ---------------------------------------------------------------------------

/// Business framing rendered into every drafting prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftingConfig {
    /// Who the assistant works for, e.g. `"a UK double glazing company"`.
    pub business_domain: String,
    /// Regional spelling convention, e.g. `"UK"`.
    pub spelling: String,
    /// Company name used when a request does not supply one.
    pub default_company_name: String,
    /// Subject used when the model omits `subject_suggestion`.
    pub fallback_subject: String,
}

impl Default for DraftingConfig {
    fn default() -> Self {
        Self {
            business_domain: "a UK double glazing company".into(),
            spelling: "UK".into(),
            default_company_name: "Radbury Double Glazing".into(),
            fallback_subject: "Re: Your email".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// NormalizationConfig
// ---------------------------------------------------------------------------

/// Site-specific transcript corrections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Rules applied after the built-in table, in listed order.
    pub extra_rules: Vec<Rule>,
}

// ---------------------------------------------------------------------------
// AuthConfig
// ---------------------------------------------------------------------------

/// Boundary settings for the external authentication layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Reject drafting and transcription requests without a known token.
    pub required: bool,
    /// Bearer tokens issued by the auth subsystem.
    pub tokens: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            required: true,
            tokens: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use robotalk::config::{AppConfig, AppPaths};
///
/// // Load (returns Default when file is missing), then apply env overrides.
/// let mut config = AppConfig::load_from(&AppPaths::new().settings_file).unwrap();
/// config.apply_env();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub transcription: TranscriptionConfig,
    pub drafting: DraftingConfig,
    pub normalization: NormalizationConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load from `path`, normally [`crate::config::AppPaths::settings_file`].
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Write `settings.toml` to `path`, creating parent directories as
    /// needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup.  Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(API_KEY_ENV_VAR) {
            self.llm.api_key = Some(key.trim().to_string());
        }
        if let Some(bind) = non_empty(BIND_ENV_VAR) {
            self.server.bind = bind.trim().to_string();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
