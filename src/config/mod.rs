//! Configuration module for the Robotalk drafting backend.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for locating the settings file, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::{AppPaths, CONFIG_ENV_VAR};
pub use settings::{
    AppConfig, AuthConfig, DraftingConfig, LlmConfig, NormalizationConfig, ServerConfig,
    TranscriptionConfig,
};
