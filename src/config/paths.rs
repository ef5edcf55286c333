//! Cross-platform settings location using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir:
//!   Windows: %APPDATA%\robotalk\
//!   macOS:   ~/Library/Application Support/robotalk/
//!   Linux:   ~/.config/robotalk/
//!
//! The `ROBOTALK_CONFIG` environment variable overrides the settings file
//! path entirely (container deployments mount the file wherever they like).

use std::path::PathBuf;

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV_VAR: &str = "ROBOTALK_CONFIG";

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "robotalk";

    /// Resolves the platform paths, honouring [`CONFIG_ENV_VAR`].
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(explicit) if !explicit.is_empty() => Self::from_settings_file(explicit.into()),
            _ => Self::platform(),
        }
    }

    /// Paths rooted at the platform config directory, ignoring the environment.
    pub fn platform() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);
        let settings_file = config_dir.join("settings.toml");

        Self {
            config_dir,
            settings_file,
        }
    }

    fn from_settings_file(settings_file: PathBuf) -> Self {
        let config_dir = settings_file
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            config_dir,
            settings_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
