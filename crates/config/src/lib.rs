//! Configuration loading, validation, and management for LingoBridge.
//!
//! Loads configuration from `~/.lingobridge/config.toml` with environment
//! variable overrides. Validates all settings at startup, including any
//! custom `[[modes]]`.

use lingobridge_core::mode::{ModeConfig, ModeConfigRegistry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.lingobridge/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Mode selected at session start
    #[serde(default = "default_mode")]
    pub default_mode: String,

    /// Shown to the user when generation fails
    #[serde(default = "default_apology")]
    pub apology_message: String,

    #[serde(default)]
    pub languages: LanguageConfig,

    #[serde(default)]
    pub generation: GenerationServiceConfig,

    #[serde(default)]
    pub translation: TranslationServiceConfig,

    /// Additional or overriding mode definitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modes: Vec<ModeConfig>,
}

fn default_mode() -> String {
    "balanced".into()
}
fn default_apology() -> String {
    "ขออภัย เกิดข้อผิดพลาด".into()
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Language the user reads answers in
    #[serde(default = "default_display")]
    pub display: String,

    /// Language questions are translated into before generation.
    /// Empty disables the bridge.
    #[serde(default = "default_bridge")]
    pub bridge: String,

    /// Hop used when direct recovery into the display language fails
    #[serde(default = "default_intermediate")]
    pub intermediate: String,

    /// Answer languages accepted without recovery translation
    #[serde(default = "default_passthrough")]
    pub passthrough: Vec<String>,
}

fn default_display() -> String {
    "th".into()
}
fn default_bridge() -> String {
    "zh-CN".into()
}
fn default_intermediate() -> String {
    "en".into()
}
fn default_passthrough() -> Vec<String> {
    vec!["th".into(), "en".into()]
}

impl LanguageConfig {
    /// The bridge language, or `None` when bridging is disabled.
    pub fn bridge_language(&self) -> Option<&str> {
        let bridge = self.bridge.trim();
        (!bridge.is_empty()).then_some(bridge)
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            display: default_display(),
            bridge: default_bridge(),
            intermediate: default_intermediate(),
            passthrough: default_passthrough(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GenerationServiceConfig {
    /// Backend kind: "tgi"
    #[serde(default = "default_generation_backend")]
    pub backend: String,

    #[serde(default = "default_generation_url")]
    pub api_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Informational; sent as a header by some gateways
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,

    /// Additional endpoints tried in order when the primary fails
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback_urls: Vec<String>,
}

fn default_generation_backend() -> String {
    "tgi".into()
}
fn default_generation_url() -> String {
    "http://localhost:8080".into()
}
fn default_generation_timeout() -> u64 {
    120
}

impl Default for GenerationServiceConfig {
    fn default() -> Self {
        Self {
            backend: default_generation_backend(),
            api_url: default_generation_url(),
            api_key: None,
            model: None,
            timeout_secs: default_generation_timeout(),
            fallback_urls: vec![],
        }
    }
}

impl std::fmt::Debug for GenerationServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationServiceConfig")
            .field("backend", &self.backend)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("fallback_urls", &self.fallback_urls)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TranslationServiceConfig {
    /// Backend kind: "libretranslate" or "none"
    #[serde(default = "default_translation_backend")]
    pub backend: String,

    #[serde(default = "default_translation_url")]
    pub api_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_translation_timeout")]
    pub timeout_secs: u64,

    /// Language detection: "script" (offline, Unicode script) or "service"
    #[serde(default = "default_detector")]
    pub detector: String,
}

fn default_translation_backend() -> String {
    "libretranslate".into()
}
fn default_translation_url() -> String {
    "http://localhost:5000".into()
}
fn default_translation_timeout() -> u64 {
    15
}
fn default_detector() -> String {
    "script".into()
}

impl Default for TranslationServiceConfig {
    fn default() -> Self {
        Self {
            backend: default_translation_backend(),
            api_url: default_translation_url(),
            api_key: None,
            timeout_secs: default_translation_timeout(),
            detector: default_detector(),
        }
    }
}

impl std::fmt::Debug for TranslationServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationServiceConfig")
            .field("backend", &self.backend)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("timeout_secs", &self.timeout_secs)
            .field("detector", &self.detector)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.lingobridge/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `LINGOBRIDGE_MODE`
    /// - `LINGOBRIDGE_GENERATION_URL`
    /// - `LINGOBRIDGE_API_KEY`, then `HF_API_TOKEN`
    /// - `LINGOBRIDGE_TRANSLATION_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;

        if let Ok(mode) = std::env::var("LINGOBRIDGE_MODE") {
            config.default_mode = mode;
        }

        if let Ok(url) = std::env::var("LINGOBRIDGE_GENERATION_URL") {
            config.generation.api_url = url;
        }

        if config.generation.api_key.is_none() {
            config.generation.api_key = std::env::var("LINGOBRIDGE_API_KEY")
                .ok()
                .or_else(|| std::env::var("HF_API_TOKEN").ok());
        }

        if let Ok(url) = std::env::var("LINGOBRIDGE_TRANSLATION_URL") {
            config.translation.api_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".lingobridge")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.languages.display.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "languages.display must not be empty".into(),
            ));
        }

        if self.languages.intermediate.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "languages.intermediate must not be empty".into(),
            ));
        }

        if self.generation.timeout_secs == 0 || self.translation.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "service timeouts must be > 0".into(),
            ));
        }

        if !matches!(self.translation.backend.as_str(), "libretranslate" | "none") {
            return Err(ConfigError::ValidationError(format!(
                "unknown translation backend '{}'",
                self.translation.backend
            )));
        }

        if !matches!(self.translation.detector.as_str(), "script" | "service") {
            return Err(ConfigError::ValidationError(format!(
                "unknown language detector '{}'",
                self.translation.detector
            )));
        }

        if self.translation.detector == "service" && self.translation.backend == "none" {
            return Err(ConfigError::ValidationError(
                "detector = \"service\" requires a translation backend".into(),
            ));
        }

        if self.generation.backend != "tgi" {
            return Err(ConfigError::ValidationError(format!(
                "unknown generation backend '{}'",
                self.generation.backend
            )));
        }

        self.mode_registry()?;
        Ok(())
    }

    /// Build the mode catalogue: built-ins, then configured modes on top.
    pub fn mode_registry(&self) -> Result<ModeConfigRegistry, ConfigError> {
        let builtin = ModeConfigRegistry::default();
        let modes = builtin.modes().cloned().chain(self.modes.iter().cloned());
        ModeConfigRegistry::new(modes, builtin.default_mode().id.clone())
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_mode: default_mode(),
            apology_message: default_apology(),
            languages: LanguageConfig::default(),
            generation: GenerationServiceConfig::default(),
            translation: TranslationServiceConfig::default(),
            modes: vec![],
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
