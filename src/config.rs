//! Configuration management for mdtranslate.
//!
//! Handles loading, saving, and validating configuration from
//! platform-specific config directories, with environment overrides
//! applied on top of the file.

use crate::client::RetryPolicy;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Application name used for config directory.
const APP_NAME: &str = "mdtranslate";

/// Default config filename.
const CONFIG_FILENAME: &str = "config.toml";

/// Environment variables recognised as overrides.
pub const ENV_TARGET_LANGUAGE: &str = "MDTRANSLATE_TARGET_LANGUAGE";
pub const ENV_OUTPUT_DIR: &str = "MDTRANSLATE_OUTPUT_DIR";
pub const ENV_MAX_RETRIES: &str = "MDTRANSLATE_MAX_RETRIES";
pub const ENV_RETRY_DELAY: &str = "MDTRANSLATE_RETRY_DELAY";
pub const ENV_RATE_LIMIT_WAIT: &str = "MDTRANSLATE_RATE_LIMIT_WAIT";
pub const ENV_MODEL: &str = "GEMINI_MODEL";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote API settings.
    pub api: ApiConfig,

    /// Translation behavior settings.
    pub translation: TranslationConfig,

    /// LLM prompts.
    pub prompts: PromptsConfig,
}

/// API configuration for the Gemini endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL for the API.
    pub base_url: String,

    /// Model identifier.
    pub model: String,

    /// Timeout for a single request in seconds.
    pub request_timeout_sec: f64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            request_timeout_sec: 120.0,
        }
    }
}

/// Translation behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Language the documents are translated into.
    pub target_language: String,

    /// Subdirectory of the source root that receives translated files.
    pub output_directory_name: String,

    /// Extension of the documents to translate.
    pub extension: String,

    /// Number of retries after the first failed attempt.
    pub max_retries: u32,

    /// Initial backoff in seconds, doubled per transient retry.
    pub retry_delay_sec: f64,

    /// Wait in seconds after a rate-limit response.
    pub rate_limit_wait_sec: f64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_language: "Japanese".to_string(),
            output_directory_name: "jp".to_string(),
            extension: "md".to_string(),
            max_retries: 3,
            retry_delay_sec: 1.0,
            rate_limit_wait_sec: 60.0,
        }
    }
}

/// LLM prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Prompt for document translation; `{language}` is substituted.
    pub translation: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            translation: "Translate the following text to {language}. Preserve all Markdown formatting exactly as it appears. Keep every token of the form <PLACEHOLDER_n> exactly as written and on its own line. Only return the translated text without any additional explanation:".to_string(),
        }
    }
}

/// Parses an override value, naming the variable on failure.
fn parse_override<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Converts a positive number of seconds into a `Duration`.
pub(crate) fn seconds(key: &str, value: f64) -> Result<Duration, ConfigError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than 0".to_string(),
        });
    }
    Duration::try_from_secs_f64(value).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

impl Config {
    /// Returns the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full path to the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// Loads configuration from the default location.
    ///
    /// If the config file doesn't exist, creates a default one.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = get(ENV_TARGET_LANGUAGE) {
            self.translation.target_language = value.trim().to_string();
        }
        if let Some(value) = get(ENV_OUTPUT_DIR) {
            self.translation.output_directory_name = value.trim().to_string();
        }
        if let Some(value) = get(ENV_MAX_RETRIES) {
            self.translation.max_retries = parse_override(ENV_MAX_RETRIES, &value)?;
        }
        if let Some(value) = get(ENV_RETRY_DELAY) {
            self.translation.retry_delay_sec = parse_override(ENV_RETRY_DELAY, &value)?;
        }
        if let Some(value) = get(ENV_RATE_LIMIT_WAIT) {
            self.translation.rate_limit_wait_sec = parse_override(ENV_RATE_LIMIT_WAIT, &value)?;
        }
        if let Some(value) = get(ENV_MODEL) {
            self.api.model = value.trim().to_string();
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.translation.target_language.trim().is_empty() {
            return Err(ConfigError::MissingValue(
                "translation.target_language".to_string(),
            ));
        }

        let output = &self.translation.output_directory_name;
        if output.trim().is_empty()
            || output.contains(['/', '\\'])
            || output == "."
            || output == ".."
        {
            return Err(ConfigError::InvalidValue {
                key: "translation.output_directory_name".to_string(),
                message: "must be a single directory name".to_string(),
            });
        }

        if self.translation.extension.trim().is_empty() {
            return Err(ConfigError::MissingValue("translation.extension".to_string()));
        }

        for (key, value) in [
            ("translation.retry_delay_sec", self.translation.retry_delay_sec),
            (
                "translation.rate_limit_wait_sec",
                self.translation.rate_limit_wait_sec,
            ),
            ("api.request_timeout_sec", self.api.request_timeout_sec),
        ] {
            seconds(key, value)?;
        }

        if self.api.model.trim().is_empty() {
            return Err(ConfigError::MissingValue("api.model".to_string()));
        }

        Ok(())
    }

    /// Returns the retry policy described by this configuration.
    pub fn retry_policy(&self) -> Result<RetryPolicy, ConfigError> {
        Ok(RetryPolicy {
            max_retries: self.translation.max_retries,
            base_delay: seconds("translation.retry_delay_sec", self.translation.retry_delay_sec)?,
            rate_limit_wait: seconds(
                "translation.rate_limit_wait_sec",
                self.translation.rate_limit_wait_sec,
            )?,
        })
    }
}
