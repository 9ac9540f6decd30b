// crates/figma-cache/src/config.rs
// ============================================================================
// Module: Figma Cache Configuration
// Description: TOML configuration for listing paths, API limits, and workers.
// Purpose: Load and validate cache settings with deterministic defaults.
// Dependencies: crate::{api, batch}, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is resolved from an explicit path, then from the
//! `FIGMA_CACHE_CONFIG` environment variable, then from `figma-cache.toml` in
//! the working directory. Only the default file may be absent, in which case
//! defaults apply. Unknown keys are rejected and every value is bounds checked.
//!
//! ```toml
//! urls_file = "docs/design/figma_urls.md"
//! cache_dir = "docs/design/figma_cache"
//! jobs = 4
//! request_delay_ms = 0
//!
//! [api]
//! base_url = "https://api.figma.com"
//! timeout_ms = 30000
//! retry_backoff_ms = 500
//! ```
//!
//! The access token is never read from this file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::api::ApiConfig;
use crate::api::DEFAULT_API_BASE;
use crate::api::DEFAULT_MAX_IMAGE_BYTES;
use crate::api::DEFAULT_MAX_RESPONSE_BYTES;
use crate::api::DEFAULT_RETRY_BACKOFF_MS;
use crate::api::DEFAULT_TIMEOUT_MS;
use crate::batch::BatchOptions;
use crate::batch::DEFAULT_JOBS;
use crate::batch::MAX_JOBS;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "figma-cache.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "FIGMA_CACHE_CONFIG";
/// Default listing path.
pub const DEFAULT_URLS_FILE: &str = "docs/design/figma_urls.md";
/// Default cache root.
pub const DEFAULT_CACHE_DIR: &str = "docs/design/figma_cache";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 256 * 1024;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum request timeout in milliseconds.
const MAX_TIMEOUT_MS: u64 = 600_000;
/// Maximum retry backoff and inter-entry delay in milliseconds.
const MAX_DELAY_MS: u64 = 60_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Top-level cache configuration.
///
/// # Invariants
/// - After [`FigmaCacheConfig::validate`], `jobs` is in `1..=MAX_JOBS` and
///   both paths are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FigmaCacheConfig {
    /// Listing file path.
    pub urls_file: String,
    /// Cache root directory.
    pub cache_dir: String,
    /// Worker count for batch runs.
    pub jobs: usize,
    /// Pause after each processed entry, in milliseconds.
    pub request_delay_ms: u64,
    /// Remote API settings.
    pub api: ApiSettings,
}

impl Default for FigmaCacheConfig {
    fn default() -> Self {
        Self {
            urls_file: DEFAULT_URLS_FILE.to_string(),
            cache_dir: DEFAULT_CACHE_DIR.to_string(),
            jobs: DEFAULT_JOBS,
            request_delay_ms: 0,
            api: ApiSettings::default(),
        }
    }
}

/// Remote API settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiSettings {
    /// API base URL.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Pause before the single retry, in milliseconds.
    pub retry_backoff_ms: u64,
    /// Maximum JSON response size in bytes.
    pub max_response_bytes: usize,
    /// Maximum image size in bytes.
    pub max_image_bytes: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl FigmaCacheConfig {
    /// Loads configuration using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an explicit file is missing, or when
    /// loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, required) = resolve_path(path)?;
        validate_path_string("config path", &resolved.to_string_lossy())?;
        let bytes = match fs::read(&resolved) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound && !required => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(ConfigError::Io(format!("{}: {err}", resolved.display())));
            }
        };
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is out of bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("urls_file", &self.urls_file)?;
        validate_path_string("cache_dir", &self.cache_dir)?;
        if !(1 ..= MAX_JOBS).contains(&self.jobs) {
            return Err(ConfigError::Invalid(format!("jobs must be between 1 and {MAX_JOBS}")));
        }
        if self.request_delay_ms > MAX_DELAY_MS {
            return Err(ConfigError::Invalid(format!(
                "request_delay_ms must be at most {MAX_DELAY_MS}"
            )));
        }
        self.api.validate()
    }

    /// Builds the API client configuration for `token`.
    #[must_use]
    pub fn api_config(&self, token: impl Into<String>) -> ApiConfig {
        let mut config = ApiConfig::new(token);
        config.base_url.clone_from(&self.api.base_url);
        config.timeout_ms = self.api.timeout_ms;
        config.retry_backoff_ms = self.api.retry_backoff_ms;
        config.max_response_bytes = self.api.max_response_bytes;
        config.max_image_bytes = self.api.max_image_bytes;
        config
    }

    /// Builds batch options.
    #[must_use]
    pub const fn batch_options(&self, force: bool) -> BatchOptions {
        BatchOptions {
            jobs: self.jobs,
            force,
            request_delay: Duration::from_millis(self.request_delay_ms),
        }
    }
}

impl ApiSettings {
    /// Validates API settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let base = self.base_url.trim();
        if !(base.starts_with("https://") || base.starts_with("http://")) {
            return Err(ConfigError::Invalid(
                "api.base_url must include http:// or https://".to_string(),
            ));
        }
        if !(1 ..= MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "api.timeout_ms must be between 1 and {MAX_TIMEOUT_MS}"
            )));
        }
        if self.retry_backoff_ms > MAX_DELAY_MS {
            return Err(ConfigError::Invalid(format!(
                "api.retry_backoff_ms must be at most {MAX_DELAY_MS}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_image_bytes == 0 {
            return Err(ConfigError::Invalid(
                "api byte limits must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path; the flag reports whether the file must exist.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR)
        && !env_path.trim().is_empty()
    {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
