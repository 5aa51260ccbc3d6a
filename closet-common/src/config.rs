//! Configuration loading and oracle credential resolution
//!
//! Two-tier configuration:
//! 1. **TOML bootstrap**: logging, oracle endpoint/timeouts, generation limits
//! 2. **Environment overrides**: oracle API key and endpoint
//!
//! # Settings Sources Priority
//!
//! 1. Environment variables (`CLOSET_ORACLE_API_KEY`, `CLOSET_ORACLE_ENDPOINT`)
//! 2. TOML configuration file
//! 3. Built-in defaults (code constants)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable holding the oracle API key
pub const ENV_ORACLE_API_KEY: &str = "CLOSET_ORACLE_API_KEY";

/// Environment variable overriding the oracle scoring endpoint
pub const ENV_ORACLE_ENDPOINT: &str = "CLOSET_ORACLE_ENDPOINT";

const DEFAULT_ORACLE_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";
const DEFAULT_MODELS_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Bootstrap configuration loaded from TOML file
///
/// Every table is optional; missing values fall back to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Compatibility oracle connection settings
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Suggestion generation limits
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Compatibility oracle connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OracleConfig {
    /// Scoring endpoint (generateContent URL)
    #[serde(default = "default_oracle_endpoint")]
    pub endpoint: String,

    /// Model listing endpoint used by the connectivity self-check
    #[serde(default = "default_models_endpoint")]
    pub models_endpoint: String,

    /// API key (prefer the environment variable over storing it here)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Bounded wait for one oracle round-trip, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts after a transport error or 5xx response
    #[serde(default)]
    pub max_retries: u32,

    /// Sampling temperature sent with each request
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum output length requested from the oracle
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Client-side request quota
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: default_oracle_endpoint(),
            models_endpoint: default_models_endpoint(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            requests_per_minute: default_requests_per_minute(),
        }
    }
}

/// Suggestion generation limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Per-side item count above which the collection is randomly sampled down
    #[serde(default = "default_sample_limit")]
    pub sample_limit: usize,

    /// Ceiling on pairs scored per generation run
    #[serde(default = "default_max_pairs")]
    pub max_pairs: usize,

    /// Consecutive oracle failures that disable the oracle for the rest of a run
    #[serde(default = "default_breaker_threshold")]
    pub breaker_threshold: u32,

    /// Oracle share of the blended score (heuristic gets the remainder)
    #[serde(default = "default_oracle_weight")]
    pub oracle_weight: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            sample_limit: default_sample_limit(),
            max_pairs: default_max_pairs(),
            breaker_threshold: default_breaker_threshold(),
            oracle_weight: default_oracle_weight(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_oracle_endpoint() -> String {
    DEFAULT_ORACLE_ENDPOINT.to_string()
}

fn default_models_endpoint() -> String {
    DEFAULT_MODELS_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_output_tokens() -> u32 {
    200
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_sample_limit() -> usize {
    10
}

fn default_max_pairs() -> usize {
    30
}

fn default_breaker_threshold() -> u32 {
    3
}

fn default_oracle_weight() -> f64 {
    0.6
}

impl TomlConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns `Error::Config` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

        let config: TomlConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        config.validate()?;
        info!("Loaded TOML configuration from {:?}", path);
        Ok(config)
    }

    /// Load from an explicit path, else the default location, else built-in defaults
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                info!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        let g = &self.generation;
        if g.sample_limit == 0 {
            return Err(Error::Config("generation.sample_limit must be at least 1".to_string()));
        }
        if g.max_pairs == 0 {
            return Err(Error::Config("generation.max_pairs must be at least 1".to_string()));
        }
        if g.breaker_threshold == 0 {
            return Err(Error::Config(
                "generation.breaker_threshold must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&g.oracle_weight) {
            return Err(Error::Config(format!(
                "generation.oracle_weight must be within 0.0-1.0, got {}",
                g.oracle_weight
            )));
        }
        if self.oracle.timeout_secs == 0 {
            return Err(Error::Config("oracle.timeout_secs must be at least 1".to_string()));
        }
        if self.oracle.requests_per_minute == 0 {
            return Err(Error::Config(
                "oracle.requests_per_minute must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default configuration file path (`~/.config/closet-fusion/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("closet-fusion").join("config.toml"))
}

/// Resolve the oracle API key
///
/// **Priority:** ENV → TOML. Returns `None` when neither holds a usable key;
/// the oracle adapter then answers every request with its rule-based estimate.
pub fn resolve_oracle_api_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(ENV_ORACLE_API_KEY)
        .ok()
        .filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .oracle
        .api_key
        .as_ref()
        .filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "Oracle API key found in both environment and TOML. Using environment (highest priority)."
        );
    }

    if let Some(key) = env_key {
        info!("Oracle API key loaded from environment variable");
        return Some(key);
    }

    if let Some(key) = toml_key {
        info!("Oracle API key loaded from TOML config");
        return Some(key.clone());
    }

    warn!("Oracle API key not configured; oracle scoring will use the rule-based fallback");
    None
}

/// Resolve the oracle configuration with environment overrides applied
pub fn resolve_oracle_config(toml_config: &TomlConfig) -> OracleConfig {
    let mut oracle = toml_config.oracle.clone();
    oracle.api_key = resolve_oracle_api_key(toml_config);

    if let Ok(endpoint) = std::env::var(ENV_ORACLE_ENDPOINT) {
        if !endpoint.trim().is_empty() {
            info!(endpoint = %endpoint, "Oracle endpoint overridden from environment");
            oracle.endpoint = endpoint;
        }
    }

    oracle
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Write configuration atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, target: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp_path = target.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, target)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_limits() {
        let config = TomlConfig::default();
        assert_eq!(config.generation.sample_limit, 10);
        assert_eq!(config.generation.max_pairs, 30);
        assert_eq!(config.generation.breaker_threshold, 3);
        assert!((config.generation.oracle_weight - 0.6).abs() < f64::EPSILON);
        assert_eq!(config.oracle.timeout_secs, 20);
        assert_eq!(config.oracle.max_output_tokens, 200);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            [generation]
            max_pairs = 12
            "#,
        )
        .unwrap();

        assert_eq!(config.generation.max_pairs, 12);
        assert_eq!(config.generation.sample_limit, 10);
        assert_eq!(config.oracle, OracleConfig::default());
    }

    #[test]
    fn test_validate_rejects_out_of_range_weight() {
        let mut config = TomlConfig::default();
        config.generation.oracle_weight = 1.5;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = TomlConfig::default();
        config.generation.max_pairs = 0;
        assert!(config.validate().is_err());

        let mut config = TomlConfig::default();
        config.generation.breaker_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }
}
