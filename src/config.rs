//! Engine configuration with builder pattern.
//!
//! [`EngineConfig`] replaces the settings object of a hosting service: cache
//! behaviour, the default threshold cap for feature sweeps and the histogram
//! resolution. It uses the `bon` crate for builder generation and validates at
//! build time.
//!
//! # Example
//!
//! ```
//! use treelab::config::EngineConfig;
//!
//! // All defaults
//! let config = EngineConfig::builder().build().unwrap();
//! assert_eq!(config.cache_max_size, 100);
//!
//! // Small cache, coarse sweeps
//! let config = EngineConfig::builder()
//!     .cache_max_size(8)
//!     .max_thresholds(20)
//!     .build()
//!     .unwrap();
//! ```

use bon::Builder;
use serde::Deserialize;

use crate::utils::Parallelism;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A size or count parameter must be at least 1.
    ZeroValue { field: &'static str },
    /// The JSON settings document could not be parsed.
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroValue { field } => write!(f, "{} must be at least 1", field),
            Self::Parse(msg) => write!(f, "invalid engine settings: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// EngineConfig
// =============================================================================

/// Configuration for the modeling engine.
///
/// Deserializable from a JSON settings document; missing fields take the
/// builder defaults.
#[derive(Debug, Clone, Builder, Deserialize)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
#[serde(default)]
pub struct EngineConfig {
    // === Model cache ===
    /// Whether trained models are cached. Default: `true`.
    #[builder(default = true)]
    pub cache_enabled: bool,

    /// Maximum number of cached models. Default: 100.
    #[builder(default = 100)]
    pub cache_max_size: usize,

    // === Manual building ===
    /// Default cap on thresholds returned by a feature sweep. Default: 50.
    #[builder(default = 50)]
    pub max_thresholds: usize,

    /// Target bin count for equal-width histograms. Default: 10.
    #[builder(default = 10)]
    pub histogram_bins: usize,

    // === Resource control ===
    /// Whether batch prediction and sweeps may use rayon. Default: sequential.
    #[builder(default)]
    pub parallelism: Parallelism,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_max_size: 100,
            max_thresholds: 50,
            histogram_bins: 10,
            parallelism: Parallelism::Sequential,
        }
    }
}

/// Custom finishing function that validates the config.
impl<S: engine_config_builder::IsComplete> EngineConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroValue`] if `cache_max_size`, `max_thresholds`
    /// or `histogram_bins` is zero.
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl EngineConfig {
    /// Parse and validate a JSON settings document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_max_size == 0 {
            return Err(ConfigError::ZeroValue { field: "cache_max_size" });
        }
        if self.max_thresholds == 0 {
            return Err(ConfigError::ZeroValue { field: "max_thresholds" });
        }
        if self.histogram_bins == 0 {
            return Err(ConfigError::ZeroValue { field: "histogram_bins" });
        }
        Ok(())
    }
}
