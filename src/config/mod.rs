//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `SIFT_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::str::FromStr;

use crate::biencoder::BiEncoderConfig;
use crate::constants::{DEFAULT_MAX_SEQ_LEN, DEFAULT_PAIR_CACHE_CAPACITY};
use crate::registry::RerankerKind;
use crate::reranker::RerankerConfig;

/// Scorer configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `SIFT_*` overrides on top of defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Scoring strategy. Default: `optimized_crossencoder`.
    pub reranker: RerankerKind,

    /// Model directory or hub id; `None` uses the strategy's default model.
    pub model: Option<String>,

    /// Batch size override; `None` derives one from the device.
    pub batch_size: Option<usize>,

    /// Max tokens per input. Default: `512`.
    pub max_seq_len: usize,

    /// Request model compilation (cross-encoder only). Default: `true`.
    pub compile_model: bool,

    /// Score a placeholder pair after loading (cross-encoder only). Default: `true`.
    pub warm_up: bool,

    /// Pair cache capacity; `0` disables. Default: `1000`.
    pub cache_capacity: u64,

    /// Normalize bi-encoder embeddings. Default: `true`.
    pub normalize_embeddings: bool,

    /// CUDA device memory hint used to pick the capacity class.
    pub gpu_memory_gb: Option<f64>,

    /// Use the deterministic weight-free backend. Default: `false`.
    pub stub: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reranker: RerankerKind::default(),
            model: None,
            batch_size: None,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            compile_model: true,
            warm_up: true,
            cache_capacity: DEFAULT_PAIR_CACHE_CAPACITY,
            normalize_embeddings: true,
            gpu_memory_gb: None,
            stub: false,
        }
    }
}

impl Config {
    const ENV_RERANKER: &'static str = "SIFT_RERANKER";
    const ENV_MODEL: &'static str = "SIFT_MODEL";
    const ENV_BATCH_SIZE: &'static str = "SIFT_BATCH_SIZE";
    const ENV_MAX_SEQ_LEN: &'static str = "SIFT_MAX_SEQ_LEN";
    const ENV_COMPILE: &'static str = "SIFT_COMPILE";
    const ENV_WARM_UP: &'static str = "SIFT_WARM_UP";
    const ENV_CACHE_CAPACITY: &'static str = "SIFT_CACHE_CAPACITY";
    const ENV_NORMALIZE: &'static str = "SIFT_NORMALIZE_EMBEDDINGS";
    const ENV_GPU_MEMORY_GB: &'static str = "SIFT_GPU_MEMORY_GB";
    const ENV_STUB: &'static str = "SIFT_STUB";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let reranker = match Self::read_var(Self::ENV_RERANKER) {
            Some(value) => RerankerKind::from_str(&value)?,
            None => defaults.reranker,
        };

        Ok(Self {
            reranker,
            model: Self::read_var(Self::ENV_MODEL),
            batch_size: Self::parse_optional_from_env(Self::ENV_BATCH_SIZE)?,
            max_seq_len: Self::parse_optional_from_env(Self::ENV_MAX_SEQ_LEN)?
                .unwrap_or(defaults.max_seq_len),
            compile_model: Self::parse_bool_from_env(Self::ENV_COMPILE, defaults.compile_model)?,
            warm_up: Self::parse_bool_from_env(Self::ENV_WARM_UP, defaults.warm_up)?,
            cache_capacity: Self::parse_optional_from_env(Self::ENV_CACHE_CAPACITY)?
                .unwrap_or(defaults.cache_capacity),
            normalize_embeddings: Self::parse_bool_from_env(
                Self::ENV_NORMALIZE,
                defaults.normalize_embeddings,
            )?,
            gpu_memory_gb: Self::parse_optional_float_from_env(Self::ENV_GPU_MEMORY_GB)?,
            stub: Self::parse_bool_from_env(Self::ENV_STUB, defaults.stub)?,
        })
    }

    /// Checks ranges that parsing alone does not catch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == Some(0) {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_BATCH_SIZE,
                reason: "must be at least 1".to_string(),
            });
        }

        if self.max_seq_len == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_MAX_SEQ_LEN,
                reason: "must be at least 1".to_string(),
            });
        }

        if let Some(gb) = self.gpu_memory_gb
            && !(gb.is_finite() && gb > 0.0)
        {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_GPU_MEMORY_GB,
                reason: format!("must be a positive number, got {gb}"),
            });
        }

        Ok(())
    }

    /// The configured model, or the default model of the selected strategy.
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.reranker.default_model())
    }

    pub fn reranker_config(&self) -> RerankerConfig {
        let mut config = RerankerConfig::new(self.model())
            .with_max_seq_len(self.max_seq_len)
            .with_compile(self.compile_model)
            .with_warm_up(self.warm_up)
            .with_cache_capacity(self.cache_capacity);
        config.batch_size = self.batch_size;
        config
    }

    pub fn biencoder_config(&self) -> BiEncoderConfig {
        let mut config = BiEncoderConfig::new(self.model())
            .with_max_seq_len(self.max_seq_len)
            .with_normalize_embeddings(self.normalize_embeddings);
        config.batch_size = self.batch_size;
        config
    }

    fn read_var(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_optional_from_env<T>(var_name: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr<Err = std::num::ParseIntError>,
    {
        Self::read_var(var_name)
            .map(|value| {
                value.parse().map_err(|e| ConfigError::InvalidInteger {
                    name: var_name,
                    value,
                    source: e,
                })
            })
            .transpose()
    }

    fn parse_optional_float_from_env(var_name: &'static str) -> Result<Option<f64>, ConfigError> {
        Self::read_var(var_name)
            .map(|value| {
                value.parse().map_err(|e| ConfigError::InvalidFloat {
                    name: var_name,
                    value,
                    source: e,
                })
            })
            .transpose()
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        let Some(value) = Self::read_var(var_name) else {
            return Ok(default);
        };

        match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidBool {
                name: var_name,
                value,
            }),
        }
    }
}
