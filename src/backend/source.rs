use std::path::{Path, PathBuf};

use hf_hub::api::sync::Api;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::{debug, info};

use super::error::BackendError;

pub const CONFIG_FILE: &str = "config.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Where a model's files come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Directory holding `config.json`, `model.safetensors` and `tokenizer.json`.
    Local(PathBuf),
    /// Hugging Face hub repository id (e.g. `BAAI/bge-base-en-v1.5`).
    Hub(String),
}

impl ModelSource {
    /// Existing paths, absolute paths and `./`-style paths are local; anything else is a hub id.
    pub fn parse(identifier: &str) -> Result<Self, BackendError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(BackendError::InvalidConfig {
                reason: "model identifier cannot be empty".to_string(),
            });
        }

        let path = Path::new(identifier);
        if path.exists() || path.is_absolute() || identifier.starts_with('.') {
            Ok(ModelSource::Local(path.to_path_buf()))
        } else {
            Ok(ModelSource::Hub(identifier.to_string()))
        }
    }

    /// Locates (downloading if needed) the files the candle backend reads.
    pub fn resolve(&self) -> Result<ModelFiles, BackendError> {
        match self {
            ModelSource::Local(dir) => ModelFiles::from_dir(dir),
            ModelSource::Hub(model) => ModelFiles::download(model),
        }
    }
}

/// Paths to the three files a BERT-family model needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub weights: PathBuf,
    pub tokenizer: PathBuf,
}

impl ModelFiles {
    pub fn from_dir(dir: &Path) -> Result<Self, BackendError> {
        if !dir.exists() {
            return Err(BackendError::ModelNotFound {
                path: dir.to_path_buf(),
            });
        }

        let files = Self {
            config: dir.join(CONFIG_FILE),
            weights: dir.join(WEIGHTS_FILE),
            tokenizer: dir.join(TOKENIZER_FILE),
        };

        for path in [&files.config, &files.weights, &files.tokenizer] {
            if !path.exists() {
                return Err(BackendError::ModelLoadFailed {
                    reason: format!("Missing {} in {}", file_name(path), dir.display()),
                });
            }
        }

        Ok(files)
    }

    pub fn download(model: &str) -> Result<Self, BackendError> {
        let download_failed = |reason: String| BackendError::DownloadFailed {
            model: model.to_string(),
            reason,
        };

        info!(model, "Fetching model files from hub");

        let api = Api::new().map_err(|e| download_failed(e.to_string()))?;
        let repo = api.model(model.to_string());

        let fetch = |file: &str| {
            repo.get(file)
                .map_err(|e| download_failed(format!("{file}: {e}")))
        };

        let files = Self {
            config: fetch(CONFIG_FILE)?,
            weights: fetch(WEIGHTS_FILE)?,
            tokenizer: fetch(TOKENIZER_FILE)?,
        };

        debug!(model, weights = %files.weights.display(), "Model files ready");
        Ok(files)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Loads a tokenizer that truncates to `max_len` and pads each batch to its longest entry.
pub fn load_tokenizer(path: &Path, max_len: usize) -> Result<Tokenizer, BackendError> {
    let mut tokenizer =
        Tokenizer::from_file(path).map_err(|e| BackendError::TokenizationFailed {
            reason: format!("Failed to load tokenizer from {}: {}", path.display(), e),
        })?;

    let truncation = TruncationParams {
        max_length: max_len,
        ..Default::default()
    };
    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| BackendError::TokenizationFailed {
            reason: format!("Failed to configure truncation: {}", e),
        })?;

    let mut padding = tokenizer.get_padding().cloned().unwrap_or(PaddingParams {
        strategy: PaddingStrategy::BatchLongest,
        ..Default::default()
    });
    padding.strategy = PaddingStrategy::BatchLongest;
    tokenizer.with_padding(Some(padding));

    Ok(tokenizer)
}
