use candle::{DType, Device, Result, Tensor};
use candle_core as candle;
use candle_core::IndexOp;
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use super::source::ModelFiles;

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))
}

fn var_builder<'a>(files: &ModelFiles, dtype: DType, device: &Device) -> Result<VarBuilder<'a>> {
    // SAFETY: the safetensors file is not modified while mapped.
    unsafe { VarBuilder::from_mmaped_safetensors(&[files.weights.clone()], dtype, device) }
}

/// Rejects checkpoints whose encoder `BertModel` cannot run.
///
/// RoBERTa offsets position ids by the padding index and uses a different
/// classification head, so its weights would load into wrong activations.
fn check_architecture(vb: &VarBuilder) -> Result<()> {
    if vb.contains_tensor("roberta.embeddings.word_embeddings.weight") {
        return Err(candle::Error::Msg(
            "RoBERTa checkpoints are not supported; use a BERT-family model".to_string(),
        ));
    }
    Ok(())
}

/// Loads the encoder under whichever prefix the checkpoint uses.
fn load_encoder(vb: &VarBuilder, config: &Config) -> Result<BertModel> {
    if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
        BertModel::load(vb.pp("bert"), config)
    } else {
        BertModel::load(vb.clone(), config)
    }
}

struct BertForSequenceClassificationImpl {
    bert: BertModel,
    classifier: Linear,
}

impl BertForSequenceClassificationImpl {
    fn load(vb: VarBuilder, config: &Config) -> Result<Self> {
        let bert = load_encoder(&vb, config)?;
        let classifier = candle_nn::linear(config.hidden_size, 1, vb.pp("classifier"))?;

        Ok(Self { bert, classifier })
    }

    fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        let output = self
            .bert
            .forward(input_ids, token_type_ids, attention_mask)?;
        let cls_token = output.i((.., 0, ..))?;
        self.classifier.forward(&cls_token)
    }
}

/// Single-logit sequence classifier (cross-encoder head).
#[derive(Clone)]
pub struct BertClassifier(Arc<BertForSequenceClassificationImpl>);

impl BertClassifier {
    pub fn load(files: &ModelFiles, dtype: DType, device: &Device) -> Result<Self> {
        let vb = var_builder(files, dtype, device)?;
        check_architecture(&vb)?;
        let config = read_config(&files.config)?;
        let model = BertForSequenceClassificationImpl::load(vb, &config)?;

        Ok(Self(Arc::new(model)))
    }

    /// Returns logits shaped `[batch, 1]`.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        self.0.forward(input_ids, token_type_ids, attention_mask)
    }
}

/// How token states are reduced to one sentence vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pooling {
    /// First (`[CLS]`) token state.
    #[default]
    Cls,
    /// Attention-masked mean of all token states.
    Mean,
}

/// Bare BERT encoder producing pooled sentence embeddings.
#[derive(Clone)]
pub struct BertEncoder {
    bert: Arc<BertModel>,
    pooling: Pooling,
}

impl BertEncoder {
    pub fn load(
        files: &ModelFiles,
        dtype: DType,
        device: &Device,
        pooling: Pooling,
    ) -> Result<Self> {
        let vb = var_builder(files, dtype, device)?;
        check_architecture(&vb)?;
        let config = read_config(&files.config)?;
        let bert = load_encoder(&vb, &config)?;

        Ok(Self {
            bert: Arc::new(bert),
            pooling,
        })
    }

    /// Returns pooled embeddings shaped `[batch, hidden]`.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        let hidden = self
            .bert
            .forward(input_ids, token_type_ids, Some(attention_mask))?;

        match self.pooling {
            Pooling::Cls => hidden.i((.., 0, ..)),
            Pooling::Mean => {
                let mask = attention_mask.to_dtype(hidden.dtype())?.unsqueeze(2)?;
                let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
                let counts = mask.sum(1)?;
                summed.broadcast_div(&counts)
            }
        }
    }
}
