/*!
 * Token counting for chunk budgeting.
 *
 * The chunker only needs a deterministic `count` per model. OpenAI-family
 * models are counted with their real BPE through `tiktoken-rs`; other models
 * fall back to a character-based estimate.
 */

use std::fmt::Debug;

use log::warn;
use tiktoken_rs::CoreBPE;

use crate::errors::TranslationError;

/// Counts how many model tokens a string consumes
pub trait TokenCounter: Send + Sync + Debug {
    /// Number of tokens `text` encodes to
    fn count(&self, text: &str) -> usize;
}

/// Exact BPE counter for OpenAI models
pub struct TiktokenCounter {
    model: String,
    bpe: CoreBPE,
}

impl TiktokenCounter {
    /// Load the encoding used by the given model
    pub fn for_model(model: &str) -> Result<Self, TranslationError> {
        let bpe = tiktoken_rs::get_bpe_from_model(model)
            .map_err(|e| TranslationError::Tokenizer(format!("no encoding for model '{}': {}", model, e)))?;

        Ok(Self {
            model: model.to_string(),
            bpe,
        })
    }

    /// Model this counter was built for
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Debug for TiktokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiktokenCounter").field("model", &self.model).finish()
    }
}

impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

/// Rough estimate of ~4 characters per token
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedTokenCounter;

impl TokenCounter for EstimatedTokenCounter {
    fn count(&self, text: &str) -> usize {
        text.chars().count().div_ceil(4)
    }
}

/// Counts whitespace-separated words; deterministic and model independent
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenCounter;

impl TokenCounter for WordTokenCounter {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

/// Best available counter for a model name
pub fn counter_for_model(model: &str) -> Box<dyn TokenCounter> {
    match TiktokenCounter::for_model(model) {
        Ok(counter) => Box::new(counter),
        Err(e) => {
            warn!("{}; falling back to estimated token counts", e);
            Box::new(EstimatedTokenCounter)
        }
    }
}
