/*!
 * Chunk translation with bisection retry.
 *
 * A chunk is encoded as a table, sent to the translator and validated. A
 * valid reply is decoded back onto the entries. An invalid reply splits the
 * chunk at its midpoint and each half is encoded and translated again, down
 * to single entries; a single entry that still fails is unrecoverable.
 * Provider errors are never retried here.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use futures::future::{BoxFuture, FutureExt};
use log::{debug, error, warn};

use crate::app_config::{ModelConfig, TranslationConfig};
use crate::errors::TranslationError;
use crate::providers::{self, Translator};
use crate::subtitle_processor::SubtitleEntry;
use crate::validation::TableValidator;

use super::prompts::PromptTemplate;
use super::table;

/// Everything a chunk translation needs, passed explicitly
#[derive(Debug, Clone)]
pub struct TranslationContext {
    /// Model the chunks are sized for
    pub model: ModelConfig,

    /// Token budget of one chunk
    pub token_budget: usize,

    /// Adapter the tables are sent to
    pub translator: Arc<dyn Translator>,

    /// Instructions sent with every table
    pub prompt: PromptTemplate,
}

impl TranslationContext {
    /// Create a context with the default instructions
    pub fn new(model: ModelConfig, token_budget: usize, translator: Arc<dyn Translator>) -> Self {
        Self {
            model,
            token_budget,
            translator,
            prompt: PromptTemplate::default(),
        }
    }

    /// Replace the instruction template
    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    /// Resolve model, budget and adapter from the configuration
    pub fn from_config(config: &TranslationConfig) -> Result<Self> {
        let model = config.model_config()?;
        let token_budget = config.token_budget()?;
        let translator = providers::build_translator(config)?;

        Ok(Self::new(model, token_budget, translator)
            .with_prompt(PromptTemplate::new(&config.common.system_prompt)))
    }
}

/// Request counters of a chunk translator
#[derive(Debug, Default)]
struct TranslationStats {
    requests: AtomicUsize,
    bisections: AtomicUsize,
}

/// Translates chunks, bisecting on malformed replies
#[derive(Debug)]
pub struct ChunkTranslator {
    context: TranslationContext,
    stats: TranslationStats,
}

impl ChunkTranslator {
    pub fn new(context: TranslationContext) -> Self {
        Self {
            context,
            stats: TranslationStats::default(),
        }
    }

    pub fn context(&self) -> &TranslationContext {
        &self.context
    }

    /// Translator calls made so far
    pub fn requests(&self) -> usize {
        self.stats.requests.load(Ordering::Relaxed)
    }

    /// Chunks split after an invalid reply so far
    pub fn bisections(&self) -> usize {
        self.stats.bisections.load(Ordering::Relaxed)
    }

    /// Translate a chunk.
    ///
    /// Returns the entries in input order with their text replaced by the
    /// translation; timing and sequence numbers are untouched.
    ///
    /// # Errors
    /// * `TranslationError::Provider` - the adapter failed; not retried
    /// * `TranslationError::Unrecoverable` - a single entry never produced a valid reply
    pub async fn translate_chunk(
        &self,
        chunk: &[SubtitleEntry],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<SubtitleEntry>, TranslationError> {
        if chunk.is_empty() {
            return Ok(Vec::new());
        }

        let instructions = self.context.prompt.render(source_language, target_language);
        self.translate_span(chunk, &instructions).await
    }

    fn translate_span<'a>(
        &'a self,
        entries: &'a [SubtitleEntry],
        instructions: &'a str,
    ) -> BoxFuture<'a, Result<Vec<SubtitleEntry>, TranslationError>> {
        async move {
            let request = table::build_table(&table::encode_chunk(entries));

            self.stats.requests.fetch_add(1, Ordering::Relaxed);
            debug!(
                "Sending {} rows starting at #{} to {}",
                entries.len(), entries[0].seq_num, self.context.translator.name()
            );
            let reply = self.context.translator.translate(instructions, &request).await?;

            let validation = TableValidator::validate(&reply, entries.len());
            let Some(defect) = validation.defect else {
                return Ok(entries
                    .iter()
                    .zip(table::decode(&reply))
                    .map(|(entry, text)| entry.with_text(text))
                    .collect());
            };

            let malformed = TranslationError::MalformedResponse {
                expected: entries.len(),
                reason: defect.to_string(),
            };

            if entries.len() <= 1 {
                let entry = &entries[0];
                error!("Entry #{} cannot be split further: {}", entry.seq_num, malformed);
                return Err(TranslationError::Unrecoverable {
                    seq_num: entry.seq_num,
                    start: entry.format_start_time(),
                    reason: malformed.to_string(),
                });
            }

            self.stats.bisections.fetch_add(1, Ordering::Relaxed);
            let (first, second) = entries.split_at(entries.len() / 2);
            warn!(
                "{}; retrying as {} + {} rows from #{}",
                malformed, first.len(), second.len(), entries[0].seq_num
            );

            let mut translated = self.translate_span(first, instructions).await?;
            translated.extend(self.translate_span(second, instructions).await?);
            Ok(translated)
        }
        .boxed()
    }
}
