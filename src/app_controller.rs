use anyhow::{Result, Context, anyhow};
use log::{info, warn};
use std::path::Path;
use std::time::{Duration, Instant};
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::subtitle_processor::{SubtitleEntry, SubtitleReader, SubtitleWriter};
use crate::translation::{ChunkTranslator, Chunker, TokenCounter, TranslationContext, counter_for_model};

// @module: Streaming translation pipeline

/// Options of one translation run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Replace an existing output file
    pub force_overwrite: bool,

    /// Chunks already translated by a previous run; their entries are
    /// skipped and the output is appended to
    pub skip_chunks: usize,

    /// Show the progress spinner
    pub show_progress: bool,
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Chunks translated in this run
    pub chunks: usize,
    /// Entries written in this run
    pub entries: usize,
    /// Translator calls, bisection retries included
    pub requests: usize,
    /// Chunks split after an invalid reply
    pub bisections: usize,
    /// Chunks skipped to resume a previous run
    pub skipped_chunks: usize,
}

/// One chunk of the plan computed without calling the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    /// 1-based chunk number
    pub number: usize,
    pub entries: usize,
    pub first_seq_num: usize,
    pub last_seq_num: usize,
    /// Summed row cost of the chunk
    pub tokens: usize,
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Model, budget and adapter shared by every chunk
    context: TranslationContext,

    // @field: Token counter of the configured model
    counter: Box<dyn TokenCounter>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let context = TranslationContext::from_config(&config.translation)
            .context("Failed to set up the translation context")?;
        let counter = counter_for_model(&context.model.name);

        Ok(Self::with_context(config, context, counter))
    }

    /// Create a controller around an explicit context and token counter
    pub fn with_context(config: Config, context: TranslationContext, counter: Box<dyn TokenCounter>) -> Self {
        Self {
            config,
            context,
            counter,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn chunker(&self) -> Chunker<'_> {
        Chunker::new(self.counter.as_ref(), self.context.token_budget)
    }

    /// Compute the chunk plan of a track without translating it
    pub fn plan(&self, input_file: &Path) -> Result<Vec<ChunkPlan>> {
        FileManager::check_input(input_file)?;
        let reader = SubtitleReader::open(input_file)
            .with_context(|| format!("Failed to read subtitle file: {}", input_file.display()))?;

        let mut plan = Vec::new();
        for (offset, chunk) in self.chunker().try_chunks(reader.entries()).enumerate() {
            let number = offset + 1;
            let chunk = chunk.with_context(|| format!("chunk {} failed", number))?;
            let (Some(first), Some(last)) = (chunk.entries.first(), chunk.entries.last()) else {
                continue;
            };

            plan.push(ChunkPlan {
                number,
                entries: chunk.len(),
                first_seq_num: first.seq_num,
                last_seq_num: last.seq_num,
                tokens: chunk.tokens,
            });
        }

        Ok(plan)
    }

    /// Translate `input_file` into `output_file`, one chunk at a time.
    ///
    /// Every translated chunk is flushed before the next one is read, so a
    /// failing run leaves the chunks translated so far on disk.
    pub async fn run(&self, input_file: &Path, output_file: &Path, options: RunOptions) -> Result<RunSummary> {
        let start_time = Instant::now();
        let resume = options.skip_chunks > 0;

        FileManager::check_input(input_file)?;
        FileManager::check_output(output_file, options.force_overwrite, resume)?;

        let reader = SubtitleReader::open(input_file)
            .with_context(|| format!("Failed to read subtitle file: {}", input_file.display()))?;
        let mut chunks = self.chunker().try_chunks(reader.entries());

        let mut skipped_entries = 0;
        for offset in 0..options.skip_chunks {
            let number = offset + 1;
            let chunk = chunks
                .next()
                .ok_or_else(|| anyhow!(
                    "Cannot skip {} chunks: the track only has {}",
                    options.skip_chunks, offset
                ))?
                .with_context(|| format!("chunk {} failed", number))?;
            skipped_entries += chunk.len();
        }
        if resume {
            info!(
                "Resuming after {} chunks ({} entries) already in {}",
                options.skip_chunks, skipped_entries, output_file.display()
            );
        }

        let mut writer = if resume {
            SubtitleWriter::append(output_file, skipped_entries + 1)
        } else {
            SubtitleWriter::create(output_file)
        }
        .with_context(|| format!("Failed to open output file: {}", output_file.display()))?;

        let translator = ChunkTranslator::new(self.context.clone());
        let progress = Self::progress_bar(options.show_progress);
        info!(
            "Translating {} -> {} with {} ({} tokens per chunk)",
            self.config.source_language,
            self.config.target_language,
            self.context.translator.name(),
            self.context.token_budget
        );

        let mut summary = RunSummary {
            skipped_chunks: options.skip_chunks,
            ..Default::default()
        };

        for (offset, chunk) in chunks.enumerate() {
            let number = options.skip_chunks + offset + 1;
            let chunk = chunk.with_context(|| format!("chunk {} failed", number))?;

            let translated = translator
                .translate_chunk(&chunk.entries, &self.config.source_language, &self.config.target_language)
                .await;
            let translated = match translated {
                Ok(translated) => translated,
                Err(e) => {
                    progress.abandon_with_message(format!("chunk {} failed", number));
                    warn!(
                        "{} entries written to {} before the failure",
                        writer.written(), output_file.display()
                    );
                    return Err(e).with_context(|| format!("chunk {} failed", number));
                }
            };

            for entry in &translated {
                progress.set_message(Self::progress_line(number, entry));
                progress.tick();
            }

            writer
                .write_chunk(&translated)
                .with_context(|| format!("chunk {} failed: cannot write output", number))?;
            summary.chunks += 1;
            summary.entries += translated.len();
        }

        progress.finish_and_clear();
        summary.requests = translator.requests();
        summary.bisections = translator.bisections();

        info!(
            "Translated {} entries in {} chunks ({} requests, {} bisections) in {}",
            summary.entries,
            summary.chunks,
            summary.requests,
            summary.bisections,
            Self::format_duration(start_time.elapsed())
        );

        Ok(summary)
    }

    fn progress_bar(visible: bool) -> ProgressBar {
        if !visible {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        progress.set_style(style);
        progress.enable_steady_tick(Duration::from_millis(120));
        progress
    }

    /// Progress message of an entry: chunk, index, end time and the
    /// beginning of the text
    pub fn progress_line(chunk_number: usize, entry: &SubtitleEntry) -> String {
        let preview: String = entry.text.chars().take(40).collect();
        format!(
            "chunk {}: #{} [{}] {}...",
            chunk_number,
            entry.seq_num,
            entry.format_end_time(),
            preview
        )
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
