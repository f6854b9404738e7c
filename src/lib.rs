/*!
 * # subtable - batched subtitle translation with LLMs
 *
 * Translates SubRip caption tracks by sending many entries per model call as
 * a two-column table, then validating and decoding the reply row by row.
 *
 * ## Features
 *
 * - Token-budgeted chunking sized from the model's context window
 * - `::N::` position markers that make lost, merged or reordered rows detectable
 * - Bisection retry of malformed replies down to single entries
 * - Streaming pipeline: every translated chunk is flushed before the next is read
 * - Resume of interrupted runs by skipping already written chunks
 * - OpenAI and Anthropic adapters, plus an offline mock
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * - `subtitle_processor`: SRT reading and chunk-wise writing
 * - `translation`: the translation core:
 *   - `translation::tokens`: token counting per model
 *   - `translation::chunker`: token-budgeted chunking
 *   - `translation::table`: table encoding and decoding
 *   - `translation::core`: chunk translation with bisection retry
 * - `validation`: structural checks of translated tables
 * - `providers`: `Translator` adapters for LLM APIs
 * - `app_config`: configuration and model registry
 * - `app_controller`: the end-to-end pipeline
 * - `file_utils`: file system checks
 * - `language_utils`: ISO language code utilities
 * - `errors`: custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::too_many_arguments)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod translation;
pub mod validation;
pub mod app_controller;
pub mod language_utils;
pub mod providers;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::{Config, ModelConfig};
pub use app_controller::{Controller, RunOptions, RunSummary};
pub use subtitle_processor::{SubtitleEntry, SubtitleReader, SubtitleWriter};
pub use translation::{Chunk, ChunkTranslator, Chunker, TranslationContext};
pub use providers::Translator;
pub use validation::TableValidator;
pub use language_utils::{normalize_to_part2t, get_language_name};
pub use errors::{AppError, ProviderError, SubtitleError, TranslationError};
