/*!
 * Batched subtitle translation through a table-encoded prompt.
 *
 * - `tokens`: token counting per model
 * - `chunker`: token-budgeted grouping of entries
 * - `table`: table encoding and decoding with position markers
 * - `prompts`: instructions sent alongside each table
 * - `core`: chunk translation with bisection retry
 */

// Re-export main types for easier usage
pub use self::chunker::{Chunk, Chunker, TryChunks};
pub use self::core::{ChunkTranslator, TranslationContext};
pub use self::prompts::PromptTemplate;
pub use self::tokens::{EstimatedTokenCounter, TiktokenCounter, TokenCounter, WordTokenCounter, counter_for_model};

// Submodules
pub mod chunker;
pub mod core;
pub mod prompts;
pub mod table;
pub mod tokens;
