/*!
 * Instruction template sent alongside every translation table.
 */

use crate::language_utils;

/// Instruction template for table translation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default instructions: translate the table row by row and keep the
    /// position markers in both columns.
    pub const TABLE_TRANSLATOR: &'static str = "You will be provided with a table of sentences in {source_language}, \
and your task is to translate it into {target_language}, using the following table format:

| Original | Translated |
| --- | --- |
| ::0:: Sentence 1 | ::0:: Translation 1 |
| ::1:: Sentence 2 | ::1:: Translation 2 |
| ::2:: Sentence 3 | ::2:: Translation 3 |

Provide the result keeping the original sentences in the 'Original' column \
and the translations in the 'Translated' column. Translate row by row. \
Start every translation with the same ::N:: marker as its original sentence. \
Never merge, split, reorder or drop rows, and reply with the table only.";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default table translator template.
    pub fn table_translator() -> Self {
        Self::new(Self::TABLE_TRANSLATOR)
    }

    /// Render the template with language codes, shown by name when known.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", &language_utils::prompt_language_name(source_language))
            .replace("{target_language}", &language_utils::prompt_language_name(target_language))
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::table_translator()
    }
}
