/*!
 * Offline translator with scripted behaviors.
 *
 * - `MockTranslator::echo()` - Mirrors every row and tags its text as translated
 * - `MockTranslator::corrupt_unless_single_row()` - Drops a row unless the table has one
 * - `MockTranslator::always_invalid()` - Keeps markers but leaves translations empty
 * - `MockTranslator::failing()` - Always fails with a provider error
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::Translator;
use crate::translation::table::{TABLE_HEADER, TABLE_SEPARATOR, parse_cell, split_row, table_rows};

/// Behavior mode for the mock translator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Valid reply: every row echoed with `[TRANSLATED]` prepended
    Echo,
    /// Valid reply for a single row, last row dropped otherwise
    CorruptUnlessSingleRow,
    /// Markers kept, translated cells left empty
    AlwaysInvalid,
    /// Always fails with an error
    Failing,
}

/// Mock translator for tests and offline dry runs
#[derive(Debug, Clone)]
pub struct MockTranslator {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of translate calls, shared between clones
    calls: Arc<AtomicUsize>,
}

impl MockTranslator {
    /// Create a new mock translator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn corrupt_unless_single_row() -> Self {
        Self::new(MockBehavior::CorruptUnlessSingleRow)
    }

    pub fn always_invalid() -> Self {
        Self::new(MockBehavior::AlwaysInvalid)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Number of translate calls received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Deterministic stand-in for a translation
    pub fn substitute(text: &str) -> String {
        format!("[TRANSLATED] {}", text)
    }

    /// Reply rows built from the original column of each request row.
    ///
    /// `translated` maps the marker and original text to the translated cell.
    fn reply_rows<F>(table: &str, translated: F) -> Vec<String>
    where
        F: Fn(usize, &str) -> String,
    {
        table_rows(table)
            .map(|row| match split_row(row) {
                Some((original_cell, _)) => match parse_cell(original_cell) {
                    (Some(position), text) => format!(
                        "| ::{}:: {} | {} |",
                        position,
                        text,
                        translated(position, &text)
                    ),
                    (None, _) => row.to_string(),
                },
                None => row.to_string(),
            })
            .collect()
    }

    fn render(rows: &[String]) -> String {
        let mut reply = format!("{}\n{}", TABLE_HEADER, TABLE_SEPARATOR);
        for row in rows {
            reply.push('\n');
            reply.push_str(row);
        }
        reply
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, _instructions: &str, table: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let echo = |position: usize, text: &str| format!("::{}:: {}", position, Self::substitute(text));

        match self.behavior {
            MockBehavior::Echo => Ok(Self::render(&Self::reply_rows(table, echo))),

            MockBehavior::CorruptUnlessSingleRow => {
                let mut rows = Self::reply_rows(table, echo);
                if rows.len() > 1 {
                    rows.pop();
                }
                Ok(Self::render(&rows))
            }

            MockBehavior::AlwaysInvalid => {
                let rows = Self::reply_rows(table, |position, _| format!("::{}::", position));
                Ok(Self::render(&rows))
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),
        }
    }

    fn name(&self) -> String {
        format!("mock/{:?}", self.behavior).to_lowercase()
    }
}
