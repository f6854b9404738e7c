/*!
 * Structural validation of translated tables.
 *
 * A response is accepted only when it mirrors the request: same number of
 * data rows, four segments per row, the row's own position as marker in both
 * columns and non-empty text on both sides.
 */

use std::fmt;

use log::debug;

use crate::translation::table::{parse_cell, split_row, table_rows};

/// First defect found in a translated table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableDefect {
    /// Number of data rows differs from the number of entries sent
    RowCount { expected: usize, found: usize },
    /// A row does not have exactly four `|`-delimited segments
    SegmentCount { row: usize, found: usize },
    /// A marker is malformed, differs between the columns, or does not match
    /// the row's position (reordered or duplicated rows)
    MarkerMismatch { row: usize, original: Option<usize>, translated: Option<usize> },
    /// Either cell of a row has no text once the marker is removed
    EmptyCell { row: usize },
}

impl fmt::Display for TableDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = |m: &Option<usize>| m.map_or_else(|| "malformed".to_string(), |p| p.to_string());
        match self {
            Self::RowCount { expected, found } => {
                write!(f, "expected {} rows, found {}", expected, found)
            }
            Self::SegmentCount { row, found } => {
                write!(f, "row {} has {} segments instead of 4", row, found)
            }
            Self::MarkerMismatch { row, original, translated } => write!(
                f,
                "row {} marker mismatch: original {}, translated {}",
                row, marker(original), marker(translated)
            ),
            Self::EmptyCell { row } => write!(f, "row {} has an empty cell", row),
        }
    }
}

/// Outcome of validating one translated table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableValidationResult {
    /// Rows the table was expected to contain
    pub expected_rows: usize,
    /// Data rows present in the table
    pub found_rows: usize,
    /// First defect, if any
    pub defect: Option<TableDefect>,
}

impl TableValidationResult {
    /// Whether the table can be decoded safely
    pub fn passed(&self) -> bool {
        self.defect.is_none()
    }
}

/// Validator for translated tables
pub struct TableValidator;

impl TableValidator {
    /// Validate a translated table against the number of entries sent.
    ///
    /// Rows are 0-based in the reported defects.
    pub fn validate(translated_table: &str, expected_entries: usize) -> TableValidationResult {
        let rows: Vec<&str> = table_rows(translated_table).collect();
        let mut result = TableValidationResult {
            expected_rows: expected_entries,
            found_rows: rows.len(),
            defect: None,
        };

        if rows.len() != expected_entries {
            result.defect = Some(TableDefect::RowCount {
                expected: expected_entries,
                found: rows.len(),
            });
            return result;
        }

        for (row, line) in rows.iter().enumerate() {
            let Some((original_cell, translated_cell)) = split_row(line) else {
                result.defect = Some(TableDefect::SegmentCount {
                    row,
                    found: line.split('|').count(),
                });
                return result;
            };

            let (original, original_text) = parse_cell(original_cell);
            let (translated, translated_text) = parse_cell(translated_cell);

            if original != translated || original != Some(row) {
                result.defect = Some(TableDefect::MarkerMismatch { row, original, translated });
                return result;
            }

            if original_text.is_empty() || translated_text.is_empty() {
                result.defect = Some(TableDefect::EmptyCell { row });
                return result;
            }
        }

        debug!("Translated table passed validation ({} rows)", expected_entries);
        result
    }

    /// Whether the translated table mirrors a chunk of `expected_entries`
    pub fn is_valid(translated_table: &str, expected_entries: usize) -> bool {
        Self::validate(translated_table, expected_entries).passed()
    }
}
