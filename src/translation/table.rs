/*!
 * Table wire format shared by the chunk encoder, the decoder and the validator.
 *
 * A chunk travels to the model as a two-column markdown table. Every row of
 * the `Original` column starts with a `::N::` position marker, N being the
 * zero-based position of the entry inside its chunk:
 *
 * ```text
 * | Original | Translated |
 * | --- | --- |
 * | ::0:: Hello |     |
 * | ::1:: World |     |
 * ```
 *
 * Source text is escaped before marker injection: `|` becomes `/` and any run
 * of colons collapses to a single `:` so neither the cell grammar nor the
 * marker grammar can be forged by the text itself.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::subtitle_processor::SubtitleEntry;

/// Header row of every translation table
pub const TABLE_HEADER: &str = "| Original | Translated |";

/// Separator row following the header
pub const TABLE_SEPARATOR: &str = "| --- | --- |";

/// Matches a position marker anywhere in a cell
static MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"::\d+::").expect("Invalid position marker regex")
});

/// Neutralize the characters that carry table or marker meaning
pub fn escape_text(text: &str) -> String {
    let mut escaped = text.replace('|', "/");
    while escaped.contains("::") {
        escaped = escaped.replace("::", ":");
    }
    escaped
}

/// Row whose token cost budgets one entry: the text in both columns, since
/// the translation roughly mirrors the source length
pub fn budget_row(text: &str) -> String {
    format!("| {} | {} |", text, text)
}

/// Encoded table row for the entry at `index` within its chunk
pub fn encode_row(index: usize, text: &str) -> String {
    format!("| ::{}:: {} |     |", index, escape_text(text))
}

/// Encode every entry of a chunk into its table row.
///
/// The input is left untouched; the returned entries keep timing and sequence
/// numbers and carry the encoded row as text.
pub fn encode_chunk(chunk: &[SubtitleEntry]) -> Vec<SubtitleEntry> {
    chunk
        .iter()
        .enumerate()
        .map(|(index, entry)| entry.with_text(encode_row(index, &entry.text)))
        .collect()
}

/// Full table text (header, separator, rows) for already encoded entries
pub fn build_table(encoded: &[SubtitleEntry]) -> String {
    let mut table = String::with_capacity(
        TABLE_HEADER.len() + TABLE_SEPARATOR.len() + encoded.iter().map(|e| e.text.len() + 1).sum::<usize>() + 2,
    );
    table.push_str(TABLE_HEADER);
    table.push('\n');
    table.push_str(TABLE_SEPARATOR);

    for entry in encoded {
        table.push('\n');
        table.push_str(&entry.text);
    }

    table
}

/// Data rows of a table: everything after the header and separator lines.
///
/// Surrounding blank lines of the whole response are ignored; `\r\n` line
/// endings are accepted.
pub fn table_rows(table: &str) -> impl Iterator<Item = &str> {
    table.trim().lines().skip(2)
}

/// Split a row into its `(original, translated)` cells.
///
/// A well-formed row has exactly four `|`-delimited segments: an empty
/// leading segment, the two cells and an empty trailing segment.
pub fn split_row(row: &str) -> Option<(&str, &str)> {
    let segments: Vec<&str> = row.split('|').collect();
    if segments.len() != 4 {
        return None;
    }
    Some((segments[1], segments[2]))
}

/// Parse a `::N:: text` cell into its position and text.
///
/// Cells that do not split into exactly three `::`-delimited parts, or whose
/// position is not a number, yield `(None, "")`.
pub fn parse_cell(cell: &str) -> (Option<usize>, String) {
    let parts: Vec<&str> = cell.trim().split("::").collect();
    if parts.len() != 3 {
        return (None, String::new());
    }

    match parts[1].trim().parse::<usize>() {
        Ok(position) => (Some(position), parts[2].trim().to_string()),
        Err(_) => (None, String::new()),
    }
}

/// Remove every position marker from a cell
pub fn strip_markers(cell: &str) -> String {
    MARKER_REGEX.replace_all(cell.trim(), "").trim().to_string()
}

/// Decode the translated column of a table, one string per well-formed row.
///
/// Malformed rows are skipped silently; row count has to be reconciled by the
/// validator.
pub fn decode(table: &str) -> impl Iterator<Item = String> + '_ {
    table_rows(table)
        .filter_map(split_row)
        .map(|(_, translated)| strip_markers(translated))
}
