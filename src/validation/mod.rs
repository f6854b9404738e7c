/*!
 * Validation of model responses.
 *
 * - `table`: Validates that a translated table mirrors the rows and position
 *   markers of the chunk that was sent
 */

pub mod table;

// Re-export main types
pub use table::{TableDefect, TableValidationResult, TableValidator};
