/*!
 * Tests for translated table validation
 */

use subtable::validation::{TableDefect, TableValidator};

const HEADER: &str = "| Original | Translated |\n| --- | --- |";

fn table(rows: &[&str]) -> String {
    format!("{}\n{}", HEADER, rows.join("\n"))
}

#[test]
fn test_isValid_withMirroredRows_shouldAccept() {
    let reply = table(&[
        "| ::0:: Hello | ::0:: Bonjour |",
        "| ::1:: World | ::1:: Monde |",
        "| ::2:: Test | ::2:: Essai |",
    ]);

    assert!(TableValidator::is_valid(&reply, 3));
}

#[test]
fn test_isValid_withWrongRowCount_shouldReject() {
    let reply = table(&["| ::0:: Hello | ::0:: Bonjour |"]);

    let result = TableValidator::validate(&reply, 2);
    assert!(!result.passed());
    assert_eq!(result.found_rows, 1);
    assert_eq!(result.defect, Some(TableDefect::RowCount { expected: 2, found: 1 }));
}

#[test]
fn test_isValid_withSwappedMarkers_shouldReject() {
    let reply = table(&[
        "| ::0:: Hello | ::1:: Monde |",
        "| ::1:: World | ::0:: Bonjour |",
    ]);

    assert_eq!(
        TableValidator::validate(&reply, 2).defect,
        Some(TableDefect::MarkerMismatch { row: 0, original: Some(0), translated: Some(1) })
    );
}

#[test]
fn test_isValid_withSwappedRowsAndAgreeingMarkers_shouldReject() {
    let reply = table(&[
        "| ::1:: World | ::1:: Monde |",
        "| ::0:: Hello | ::0:: Bonjour |",
    ]);

    assert_eq!(
        TableValidator::validate(&reply, 2).defect,
        Some(TableDefect::MarkerMismatch { row: 0, original: Some(1), translated: Some(1) })
    );
}

#[test]
fn test_isValid_withDuplicatedRow_shouldReject() {
    let reply = table(&[
        "| ::0:: Hello | ::0:: Bonjour |",
        "| ::0:: Hello | ::0:: Bonjour |",
    ]);

    assert!(!TableValidator::is_valid(&reply, 2));
    assert_eq!(
        TableValidator::validate(&reply, 2).defect,
        Some(TableDefect::MarkerMismatch { row: 1, original: Some(0), translated: Some(0) })
    );
}

#[test]
fn test_isValid_withMissingTranslatedMarker_shouldReject() {
    let reply = table(&["| ::0:: Hello | Bonjour |"]);

    assert_eq!(
        TableValidator::validate(&reply, 1).defect,
        Some(TableDefect::MarkerMismatch { row: 0, original: Some(0), translated: None })
    );
}

#[test]
fn test_isValid_withEmptyTranslation_shouldReject() {
    let reply = table(&["| ::0:: Hello | ::0:: Bonjour |", "| ::1:: World | ::1:: |"]);

    assert_eq!(TableValidator::validate(&reply, 2).defect, Some(TableDefect::EmptyCell { row: 1 }));
}

#[test]
fn test_isValid_withExtraPipe_shouldReject() {
    let reply = table(&["| ::0:: Hello | ::0:: Bon | jour |"]);

    assert_eq!(
        TableValidator::validate(&reply, 1).defect,
        Some(TableDefect::SegmentCount { row: 0, found: 5 })
    );
}

#[test]
fn test_isValid_withUntranslatedRequestTable_shouldReject() {
    // The request itself leaves the translated column empty
    let request = table(&["| ::0:: Hello |     |"]);
    assert!(!TableValidator::is_valid(&request, 1));
}

#[test]
fn test_isValid_withProseAroundTable_shouldRejectOnRowCount() {
    let reply = format!("Here is your table:\n{}", table(&["| ::0:: Hello | ::0:: Bonjour |"]));
    assert!(!TableValidator::is_valid(&reply, 1));
}

#[test]
fn test_isValid_withCrlfAndTrailingNewline_shouldAccept() {
    let reply = "| Original | Translated |\r\n| --- | --- |\r\n| ::0:: Hello | ::0:: Bonjour |\r\n";
    assert!(TableValidator::is_valid(reply, 1));
}

#[test]
fn test_isValid_withZeroExpectedAndNoRows_shouldAccept() {
    assert!(TableValidator::is_valid(HEADER, 0));
}
