/*!
 * Tests for SRT reading and chunk-wise writing
 */

use std::fmt::Write;
use anyhow::Result;
use subtable::errors::SubtitleError;
use subtable::subtitle_processor::{SubtitleEntry, SubtitleReader, SubtitleWriter, parse_srt_string};
use crate::common;

/// Test timestamp parsing and formatting
#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ts = "01:23:45,678";
    let ms = SubtitleEntry::parse_timestamp(ts).unwrap();
    assert_eq!(ms, 5025678);

    let formatted = SubtitleEntry::format_timestamp(ms);
    assert_eq!(formatted, ts);
}

#[test]
fn test_timestamp_parsing_withOutOfRangeMinutes_shouldFail() {
    assert!(SubtitleEntry::parse_timestamp("00:61:00,000").is_err());
    assert!(SubtitleEntry::parse_timestamp("garbage").is_err());
}

/// Test subtitle entry display formatting
#[test]
fn test_subtitle_entry_display_withValidEntry_shouldFormatSrtBlock() {
    let entry = SubtitleEntry::new(1, 5000, 10000, "Test subtitle".to_string());
    let mut output = String::new();
    write!(output, "{}", entry).unwrap();

    assert_eq!(output, "1\n00:00:05,000 --> 00:00:10,000\nTest subtitle\n\n");
}

#[test]
fn test_withText_shouldKeepTimingAndIndex() {
    let entry = SubtitleEntry::new(7, 61234, 65432, "Hello".to_string());
    let translated = entry.with_text("Bonjour");

    assert_eq!(translated.seq_num, 7);
    assert_eq!(translated.start_time_ms, 61234);
    assert_eq!(translated.end_time_ms, 65432);
    assert_eq!(translated.text, "Bonjour");
    assert_eq!(entry.text, "Hello");
}

#[test]
fn test_parseSrtString_withMultilineText_shouldCollapseToOneLine() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nFirst line\nsecond line\n\n2\n00:00:03,000 --> 00:00:04,000\nNext\n";
    let entries = parse_srt_string(content).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "First line second line");
    assert_eq!(entries[1].start_time_ms, 3000);
}

#[test]
fn test_parseSrtString_withBomAndExtraBlankLines_shouldParse() {
    let content = "\u{feff}\n\n1\n00:00:01,000 --> 00:00:02,000\nHi\n\n\n\n2\n00:00:03,000 --> 00:00:04,000\nThere\n\n";
    let entries = parse_srt_string(content).unwrap();
    assert_eq!(entries.iter().map(|e| e.seq_num).collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn test_parseSrtString_withBadTiming_shouldReportLine() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nOk\n\n2\nnot a timing line\nText\n";
    match parse_srt_string(content) {
        Err(SubtitleError::InvalidTimestamp { line, .. }) => assert_eq!(line, 6),
        other => panic!("expected an invalid timestamp error, got {:?}", other),
    }
}

#[test]
fn test_parseSrtString_withOverflowingHours_shouldReportInvalidTimestamp() {
    let content = "1\n9999999999999999:00:00,000 --> 9999999999999999:00:01,000\nx\n";
    assert!(matches!(
        parse_srt_string(content),
        Err(SubtitleError::InvalidTimestamp { line: 2, .. })
    ));
}

#[test]
fn test_timestamp_parsing_withOverflowingHours_shouldFail() {
    assert!(SubtitleEntry::parse_timestamp("9999999999999999:00:00,000").is_err());
}

#[test]
fn test_parseSrtString_withEndBeforeStart_shouldFail() {
    let content = "1\n00:00:05,000 --> 00:00:02,000\nBackwards\n";
    assert!(matches!(
        parse_srt_string(content),
        Err(SubtitleError::InvalidTimeRange { start_ms: 5000, end_ms: 2000, .. })
    ));
}

#[test]
fn test_parseSrtString_withMissingIndex_shouldFail() {
    let content = "00:00:01,000 --> 00:00:02,000\nNo index\n";
    assert!(matches!(parse_srt_string(content), Err(SubtitleError::MalformedBlock { line: 1, .. })));
}

#[test]
fn test_parser_afterError_shouldStopYielding() {
    let reader = SubtitleReader::from_string("x\n\n1\n00:00:01,000 --> 00:00:02,000\nOk\n");
    let mut entries = reader.entries();

    assert!(entries.next().unwrap().is_err());
    assert!(entries.next().is_none());
}

#[test]
fn test_reader_withFile_shouldParseLazily() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "sample.srt")?;

    let reader = SubtitleReader::open(&path)?;
    let first = reader.entries().next().unwrap()?;

    assert_eq!(reader.path(), path.as_path());
    assert_eq!(first.text, "This is a test subtitle.");
    assert_eq!(reader.entries().count(), 3);
    Ok(())
}

#[test]
fn test_writer_withTwoChunks_shouldReindexContinuously() -> Result<()> {
    let chunk_a = vec![
        SubtitleEntry::new(10, 0, 1000, "One".to_string()),
        SubtitleEntry::new(11, 1000, 2000, "Two".to_string()),
    ];
    let chunk_b = vec![SubtitleEntry::new(42, 2000, 3000, "Three".to_string())];

    let mut writer = SubtitleWriter::new(Vec::new());
    assert_eq!(writer.write_chunk(&chunk_a)?, 3);
    assert_eq!(writer.write_chunk(&chunk_b)?, 4);
    assert_eq!(writer.written(), 3);

    let output = String::from_utf8(writer.into_inner())?;
    let written = parse_srt_string(&output)?;
    assert_eq!(written.iter().map(|e| e.seq_num).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(written[2].text, "Three");
    assert_eq!(written[2].start_time_ms, 2000);
    Ok(())
}

#[test]
fn test_writer_withPreservedIndices_shouldKeepSeqNums() -> Result<()> {
    let mut writer = SubtitleWriter::new(Vec::new()).preserve_indices();
    writer.write_chunk(&[SubtitleEntry::new(42, 0, 1000, "Kept".to_string())])?;

    let output = String::from_utf8(writer.into_inner())?;
    assert!(output.starts_with("42\n"));
    Ok(())
}

#[test]
fn test_writer_append_shouldContinueExistingFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("out.srt");

    let mut writer = SubtitleWriter::create(&path)?;
    writer.write_chunk(&common::entries(&["a", "b"]))?;
    drop(writer);

    let mut writer = SubtitleWriter::append(&path, 3)?;
    writer.write_chunk(&common::entries(&["c"]))?;
    drop(writer);

    let written = parse_srt_string(&std::fs::read_to_string(&path)?)?;
    assert_eq!(written.iter().map(|e| e.seq_num).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(written[2].text, "c");
    Ok(())
}

#[test]
fn test_writer_create_shouldMakeParentDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("dir").join("out.srt");

    let mut writer = SubtitleWriter::create(&path)?;
    writer.write_chunk(&common::entries(&["x"]))?;

    assert!(path.exists());
    Ok(())
}
