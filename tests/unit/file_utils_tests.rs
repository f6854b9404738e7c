/*!
 * Tests for file utility functions
 */

use std::path::Path;
use anyhow::Result;
use subtable::file_utils::FileManager;
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::dir_exists(&test_file));
    Ok(())
}

/// Test that generate_output_path creates the correct path
#[test]
fn test_generate_output_path_withValidInputs_shouldCreateCorrectPath() {
    let output_path = FileManager::generate_output_path("/tmp/input/movie.srt", "/tmp/output", "fr");
    assert_eq!(output_path, Path::new("/tmp/output/movie.fr.srt"));
}

#[test]
fn test_checkInput_withMissingFile_shouldFail() {
    assert!(FileManager::check_input("does/not/exist.srt").is_err());
}

#[test]
fn test_checkOutput_withExistingFile_shouldRequireForce() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let existing = common::create_test_file(temp_dir.path(), "out.srt", "")?;

    assert!(FileManager::check_output(&existing, false, false).is_err());
    assert!(FileManager::check_output(&existing, true, false).is_ok());
    assert!(FileManager::check_output(temp_dir.path().join("new.srt"), false, false).is_ok());
    Ok(())
}

#[test]
fn test_checkOutput_whenResuming_shouldRequireExistingFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let existing = common::create_test_file(temp_dir.path(), "out.srt", "")?;

    assert!(FileManager::check_output(&existing, false, true).is_ok());
    assert!(FileManager::check_output(temp_dir.path().join("missing.srt"), false, true).is_err());
    Ok(())
}

#[test]
fn test_checkOutput_withDirectory_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    assert!(FileManager::check_output(temp_dir.path(), true, false).is_err());
    Ok(())
}

#[test]
fn test_isSubtitleFile_shouldIgnoreExtensionCase() {
    assert!(FileManager::is_subtitle_file("a/b/movie.SRT"));
    assert!(!FileManager::is_subtitle_file("movie.mkv"));
}
