use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};
use log::warn;

// @module: File and directory checks around a translation run

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @generates: Output path for translated subtitle
    // @params: input_file, output_dir, target_language
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        target_language: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(target_language);
        output_filename.push_str(".srt");

        output_dir.as_ref().join(output_filename)
    }

    /// Whether the path carries a `.srt` extension
    pub fn is_subtitle_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("srt"))
    }

    /// Check that the input track exists
    pub fn check_input<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !Self::file_exists(path) {
            return Err(anyhow!("Input subtitle file not found: {}", path.display()));
        }
        if !Self::is_subtitle_file(path) {
            warn!("{} has no .srt extension, reading it as SubRip anyway", path.display());
        }
        Ok(())
    }

    /// Check that the output may be written.
    ///
    /// A fresh run refuses an existing output unless `force_overwrite` is
    /// set; a resumed run needs the partial output of the previous run.
    pub fn check_output<P: AsRef<Path>>(path: P, force_overwrite: bool, resume: bool) -> Result<()> {
        let path = path.as_ref();
        if resume {
            if !Self::file_exists(path) {
                return Err(anyhow!(
                    "Cannot resume: partial output {} does not exist",
                    path.display()
                ));
            }
            return Ok(());
        }

        if path.exists() && !force_overwrite {
            return Err(anyhow!(
                "Output file {} already exists, use --force-overwrite to replace it",
                path.display()
            ));
        }
        if Self::dir_exists(path) {
            return Err(anyhow!("Output path {} is a directory", path.display()));
        }
        Ok(())
    }
}
