use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context, anyhow};
use log::{warn, debug};

use crate::errors::SubtitleError;

// @module: Caption track source and sink (SubRip format)

// @const: SRT timing line regex, trailing position hints are tolerated
static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d+):(\d{2}):(\d{2})[,.](\d{3})").unwrap()
});

// @returns: Milliseconds of a timestamp, None on overflow
fn to_millis(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Option<u64> {
    hours
        .checked_mul(3_600_000)?
        .checked_add(minutes * 60_000 + seconds * 1_000 + millis)
}

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number, reassigned on write
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text, a single logical line
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    /// Copy of this entry carrying different text; timing and index are kept
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        SubtitleEntry {
            seq_num: self.seq_num,
            start_time_ms: self.start_time_ms,
            end_time_ms: self.end_time_ms,
            text: text.into(),
        }
    }

    /// Copy of this entry with another sequence number
    pub fn with_seq_num(&self, seq_num: usize) -> Self {
        SubtitleEntry {
            seq_num,
            ..self.clone()
        }
    }

    /// Parse an SRT timestamp (`HH:MM:SS,mmm`) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();

        if parts.len() != 4 {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
        let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
        let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        to_millis(hours, minutes, seconds, millis)
            .ok_or_else(|| anyhow!("Timestamp out of range: {}", timestamp))
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Lazy SRT parser yielding one entry per block.
///
/// Inner newlines of a block's text are collapsed to single spaces. Blocks with
/// no text are skipped. The first format error is returned and ends the stream.
pub struct SrtParser<'a> {
    lines: std::iter::Peekable<std::iter::Enumerate<std::str::Lines<'a>>>,
    finished: bool,
}

impl<'a> SrtParser<'a> {
    /// Create a parser over the full content of a caption track
    pub fn new(content: &'a str) -> Self {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        Self {
            lines: content.lines().enumerate().peekable(),
            finished: false,
        }
    }

    fn fail(&mut self, error: SubtitleError) -> Option<Result<SubtitleEntry, SubtitleError>> {
        self.finished = true;
        Some(Err(error))
    }

    fn parse_timing(line_no: usize, line: &str) -> Result<(u64, u64), SubtitleError> {
        let invalid = || SubtitleError::InvalidTimestamp {
            line: line_no,
            value: line.to_string(),
        };

        let caps = TIMING_REGEX.captures(line).ok_or_else(invalid)?;
        let component = |idx: usize| -> Result<u64, SubtitleError> {
            caps.get(idx)
                .and_then(|m| m.as_str().parse::<u64>().ok())
                .ok_or_else(invalid)
        };

        let to_ms = |first: usize| -> Result<u64, SubtitleError> {
            let (h, m, s, ms) = (component(first)?, component(first + 1)?, component(first + 2)?, component(first + 3)?);
            if m >= 60 || s >= 60 {
                return Err(invalid());
            }
            to_millis(h, m, s, ms).ok_or_else(invalid)
        };

        Ok((to_ms(1)?, to_ms(5)?))
    }
}

impl Iterator for SrtParser<'_> {
    type Item = Result<SubtitleEntry, SubtitleError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            // Skip blank separators
            while let Some((_, line)) = self.lines.peek() {
                if line.trim().is_empty() {
                    self.lines.next();
                } else {
                    break;
                }
            }

            let Some((idx, index_line)) = self.lines.next() else {
                self.finished = true;
                return None;
            };
            let line_no = idx + 1;

            let seq_num = match index_line.trim().parse::<usize>() {
                Ok(num) => num,
                Err(_) => {
                    return self.fail(SubtitleError::MalformedBlock {
                        line: line_no,
                        reason: format!("expected a sequence number, found '{}'", index_line.trim()),
                    });
                }
            };

            let Some((timing_idx, timing_line)) = self.lines.next() else {
                return self.fail(SubtitleError::MalformedBlock {
                    line: line_no,
                    reason: format!("entry {} has no timing line", seq_num),
                });
            };
            let timing_line_no = timing_idx + 1;

            let (start_ms, end_ms) = match Self::parse_timing(timing_line_no, timing_line.trim()) {
                Ok(times) => times,
                Err(e) => return self.fail(e),
            };

            if end_ms < start_ms {
                return self.fail(SubtitleError::InvalidTimeRange {
                    line: timing_line_no,
                    start_ms,
                    end_ms,
                });
            }

            let mut text_lines = Vec::new();
            while let Some((_, line)) = self.lines.peek() {
                if line.trim().is_empty() {
                    break;
                }
                text_lines.push(*line);
                self.lines.next();
            }

            let text = text_lines.join(" ").replace('\r', "").trim().to_string();
            if text.is_empty() {
                warn!("Skipping empty subtitle entry {}", seq_num);
                continue;
            }

            return Some(Ok(SubtitleEntry::new(seq_num, start_ms, end_ms, text)));
        }
    }
}

/// Parse a whole SRT document into entries
pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleEntry>, SubtitleError> {
    SrtParser::new(content).collect()
}

/// Caption track loaded from disk, parsed lazily on iteration
#[derive(Debug)]
pub struct SubtitleReader {
    /// Source filename
    path: PathBuf,

    /// Raw track content
    content: String,
}

impl SubtitleReader {
    /// Read a caption track from a file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        debug!("Loaded caption track {:?} ({} bytes)", path, content.len());

        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    /// Wrap an in-memory caption track
    pub fn from_string(content: impl Into<String>) -> Self {
        Self {
            path: PathBuf::new(),
            content: content.into(),
        }
    }

    /// Source path, empty for in-memory tracks
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lazily parsed entries of the track
    pub fn entries(&self) -> SrtParser<'_> {
        SrtParser::new(&self.content)
    }
}

/// SRT sink writing one chunk at a time.
///
/// Every chunk is flushed before `write_chunk` returns so a later failure
/// leaves all previously written chunks on disk.
pub struct SubtitleWriter<W: Write> {
    out: W,
    next_index: usize,
    reindex: bool,
    written: usize,
}

impl SubtitleWriter<BufWriter<File>> {
    /// Create (or truncate) an SRT file, creating parent directories if needed
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }

    /// Open an existing SRT file for appending, continuing at `next_index`
    pub fn append<P: AsRef<Path>>(path: P, next_index: usize) -> Result<Self, SubtitleError> {
        let file = OpenOptions::new().append(true).open(path.as_ref())?;
        Ok(Self::new(BufWriter::new(file)).with_start_index(next_index))
    }
}

impl<W: Write> SubtitleWriter<W> {
    /// Create a writer over any output, numbering entries from 1
    pub fn new(out: W) -> Self {
        Self {
            out,
            next_index: 1,
            reindex: true,
            written: 0,
        }
    }

    /// Start numbering at the given index
    pub fn with_start_index(mut self, next_index: usize) -> Self {
        self.next_index = next_index;
        self
    }

    /// Keep the sequence numbers carried by the entries
    pub fn preserve_indices(mut self) -> Self {
        self.reindex = false;
        self
    }

    /// Write one chunk and flush it
    pub fn write_chunk(&mut self, entries: &[SubtitleEntry]) -> Result<usize, SubtitleError> {
        for entry in entries {
            if self.reindex {
                write!(self.out, "{}", entry.with_seq_num(self.next_index))?;
            } else {
                write!(self.out, "{}", entry)?;
            }
            self.next_index += 1;
            self.written += 1;
        }

        self.out.flush()?;
        Ok(self.next_index)
    }

    /// Index the next written entry will receive
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Number of entries written by this writer
    pub fn written(&self) -> usize {
        self.written
    }

    /// Unwrap the underlying output
    pub fn into_inner(self) -> W {
        self.out
    }
}
