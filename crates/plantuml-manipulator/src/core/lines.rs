//! Line normalization at the file boundary
//!
//! Files are read into a [`LineSequence`] with `\n` and `\r\n` terminators
//! stripped. Blank lines and surrounding whitespace are kept exactly.

use std::fs;
use std::path::Path;
use tracing::trace;

use super::error::{ManipulatorError, Result};
use super::types::LineSequence;

/// Split text into lines, dropping terminators
///
/// A trailing terminator does not produce an extra empty line, matching how
/// line-oriented editors treat the final newline.
pub fn split_lines(text: &str) -> LineSequence {
    text.lines().map(|line| line.to_string()).collect()
}

/// Join lines with `\n` separators, without a trailing terminator
pub fn join_lines(lines: &[String]) -> String {
    lines.join("\n")
}

/// Read a file as a line sequence
///
/// Fails with [`ManipulatorError::FileNotFound`] when the path does not
/// exist, before any read is attempted.
pub fn read_lines(path: &Path) -> Result<LineSequence> {
    if !path.exists() {
        return Err(ManipulatorError::file_not_found(path));
    }
    let text = fs::read_to_string(path)?;
    let lines = split_lines(&text);
    trace!(path = %path.display(), line_count = lines.len(), "Read lines");
    Ok(lines)
}

/// Write a line sequence back to a file with `\n` separators
pub fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    fs::write(path, join_lines(lines))?;
    trace!(path = %path.display(), line_count = lines.len(), "Wrote lines");
    Ok(())
}

/// Leading whitespace of a line, as a string slice
pub fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}
