//! Multi-file driver
//!
//! Resolves a glob pattern to a sorted file list, runs one operation per file
//! and collects what happened. Files are handled strictly one after another.
//! A failure on one file is logged and recorded, never fatal to the batch.

use globset::{GlobBuilder, GlobMatcher};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, span, warn, Level};
use walkdir::WalkDir;

use crate::core::{lines, DiagramStructure, LineSequence, ManipulatorError, Result};
use crate::parser::StructureParser;
use crate::validator::{validate_structure, Requirements, ValidationReport, ValidationResult};

const GLOB_META: &[char] = &['*', '?', '[', '{'];

fn compile_matcher(pattern: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| ManipulatorError::invalid_pattern(pattern, e.to_string()))
}

/// Split a pattern into the directory to start walking from (everything up
/// to the last `/` before the first glob metacharacter) and the remainder
/// matched below it
fn walk_root(pattern: &str) -> (PathBuf, &str) {
    let literal = match pattern.find(GLOB_META) {
        Some(pos) => &pattern[..pos],
        None => pattern,
    };
    match literal.rfind('/') {
        Some(0) => (PathBuf::from("/"), &pattern[1..]),
        Some(pos) => (PathBuf::from(&literal[..pos]), &pattern[pos + 1..]),
        None => (PathBuf::from("."), pattern),
    }
}

/// Deepest level below the root a match can sit at, `None` when `**` is used
fn walk_depth(remainder: &str) -> Option<usize> {
    if remainder.contains("**") {
        return None;
    }
    Some(remainder.split('/').filter(|c| !c.is_empty()).count())
}

/// Hidden entries are only visited when the pattern names one itself
fn wants_hidden(remainder: &str) -> bool {
    remainder
        .split('/')
        .any(|c| c.starts_with('.') && c != "." && c != "..")
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Resolve `pattern` to the regular files it matches, sorted by path
///
/// `*` and `?` never cross a `/`; `**` matches any number of directories.
/// Symlinks are followed. Dotfiles and hidden directories are skipped unless
/// the pattern spells out a leading `.`. A pattern without metacharacters
/// names a single file. A pattern whose directory prefix does not exist
/// matches nothing. Directories that cannot be read are logged and skipped.
pub fn discover_files(pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);

    if !pattern.contains(GLOB_META) {
        let path = PathBuf::from(pattern);
        return Ok(if path.is_file() { vec![path] } else { Vec::new() });
    }

    let matcher = compile_matcher(pattern)?;
    let (root, remainder) = walk_root(pattern);
    if !root.is_dir() {
        debug!(pattern, root = %root.display(), "Glob root does not exist");
        return Ok(Vec::new());
    }

    let mut walker = WalkDir::new(&root).follow_links(true);
    if let Some(depth) = walk_depth(remainder) {
        walker = walker.max_depth(depth);
    }
    let include_hidden = wants_hidden(remainder);

    let mut files = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| include_hidden || !is_hidden(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(pattern, error = %e, "Skipping unreadable path");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let candidate = path.strip_prefix(".").unwrap_or(path);
        if matcher.is_match(candidate) {
            files.push(candidate.to_path_buf());
        }
    }
    files.sort();

    debug!(pattern, matched = files.len(), "Discovered files");
    Ok(files)
}

/// Pre-conditions a file must meet before an operation touches it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    /// Skip files whose text contains this substring
    pub skip_if_contains: Option<String>,
    /// Only touch files declaring this participant (alias or name)
    pub only_if_has_participant: Option<String>,
    /// Only touch files containing this group
    pub only_if_has_group: Option<String>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_if_contains(mut self, text: impl Into<String>) -> Self {
        self.skip_if_contains = Some(text.into());
        self
    }

    pub fn only_if_has_participant(mut self, reference: impl Into<String>) -> Self {
        self.only_if_has_participant = Some(reference.into());
        self
    }

    pub fn only_if_has_group(mut self, name: impl Into<String>) -> Self {
        self.only_if_has_group = Some(name.into());
        self
    }

    /// Reason the structure is excluded, or `None` if it passes every filter
    pub fn exclusion_reason(&self, structure: &DiagramStructure) -> Option<String> {
        if let Some(text) = &self.skip_if_contains {
            if structure.text().contains(text.as_str()) {
                return Some(format!("contains '{}'", text));
            }
        }
        if let Some(reference) = &self.only_if_has_participant {
            if !structure.has_participant(reference) {
                return Some(format!("missing participant '{}'", reference));
            }
        }
        if let Some(name) = &self.only_if_has_group {
            if !structure.has_group(name) {
                return Some(format!("missing group '{}'", name));
            }
        }
        None
    }
}

/// A file left untouched by a filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// A file whose processing failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub path: PathBuf,
    pub message: String,
}

/// Per-batch tallies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub total: usize,
    pub processed: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
    pub errors: Vec<FileError>,
}

impl BatchOutcome {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

enum FileAction {
    Processed,
    Skipped(String),
}

/// Path of the backup written next to `path`: the full file name plus `.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Applies one operation across every file a pattern matches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileProcessor {
    /// Run everything except the final write
    pub dry_run: bool,
    /// Copy each file to `<file>.bak` before overwriting it
    pub create_backup: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub fn create_backup(mut self, enabled: bool) -> Self {
        self.create_backup = enabled;
        self
    }

    /// Run `operation` on every matching file
    ///
    /// Only an invalid pattern (or a failed directory walk) is returned as an
    /// error. Everything that goes wrong with an individual file lands in
    /// [`BatchOutcome::errors`].
    pub fn process_files<F>(
        &self,
        pattern: &str,
        filters: &Filters,
        operation: F,
    ) -> Result<BatchOutcome>
    where
        F: Fn(&DiagramStructure) -> Result<LineSequence>,
    {
        let batch_span = span!(Level::INFO, "process_files", pattern, dry_run = self.dry_run);
        let _enter = batch_span.enter();

        let files = discover_files(pattern)?;
        let mut outcome = BatchOutcome {
            total: files.len(),
            ..BatchOutcome::default()
        };

        for path in files {
            match self.process_one(&path, filters, &operation) {
                Ok(FileAction::Processed) => {
                    info!(path = %path.display(), dry_run = self.dry_run, "Processed file");
                    outcome.processed.push(path);
                }
                Ok(FileAction::Skipped(reason)) => {
                    debug!(path = %path.display(), reason = %reason, "Skipped file");
                    outcome.skipped.push(SkippedFile { path, reason });
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to process file");
                    outcome.errors.push(FileError {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    fn process_one<F>(&self, path: &Path, filters: &Filters, operation: &F) -> Result<FileAction>
    where
        F: Fn(&DiagramStructure) -> Result<LineSequence>,
    {
        let structure = StructureParser::new().parse_file(path)?;
        if let Some(reason) = filters.exclusion_reason(&structure) {
            return Ok(FileAction::Skipped(reason));
        }

        let modified = operation(&structure)?;
        if self.dry_run {
            return Ok(FileAction::Processed);
        }

        if self.create_backup {
            let backup = backup_path(path);
            fs::copy(path, &backup)?;
            debug!(backup = %backup.display(), "Wrote backup");
        }
        lines::write_lines(path, &modified)?;
        Ok(FileAction::Processed)
    }
}

/// Validate every file `pattern` matches
///
/// Files excluded by `filters` are reported as skipped. A file that cannot
/// be parsed is reported as failed.
pub fn validate_files(
    pattern: &str,
    requirements: &Requirements,
    filters: &Filters,
) -> Result<ValidationReport> {
    let files = discover_files(pattern)?;
    let parser = StructureParser::new();
    let mut report = ValidationReport::new();

    for path in files {
        let result = match parser.parse_file(&path) {
            Ok(structure) => match filters.exclusion_reason(&structure) {
                Some(reason) => ValidationResult::skipped(Some(path), reason),
                None => validate_structure(&structure, requirements),
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse file");
                ValidationResult::failed(Some(path), format!("✗ {}", e))
            }
        };
        report.push(result);
    }

    info!(
        total = report.total_files,
        passed = report.files_passed,
        failed = report.files_failed,
        "Validation finished"
    );
    Ok(report)
}
