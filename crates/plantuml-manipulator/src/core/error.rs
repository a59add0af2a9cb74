//! Core error types for diagram manipulation
//!
//! Every fallible operation in the library reports one of these variants so
//! that batch callers can record a precise message per file.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, parsing or mutating a diagram
#[derive(Error, Debug)]
pub enum ManipulatorError {
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Group '{name}' not found in diagram")]
    GroupNotFound { name: String },

    #[error("Participant '{name}' not found in diagram")]
    ParticipantNotFound { name: String },

    /// Reserved for structurally malformed input. The structural parser is
    /// lenient and never produces this variant itself.
    #[error("Invalid PlantUML syntax: {message} at line {line}")]
    InvalidSyntax { message: String, line: usize },

    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ManipulatorError {
    /// Create a new file-not-found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new group-not-found error
    pub fn group_not_found(name: impl Into<String>) -> Self {
        Self::GroupNotFound { name: name.into() }
    }

    /// Create a new participant-not-found error
    pub fn participant_not_found(name: impl Into<String>) -> Self {
        Self::ParticipantNotFound { name: name.into() }
    }

    /// Create a new invalid-syntax error
    pub fn invalid_syntax(message: impl Into<String>, line: usize) -> Self {
        Self::InvalidSyntax {
            message: message.into(),
            line,
        }
    }

    /// Create a new invalid-pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Returns true for the lookup failures raised by mutations
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            Self::GroupNotFound { .. } | Self::ParticipantNotFound { .. }
        )
    }
}

/// Result alias used throughout the library
pub type Result<T, E = ManipulatorError> = std::result::Result<T, E>;
