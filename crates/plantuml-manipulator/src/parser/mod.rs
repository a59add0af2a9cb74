//! Structural parser for PlantUML sequence diagrams
//!
//! Recovers participants, groups and the `@startuml`/`@enduml` markers from a
//! line sequence in one forward pass. Only those constructs are recognized;
//! every other line is opaque and stays reachable through
//! [`DiagramStructure::raw_lines`]. The parser never fails on content:
//! malformed nesting degrades to missing groups plus recorded
//! [`NestingIssue`](crate::core::NestingIssue)s.
//!
//! ```rust
//! use plantuml_manipulator::parser::StructureParser;
//!
//! let structure = StructureParser::new().parse_str(
//!     "@startuml\nparticipant \"API\" as API\ngroup Auth\nAPI -> API: check\nend\n@enduml",
//! );
//! assert_eq!(structure.participants[0].alias, "API");
//! assert_eq!(structure.groups[0].name, "Auth");
//! assert!(structure.has_start_marker && structure.has_end_marker);
//! ```

mod group;
mod participant;

pub use group::{
    classify, group_name, indent_level, is_group_end, is_group_start, GroupTracker, LineClass,
};
pub use participant::{match_declaration, parse_participant, Declaration};

use std::path::Path;
use tracing::{debug, span, trace, Level};

use crate::core::{lines, DiagramStructure, LineSequence, Result};

/// True if the trimmed line begins with `@startuml`
pub fn is_start_marker(line: &str) -> bool {
    line.trim().starts_with("@startuml")
}

/// True if the trimmed line begins with `@enduml`
pub fn is_end_marker(line: &str) -> bool {
    line.trim().starts_with("@enduml")
}

/// Line-oriented PlantUML structure parser
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureParser;

impl StructureParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a file from disk
    ///
    /// Fails with `FileNotFound` before reading if the path does not exist.
    pub fn parse_file(&self, path: &Path) -> Result<DiagramStructure> {
        let raw_lines = lines::read_lines(path)?;
        Ok(self.parse_lines(raw_lines).with_source(path))
    }

    /// Parse in-memory text
    pub fn parse_str(&self, text: &str) -> DiagramStructure {
        self.parse_lines(lines::split_lines(text))
    }

    /// Parse a line sequence, taking ownership of it as `raw_lines`
    pub fn parse_lines(&self, raw_lines: LineSequence) -> DiagramStructure {
        let parse_span = span!(Level::DEBUG, "parse_lines", line_count = raw_lines.len());
        let _enter = parse_span.enter();

        let mut participants = Vec::new();
        let mut tracker = GroupTracker::new();
        let mut has_start_marker = false;
        let mut has_end_marker = false;

        for (index, line) in raw_lines.iter().enumerate() {
            has_start_marker |= is_start_marker(line);
            has_end_marker |= is_end_marker(line);

            if let Some(participant) = parse_participant(line, index) {
                trace!(line = index, alias = %participant.alias, "Participant declared");
                participants.push(participant);
            }

            tracker.feed(index, line);
        }

        let (groups, nesting_issues) = tracker.finish();

        debug!(
            participants = participants.len(),
            groups = groups.len(),
            nesting_issues = nesting_issues.len(),
            "Parsed diagram structure"
        );

        DiagramStructure {
            source: None,
            participants,
            groups,
            raw_lines,
            has_start_marker,
            has_end_marker,
            nesting_issues,
        }
    }
}
