//! Core type definitions for parsed diagrams
//!
//! A [`DiagramStructure`] is a frozen snapshot: participants and groups refer
//! to positions in `raw_lines` by index. Mutations never edit a structure in
//! place. They return a new [`LineSequence`], and any structure parsed before
//! the mutation must be discarded and the new lines parsed again, since every
//! index after the splice point has shifted.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// One string per physical line, terminators removed, content untouched
pub type LineSequence = Vec<String>;

/// A `participant "Name" as Alias #color` declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    /// Display label, quotes stripped
    pub name: String,
    /// Identifier used by the rest of the diagram
    pub alias: String,
    /// Color token without the leading `#`
    pub color: Option<String>,
    /// Index of the declaration line in `raw_lines`
    pub line_index: usize,
    /// The declaration line exactly as it appeared
    pub raw_line: String,
}

impl Participant {
    pub fn new(name: impl Into<String>, alias: impl Into<String>, line_index: usize) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
            color: None,
            line_index,
            raw_line: String::new(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_raw_line(mut self, raw_line: impl Into<String>) -> Self {
        self.raw_line = raw_line.into();
        self
    }

    /// True if `reference` is this participant's alias or display name
    pub fn matches(&self, reference: &str) -> bool {
        self.alias == reference || self.name == reference
    }
}

/// A closed `group <name>` ... `end` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub name: String,
    /// Index of the `group` line
    pub start_line: usize,
    /// Index of the matching `end` line (inclusive)
    pub end_line: usize,
    /// Lines directly inside this group, excluding anything that belongs to
    /// a nested group
    pub content: Vec<String>,
    /// Number of groups already open when this one started
    pub depth: usize,
    /// Leading whitespace characters on the `group` line
    pub indent: usize,
}

impl Group {
    pub fn new(name: impl Into<String>, start_line: usize, end_line: usize) -> Self {
        Self {
            name: name.into(),
            start_line,
            end_line,
            content: Vec::new(),
            depth: 0,
            indent: 0,
        }
    }

    pub fn with_content(mut self, content: Vec<String>) -> Self {
        self.content = content;
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Number of lines spanned, marker lines included
    pub fn span_len(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    /// True if `other` lies strictly inside this group
    pub fn contains(&self, other: &Group) -> bool {
        self.start_line < other.start_line && other.end_line < self.end_line
    }
}

/// Group markers the parser could not pair up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NestingIssue {
    /// An `end` line seen while no group was open
    UnmatchedEnd { line: usize },
    /// A `group` line still open at end of input
    UnclosedGroup { name: String, start_line: usize },
}

impl fmt::Display for NestingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NestingIssue::UnmatchedEnd { line } => {
                write!(f, "Unmatched end marker at line {}", line + 1)
            }
            NestingIssue::UnclosedGroup { name, start_line } => {
                write!(
                    f,
                    "Group '{}' opened at line {} is never closed",
                    name,
                    start_line + 1
                )
            }
        }
    }
}

/// Everything the structural parser recovered from one line sequence
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DiagramStructure {
    /// Where the lines came from, if they came from a file
    pub source: Option<PathBuf>,
    /// Declarations in source order
    pub participants: Vec<Participant>,
    /// Closed groups in closing order (innermost first)
    pub groups: Vec<Group>,
    /// The unmodified input
    pub raw_lines: LineSequence,
    pub has_start_marker: bool,
    pub has_end_marker: bool,
    /// Markers dropped while pairing groups
    pub nesting_issues: Vec<NestingIssue>,
}

impl DiagramStructure {
    pub fn new(raw_lines: LineSequence) -> Self {
        Self {
            raw_lines,
            ..Self::default()
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Display name for the source, `<memory>` for in-memory input
    pub fn source_name(&self) -> String {
        self.source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string())
    }

    /// First group (in closing order) with exactly this name
    pub fn find_group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// First participant whose alias or display name is `reference`
    pub fn find_participant(&self, reference: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.matches(reference))
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.find_group(name).is_some()
    }

    pub fn has_participant(&self, reference: &str) -> bool {
        self.find_participant(reference).is_some()
    }

    /// Groups ordered by where they open, outermost before inner
    pub fn groups_in_source_order(&self) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self.groups.iter().collect();
        groups.sort_by_key(|g| g.start_line);
        groups
    }

    /// The full text with `\n` separators
    pub fn text(&self) -> String {
        self.raw_lines.join("\n")
    }

    pub fn line_count(&self) -> usize {
        self.raw_lines.len()
    }
}
