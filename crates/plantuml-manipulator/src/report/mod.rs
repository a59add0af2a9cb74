//! Read-only reports over sets of diagrams
//!
//! Listings are built from the same [`StructureParser`] output the mutators
//! use. Line numbers in reports are 1-based.

mod table;
mod tree;

pub use table::{csv_field, pad, render_csv, render_table};
pub use tree::render_tree;

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::batch::discover_files;
use crate::core::{DiagramStructure, Group, NestingIssue, Participant};
use crate::parser::StructureParser;

/// Output format for a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
    Csv,
    Tree,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Table => "table",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Tree => "tree",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(ReportFormat::Table),
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            "tree" => Ok(ReportFormat::Tree),
            _ => Err(format!(
                "Unknown report format: {}. Valid options: table, json, csv, tree",
                s
            )),
        }
    }
}

/// One row of the group listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRow {
    pub file: String,
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
    pub depth: usize,
}

/// One row of the participant listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantRow {
    pub file: String,
    pub name: String,
    pub alias: String,
    pub color: Option<String>,
    pub line: usize,
}

/// Structure summary for JSON output, without group content lines
#[derive(Debug, Serialize)]
struct StructureSummary<'a> {
    source: String,
    line_count: usize,
    has_start_marker: bool,
    has_end_marker: bool,
    participants: Vec<ParticipantRow>,
    groups: Vec<GroupRow>,
    nesting_issues: &'a [NestingIssue],
}

fn group_row(file: &str, group: &Group) -> GroupRow {
    GroupRow {
        file: file.to_string(),
        name: group.name.clone(),
        start_line: group.start_line + 1,
        end_line: group.end_line + 1,
        depth: group.depth,
    }
}

fn participant_row(file: &str, participant: &Participant) -> ParticipantRow {
    ParticipantRow {
        file: file.to_string(),
        name: participant.name.clone(),
        alias: participant.alias.clone(),
        color: participant.color.clone(),
        line: participant.line_index + 1,
    }
}

fn unsupported(operation: &str, format: ReportFormat) -> anyhow::Error {
    anyhow::anyhow!("Format '{}' is not supported for {}", format, operation)
}

/// Builds listings, trees and matrices from files on disk
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportGenerator {
    parser: StructureParser,
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn parse_all(&self, pattern: &str) -> Result<Vec<DiagramStructure>> {
        let files = discover_files(pattern)?;
        debug!(pattern, files = files.len(), "Collecting structures for report");
        files
            .iter()
            .map(|path| {
                self.parser
                    .parse_file(path)
                    .with_context(|| format!("Failed to read {}", path.display()))
            })
            .collect()
    }

    /// Every group in every matching file, in source order per file
    pub fn group_rows(&self, pattern: &str) -> Result<Vec<GroupRow>> {
        Ok(self
            .parse_all(pattern)?
            .iter()
            .flat_map(|structure| {
                let file = structure.source_name();
                structure
                    .groups_in_source_order()
                    .into_iter()
                    .map(move |group| group_row(&file, group))
                    .collect::<Vec<_>>()
            })
            .collect())
    }

    /// Every participant in every matching file
    pub fn participant_rows(&self, pattern: &str) -> Result<Vec<ParticipantRow>> {
        Ok(self
            .parse_all(pattern)?
            .iter()
            .flat_map(|structure| {
                let file = structure.source_name();
                structure
                    .participants
                    .iter()
                    .map(|p| participant_row(&file, p))
                    .collect::<Vec<_>>()
            })
            .collect())
    }

    pub fn list_groups(&self, pattern: &str, format: ReportFormat) -> Result<String> {
        let rows = self.group_rows(pattern)?;
        let headers = ["File", "Group", "Start", "End", "Depth"];
        let cells = |r: &GroupRow| {
            vec![
                r.file.clone(),
                r.name.clone(),
                r.start_line.to_string(),
                r.end_line.to_string(),
                r.depth.to_string(),
            ]
        };

        match format {
            ReportFormat::Table if rows.is_empty() => Ok("No groups found".to_string()),
            ReportFormat::Table => Ok(render_table(
                &headers,
                &rows.iter().map(cells).collect::<Vec<_>>(),
            )),
            ReportFormat::Csv => Ok(render_csv(
                &["file", "group", "start_line", "end_line", "depth"],
                &rows.iter().map(cells).collect::<Vec<_>>(),
            )),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(&rows)?),
            ReportFormat::Tree => Err(unsupported("group listings", format)),
        }
    }

    pub fn list_participants(&self, pattern: &str, format: ReportFormat) -> Result<String> {
        let rows = self.participant_rows(pattern)?;
        let cells = |r: &ParticipantRow| {
            vec![
                r.file.clone(),
                r.name.clone(),
                r.alias.clone(),
                r.color.clone().unwrap_or_default(),
                r.line.to_string(),
            ]
        };

        match format {
            ReportFormat::Table if rows.is_empty() => Ok("No participants found".to_string()),
            ReportFormat::Table => Ok(render_table(
                &["File", "Name", "Alias", "Color", "Line"],
                &rows.iter().map(cells).collect::<Vec<_>>(),
            )),
            ReportFormat::Csv => Ok(render_csv(
                &["file", "name", "alias", "color", "line"],
                &rows.iter().map(cells).collect::<Vec<_>>(),
            )),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(&rows)?),
            ReportFormat::Tree => Err(unsupported("participant listings", format)),
        }
    }

    /// Structure of a single file as a tree or JSON
    pub fn show_structure(&self, path: &Path, format: ReportFormat) -> Result<String> {
        let structure = self
            .parser
            .parse_file(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        match format {
            ReportFormat::Tree => Ok(render_tree(&structure)),
            ReportFormat::Json => {
                let file = structure.source_name();
                let summary = StructureSummary {
                    source: file.clone(),
                    line_count: structure.line_count(),
                    has_start_marker: structure.has_start_marker,
                    has_end_marker: structure.has_end_marker,
                    participants: structure
                        .participants
                        .iter()
                        .map(|p| participant_row(&file, p))
                        .collect(),
                    groups: structure
                        .groups_in_source_order()
                        .into_iter()
                        .map(|g| group_row(&file, g))
                        .collect(),
                    nesting_issues: &structure.nesting_issues,
                };
                Ok(serde_json::to_string_pretty(&summary)?)
            }
            ReportFormat::Table | ReportFormat::Csv => {
                Err(unsupported("structure views", format))
            }
        }
    }

    /// File × group-name presence table
    ///
    /// Columns are the distinct group names across all files, sorted.
    pub fn group_matrix(&self, pattern: &str) -> Result<String> {
        let structures = self.parse_all(pattern)?;
        if structures.is_empty() {
            return Ok("No files found".to_string());
        }

        let names: BTreeSet<&str> = structures
            .iter()
            .flat_map(|s| s.groups.iter().map(|g| g.name.as_str()))
            .collect();

        let mut headers = vec!["File"];
        headers.extend(names.iter().copied());

        let rows: Vec<Vec<String>> = structures
            .iter()
            .map(|structure| {
                let mut row = vec![structure.source_name()];
                row.extend(names.iter().map(|name| {
                    let cell = if structure.has_group(name) { "✓" } else { "·" };
                    cell.to_string()
                }));
                row
            })
            .collect();

        Ok(render_table(&headers, &rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn fixture() -> TempDir {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("a.puml"),
            "@startuml\nparticipant \"Web, UI\" as W #blue\ngroup Outer\ngroup Inner\nend\nend\n@enduml",
        )
        .unwrap();
        fs::write(
            dir.path().join("b.puml"),
            "@startuml\nparticipant DB as D\ngroup Outer\nend\n@enduml",
        )
        .unwrap();
        dir
    }

    fn pattern(dir: &TempDir) -> String {
        format!("{}/*.puml", dir.path().display())
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert!("xml".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_group_rows_are_one_based_source_order() {
        let dir = fixture();
        let rows = ReportGenerator::new().group_rows(&pattern(&dir)).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name, "Outer");
        assert_eq!((rows[0].start_line, rows[0].end_line), (3, 6));
        assert_eq!(rows[1].name, "Inner");
        assert_eq!(rows[1].depth, 1);
        assert!(rows[2].file.ends_with("b.puml"));
    }

    #[test]
    fn test_list_groups_table() {
        let dir = fixture();
        let table = ReportGenerator::new()
            .list_groups(&pattern(&dir), ReportFormat::Table)
            .unwrap();
        let header = table.lines().next().unwrap();
        assert!(header.starts_with("File"));
        assert!(header.contains("Group"));
        assert_eq!(table.lines().count(), 5);
    }

    #[test]
    fn test_list_participants_csv_quotes_fields() {
        let dir = fixture();
        let csv = ReportGenerator::new()
            .list_participants(&pattern(&dir), ReportFormat::Csv)
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "file,name,alias,color,line");
        assert!(lines[1].ends_with(",\"Web, UI\",W,blue,2"));
        assert!(lines[2].ends_with(",DB,D,,2"));
    }

    #[test]
    fn test_list_participants_json() {
        let dir = fixture();
        let json = ReportGenerator::new()
            .list_participants(&pattern(&dir), ReportFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[0]["alias"], "W");
        assert_eq!(value[1]["color"], serde_json::Value::Null);
    }

    #[test]
    fn test_empty_listing() {
        let dir = tempdir().unwrap();
        let out = ReportGenerator::new()
            .list_groups(&format!("{}/*.puml", dir.path().display()), ReportFormat::Table)
            .unwrap();
        assert_eq!(out, "No groups found");
    }

    #[test]
    fn test_show_structure_json_omits_content() {
        let dir = fixture();
        let json = ReportGenerator::new()
            .show_structure(&dir.path().join("a.puml"), ReportFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["line_count"], 7);
        assert_eq!(value["groups"][0]["name"], "Outer");
        assert!(value["groups"][0].get("content").is_none());
        assert_eq!(value["has_end_marker"], true);
    }

    #[test]
    fn test_unsupported_formats() {
        let dir = fixture();
        let generator = ReportGenerator::new();
        assert!(generator
            .list_groups(&pattern(&dir), ReportFormat::Tree)
            .is_err());
        let err = generator
            .show_structure(&dir.path().join("a.puml"), ReportFormat::Csv)
            .unwrap_err();
        assert!(err.to_string().contains("not supported"));
    }

    #[test]
    fn test_show_structure_missing_file() {
        let err = ReportGenerator::new()
            .show_structure(Path::new("/nonexistent/x.puml"), ReportFormat::Tree)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("File not found"));
    }

    #[test]
    fn test_group_matrix() {
        let dir = fixture();
        let matrix = ReportGenerator::new().group_matrix(&pattern(&dir)).unwrap();
        let lines: Vec<&str> = matrix.lines().collect();
        assert!(lines[0].ends_with("Inner  Outer"));
        assert!(lines[2].contains('✓'));
        assert!(lines[3].contains('·'));
        assert_eq!(lines.len(), 4);
    }
}
