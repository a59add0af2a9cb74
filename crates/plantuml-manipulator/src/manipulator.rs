//! Positional mutations over a parsed diagram
//!
//! Every operation reads a [`DiagramStructure`] and returns a brand new
//! [`LineSequence`]. Lines outside the affected span are copied verbatim and
//! keep their relative order; only their indices may shift. After a mutation
//! the old structure's indices are stale, so parse the result again before
//! applying another mutation.
//!
//! ```rust
//! use plantuml_manipulator::manipulator::insert_after_group;
//! use plantuml_manipulator::parser::StructureParser;
//!
//! let structure = StructureParser::new().parse_str("group Auth\nA -> B\nend\nB -> A");
//! let lines = insert_after_group(&structure, "Auth", &["note over A: audited".to_string()])?;
//! assert_eq!(lines, vec!["group Auth", "A -> B", "end", "", "note over A: audited", "B -> A"]);
//! # Ok::<(), plantuml_manipulator::ManipulatorError>(())
//! ```

use tracing::trace;

use crate::core::{
    lines::leading_whitespace, DiagramStructure, LineSequence, ManipulatorError, Result,
};

/// Insert `block_lines` after the first group named `group_name`
///
/// A blank separator line is placed between the group's `end` and the block.
/// Block lines are inserted verbatim; use [`preserve_indentation`] first to
/// align them.
pub fn insert_after_group(
    structure: &DiagramStructure,
    group_name: &str,
    block_lines: &[String],
) -> Result<LineSequence> {
    let group = structure
        .find_group(group_name)
        .ok_or_else(|| ManipulatorError::group_not_found(group_name))?;

    let insert_pos = group.end_line + 1;
    trace!(group = group_name, insert_pos, block_len = block_lines.len(), "Inserting after group");

    let mut result = Vec::with_capacity(structure.raw_lines.len() + block_lines.len() + 1);
    result.extend_from_slice(&structure.raw_lines[..insert_pos]);
    result.push(String::new());
    result.extend_from_slice(block_lines);
    result.extend_from_slice(&structure.raw_lines[insert_pos..]);
    Ok(result)
}

/// Add a participant declaration line
///
/// * With no participants declared yet, the line goes after the header
///   (`@startuml` and `title` lines at the top), preceded by a blank line.
/// * With `after_participant`, it goes right after the first participant whose
///   alias or name matches.
/// * Otherwise it goes right after the last declared participant.
pub fn add_participant(
    structure: &DiagramStructure,
    participant_line: &str,
    after_participant: Option<&str>,
) -> Result<LineSequence> {
    let mut result = structure.raw_lines.clone();

    let Some(last) = structure.participants.last() else {
        let insert_pos = header_end(&structure.raw_lines);
        trace!(insert_pos, "No participants declared, inserting after header");
        result.insert(insert_pos, String::new());
        result.insert(insert_pos + 1, participant_line.to_string());
        return Ok(result);
    };

    let anchor = match after_participant {
        Some(reference) => structure
            .find_participant(reference)
            .ok_or_else(|| ManipulatorError::participant_not_found(reference))?,
        None => last,
    };

    let insert_pos = anchor.line_index + 1;
    trace!(anchor = %anchor.alias, insert_pos, "Inserting participant");
    result.insert(insert_pos, participant_line.to_string());
    Ok(result)
}

/// Delete the first group named `group_name`, marker lines included
pub fn remove_group(structure: &DiagramStructure, group_name: &str) -> Result<LineSequence> {
    let group = structure
        .find_group(group_name)
        .ok_or_else(|| ManipulatorError::group_not_found(group_name))?;

    trace!(
        group = group_name,
        start = group.start_line,
        end = group.end_line,
        "Removing group"
    );

    let mut result = Vec::with_capacity(structure.raw_lines.len().saturating_sub(group.span_len()));
    result.extend_from_slice(&structure.raw_lines[..group.start_line]);
    result.extend_from_slice(&structure.raw_lines[group.end_line + 1..]);
    Ok(result)
}

/// Replace everything between a group's start and end lines with `new_content`
///
/// The `group` and `end` lines themselves are kept. Nested groups inside the
/// replaced span are removed along with the rest of the interior.
pub fn replace_group(
    structure: &DiagramStructure,
    group_name: &str,
    new_content: &[String],
) -> Result<LineSequence> {
    let group = structure
        .find_group(group_name)
        .ok_or_else(|| ManipulatorError::group_not_found(group_name))?;

    trace!(
        group = group_name,
        start = group.start_line,
        end = group.end_line,
        new_len = new_content.len(),
        "Replacing group content"
    );

    let interior_len = group.span_len().saturating_sub(2);
    let mut result = Vec::with_capacity(
        structure.raw_lines.len().saturating_sub(interior_len) + new_content.len(),
    );
    result.extend_from_slice(&structure.raw_lines[..=group.start_line]);
    result.extend_from_slice(new_content);
    result.extend_from_slice(&structure.raw_lines[group.end_line..]);
    Ok(result)
}

/// Prefix every non-blank content line with `reference_line`'s indentation
///
/// Whitespace-only lines are returned unchanged.
pub fn preserve_indentation(reference_line: &str, content: &[String]) -> Vec<String> {
    let indent = leading_whitespace(reference_line);
    content
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                line.clone()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect()
}

/// First index after the `@startuml` / `title` header block
///
/// Blank lines inside the header are skipped; the scan stops at the first
/// other non-blank line.
fn header_end(lines: &[String]) -> usize {
    let mut insert_pos = 0;
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with("@startuml") || trimmed.starts_with("title") {
            insert_pos = i + 1;
        } else if !trimmed.is_empty() {
            break;
        }
    }
    insert_pos
}

/// One mutation request, applied uniformly by the batch driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    InsertAfterGroup {
        group: String,
        block: Vec<String>,
    },
    AddParticipant {
        declaration: String,
        after: Option<String>,
    },
    RemoveGroup {
        group: String,
    },
    ReplaceGroup {
        group: String,
        content: Vec<String>,
    },
}

impl Mutation {
    /// Run this mutation against a parsed structure
    pub fn apply(&self, structure: &DiagramStructure) -> Result<LineSequence> {
        match self {
            Mutation::InsertAfterGroup { group, block } => {
                insert_after_group(structure, group, block)
            }
            Mutation::AddParticipant { declaration, after } => {
                add_participant(structure, declaration, after.as_deref())
            }
            Mutation::RemoveGroup { group } => remove_group(structure, group),
            Mutation::ReplaceGroup { group, content } => replace_group(structure, group, content),
        }
    }

    /// Short human-readable description
    pub fn describe(&self) -> String {
        match self {
            Mutation::InsertAfterGroup { group, block } => {
                format!("insert {} line(s) after group '{}'", block.len(), group)
            }
            Mutation::AddParticipant { declaration, after } => match after {
                Some(after) => format!("add '{}' after participant '{}'", declaration, after),
                None => format!("add '{}'", declaration),
            },
            Mutation::RemoveGroup { group } => format!("remove group '{}'", group),
            Mutation::ReplaceGroup { group, content } => {
                format!("replace body of group '{}' with {} line(s)", group, content.len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Group, Participant};
    use crate::parser::StructureParser;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn structure_with_group(name: &str, start: usize, end: usize, len: usize) -> DiagramStructure {
        let raw: Vec<String> = (0..len).map(|i| format!("line {}", i)).collect();
        let mut structure = DiagramStructure::new(raw);
        structure.groups.push(Group::new(name, start, end));
        structure
    }

    #[test]
    fn test_insert_after_group_offsets() {
        let structure = structure_with_group("X", 2, 4, 6);
        let result = insert_after_group(&structure, "X", &lines(&["NEW"])).unwrap();

        assert_eq!(result.len(), 8);
        assert_eq!(&result[..5], &structure.raw_lines[..5]);
        assert_eq!(result[5], "");
        assert_eq!(result[6], "NEW");
        assert_eq!(result[7], structure.raw_lines[5]);
    }

    #[test]
    fn test_insert_after_missing_group() {
        let structure = structure_with_group("X", 2, 4, 6);
        let before = structure.clone();
        let err = insert_after_group(&structure, "Y", &lines(&["NEW"])).unwrap_err();
        assert!(matches!(err, ManipulatorError::GroupNotFound { ref name } if name == "Y"));
        assert_eq!(structure, before);
    }

    #[test]
    fn test_insert_is_case_sensitive() {
        let structure = structure_with_group("Auth", 0, 1, 2);
        assert!(insert_after_group(&structure, "auth", &[]).is_err());
    }

    #[test]
    fn test_insert_after_last_line() {
        let structure = StructureParser::new().parse_str("group G\nend");
        let result = insert_after_group(&structure, "G", &lines(&["A", "B"])).unwrap();
        assert_eq!(result, lines(&["group G", "end", "", "A", "B"]));
    }

    #[test]
    fn test_insert_targets_innermost_first_match() {
        let structure = StructureParser::new()
            .parse_str("group Dup\n  group Dup\n  end\nend\ntail");
        let result = insert_after_group(&structure, "Dup", &lines(&["X"])).unwrap();
        assert_eq!(
            result,
            lines(&["group Dup", "  group Dup", "  end", "", "X", "end", "tail"])
        );
    }

    #[test]
    fn test_add_participant_after_alias() {
        let mut structure = DiagramStructure::new(lines(&["@startuml", "pA", "x", "pB", "@enduml"]));
        structure.participants.push(Participant::new("A", "A", 1));
        structure.participants.push(Participant::new("B", "B", 3));

        let result =
            add_participant(&structure, "participant \"C\" as C", Some("A")).unwrap();
        assert_eq!(
            result,
            lines(&["@startuml", "pA", "participant \"C\" as C", "x", "pB", "@enduml"])
        );
    }

    #[test]
    fn test_add_participant_matches_display_name() {
        let structure = StructureParser::new().parse_str(
            "participant \"Front End\" as FE\nparticipant \"Back End\" as BE",
        );
        let result = add_participant(&structure, "participant API as API", Some("Front End")).unwrap();
        assert_eq!(result[1], "participant API as API");
    }

    #[test]
    fn test_add_participant_defaults_to_last() {
        let structure = StructureParser::new().parse_str(
            "@startuml\nparticipant A as A\nparticipant B as B\n\nA -> B: hi\n@enduml",
        );
        let result = add_participant(&structure, "participant C as C", None).unwrap();
        assert_eq!(result[3], "participant C as C");
        assert_eq!(result[4], "");
        assert_eq!(result.len(), 7);
    }

    #[test]
    fn test_add_participant_unknown_anchor() {
        let structure = StructureParser::new().parse_str("participant A as A");
        let err = add_participant(&structure, "participant C as C", Some("Z")).unwrap_err();
        assert!(matches!(err, ManipulatorError::ParticipantNotFound { .. }));
    }

    #[test]
    fn test_add_first_participant_after_header() {
        let structure = StructureParser::new()
            .parse_str("@startuml\ntitle Login Flow\n\nA -> B: hi\n@enduml");
        let result = add_participant(&structure, "participant A as A", None).unwrap();
        assert_eq!(
            result,
            lines(&[
                "@startuml",
                "title Login Flow",
                "",
                "participant A as A",
                "",
                "A -> B: hi",
                "@enduml"
            ])
        );
    }

    #[test]
    fn test_add_first_participant_without_header() {
        let structure = StructureParser::new().parse_str("A -> B: hi");
        let result = add_participant(&structure, "participant A as A", None).unwrap();
        assert_eq!(result, lines(&["", "participant A as A", "A -> B: hi"]));
    }

    #[test]
    fn test_add_first_participant_ignores_anchor() {
        let structure = StructureParser::new().parse_str("@startuml\n@enduml");
        let result = add_participant(&structure, "participant A as A", Some("Nobody")).unwrap();
        assert_eq!(result, lines(&["@startuml", "", "participant A as A", "@enduml"]));
    }

    #[test]
    fn test_remove_group() {
        let structure = StructureParser::new()
            .parse_str("before\ngroup G\n  a\n  group H\n  end\nend\nafter");
        let result = remove_group(&structure, "G").unwrap();
        assert_eq!(result, lines(&["before", "after"]));

        let result = remove_group(&structure, "H").unwrap();
        assert_eq!(result, lines(&["before", "group G", "  a", "end", "after"]));
    }

    #[test]
    fn test_replace_group_keeps_markers() {
        let structure = StructureParser::new()
            .parse_str("before\n  group G\n    old 1\n    old 2\n  end group\nafter");
        let result = replace_group(&structure, "G", &lines(&["    new"])).unwrap();
        assert_eq!(
            result,
            lines(&["before", "  group G", "    new", "  end group", "after"])
        );
    }

    #[test]
    fn test_replace_empty_group_and_with_nothing() {
        let structure = StructureParser::new().parse_str("group G\nend");
        let result = replace_group(&structure, "G", &lines(&["x", "y"])).unwrap();
        assert_eq!(result, lines(&["group G", "x", "y", "end"]));

        let structure = StructureParser::new().parse_str("group G\nx\nend");
        let result = replace_group(&structure, "G", &[]).unwrap();
        assert_eq!(result, lines(&["group G", "end"]));
    }

    #[test]
    fn test_remove_and_replace_missing_group() {
        let structure = StructureParser::new().parse_str("group G\nend");
        assert!(remove_group(&structure, "Nope").is_err());
        assert!(replace_group(&structure, "Nope", &[]).is_err());
    }

    #[test]
    fn test_preserve_indentation() {
        let result = preserve_indentation("    indented line", &lines(&["line 1", "", "  ", "line 2"]));
        assert_eq!(result, lines(&["    line 1", "", "  ", "    line 2"]));
    }

    #[test]
    fn test_preserve_indentation_tabs() {
        let result = preserve_indentation("\tgroup X", &lines(&["a"]));
        assert_eq!(result, lines(&["\ta"]));
    }

    #[test]
    fn test_mutation_apply_and_describe() {
        let structure = StructureParser::new().parse_str("group G\nend");
        let mutation = Mutation::RemoveGroup {
            group: "G".to_string(),
        };
        assert!(mutation.apply(&structure).unwrap().is_empty());
        assert_eq!(mutation.describe(), "remove group 'G'");

        let mutation = Mutation::AddParticipant {
            declaration: "participant A as A".to_string(),
            after: Some("B".to_string()),
        };
        assert!(mutation.describe().contains("after participant 'B'"));
    }
}
