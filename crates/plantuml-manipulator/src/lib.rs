//! PlantUML Manipulator - Structured editing of PlantUML sequence diagrams
//!
//! A library for recovering participants and groups from PlantUML diagrams and
//! applying positional edits without disturbing any other line.
//!
//! # Quick Start
//!
//! ```rust
//! use plantuml_manipulator::parse_str;
//!
//! let structure = parse_str("@startuml\nparticipant \"User\" as U\ngroup Login\nU -> U: auth\nend\n@enduml");
//! assert_eq!(structure.participants[0].alias, "U");
//! assert!(structure.has_group("Login"));
//! ```
//!
//! # Editing
//!
//! Mutations take a parsed structure and return a new line sequence:
//!
//! ```rust
//! use plantuml_manipulator::prelude::*;
//!
//! let structure = parse_str("@startuml\nparticipant A as A\nparticipant B as B\n@enduml");
//! let lines = add_participant(&structure, "participant \"Cache\" as C", Some("A"))?;
//! assert_eq!(lines[2], "participant \"Cache\" as C");
//!
//! // Re-parse before the next edit, indices have moved
//! let structure = StructureParser::new().parse_lines(lines);
//! let result = validate_structure(&structure, &Requirements::new().require_participant("C"));
//! assert_eq!(result.status, ValidationStatus::Pass);
//! # Ok::<(), ManipulatorError>(())
//! ```
//!
//! # Batches
//!
//! [`batch::FileProcessor`] applies one operation across every file a glob
//! matches, and [`batch::validate_files`] checks requirements the same way.

pub mod batch;
pub mod core;
pub mod manipulator;
pub mod parser;
pub mod report;
pub mod validator;

pub use crate::core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::batch::{validate_files, BatchOutcome, FileProcessor, Filters};
    pub use crate::core::{
        DiagramStructure, Group, LineSequence, ManipulatorError, NestingIssue, Participant,
    };
    pub use crate::manipulator::{
        add_participant, insert_after_group, preserve_indentation, remove_group, replace_group,
        Mutation,
    };
    pub use crate::parser::StructureParser;
    pub use crate::report::{ReportFormat, ReportGenerator};
    pub use crate::validator::{
        validate_file, validate_structure, Requirements, ValidationReport, ValidationResult,
        ValidationStatus,
    };
    pub use crate::{parse_file, parse_str};
}

/// Parse a diagram file from disk
///
/// # Example
/// ```rust,no_run
/// use plantuml_manipulator::parse_file;
///
/// let structure = parse_file("diagrams/checkout.puml")?;
/// println!("{} groups", structure.groups.len());
/// # Ok::<(), plantuml_manipulator::ManipulatorError>(())
/// ```
pub fn parse_file(path: impl AsRef<std::path::Path>) -> Result<DiagramStructure> {
    parser::StructureParser::new().parse_file(path.as_ref())
}

/// Parse diagram text held in memory
pub fn parse_str(text: &str) -> DiagramStructure {
    parser::StructureParser::new().parse_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_str_round_trip() {
        let text = "@startuml\n  group G\n  end\n@enduml";
        let structure = parse_str(text);
        assert_eq!(structure.text(), text);
        assert_eq!(structure.groups.len(), 1);
    }

    #[test]
    fn test_parse_file_missing() {
        let err = parse_file("/definitely/not/here.puml").unwrap_err();
        assert!(matches!(err, ManipulatorError::FileNotFound { .. }));
    }

    #[test]
    fn test_parse_file_sets_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.puml");
        std::fs::write(&path, "@startuml\n@enduml\n").unwrap();
        let structure = parse_file(&path).unwrap();
        assert_eq!(structure.source.as_deref(), Some(path.as_path()));
        assert_eq!(structure.line_count(), 2);
    }
}
