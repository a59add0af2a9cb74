//! Requirement checks over parsed diagrams
//!
//! Validation is a pure function of a [`DiagramStructure`] and a set of
//! [`Requirements`]. The outcome is four-way rather than a boolean so that
//! "validated and clean" ([`ValidationStatus::Pass`]) can be told apart from
//! "nothing was asked" ([`ValidationStatus::Skipped`]).

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::DiagramStructure;
use crate::parser::StructureParser;

/// Overall outcome of validating one diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Pass,
    Fail,
    Warning,
    Skipped,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Pass => "pass",
            ValidationStatus::Fail => "fail",
            ValidationStatus::Warning => "warning",
            ValidationStatus::Skipped => "skipped",
        }
    }

    /// One-character marker used by console reports
    pub fn symbol(&self) -> &'static str {
        match self {
            ValidationStatus::Pass => "✓",
            ValidationStatus::Fail => "✗",
            ValidationStatus::Warning => "⚠",
            ValidationStatus::Skipped => "·",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a diagram must (or must not) contain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    pub required_groups: Vec<String>,
    pub required_participants: Vec<String>,
    pub forbidden_groups: Vec<String>,
    /// Turn unmatched `end` lines and unclosed groups into warnings
    pub report_nesting_issues: bool,
}

impl Requirements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_group(mut self, name: impl Into<String>) -> Self {
        self.required_groups.push(name.into());
        self
    }

    pub fn require_participant(mut self, name: impl Into<String>) -> Self {
        self.required_participants.push(name.into());
        self
    }

    pub fn forbid_group(mut self, name: impl Into<String>) -> Self {
        self.forbidden_groups.push(name.into());
        self
    }

    pub fn report_nesting_issues(mut self, enabled: bool) -> Self {
        self.report_nesting_issues = enabled;
        self
    }

    /// Number of individual checks these requirements produce
    pub fn check_count(&self) -> usize {
        self.required_groups.len() + self.required_participants.len() + self.forbidden_groups.len()
    }
}

/// Per-diagram validation verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub source: Option<PathBuf>,
    pub status: ValidationStatus,
    pub checks_passed: usize,
    pub checks_failed: usize,
    pub messages: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// A result for a diagram excluded before any check ran
    pub fn skipped(source: Option<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            source,
            status: ValidationStatus::Skipped,
            checks_passed: 0,
            checks_failed: 0,
            messages: vec![reason.into()],
            warnings: Vec::new(),
        }
    }

    /// A forced failure, used when the diagram could not even be parsed
    pub fn failed(source: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            source,
            status: ValidationStatus::Fail,
            checks_passed: 0,
            checks_failed: 1,
            messages: vec![message.into()],
            warnings: Vec::new(),
        }
    }

    /// Display name for the source, `<memory>` for in-memory input
    pub fn source_name(&self) -> String {
        self.source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string())
    }
}

/// Check one structure against `requirements`
pub fn validate_structure(
    structure: &DiagramStructure,
    requirements: &Requirements,
) -> ValidationResult {
    let mut checks_passed = 0;
    let mut checks_failed = 0;
    let mut messages = Vec::with_capacity(requirements.check_count());
    let mut warnings = Vec::new();

    for name in &requirements.required_groups {
        if structure.has_group(name) {
            checks_passed += 1;
            messages.push(format!("✓ Group '{}' found", name));
        } else {
            checks_failed += 1;
            messages.push(format!("✗ Group '{}' not found", name));
        }
    }

    for name in &requirements.required_participants {
        if structure.has_participant(name) {
            checks_passed += 1;
            messages.push(format!("✓ Participant '{}' found", name));
        } else {
            checks_failed += 1;
            messages.push(format!("✗ Participant '{}' not found", name));
        }
    }

    for name in &requirements.forbidden_groups {
        if structure.has_group(name) {
            checks_failed += 1;
            messages.push(format!("✗ Forbidden group '{}' present", name));
        } else {
            checks_passed += 1;
            messages.push(format!("✓ Forbidden group '{}' absent", name));
        }
    }

    if requirements.report_nesting_issues {
        warnings.extend(structure.nesting_issues.iter().map(|issue| issue.to_string()));
    }

    let status = if checks_failed > 0 {
        ValidationStatus::Fail
    } else if !warnings.is_empty() {
        ValidationStatus::Warning
    } else if checks_passed > 0 {
        ValidationStatus::Pass
    } else {
        ValidationStatus::Skipped
    };

    debug!(
        source = %structure.source_name(),
        status = %status,
        checks_passed,
        checks_failed,
        "Validated structure"
    );

    ValidationResult {
        source: structure.source.clone(),
        status,
        checks_passed,
        checks_failed,
        messages,
        warnings,
    }
}

/// Parse and validate a file
///
/// A file that cannot be read yields a failing result naming the error
/// instead of an `Err`, so batch callers always get one verdict per file.
pub fn validate_file(path: &Path, requirements: &Requirements) -> ValidationResult {
    match StructureParser::new().parse_file(path) {
        Ok(structure) => validate_structure(&structure, requirements),
        Err(e) => ValidationResult::failed(Some(path.to_path_buf()), format!("✗ {}", e)),
    }
}

/// Verdicts for a set of files plus per-status counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub total_files: usize,
    pub files_passed: usize,
    pub files_failed: usize,
    pub files_warned: usize,
    pub files_skipped: usize,
    pub results: Vec<ValidationResult>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one verdict and bump the matching counter
    pub fn push(&mut self, result: ValidationResult) {
        self.total_files += 1;
        match result.status {
            ValidationStatus::Pass => self.files_passed += 1,
            ValidationStatus::Fail => self.files_failed += 1,
            ValidationStatus::Warning => self.files_warned += 1,
            ValidationStatus::Skipped => self.files_skipped += 1,
        }
        self.results.push(result);
    }

    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Group, NestingIssue, Participant};

    fn sample_structure() -> DiagramStructure {
        let mut structure = DiagramStructure::new(Vec::new()).with_source("test.puml");
        structure.participants = vec![
            Participant::new("User", "User", 1),
            Participant::new("Payment System", "Pay", 2),
        ];
        structure.groups = vec![
            Group::new("Process Request", 5, 8),
            Group::new("Handle Response", 10, 13),
        ];
        structure
    }

    #[test]
    fn test_no_requirements_is_skipped() {
        let result = validate_structure(&sample_structure(), &Requirements::new());
        assert_eq!(result.status, ValidationStatus::Skipped);
        assert_eq!(result.checks_passed, 0);
        assert_eq!(result.checks_failed, 0);
        assert!(result.messages.is_empty());
    }

    #[test]
    fn test_required_group_present() {
        let requirements = Requirements::new().require_group("Process Request");
        let result = validate_structure(&sample_structure(), &requirements);
        assert_eq!(result.status, ValidationStatus::Pass);
        assert_eq!(result.checks_failed, 0);
        assert_eq!(result.checks_passed, 1);
    }

    #[test]
    fn test_required_group_absent() {
        let requirements = Requirements::new().require_group("X");
        let result = validate_structure(&sample_structure(), &requirements);
        assert_eq!(result.status, ValidationStatus::Fail);
        assert_eq!(result.checks_failed, 1);
        assert!(result.messages[0].contains("'X'"));
    }

    #[test]
    fn test_participant_matches_name_or_alias() {
        let requirements = Requirements::new()
            .require_participant("Pay")
            .require_participant("Payment System")
            .require_participant("Ghost");
        let result = validate_structure(&sample_structure(), &requirements);
        assert_eq!(result.checks_passed, 2);
        assert_eq!(result.checks_failed, 1);
        assert_eq!(result.status, ValidationStatus::Fail);
        assert_eq!(result.messages.len(), 3);
    }

    #[test]
    fn test_forbidden_groups() {
        let requirements = Requirements::new()
            .forbid_group("Legacy Flow")
            .forbid_group("Handle Response");
        let result = validate_structure(&sample_structure(), &requirements);
        assert_eq!(result.checks_passed, 1);
        assert_eq!(result.checks_failed, 1);
        assert!(result.messages[1].contains("Forbidden group 'Handle Response' present"));
    }

    #[test]
    fn test_nesting_issues_only_warn_when_enabled() {
        let mut structure = sample_structure();
        structure
            .nesting_issues
            .push(NestingIssue::UnmatchedEnd { line: 3 });

        let requirements = Requirements::new().require_group("Process Request");
        let result = validate_structure(&structure, &requirements);
        assert_eq!(result.status, ValidationStatus::Pass);
        assert!(result.warnings.is_empty());

        let result = validate_structure(&structure, &requirements.report_nesting_issues(true));
        assert_eq!(result.status, ValidationStatus::Warning);
        assert_eq!(result.warnings, vec!["Unmatched end marker at line 4"]);
    }

    #[test]
    fn test_failure_outranks_warning() {
        let mut structure = sample_structure();
        structure.nesting_issues.push(NestingIssue::UnclosedGroup {
            name: "Open".to_string(),
            start_line: 0,
        });
        let requirements = Requirements::new()
            .require_group("Missing")
            .report_nesting_issues(true);
        let result = validate_structure(&structure, &requirements);
        assert_eq!(result.status, ValidationStatus::Fail);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_result_carries_source() {
        let result = validate_structure(&sample_structure(), &Requirements::new());
        assert_eq!(result.source_name(), "test.puml");
    }

    #[test]
    fn test_report_counts() {
        let mut report = ValidationReport::new();
        report.push(ValidationResult::failed(None, "boom"));
        report.push(ValidationResult::skipped(None, "filtered"));
        report.push(validate_structure(
            &sample_structure(),
            &Requirements::new().require_group("Process Request"),
        ));
        assert_eq!(report.total_files, 3);
        assert_eq!(report.files_failed, 1);
        assert_eq!(report.files_skipped, 1);
        assert_eq!(report.files_passed, 1);
        assert!(report.has_failures());
    }

    #[test]
    fn test_status_symbols_and_serialization() {
        assert_eq!(ValidationStatus::Pass.symbol(), "✓");
        assert_eq!(ValidationStatus::Skipped.to_string(), "skipped");
        let json = serde_json::to_string(&ValidationStatus::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }
}
