//! Tests for logging functionality
//!
//! A global subscriber can only be installed once per process, so these
//! tests only check that initialization never panics.

use plantuml_manipulator::core::logging::{init_logging, LogFormat};
use std::str::FromStr;

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
    assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
    assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
    assert_eq!(LogFormat::from_str("COMPACT").unwrap(), LogFormat::Compact);
    assert!(LogFormat::from_str("invalid").is_err());
}

#[test]
fn test_init_logging_with_levels() {
    let _ = init_logging(Some("trace"), Some("compact"));
    let _ = init_logging(Some("debug"), Some("compact"));
    let _ = init_logging(Some("off"), Some("compact"));
    let _ = init_logging(Some("plantuml_manipulator=debug"), Some("json"));
}

#[test]
fn test_invalid_format_is_rejected() {
    let result = init_logging(Some("info"), Some("yaml"));
    assert!(result.is_err());
}

#[test]
fn test_logging_does_not_change_results() {
    let _ = init_logging(Some("trace"), Some("compact"));
    let structure = plantuml_manipulator::parse_str("group A\nend\nend");
    assert_eq!(structure.groups.len(), 1);
    assert_eq!(structure.nesting_issues.len(), 1);
}
