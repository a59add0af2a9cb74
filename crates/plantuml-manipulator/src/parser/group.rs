//! Group block pairing
//!
//! Groups are paired with an explicit stack of open records. A `group` line
//! pushes, an `end` line pops and emits, and every other line inside a group
//! is owned by whichever group is innermost at that moment.

use tracing::trace;

use crate::core::{Group, NestingIssue};

const GROUP_PREFIX: &str = "group ";

/// How a single line affects group nesting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    GroupStart,
    GroupEnd,
    Other,
}

/// True if the trimmed line opens a group (`group ` prefix)
pub fn is_group_start(line: &str) -> bool {
    line.trim().starts_with(GROUP_PREFIX)
}

/// True if the trimmed line is exactly `end` or `end group`
pub fn is_group_end(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed == "end" || trimmed == "end group"
}

/// Count of leading whitespace characters
pub fn indent_level(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Name of the group a start line opens, taken verbatim after `group `
pub fn group_name(line: &str) -> Option<&str> {
    line.trim().strip_prefix(GROUP_PREFIX)
}

pub fn classify(line: &str) -> LineClass {
    if is_group_start(line) {
        LineClass::GroupStart
    } else if is_group_end(line) {
        LineClass::GroupEnd
    } else {
        LineClass::Other
    }
}

#[derive(Debug)]
struct OpenGroup {
    name: String,
    start_line: usize,
    depth: usize,
    indent: usize,
    content: Vec<String>,
}

/// Single-pass group state machine
///
/// Feed every line in order, then call [`GroupTracker::finish`].
#[derive(Debug, Default)]
pub struct GroupTracker {
    stack: Vec<OpenGroup>,
    closed: Vec<Group>,
    issues: Vec<NestingIssue>,
}

impl GroupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of groups currently open
    pub fn open_depth(&self) -> usize {
        self.stack.len()
    }

    /// Process the line at `index`
    pub fn feed(&mut self, index: usize, line: &str) -> LineClass {
        let class = classify(line);
        match class {
            LineClass::GroupStart => {
                let name = group_name(line).unwrap_or_default().to_string();
                let depth = self.open_depth();
                trace!(line = index, name = %name, depth, "Group opened");
                self.stack.push(OpenGroup {
                    name,
                    start_line: index,
                    depth,
                    indent: indent_level(line),
                    content: Vec::new(),
                });
            }
            LineClass::GroupEnd => match self.stack.pop() {
                Some(open) => {
                    trace!(line = index, name = %open.name, "Group closed");
                    self.closed.push(
                        Group::new(open.name, open.start_line, index)
                            .with_content(open.content)
                            .with_depth(open.depth)
                            .with_indent(open.indent),
                    );
                }
                None => {
                    trace!(line = index, "Dropping end marker with no open group");
                    self.issues.push(NestingIssue::UnmatchedEnd { line: index });
                }
            },
            LineClass::Other => {
                if let Some(top) = self.stack.last_mut() {
                    top.content.push(line.to_string());
                }
            }
        }
        class
    }

    /// Closed groups in pop order plus any nesting issues
    ///
    /// Groups still open are not emitted; each becomes an
    /// [`NestingIssue::UnclosedGroup`].
    pub fn finish(mut self) -> (Vec<Group>, Vec<NestingIssue>) {
        for open in self.stack.drain(..) {
            trace!(name = %open.name, start_line = open.start_line, "Dropping unclosed group");
            self.issues.push(NestingIssue::UnclosedGroup {
                name: open.name,
                start_line: open.start_line,
            });
        }
        (self.closed, self.issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(lines: &[&str]) -> (Vec<Group>, Vec<NestingIssue>) {
        let mut tracker = GroupTracker::new();
        for (i, line) in lines.iter().enumerate() {
            tracker.feed(i, line);
        }
        tracker.finish()
    }

    #[test]
    fn test_is_group_start() {
        assert!(is_group_start("group Process Request"));
        assert!(is_group_start("    group Indented"));
        assert!(!is_group_start("end group"));
        assert!(!is_group_start("groups are not groups"));
        assert!(!is_group_start("group"));
        assert!(!is_group_start("User -> System"));
    }

    #[test]
    fn test_is_group_end() {
        assert!(is_group_end("end"));
        assert!(is_group_end("end group"));
        assert!(is_group_end("    end  "));
        assert!(!is_group_end("end note"));
        assert!(!is_group_end("endgroup"));
        assert!(!is_group_end("group Start"));
    }

    #[test]
    fn test_indent_level() {
        assert_eq!(indent_level("no indent"), 0);
        assert_eq!(indent_level("    4 spaces"), 4);
        assert_eq!(indent_level("\t\tgroup"), 2);
    }

    #[test]
    fn test_group_name_keeps_trailing_text() {
        assert_eq!(group_name("  group Retry [max 3]"), Some("Retry [max 3]"));
        assert_eq!(group_name("group  Double"), Some(" Double"));
        assert_eq!(group_name("end"), None);
    }

    #[test]
    fn test_nested_groups_pop_innermost_first() {
        let (groups, issues) = track(&["group A", "group B", "end", "end"]);
        assert!(issues.is_empty());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "B");
        assert_eq!((groups[0].start_line, groups[0].end_line), (1, 2));
        assert_eq!(groups[0].depth, 1);
        assert_eq!(groups[1].name, "A");
        assert_eq!((groups[1].start_line, groups[1].end_line), (0, 3));
        assert_eq!(groups[1].depth, 0);
        assert!(groups[0].content.is_empty());
        assert!(groups[1].content.is_empty());
    }

    #[test]
    fn test_content_belongs_to_innermost_group() {
        let (groups, _) = track(&[
            "group Outer",
            "  A -> B: before",
            "  group Inner",
            "    B -> C: inside",
            "  end",
            "  A -> B: after",
            "end",
        ]);
        let inner = &groups[0];
        let outer = &groups[1];
        assert_eq!(inner.content, vec!["    B -> C: inside"]);
        assert_eq!(outer.content, vec!["  A -> B: before", "  A -> B: after"]);
        assert_eq!(inner.indent, 2);
    }

    #[test]
    fn test_open_depth_follows_markers() {
        let mut tracker = GroupTracker::new();
        let depths: Vec<usize> = ["group A", "group B", "x", "end", "end", "end"]
            .iter()
            .enumerate()
            .map(|(i, line)| {
                tracker.feed(i, line);
                tracker.open_depth()
            })
            .collect();
        assert_eq!(depths, vec![1, 2, 2, 1, 0, 0]);
    }

    #[test]
    fn test_unmatched_end_is_dropped() {
        let (groups, issues) = track(&["end", "group A", "end"]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "A");
        assert_eq!((groups[0].start_line, groups[0].end_line), (1, 2));
        assert_eq!(issues, vec![NestingIssue::UnmatchedEnd { line: 0 }]);
    }

    #[test]
    fn test_unclosed_group_is_dropped() {
        let (groups, issues) = track(&["group A", "group B", "end"]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "B");
        assert_eq!(
            issues,
            vec![NestingIssue::UnclosedGroup {
                name: "A".to_string(),
                start_line: 0
            }]
        );
    }

    #[test]
    fn test_lines_outside_groups_are_not_captured() {
        let (groups, _) = track(&["A -> B", "group G", "x", "end", "B -> A"]);
        assert_eq!(groups[0].content, vec!["x"]);
    }
}
