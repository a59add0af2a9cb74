//! Indented tree view of one diagram

use crate::core::{DiagramStructure, Group};

/// Branch glyphs for tree output
#[derive(Debug, Clone, Copy)]
struct TreeChars {
    branch: &'static str,
    last: &'static str,
    vertical: &'static str,
    blank: &'static str,
}

const TREE: TreeChars = TreeChars {
    branch: "├── ",
    last: "└── ",
    vertical: "│   ",
    blank: "    ",
};

struct Node {
    label: String,
    children: Vec<Node>,
}

impl Node {
    fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    fn render(&self, prefix: &str, is_last: bool, out: &mut Vec<String>) {
        let connector = if is_last { TREE.last } else { TREE.branch };
        out.push(format!("{}{}{}", prefix, connector, self.label));

        let child_prefix = format!("{}{}", prefix, if is_last { TREE.blank } else { TREE.vertical });
        render_children(&self.children, &child_prefix, out);
    }
}

fn render_children(children: &[Node], prefix: &str, out: &mut Vec<String>) {
    for (i, child) in children.iter().enumerate() {
        child.render(prefix, i + 1 == children.len(), out);
    }
}

fn group_label(group: &Group) -> String {
    format!(
        "{} (lines {}-{})",
        group.name,
        group.start_line + 1,
        group.end_line + 1
    )
}

/// Arrange groups by containment, outermost first
fn group_nodes(structure: &DiagramStructure) -> Vec<Node> {
    fn build(groups: &[&Group], index: &mut usize, parent: Option<&Group>) -> Vec<Node> {
        let mut nodes = Vec::new();
        while let Some(group) = groups.get(*index) {
            if let Some(parent) = parent {
                if !parent.contains(group) {
                    break;
                }
            }
            *index += 1;
            let children = build(groups, index, Some(group));
            nodes.push(Node {
                label: group_label(group),
                children,
            });
        }
        nodes
    }

    let ordered = structure.groups_in_source_order();
    let mut index = 0;
    build(&ordered, &mut index, None)
}

fn marker(present: bool) -> &'static str {
    if present {
        "✓"
    } else {
        "✗"
    }
}

/// Render the structure as a tree rooted at the source name
pub fn render_tree(structure: &DiagramStructure) -> String {
    let participants = Node {
        label: format!("Participants ({})", structure.participants.len()),
        children: structure
            .participants
            .iter()
            .map(|p| {
                let mut label = format!("{} as {}", p.name, p.alias);
                if let Some(color) = &p.color {
                    label.push_str(&format!(" #{}", color));
                }
                label.push_str(&format!(" (line {})", p.line_index + 1));
                Node::leaf(label)
            })
            .collect(),
    };

    let groups = Node {
        label: format!("Groups ({})", structure.groups.len()),
        children: group_nodes(structure),
    };

    let mut sections = vec![
        Node::leaf(format!(
            "@startuml {}  @enduml {}",
            marker(structure.has_start_marker),
            marker(structure.has_end_marker)
        )),
        participants,
        groups,
    ];

    if !structure.nesting_issues.is_empty() {
        sections.push(Node {
            label: format!("Nesting issues ({})", structure.nesting_issues.len()),
            children: structure
                .nesting_issues
                .iter()
                .map(|issue| Node::leaf(issue.to_string()))
                .collect(),
        });
    }

    let mut out = vec![format!(
        "{} ({} lines)",
        structure.source_name(),
        structure.line_count()
    )];
    render_children(&sections, "", &mut out);
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::StructureParser;

    #[test]
    fn test_render_nested_groups() {
        let structure = StructureParser::new().parse_str(
            "@startuml\nparticipant \"Web\" as W #blue\ngroup Outer\ngroup Inner\nend\nend\ngroup Next\nend\n@enduml",
        );
        let tree = render_tree(&structure);
        let expected = [
            "<memory> (9 lines)",
            "├── @startuml ✓  @enduml ✓",
            "├── Participants (1)",
            "│   └── Web as W #blue (line 2)",
            "└── Groups (3)",
            "    ├── Outer (lines 3-6)",
            "    │   └── Inner (lines 4-5)",
            "    └── Next (lines 7-8)",
        ]
        .join("\n");
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_nesting_issues_section() {
        let structure = StructureParser::new().parse_str("end");
        let tree = render_tree(&structure);
        assert!(tree.contains("@startuml ✗  @enduml ✗"));
        assert!(tree.ends_with("└── Nesting issues (1)\n    └── Unmatched end marker at line 1"));
    }
}
