//! Structure validator - referential integrity over a node set

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::entities::WbsNode;

/// A single structural problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum StructuralIssue {
    /// No node without a parent
    NoRoot,
    /// More than one node without a parent
    MultipleRoots { codes: Vec<String> },
    /// A parent code that no node carries
    DanglingParent { code: String, parent: String },
    /// Two nodes share a code
    DuplicateCode { code: String },
}

impl fmt::Display for StructuralIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralIssue::NoRoot => write!(f, "no root node"),
            StructuralIssue::MultipleRoots { codes } => {
                write!(f, "multiple root nodes: {}", codes.join(", "))
            }
            StructuralIssue::DanglingParent { code, parent } => {
                write!(f, "node {} references missing parent {}", code, parent)
            }
            StructuralIssue::DuplicateCode { code } => write!(f, "duplicate WBS code {}", code),
        }
    }
}

/// Result of validating a node set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub node_count: usize,
    pub issues: Vec<StructuralIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Validate a node set, logging every finding as a warning
pub fn validate(nodes: &[WbsNode]) -> bool {
    let report = validate_report(nodes);
    for issue in &report.issues {
        tracing::warn!(%issue, "structural integrity");
    }
    report.is_valid()
}

/// Collect every structural finding without logging
pub fn validate_report(nodes: &[WbsNode]) -> ValidationReport {
    let mut issues = Vec::new();

    let roots: Vec<String> = nodes
        .iter()
        .filter(|n| n.is_root())
        .map(|n| n.wbs_code.to_string())
        .collect();
    match roots.len() {
        0 => issues.push(StructuralIssue::NoRoot),
        1 => {}
        _ => issues.push(StructuralIssue::MultipleRoots { codes: roots }),
    }

    let mut codes = HashSet::new();
    for node in nodes {
        if !codes.insert(&node.wbs_code) {
            issues.push(StructuralIssue::DuplicateCode {
                code: node.wbs_code.to_string(),
            });
        }
    }

    for node in nodes {
        if let Some(parent) = &node.parent_wbs_code {
            if !codes.contains(parent) {
                issues.push(StructuralIssue::DanglingParent {
                    code: node.wbs_code.to_string(),
                    parent: parent.to_string(),
                });
            }
        }
    }

    ValidationReport {
        node_count: nodes.len(),
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::WbsCode;

    fn node(code: &str, name: &str) -> WbsNode {
        WbsNode::new(WbsCode::parse(code).unwrap(), name)
    }

    #[test]
    fn test_valid_tree() {
        let nodes = vec![
            node("1", "Project"),
            node("1.1", "M | Milestones"),
            node("1.2", "P | Pre-requisites"),
        ];
        assert!(validate(&nodes));
        assert_eq!(validate_report(&nodes).node_count, 3);
    }

    #[test]
    fn test_dangling_parent() {
        let nodes = vec![node("1", "Project"), node("1.4.1", "orphan")];
        assert!(!validate(&nodes));
        let report = validate_report(&nodes);
        assert_eq!(
            report.issues,
            vec![StructuralIssue::DanglingParent {
                code: "1.4.1".to_string(),
                parent: "1.4".to_string()
            }]
        );
    }

    #[test]
    fn test_multiple_roots() {
        let nodes = vec![node("1", "A"), node("2", "B")];
        let report = validate_report(&nodes);
        assert_eq!(
            report.issues,
            vec![StructuralIssue::MultipleRoots {
                codes: vec!["1".to_string(), "2".to_string()]
            }]
        );
    }

    #[test]
    fn test_no_root_and_empty_set() {
        assert!(!validate(&[]));
        assert_eq!(validate_report(&[]).issues, vec![StructuralIssue::NoRoot]);
    }

    #[test]
    fn test_duplicate_code() {
        let nodes = vec![node("1", "A"), node("1.1", "x"), node("1.1", "y")];
        let report = validate_report(&nodes);
        assert_eq!(
            report.issues,
            vec![StructuralIssue::DuplicateCode {
                code: "1.1".to_string()
            }]
        );
    }

    #[test]
    fn test_issue_display() {
        let issue = StructuralIssue::DanglingParent {
            code: "1.4.1".to_string(),
            parent: "1.4".to_string(),
        };
        assert_eq!(issue.to_string(), "node 1.4.1 references missing parent 1.4");
    }
}
