//! Working tree over a node set
//!
//! Appending to an existing structure needs two lookups: the children of a
//! node, and the next free code under it. `WbsTree` keeps both current as
//! nodes are pushed and never reorders or renumbers what it was given.

use std::collections::HashMap;

use crate::entities::{WbsCode, WbsNode};

#[derive(Debug, Clone, Default)]
pub struct WbsTree {
    nodes: Vec<WbsNode>,
    by_code: HashMap<WbsCode, usize>,
    children: HashMap<WbsCode, Vec<usize>>,
    max_child: HashMap<WbsCode, u32>,
}

impl WbsTree {
    pub fn from_nodes(nodes: Vec<WbsNode>) -> Self {
        let mut tree = Self::default();
        for node in nodes {
            tree.push(node);
        }
        tree
    }

    /// Append a node; the first node carrying a code wins lookups
    pub fn push(&mut self, node: WbsNode) {
        let i = self.nodes.len();
        self.by_code.entry(node.wbs_code.clone()).or_insert(i);
        if let Some(parent) = &node.parent_wbs_code {
            self.children.entry(parent.clone()).or_default().push(i);
        }
        if let Some(structural_parent) = node.wbs_code.parent() {
            let last = node.wbs_code.last_segment();
            let max = self.max_child.entry(structural_parent).or_insert(0);
            *max = (*max).max(last);
        }
        self.nodes.push(node);
    }

    pub fn contains(&self, code: &WbsCode) -> bool {
        self.by_code.contains_key(code)
    }

    /// Direct children in insertion order
    pub fn children(&self, parent: &WbsCode) -> impl Iterator<Item = &WbsNode> + '_ {
        self.children
            .get(parent)
            .into_iter()
            .flatten()
            .map(|&i| &self.nodes[i])
    }

    pub fn find_child<P>(&self, parent: &WbsCode, predicate: P) -> Option<&WbsNode>
    where
        P: Fn(&WbsNode) -> bool,
    {
        self.children(parent).find(|n| predicate(n))
    }

    /// Next free sibling code under `parent`
    ///
    /// One past the highest final segment of any code directly below
    /// `parent`, or `<parent>.1` when it has none.
    pub fn next_child_code(&self, parent: &WbsCode) -> WbsCode {
        let max = self.max_child.get(parent).copied().unwrap_or(0);
        parent.child(max + 1)
    }

    pub fn into_nodes(self) -> Vec<WbsNode> {
        self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(code: &str, name: &str) -> WbsNode {
        WbsNode::new(WbsCode::parse(code).unwrap(), name)
    }

    fn sample() -> WbsTree {
        WbsTree::from_nodes(vec![
            node("1", "Project"),
            node("1.1", "M | Milestones"),
            node("1.2", "P | Pre-requisites"),
            node("1.3", "S1 | Switchroom"),
            node("1.3.2", "02 | Protection Panels"),
            node("1.3.2.1", "+UH101 | Panel A"),
            node("1.3.2.4", "+UH104 | Panel D"),
        ])
    }

    #[test]
    fn test_next_child_code_uses_max_segment() {
        let tree = sample();
        let cat = WbsCode::parse("1.3.2").unwrap();
        assert_eq!(tree.next_child_code(&cat).to_string(), "1.3.2.5");
        assert_eq!(tree.next_child_code(&WbsCode::root()).to_string(), "1.4");
        let leaf = WbsCode::parse("1.3.2.1").unwrap();
        assert_eq!(tree.next_child_code(&leaf).to_string(), "1.3.2.1.1");
    }

    #[test]
    fn test_push_updates_lookups() {
        let mut tree = sample();
        let cat = WbsCode::parse("1.3.2").unwrap();
        let code = tree.next_child_code(&cat);
        tree.push(WbsNode::new(code.clone(), "+UH105 | Panel E"));
        assert!(tree.contains(&code));
        assert_eq!(tree.next_child_code(&cat).to_string(), "1.3.2.6");
        assert_eq!(tree.children(&cat).count(), 3);
    }

    #[test]
    fn test_find_child() {
        let tree = sample();
        let sub = WbsCode::parse("1.3").unwrap();
        let found = tree.find_child(&sub, |n| n.wbs_name.starts_with("02 |"));
        assert_eq!(found.map(|n| n.wbs_code.to_string()), Some("1.3.2".to_string()));
        assert!(tree.find_child(&sub, |n| n.wbs_name.starts_with("99 |")).is_none());
    }

    #[test]
    fn test_into_nodes_keeps_order() {
        let tree = sample();
        let codes: Vec<String> = tree
            .into_nodes()
            .iter()
            .map(|n| n.wbs_code.to_string())
            .collect();
        assert_eq!(codes[0], "1");
        assert_eq!(codes[6], "1.3.2.4");
    }
}
