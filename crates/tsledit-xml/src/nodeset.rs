#![forbid(unsafe_code)]

//! NodeSet type for XML canonicalization and transforms.
//!
//! A `NodeSet` represents a set of nodes from a parsed document, identified
//! by their `NodeId`.  Reference resolution produces one, the enveloped
//! signature transform shrinks it, and canonicalization renders it.

use std::collections::HashSet;

/// A set of XML document nodes identified by `NodeId`.
#[derive(Debug, Clone, Default)]
pub struct NodeSet {
    nodes: HashSet<usize>,
}

impl NodeSet {
    /// Create an empty node set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node set containing all nodes in the document.
    pub fn all(doc: &roxmltree::Document<'_>) -> Self {
        let nodes = doc.root().descendants().map(node_index).collect();
        Self { nodes }
    }

    /// All nodes except comments. `URI=""` selects this set.
    pub fn all_without_comments(doc: &roxmltree::Document<'_>) -> Self {
        Self::tree_without_comments(doc.root())
    }

    /// Create a node set for a subtree rooted at the given node (without comments).
    pub fn tree_without_comments(root: roxmltree::Node<'_, '_>) -> Self {
        let nodes = root
            .descendants()
            .filter(|n| !n.is_comment())
            .map(node_index)
            .collect();
        Self { nodes }
    }

    /// Check if a node is in this set.
    pub fn contains(&self, node: &roxmltree::Node<'_, '_>) -> bool {
        self.nodes.contains(&node_index(*node))
    }

    pub fn insert(&mut self, node: roxmltree::Node<'_, '_>) {
        self.nodes.insert(node_index(node));
    }

    /// Remove a node and its whole subtree.
    pub fn remove_subtree(&mut self, root: roxmltree::Node<'_, '_>) {
        for node in root.descendants() {
            self.nodes.remove(&node_index(node));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Stable per-document index of a node.
pub fn node_index(node: roxmltree::Node<'_, '_>) -> usize {
    node.id().get_usize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtree_without_comments_skips_comments() {
        let doc = roxmltree::Document::parse("<a><!--c--><b>t</b></a>").unwrap();
        let set = NodeSet::tree_without_comments(doc.root_element());
        // a, b, text
        assert_eq!(set.len(), 3);
        let all = NodeSet::all(&doc);
        // root, a, comment, b, text
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn remove_subtree_drops_descendants() {
        let doc = roxmltree::Document::parse("<a><b><c/></b><d/></a>").unwrap();
        let a = doc.root_element();
        let b = a.first_element_child().unwrap();
        let mut set = NodeSet::tree_without_comments(a);
        set.remove_subtree(b);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&a));
        assert!(!set.contains(&b.first_element_child().unwrap()));
    }
}
