//! Document tree wrapper with id-based lookup.

use crate::id::NodeId;
use crate::node::{Descendants, Node};

/// An owned node tree addressed by path-derived ids.
///
/// Because every id encodes its own ancestor chain, lookups descend the tree
/// by sibling index in `O(depth)` without any side table.
#[derive(Clone, Debug)]
pub struct Document {
    root: Node,
}

impl Document {
    /// Install `root` as the document root, re-keying the whole tree.
    pub fn new(mut root: Node) -> Self {
        root.rekey_as_root();
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// Find a node by id, descending along the id's encoded path.
    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        let segments = id.path_segments()?;
        let mut current = &self.root;
        for (tag, index) in segments {
            current = current.children().get(index)?;
            if current.tag() != tag {
                return None;
            }
        }
        Some(current)
    }

    /// Mutable variant of [`Document::find`].
    pub fn find_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        let segments = id.path_segments()?;
        let mut current = &mut self.root;
        for (tag, index) in segments {
            current = current.children_mut().get_mut(index)?;
            if current.tag() != tag {
                return None;
            }
        }
        Some(current)
    }

    pub fn parent_of(&self, id: &NodeId) -> Option<&Node> {
        self.find(&id.parent()?)
    }

    /// The node's preceding siblings, nearest first.
    pub fn previous_siblings(&self, id: &NodeId) -> Vec<&Node> {
        let Some(parent) = self.parent_of(id) else {
            return Vec::new();
        };
        let index = id.sibling_index();
        let mut siblings: Vec<&Node> = parent.children()[..index.min(parent.children().len())]
            .iter()
            .collect();
        siblings.reverse();
        siblings
    }

    /// The sibling immediately before the node, if any.
    pub fn previous_sibling(&self, id: &NodeId) -> Option<&Node> {
        let parent = self.parent_of(id)?;
        let index = id.sibling_index();
        index.checked_sub(1).and_then(|i| parent.children().get(i))
    }

    /// 1-based position among siblings, as used by `:nth-child`.
    pub fn nth_position(&self, id: &NodeId) -> usize {
        id.sibling_index() + 1
    }

    /// Number of siblings sharing the node's parent (including the node).
    pub fn sibling_count(&self, id: &NodeId) -> usize {
        self.parent_of(id).map_or(1, |parent| parent.children().len())
    }

    /// Depth-first iterator over every node in the document.
    pub fn iter(&self) -> Descendants<'_> {
        self.root.descendants()
    }

    /// Collect the id of every node currently in the tree. Used after a
    /// layout pass to prune state entries for removed nodes.
    pub fn live_ids(&self) -> std::collections::HashSet<NodeId> {
        self.iter().map(|node| node.id().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Document;
    use crate::node::Node;

    fn sample() -> Document {
        Document::new(
            Node::new("html").with_child(
                Node::new("body")
                    .with_child(Node::new("div").with_attr("id", "first"))
                    .with_child(Node::new("div").with_attr("id", "second"))
                    .with_child(Node::new("p")),
            ),
        )
    }

    #[test]
    fn find_descends_by_encoded_path() {
        let doc = sample();
        let second = doc
            .iter()
            .find(|node| node.attr("id") == Some("second"))
            .expect("second div")
            .id()
            .clone();
        assert_eq!(second.as_str(), "root:body:0:div:1");
        let found = doc.find(&second).expect("lookup");
        assert_eq!(found.attr("id"), Some("second"));
    }

    #[test]
    fn sibling_queries_follow_document_order() {
        let doc = sample();
        let p_id = doc
            .iter()
            .find(|node| node.tag() == "p")
            .expect("p")
            .id()
            .clone();
        assert_eq!(doc.nth_position(&p_id), 3);
        assert_eq!(doc.sibling_count(&p_id), 3);
        let prev = doc.previous_sibling(&p_id).expect("previous");
        assert_eq!(prev.attr("id"), Some("second"));
        let all_prev = doc.previous_siblings(&p_id);
        assert_eq!(all_prev.len(), 2);
        assert_eq!(all_prev[0].attr("id"), Some("second"));
    }
}
