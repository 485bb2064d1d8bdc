//! Path-derived node identity.
//!
//! A node id is the colon-joined chain `parent_id:tag:sibling_index`, so the
//! id itself encodes the full ancestor path. Ancestor lookups (e.g. finding
//! the nearest positioned ancestor during absolute positioning) walk id
//! prefixes instead of chasing parent pointers.

use std::fmt;

/// Root id of every document tree.
pub const ROOT_ID: &str = "root";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    /// The id of the document root.
    pub fn root() -> Self {
        Self(ROOT_ID.to_string())
    }

    /// Derive a child id from its parent id, tag name and sibling index.
    pub fn child_of(parent: &NodeId, tag: &str, index: usize) -> Self {
        Self(format!("{}:{tag}:{index}", parent.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ID
    }

    /// The parent id, obtained by stripping the trailing `:tag:index` pair.
    /// Returns `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        if self.is_root() {
            return None;
        }
        let without_index = self.0.rsplit_once(':')?.0;
        let without_tag = without_index.rsplit_once(':')?.0;
        Some(Self(without_tag.to_string()))
    }

    /// Sibling index encoded in the trailing id segment (0-based).
    /// Unparsable or root ids report index 0.
    pub fn sibling_index(&self) -> usize {
        self.0
            .rsplit_once(':')
            .and_then(|(_, idx)| idx.parse().ok())
            .unwrap_or(0)
    }

    /// Iterate ancestor ids from the immediate parent up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = NodeId> {
        let mut current = self.parent();
        std::iter::from_fn(move || {
            let next = current.take()?;
            current = next.parent();
            Some(next)
        })
    }

    /// Whether `self` lies strictly inside the subtree rooted at `other`.
    pub fn is_descendant_of(&self, other: &NodeId) -> bool {
        self.0.len() > other.0.len()
            && self.0.starts_with(other.0.as_str())
            && self.0.as_bytes()[other.0.len()] == b':'
    }

    /// The `(tag, index)` segment pairs below the root, in document order.
    /// Used by `Document::find` to descend the owned tree directly.
    pub(crate) fn path_segments(&self) -> Option<Vec<(&str, usize)>> {
        if self.is_root() {
            return Some(Vec::new());
        }
        let rest = self.0.strip_prefix("root:")?;
        let mut segments = Vec::new();
        let mut parts = rest.split(':');
        while let Some(tag) = parts.next() {
            let index: usize = parts.next()?.parse().ok()?;
            segments.push((tag, index));
        }
        Some(segments)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}
