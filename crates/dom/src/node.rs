//! The document node model.
//!
//! Children are exclusively owned by their parent; the parent back-reference
//! is a plain [`NodeId`], resolved through [`crate::Document`] lookups, so the
//! tree carries no ownership cycles.

use crate::id::NodeId;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Transient interaction state toggled by input handling between layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeFlags {
    pub hovered: bool,
    pub focused: bool,
    pub disabled: bool,
    pub checked: bool,
    /// Set for `contenteditable` nodes; they participate in focus and key input.
    pub editable: bool,
}

/// Origin of a node synthesized by a transform pass rather than the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyntheticKind {
    /// `::before` / `::after` content.
    PseudoElement,
    /// Injected scrollbar track; excluded from scroll extent accumulation.
    ScrollbarTrack,
    /// A run produced by splitting text across lines.
    TextRun,
    /// List item marker.
    ListMarker,
}

#[derive(Clone, Debug)]
pub struct Node {
    id: NodeId,
    tag: String,
    attrs: HashMap<String, String>,
    classes: SmallVec<[String; 4]>,
    inline_style: Vec<(String, String)>,
    text: String,
    children: Vec<Node>,
    parent: Option<NodeId>,
    pub flags: NodeFlags,
    pub scroll_x: f32,
    pub scroll_y: f32,
    synthetic: Option<SyntheticKind>,
}

impl Node {
    /// Create a detached node. It receives a real id when appended to a tree
    /// (or when used as a document root via [`crate::Document::new`]).
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            id: NodeId::root(),
            tag: tag.into().to_ascii_lowercase(),
            attrs: HashMap::new(),
            classes: SmallVec::new(),
            inline_style: Vec::new(),
            text: String::new(),
            children: Vec::new(),
            parent: None,
            flags: NodeFlags::default(),
            scroll_x: 0.0,
            scroll_y: 0.0,
            synthetic: None,
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.append_child(child);
        self
    }

    pub fn with_synthetic(mut self, kind: SyntheticKind) -> Self {
        self.synthetic = Some(kind);
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn parent_id(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    pub fn synthetic(&self) -> Option<SyntheticKind> {
        self.synthetic
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn attrs(&self) -> &HashMap<String, String> {
        &self.attrs
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|candidate| candidate == class)
    }

    /// Inline declarations from the `style` attribute, in source order.
    pub fn inline_style(&self) -> &[(String, String)] {
        &self.inline_style
    }

    /// Set an attribute. `class` and `style` are additionally decomposed into
    /// the class set and the inline declaration list.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "class" => {
                self.classes = value.split_whitespace().map(String::from).collect();
            }
            "style" => {
                self.inline_style = parse_inline_style(value);
            }
            "disabled" => self.flags.disabled = true,
            "checked" => self.flags.checked = true,
            "contenteditable" => self.flags.editable = value != "false",
            _ => {}
        }
        let _previous = self.attrs.insert(name, value.to_string());
    }

    /// Append a child, assigning path-derived ids throughout its subtree.
    pub fn append_child(&mut self, mut child: Node) {
        let index = self.children.len();
        child.rekey(&self.id, index);
        self.children.push(child);
    }

    /// Insert a child at `index`, re-keying it and every later sibling.
    pub fn insert_child(&mut self, index: usize, child: Node) {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
        self.rekey_children_from(index);
    }

    /// Remove and return the child at `index`; later siblings are re-keyed so
    /// ids stay consistent with sibling positions.
    pub fn remove_child(&mut self, index: usize) -> Option<Node> {
        if index >= self.children.len() {
            return None;
        }
        let removed = self.children.remove(index);
        self.rekey_children_from(index);
        Some(removed)
    }

    fn rekey_children_from(&mut self, start: usize) {
        let parent_id = self.id.clone();
        for (offset, child) in self.children[start..].iter_mut().enumerate() {
            child.rekey(&parent_id, start + offset);
        }
    }

    pub(crate) fn rekey(&mut self, parent: &NodeId, index: usize) {
        self.id = NodeId::child_of(parent, &self.tag, index);
        self.parent = Some(parent.clone());
        let own_id = self.id.clone();
        for (child_index, child) in self.children.iter_mut().enumerate() {
            child.rekey(&own_id, child_index);
        }
    }

    pub(crate) fn rekey_as_root(&mut self) {
        self.id = NodeId::root();
        self.parent = None;
        let own_id = self.id.clone();
        for (child_index, child) in self.children.iter_mut().enumerate() {
            child.rekey(&own_id, child_index);
        }
    }

    /// Depth-first iterator over this node and its subtree.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Whether the `required` attribute is present (the `:required` predicate).
    pub fn is_required(&self) -> bool {
        self.attrs.contains_key("required")
    }
}

/// Depth-first traversal over an owned subtree.
pub struct Descendants<'tree> {
    stack: Vec<&'tree Node>,
}

impl<'tree> Iterator for Descendants<'tree> {
    type Item = &'tree Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Decompose a `style` attribute into `(property, value)` pairs.
/// Malformed fragments are skipped rather than erroring.
fn parse_inline_style(source: &str) -> Vec<(String, String)> {
    source
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            if name.is_empty() || value.is_empty() {
                None
            } else {
                Some((name, value))
            }
        })
        .collect()
}
