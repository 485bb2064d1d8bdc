//! Per-node layout output and the session-owned state arena.
//!
//! Every pass mutates entries of the shared id-keyed mapping in place;
//! cross-references between nodes always go through ids, never pointers.

use css::BorderSide;
use dom::NodeId;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Rect {
            x,
            y,
            width: (right - x).max(0.0),
            height: (bottom - y).max(0.0),
        }
    }

    /// Smallest rect covering both, treating zero-area rects as empty.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.width <= 0.0 && self.height <= 0.0 {
            return *other;
        }
        if other.width <= 0.0 && other.height <= 0.0 {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeSizes {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl EdgeSizes {
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Resolved border: one side record per edge plus corner radii in
/// top-left, top-right, bottom-right, bottom-left order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Border {
    pub top: BorderSide,
    pub right: BorderSide,
    pub bottom: BorderSide,
    pub left: BorderSide,
    pub radii: [f32; 4],
}

/// The layout output for one node, rebuilt every pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComputedState {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub z: i32,
    pub margin: EdgeSizes,
    pub padding: EdgeSizes,
    pub border: Border,
    /// The node's em size, for descendant-relative units and baselines.
    pub em: f32,
    pub scroll_width: f32,
    pub scroll_height: f32,
    /// Clip rectangle imposed by an overflow ancestor, if any.
    pub crop: Option<Rect>,
    /// Not painted (display:none subtree roots, non-rendering tags).
    pub hidden: bool,
    /// `position: relative | absolute`; anchor for absolute descendants.
    pub positioned: bool,
    /// Out of normal flow.
    pub absolute: bool,
    /// Participates in inline flow.
    pub inline: bool,
    /// Bitmap cache keys owned by this entry; released when pruned.
    pub texture_keys: Vec<String>,
}

impl ComputedState {
    pub fn border_box(&self) -> Rect {
        Rect { x: self.x, y: self.y, width: self.width, height: self.height }
    }

    pub fn content_x(&self) -> f32 {
        self.x + self.padding.left
    }

    pub fn content_y(&self) -> f32 {
        self.y + self.padding.top
    }

    pub fn content_width(&self) -> f32 {
        (self.width - self.padding.horizontal()).max(0.0)
    }

    pub fn content_height(&self) -> f32 {
        (self.height - self.padding.vertical()).max(0.0)
    }
}

/// Id-keyed arena of [`ComputedState`], owned by the layout session.
#[derive(Debug, Default)]
pub struct StateMap {
    entries: HashMap<NodeId, ComputedState>,
}

impl StateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &NodeId) -> Option<&ComputedState> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &NodeId) -> Option<&mut ComputedState> {
        self.entries.get_mut(id)
    }

    pub fn insert(&mut self, id: NodeId, state: ComputedState) {
        let _previous = self.entries.insert(id, state);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &ComputedState)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove entries whose ids are no longer present in the tree, handing
    /// each removed entry's texture keys to `release` exactly once.
    pub fn prune(&mut self, live: &HashSet<NodeId>, mut release: impl FnMut(&str)) {
        let stale: Vec<NodeId> = self
            .entries
            .keys()
            .filter(|id| !live.contains(*id))
            .cloned()
            .collect();
        for id in stale {
            if let Some(removed) = self.entries.remove(&id) {
                for key in &removed.texture_keys {
                    release(key);
                }
                log::trace!("pruned layout state for {id}");
            }
        }
    }
}
