//! Offset propagation.
//!
//! Computed state stores absolute coordinates, so any pass that repositions a
//! node must shift the whole subtree by the same delta before touching the
//! node's own entry, or descendants desync from their ancestor.

use crate::state::StateMap;
use dom::{Document, NodeId};

/// Shift every strict descendant of `id` by `(dx, dy)`.
pub fn propagate(doc: &Document, state: &mut StateMap, id: &NodeId, dx: f32, dy: f32) {
    if dx == 0.0 && dy == 0.0 {
        return;
    }
    let Some(node) = doc.find(id) else {
        return;
    };
    for descendant in node.descendants().skip(1) {
        if let Some(entry) = state.get_mut(descendant.id()) {
            entry.x += dx;
            entry.y += dy;
            if let Some(crop) = entry.crop.as_mut() {
                crop.x += dx;
                crop.y += dy;
            }
        }
    }
}

/// Move a node to `(new_x, new_y)`, carrying its subtree along.
pub fn move_to(doc: &Document, state: &mut StateMap, id: &NodeId, new_x: f32, new_y: f32) {
    let Some(entry) = state.get(id) else {
        return;
    };
    let dx = new_x - entry.x;
    let dy = new_y - entry.y;
    propagate(doc, state, id, dx, dy);
    if let Some(entry) = state.get_mut(id) {
        entry.x = new_x;
        entry.y = new_y;
    }
}
