//! Input events and hit testing.
//!
//! Events mutate node flags and scroll offsets; the return value of
//! [`crate::Engine::apply_input`] tells the caller whether those mutations can
//! change layout, so pointless re-layouts are skipped.

use css::Overflow;
use dom::{Document, Node, NodeId};
use layouter::Layouter;

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    MouseMove { x: f32, y: f32 },
    MouseDown { x: f32, y: f32 },
    MouseUp { x: f32, y: f32 },
    Scroll { x: f32, y: f32, delta_x: f32, delta_y: f32 },
    /// Text input for the focused editable node. A backspace control
    /// character deletes instead of inserting.
    Key { text: String },
}

/// Find the top-most rendered node under a point: highest z wins, document
/// order (deeper/later) breaks ties. Cropped nodes only hit inside their
/// crop rect.
pub fn hit_test(doc: &Document, layouter: &Layouter, x: f32, y: f32) -> Option<NodeId> {
    let mut best: Option<(i32, usize, NodeId)> = None;
    for (order, node) in doc.iter().enumerate() {
        let Some(entry) = layouter.state().get(node.id()) else {
            continue;
        };
        if entry.hidden || !entry.border_box().contains(x, y) {
            continue;
        }
        if let Some(crop) = entry.crop
            && !crop.contains(x, y)
        {
            continue;
        }
        let candidate = (entry.z, order, node.id().clone());
        let better = best
            .as_ref()
            .is_none_or(|(z, ord, _)| (entry.z, order) >= (*z, *ord));
        if better {
            best = Some(candidate);
        }
    }
    best.map(|(_, _, id)| id)
}

/// Whether a node takes keyboard focus on click.
pub(crate) fn is_focusable(node: &Node) -> bool {
    node.flags.editable || matches!(node.tag(), "input" | "textarea" | "button" | "select")
}

pub(crate) fn is_checkbox(node: &Node) -> bool {
    node.tag() == "input" && node.attr("type") == Some("checkbox")
}

/// Walk from `id` upward to the nearest ancestor-or-self that can consume a
/// scroll along the given deltas.
pub(crate) fn scroll_target(
    doc: &Document,
    layouter: &Layouter,
    id: &NodeId,
    delta_x: f32,
    delta_y: f32,
) -> Option<NodeId> {
    let chain = std::iter::once(id.clone()).chain(id.ancestors());
    for candidate in chain {
        let scrollable_style = layouter
            .style_of(&candidate)
            .is_some_and(|style| {
                matches!(style.overflow(), Overflow::Auto | Overflow::Scroll | Overflow::Hidden)
            });
        if !scrollable_style {
            continue;
        }
        let Some(entry) = layouter.state().get(&candidate) else {
            continue;
        };
        let can_x = delta_x != 0.0 && entry.scroll_width > 0.0;
        let can_y = delta_y != 0.0 && entry.scroll_height > 0.0;
        if can_x || can_y {
            return Some(candidate);
        }
    }
    None
}

/// Clamp a scroll offset into `[0, extent]`.
pub(crate) fn clamp_scroll(current: f32, delta: f32, extent: f32) -> f32 {
    (current + delta).clamp(0.0, extent.max(0.0))
}
