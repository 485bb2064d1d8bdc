//! Overflow cropping: clip rectangles and scroll offsets for containers with
//! `overflow: hidden | auto | scroll`.

use crate::offset;
use crate::passes::{LayoutPass, PassContext};
use crate::state::Rect;
use css::{Overflow, StyleMap};
use dom::Node;

pub struct CropPass;

impl LayoutPass for CropPass {
    fn name(&self) -> &'static str {
        "crop"
    }

    fn applies(&self, _node: &Node, style: &StyleMap, _ctx: &PassContext<'_>) -> bool {
        style.overflow() != Overflow::Visible
    }

    fn apply(&self, node: &Node, ctx: &mut PassContext<'_>) {
        let Some(container) = ctx.state.get(node.id()) else {
            return;
        };
        let clip = container.border_box();

        // Shift the content by the scroll position before clipping, so the
        // crop rect stays fixed while children slide under it.
        let (scroll_x, scroll_y) = (node.scroll_x, node.scroll_y);
        if scroll_x != 0.0 || scroll_y != 0.0 {
            for child in node.children() {
                if let Some((x, y)) = ctx.state.get(child.id()).map(|entry| (entry.x, entry.y)) {
                    offset::move_to(ctx.doc, ctx.state, child.id(), x - scroll_x, y - scroll_y);
                }
            }
        }

        for descendant in node.descendants().skip(1) {
            if let Some(entry) = ctx.state.get_mut(descendant.id()) {
                entry.crop = Some(match entry.crop {
                    Some(existing) => existing.intersect(&clip),
                    None => clip,
                });
            }
        }
    }
}

impl CropPass {
    /// Intersection helper exposed for hit testing: a point inside a cropped
    /// node must also fall inside its crop rect.
    pub fn visible_box(entry_box: Rect, crop: Option<Rect>) -> Rect {
        match crop {
            Some(crop) => entry_box.intersect(&crop),
            None => entry_box,
        }
    }
}
