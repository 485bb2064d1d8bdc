//! Text alignment: shifting settled lines by their unused horizontal space.

use crate::offset;
use crate::passes::{LayoutPass, PassContext, in_flow_children};
use css::{StyleMap, TextAlign};
use dom::{Node, NodeId};

pub struct TextAlignPass;

impl LayoutPass for TextAlignPass {
    fn name(&self) -> &'static str {
        "text-align"
    }

    fn applies(&self, _node: &Node, style: &StyleMap, _ctx: &PassContext<'_>) -> bool {
        matches!(style.text_align(), TextAlign::Center | TextAlign::Right)
    }

    fn apply(&self, node: &Node, ctx: &mut PassContext<'_>) {
        let Some(container) = ctx.state.get(node.id()) else {
            return;
        };
        let content_right = container.content_x() + container.content_width();
        let align = ctx
            .styles
            .get(node.id())
            .map(StyleMap::text_align)
            .unwrap_or_default();

        for line in group_lines(node, ctx) {
            let line_right = line
                .iter()
                .filter_map(|id| ctx.state.get(id))
                .map(|entry| entry.x + entry.width + entry.margin.right)
                .fold(f32::MIN, f32::max);
            let unused = content_right - line_right;
            if unused <= 0.0 {
                continue;
            }
            let shift = match align {
                TextAlign::Center => unused / 2.0,
                _ => unused,
            };
            for id in &line {
                if let Some((x, y)) = ctx.state.get(id).map(|entry| (entry.x, entry.y)) {
                    offset::move_to(ctx.doc, ctx.state, id, x + shift, y);
                }
            }
        }
    }
}

/// Group in-flow children into visual lines by shared bottom edge, preserving
/// document order within each line. Inline flow bottom-aligns shorter boxes,
/// so line members share a bottom while their top edges differ.
fn group_lines(node: &Node, ctx: &PassContext<'_>) -> Vec<Vec<NodeId>> {
    let mut lines: Vec<(f32, Vec<NodeId>)> = Vec::new();
    for id in in_flow_children(node, ctx.state) {
        let Some(entry) = ctx.state.get(&id) else {
            continue;
        };
        let bottom = entry.y + entry.height + entry.margin.bottom;
        match lines.iter_mut().find(|(line_bottom, _)| (*line_bottom - bottom).abs() < 0.5) {
            Some((_, members)) => members.push(id),
            None => lines.push((bottom, vec![id])),
        }
    }
    lines.into_iter().map(|(_, members)| members).collect()
}
