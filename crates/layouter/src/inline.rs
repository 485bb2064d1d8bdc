//! Inline re-flow: arranging inline siblings into line boxes.
//!
//! The walker stacks every child vertically; this pass pulls runs of
//! `display: inline` children back onto shared lines, wrapping against the
//! container's content width and bottom-aligning smaller boxes to approximate
//! a shared baseline.

use crate::offset;
use crate::passes::{LayoutPass, PassContext};
use css::StyleMap;
use dom::{Node, NodeId};

pub struct InlinePass;

impl LayoutPass for InlinePass {
    fn name(&self) -> &'static str {
        "inline"
    }

    fn applies(&self, node: &Node, _style: &StyleMap, ctx: &PassContext<'_>) -> bool {
        node.children().iter().any(|child| {
            ctx.state
                .get(child.id())
                .is_some_and(|entry| entry.inline && !entry.hidden && !entry.absolute)
        })
    }

    fn apply(&self, node: &Node, ctx: &mut PassContext<'_>) {
        let Some(container) = ctx.state.get(node.id()) else {
            return;
        };
        let content_x = container.content_x();
        let content_right = content_x + container.content_width();

        // Lines restart wherever a block sibling interrupts the inline run.
        let mut run: Vec<NodeId> = Vec::new();
        for child in node.children() {
            let inline = ctx
                .state
                .get(child.id())
                .is_some_and(|entry| entry.inline && !entry.hidden && !entry.absolute);
            if inline {
                run.push(child.id().clone());
            } else if !run.is_empty() {
                reflow_run(&run, content_x, content_right, ctx);
                run.clear();
            }
        }
        if !run.is_empty() {
            reflow_run(&run, content_x, content_right, ctx);
        }
    }
}

/// Re-flow one uninterrupted run of inline siblings into lines.
fn reflow_run(run: &[NodeId], content_x: f32, content_right: f32, ctx: &mut PassContext<'_>) {
    let Some(first) = run.first().and_then(|id| ctx.state.get(id)) else {
        return;
    };
    let mut cursor_x = content_x;
    let mut line_y = first.y - first.margin.top;
    let mut line: Vec<NodeId> = Vec::new();

    for id in run {
        let Some(entry) = ctx.state.get(id) else {
            continue;
        };
        let outer_width = entry.width + entry.margin.horizontal();
        let (margin_left, margin_top) = (entry.margin.left, entry.margin.top);

        // Wrap when continuing the line would overflow the content box,
        // unless the line is still empty (an oversized item stays put).
        if cursor_x > content_x && cursor_x + outer_width > content_right {
            line_y += finish_line(&line, ctx);
            line.clear();
            cursor_x = content_x;
        }

        offset::move_to(ctx.doc, ctx.state, id, cursor_x + margin_left, line_y + margin_top);
        line.push(id.clone());
        cursor_x += outer_width;
    }
    let _ = finish_line(&line, ctx);
}

/// Bottom-align a completed line's members against the tallest one, shifting
/// shorter boxes down by the height difference. Returns the line height.
fn finish_line(line: &[NodeId], ctx: &mut PassContext<'_>) -> f32 {
    let line_height = line
        .iter()
        .filter_map(|id| ctx.state.get(id))
        .map(|entry| entry.height + entry.margin.vertical())
        .fold(0.0_f32, f32::max);
    for id in line {
        let Some((x, y, drop)) = ctx
            .state
            .get(id)
            .map(|entry| (entry.x, entry.y, line_height - entry.margin.vertical() - entry.height))
        else {
            continue;
        };
        if drop > 0.0 {
            offset::move_to(ctx.doc, ctx.state, id, x, y + drop);
        }
    }
    line_height
}
