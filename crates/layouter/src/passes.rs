//! Selector-gated layout passes, run after a node's subtree has been walked.
//!
//! The execution order is a contract, not an accident: inline re-flow must
//! settle line positions before text alignment measures them, flex replaces
//! both for its own children, and cropping must see final geometry. Passes
//! mutate the shared state map directly and may touch any descendant entry.

use crate::fonts::FontMeasure;
use crate::state::StateMap;
use css::StyleMap;
use dom::{Document, Node, NodeId};
use smallvec::SmallVec;
use std::collections::HashMap;

use crate::crop::CropPass;
use crate::flex::FlexPass;
use crate::inline::InlinePass;
use crate::text_align::TextAlignPass;

/// Shared mutable view handed to each pass.
pub struct PassContext<'a> {
    pub doc: &'a Document,
    pub state: &'a mut StateMap,
    pub styles: &'a HashMap<NodeId, StyleMap>,
    pub fonts: &'a dyn FontMeasure,
    pub viewport: (f32, f32),
    pub root_em: f32,
}

pub trait LayoutPass: Sync {
    fn name(&self) -> &'static str;

    /// Whether the pass wants to adjust this container's children.
    fn applies(&self, node: &Node, style: &StyleMap, ctx: &PassContext<'_>) -> bool;

    fn apply(&self, node: &Node, ctx: &mut PassContext<'_>);
}

/// The fixed pass order: inline, text-align, flex, crop.
pub static PASS_ORDER: &[&dyn LayoutPass] = &[&InlinePass, &TextAlignPass, &FlexPass, &CropPass];

/// Run every applicable pass for `node`, in order.
pub fn run_passes(node: &Node, style: &StyleMap, ctx: &mut PassContext<'_>) {
    for pass in PASS_ORDER {
        if pass.applies(node, style, ctx) {
            log::trace!("pass {} on {}", pass.name(), node.id());
            pass.apply(node, ctx);
        }
    }
}

/// Ids of `node`'s children that take part in flow adjustment: laid out,
/// visible, and not absolutely positioned.
pub(crate) fn in_flow_children(node: &Node, state: &StateMap) -> SmallVec<[NodeId; 8]> {
    node.children()
        .iter()
        .filter(|child| {
            state
                .get(child.id())
                .is_some_and(|entry| !entry.hidden && !entry.absolute)
        })
        .map(|child| child.id().clone())
        .collect()
}
