//! The recursive layout walker.
//!
//! Depth-first with post-order finalization: resolve style and box, place the
//! node in flow (or against its positioned ancestor), recurse, then grow
//! auto-sized boxes to their children, accumulate scroll extents, and hand the
//! finished subtree to the layout passes.

use crate::box_model::{ContainingBlock, resolve_box};
use crate::fonts::{CharcellMetrics, FontMeasure, FontSpec};
use crate::passes::{PassContext, run_passes};
use crate::state::{Border, ComputedState, StateMap};
use css::{Display, LengthContext, Position, RuleDb, StyleMap, convert_to_pixels, expand_sides};
use dom::{Document, Node, NodeId, SyntheticKind};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Tags that never produce geometry; their subtrees are not visited.
static NON_RENDERING_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["head", "meta", "title", "link", "style", "script", "base"]
        .into_iter()
        .collect()
});

const DEFAULT_ROOT_EM: f32 = 16.0;

/// Block-flow cursor shared by the siblings of one parent.
struct FlowCursor {
    /// Border-box bottom of the previous in-flow sibling, or the parent's
    /// content top before anything has been placed.
    y: f32,
    prev_margin_bottom: f32,
    placed_any: bool,
}

/// The finalized parent context a child is laid out against.
struct ParentContext {
    id: NodeId,
    content_x: f32,
    content_y: f32,
    content_width: f32,
    content_height: f32,
    em: f32,
    z: i32,
    style: StyleMap,
}

/// One layout session: owns the computed-state arena and the per-pass style
/// maps, and re-runs the full walk on demand.
pub struct Layouter {
    state: StateMap,
    styles: HashMap<NodeId, StyleMap>,
    pseudo: HashMap<NodeId, HashMap<String, StyleMap>>,
    conditional: HashMap<NodeId, HashMap<String, StyleMap>>,
    fonts: Box<dyn FontMeasure>,
    viewport: (f32, f32),
    root_em: f32,
}

impl Default for Layouter {
    fn default() -> Self {
        Self::new(Box::new(CharcellMetrics::default()))
    }
}

impl Layouter {
    pub fn new(fonts: Box<dyn FontMeasure>) -> Self {
        Self {
            state: StateMap::new(),
            styles: HashMap::new(),
            pseudo: HashMap::new(),
            conditional: HashMap::new(),
            fonts,
            viewport: (800.0, 600.0),
            root_em: DEFAULT_ROOT_EM,
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = (width, height);
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    pub fn state(&self) -> &StateMap {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut StateMap {
        &mut self.state
    }

    pub fn style_of(&self, id: &NodeId) -> Option<&StyleMap> {
        self.styles.get(id)
    }

    /// Pseudo-element styles (`before` / `after`) resolved for a node.
    pub fn pseudo_of(&self, id: &NodeId) -> Option<&HashMap<String, StyleMap>> {
        self.pseudo.get(id)
    }

    /// Whether a conditional style is cached for an interaction flag
    /// (`":hover"` / `":focus"`) on this node. Input handling uses this to
    /// decide if a flag flip warrants a re-layout.
    pub fn has_conditional(&self, id: &NodeId, flag: &str) -> bool {
        self.conditional
            .get(id)
            .is_some_and(|cached| cached.contains_key(flag))
    }

    /// Run one full layout pass over the document.
    pub fn layout(&mut self, doc: &Document, rules: &RuleDb) {
        log::debug!("layout pass over {} nodes", doc.iter().count());
        self.styles.clear();
        self.pseudo.clear();
        self.conditional.clear();

        let (viewport_width, viewport_height) = self.viewport;
        let root_context = ParentContext {
            id: NodeId::root(),
            content_x: 0.0,
            content_y: 0.0,
            content_width: viewport_width,
            content_height: viewport_height,
            em: self.root_em,
            z: 0,
            style: StyleMap::new(),
        };
        let mut cursor = FlowCursor { y: 0.0, prev_margin_bottom: 0.0, placed_any: false };
        self.walk(doc, rules, doc.root(), &root_context, &mut cursor);
    }

    /// Drop state entries for ids no longer in the tree, releasing their
    /// texture keys through `release` exactly once.
    pub fn prune(&mut self, doc: &Document, release: impl FnMut(&str)) {
        let live = doc.live_ids();
        self.state.prune(&live, release);
        self.styles.retain(|id, _| live.contains(id));
        self.pseudo.retain(|id, _| live.contains(id));
        self.conditional.retain(|id, _| live.contains(id));
    }

    fn walk(
        &mut self,
        doc: &Document,
        rules: &RuleDb,
        node: &Node,
        parent: &ParentContext,
        cursor: &mut FlowCursor,
    ) {
        if NON_RENDERING_TAGS.contains(node.tag()) {
            self.mark_hidden_subtree(node);
            return;
        }

        let resolved = css::resolve(doc, node, Some(&parent.style), rules);
        let style = resolved.style;
        if !resolved.pseudo.is_empty() {
            self.pseudo.insert(node.id().clone(), resolved.pseudo);
        }
        if !resolved.conditional.is_empty() {
            self.conditional.insert(node.id().clone(), resolved.conditional);
        }

        if style.display() == Display::None {
            self.styles.insert(node.id().clone(), style);
            self.mark_hidden_subtree(node);
            return;
        }

        let is_inline = style.display() == Display::Inline;
        let block = ContainingBlock {
            width: parent.content_width,
            height: parent.content_height,
            em: parent.em,
            root_em: self.root_em,
            viewport: self.viewport,
        };
        let mut metrics = resolve_box(&style, &block, is_inline);

        let position = style.position();
        let absolute = position == Position::Absolute;

        // Flow position, with sibling/parent margin collapsing.
        let mut x = parent.content_x + metrics.margin.left;
        let mut y;
        if !absolute && !cursor.placed_any {
            // First in-flow child: its top margin hoists onto the parent.
            if parent.id != *node.id() {
                let child_top = metrics.margin.top;
                if let Some(parent_entry) = self.state.get_mut(&parent.id) {
                    parent_entry.margin.top = parent_entry.margin.top.max(child_top);
                }
                metrics.margin.top = 0.0;
            }
            y = cursor.y;
        } else if !absolute {
            let top = metrics.margin.top;
            let bottom = cursor.prev_margin_bottom;
            let gap = if top >= 0.0 && bottom >= 0.0 {
                (top - bottom).max(0.0)
            } else {
                top + bottom
            };
            y = cursor.y + gap;
        } else {
            y = cursor.y + metrics.margin.top;
        }

        if metrics.margin_left_auto && metrics.margin_right_auto {
            x = parent.content_x + (parent.content_width - metrics.width).max(0.0) / 2.0;
        }

        if absolute {
            (x, y) = self.absolute_position(node.id(), &style, &metrics, (x, y));
        }

        let length_ctx = LengthContext {
            em_px: metrics.em,
            root_em_px: self.root_em,
            percent_base_px: parent.content_width,
            viewport: self.viewport,
        };
        let border = resolve_border(&style, &length_ctx);

        let z = style
            .z_index()
            .unwrap_or(if parent.z > 0 { parent.z + 1 } else { 0 });

        let mut entry = ComputedState {
            x,
            y,
            width: metrics.width,
            height: metrics.height,
            z,
            margin: metrics.margin,
            padding: metrics.padding,
            border,
            em: metrics.em,
            hidden: style.get("visibility") == Some("hidden"),
            positioned: position != Position::Static,
            absolute,
            inline: is_inline,
            ..ComputedState::default()
        };

        // Leaf text sizes itself from font metrics and owns a bitmap key.
        if !node.text().trim().is_empty() && node.children().is_empty() {
            let font = FontSpec::from_style(&style, metrics.em);
            let measured = self.fonts.measure(&font, node.text().trim());
            let line = self.fonts.line_height(&font);
            if metrics.width_auto || measured > entry.width {
                entry.width = measured;
            }
            if metrics.height_auto {
                entry.height = line;
            }
            entry
                .texture_keys
                .push(format!("text:{}:{}", font.cache_key(), node.text().trim()));
        }

        self.state.insert(node.id().clone(), entry);

        // Recurse with this node as the containing block.
        let own_context = {
            let entry = self.state.get(node.id()).cloned().unwrap_or_default();
            ParentContext {
                id: node.id().clone(),
                content_x: entry.content_x(),
                content_y: entry.content_y(),
                content_width: entry.content_width(),
                content_height: entry.content_height(),
                em: entry.em,
                z,
                style: style.clone(),
            }
        };
        let mut child_cursor = FlowCursor {
            y: own_context.content_y,
            prev_margin_bottom: 0.0,
            placed_any: false,
        };
        for child in node.children() {
            self.walk(doc, rules, child, &own_context, &mut child_cursor);
        }

        self.finalize_extents(node, &metrics, (0.0, 0.0));
        self.styles.insert(node.id().clone(), style.clone());

        {
            let mut ctx = PassContext {
                doc,
                state: &mut self.state,
                styles: &self.styles,
                fonts: self.fonts.as_ref(),
                viewport: self.viewport,
                root_em: self.root_em,
            };
            run_passes(node, &style, &mut ctx);
        }

        // Passes may have rearranged children; auto extents are re-derived
        // from the final geometry. The crop pass slid scrolled content, so
        // extents compensate by the scroll offset to stay scroll-invariant.
        self.finalize_extents(node, &metrics, (node.scroll_x, node.scroll_y));

        let entry = self.state.get(node.id()).cloned().unwrap_or_default();
        if !absolute {
            cursor.y = entry.y + entry.height;
            cursor.prev_margin_bottom = entry.margin.bottom;
            cursor.placed_any = true;
        }
    }

    /// Grow auto-sized axes to the union of children and accumulate scroll
    /// extents beyond the own box. Synthetic scrollbar tracks are excluded.
    fn finalize_extents(
        &mut self,
        node: &Node,
        metrics: &crate::box_model::BoxMetrics,
        scroll: (f32, f32),
    ) {
        let Some(own) = self.state.get(node.id()).cloned() else {
            return;
        };
        let mut max_right: f32 = 0.0;
        let mut max_bottom: f32 = 0.0;
        let mut saw_child = false;
        for child in node.children() {
            if child.synthetic() == Some(SyntheticKind::ScrollbarTrack) {
                continue;
            }
            let Some(entry) = self.state.get(child.id()) else {
                continue;
            };
            if entry.absolute || (entry.hidden && entry.width == 0.0 && entry.height == 0.0) {
                continue;
            }
            saw_child = true;
            max_right = max_right.max(entry.x + entry.width + entry.margin.right);
            max_bottom = max_bottom.max(entry.y + entry.height + entry.margin.bottom);
        }
        if !saw_child {
            return;
        }

        let content_right = max_right + scroll.0 - own.content_x();
        let content_bottom = max_bottom + scroll.1 - own.content_y();
        let Some(own) = self.state.get_mut(node.id()) else {
            return;
        };
        if metrics.height_auto {
            own.height = (content_bottom + own.padding.vertical()).max(0.0);
        }
        if metrics.width_auto {
            own.width = own.width.max(content_right + own.padding.horizontal());
        }
        own.scroll_width = (content_right - own.content_width()).max(0.0);
        own.scroll_height = (content_bottom - own.content_height()).max(0.0);
    }

    /// Resolve an absolutely positioned node against its nearest positioned
    /// ancestor, found by walking the id path. Falls back to the static flow
    /// position when no inset property is set, and to the viewport when no
    /// ancestor is positioned.
    fn absolute_position(
        &self,
        id: &NodeId,
        style: &StyleMap,
        metrics: &crate::box_model::BoxMetrics,
        static_position: (f32, f32),
    ) -> (f32, f32) {
        let anchor = id
            .ancestors()
            .find_map(|ancestor| {
                self.state
                    .get(&ancestor)
                    .filter(|entry| entry.positioned)
                    .map(|entry| entry.border_box())
            })
            .unwrap_or(crate::state::Rect {
                x: 0.0,
                y: 0.0,
                width: self.viewport.0,
                height: self.viewport.1,
            });

        let horizontal_ctx = LengthContext {
            em_px: metrics.em,
            root_em_px: self.root_em,
            percent_base_px: anchor.width,
            viewport: self.viewport,
        };
        let vertical_ctx = LengthContext {
            percent_base_px: anchor.height,
            ..horizontal_ctx
        };

        let mut x = static_position.0;
        let mut y = static_position.1;
        if let Some(left) = style.length("left", &horizontal_ctx) {
            x = anchor.x + left + metrics.margin.left;
        } else if let Some(right) = style.length("right", &horizontal_ctx) {
            x = anchor.right() - right - metrics.width - metrics.margin.right;
        }
        if let Some(top) = style.length("top", &vertical_ctx) {
            y = anchor.y + top + metrics.margin.top;
        } else if let Some(bottom) = style.length("bottom", &vertical_ctx) {
            y = anchor.bottom() - bottom - metrics.height - metrics.margin.bottom;
        }
        (x, y)
    }

    /// Record zeroed, hidden entries for a subtree that is not rendered, so
    /// stale geometry from an earlier pass can never be painted.
    fn mark_hidden_subtree(&mut self, node: &Node) {
        for descendant in node.descendants() {
            // Texture keys carry over so they are still released on removal.
            let texture_keys = self
                .state
                .get(descendant.id())
                .map(|entry| entry.texture_keys.clone())
                .unwrap_or_default();
            self.state.insert(
                descendant.id().clone(),
                ComputedState { hidden: true, texture_keys, ..ComputedState::default() },
            );
        }
    }
}

/// Resolve the border record: `border` shorthand first, per-side shorthands
/// override, radii from `border-radius`.
fn resolve_border(style: &StyleMap, ctx: &LengthContext) -> Border {
    let base = style.border_side("border", ctx).unwrap_or_default();
    let side = |property: &str| style.border_side(property, ctx).unwrap_or(base);
    let mut border = Border {
        top: side("border-top"),
        right: side("border-right"),
        bottom: side("border-bottom"),
        left: side("border-left"),
        radii: [0.0; 4],
    };
    if let Some(radius) = style.get("border-radius") {
        let sides = expand_sides(radius);
        for (slot, value) in sides.iter().enumerate() {
            border.radii[slot] = convert_to_pixels(value, ctx).unwrap_or(0.0);
        }
    }
    border
}
