//! Box model resolution: one node's size and spacing from its computed
//! style and containing-block context.

use crate::state::EdgeSizes;
use css::{LengthContext, StyleMap, convert_to_pixels, expand_sides};

/// Resolved box metrics, before flow positioning and margin collapsing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxMetrics {
    pub width: f32,
    pub height: f32,
    /// Width was not specified; content may widen it (inline boxes).
    pub width_auto: bool,
    /// Height was not specified; grows to the union of children's bounds.
    pub height_auto: bool,
    pub margin: EdgeSizes,
    pub padding: EdgeSizes,
    pub margin_left_auto: bool,
    pub margin_right_auto: bool,
    pub em: f32,
}

/// Containing-block context for box resolution.
#[derive(Clone, Copy, Debug)]
pub struct ContainingBlock {
    pub width: f32,
    pub height: f32,
    pub em: f32,
    pub root_em: f32,
    pub viewport: (f32, f32),
}

impl ContainingBlock {
    fn length_ctx(&self, em: f32, percent_base: f32) -> LengthContext {
        LengthContext {
            em_px: em,
            root_em_px: self.root_em,
            percent_base_px: percent_base,
            viewport: self.viewport,
        }
    }
}

/// Resolve size and spacing for one node.
///
/// Width and height default to 100% of the containing block when unset and
/// the node is not inline; inline boxes stay content-sized. Unparsable
/// lengths resolve to zero, never errors.
pub fn resolve_box(style: &StyleMap, block: &ContainingBlock, is_inline: bool) -> BoxMetrics {
    let em = style.em_size(block.em, block.root_em);
    let width_ctx = block.length_ctx(em, block.width);
    let height_ctx = block.length_ctx(em, block.height);

    let (padding, _, _) = resolve_edges(style, "padding", &width_ctx);
    let (margin, margin_left_auto, margin_right_auto) = resolve_edges(style, "margin", &width_ctx);

    let specified_width = specified_length(style, "width", &width_ctx);
    let specified_height = specified_length(style, "height", &height_ctx);

    let (mut width, width_auto) = match specified_width {
        Some(width) => (width, false),
        None if is_inline => (0.0, true),
        None => (
            (block.width - margin.horizontal()).max(0.0),
            false,
        ),
    };
    let (mut height, height_auto) = match specified_height {
        Some(height) => (height, false),
        None => (0.0, true),
    };

    width = clamp_axis(style, width, "min-width", "max-width", &width_ctx);
    if !height_auto {
        height = clamp_axis(style, height, "min-height", "max-height", &height_ctx);
    }

    BoxMetrics {
        width: width.max(0.0),
        height: height.max(0.0),
        width_auto,
        height_auto,
        margin,
        padding,
        margin_left_auto,
        margin_right_auto,
        em,
    }
}

/// Apply min/max clamps after base resolution.
pub fn clamp_axis(
    style: &StyleMap,
    base: f32,
    min_prop: &str,
    max_prop: &str,
    ctx: &LengthContext,
) -> f32 {
    let mut value = base;
    if let Some(max) = specified_length(style, max_prop, ctx) {
        value = value.min(max);
    }
    if let Some(min) = specified_length(style, min_prop, ctx) {
        value = value.max(min);
    }
    value
}

/// A length property, `None` when absent, `auto`, or unparsable.
fn specified_length(style: &StyleMap, property: &str, ctx: &LengthContext) -> Option<f32> {
    let raw = style.get(property)?;
    if raw.trim() == "auto" {
        return None;
    }
    convert_to_pixels(raw, ctx)
}

/// Resolve a `margin`/`padding` group: shorthand expansion first, per-side
/// longhands override. Returns the edges plus left/right `auto` flags
/// (margins only; `auto` padding resolves to zero).
fn resolve_edges(style: &StyleMap, group: &str, ctx: &LengthContext) -> (EdgeSizes, bool, bool) {
    let mut raw: [Option<String>; 4] = [None, None, None, None];
    if let Some(shorthand) = style.get(group) {
        raw = expand_sides(shorthand).map(Some);
    }
    for (slot, side) in ["top", "right", "bottom", "left"].iter().enumerate() {
        if let Some(value) = style.get(&format!("{group}-{side}")) {
            raw[slot] = Some(value.to_string());
        }
    }

    let resolve = |value: &Option<String>| -> (f32, bool) {
        match value.as_deref().map(str::trim) {
            None | Some("") => (0.0, false),
            Some("auto") => (0.0, true),
            Some(length) => (convert_to_pixels(length, ctx).unwrap_or(0.0), false),
        }
    };

    let (top, _) = resolve(&raw[0]);
    let (right, right_auto) = resolve(&raw[1]);
    let (bottom, _) = resolve(&raw[2]);
    let (left, left_auto) = resolve(&raw[3]);
    (
        EdgeSizes { top, right, bottom, left },
        left_auto,
        right_auto,
    )
}

#[cfg(test)]
mod tests {
    use super::{ContainingBlock, resolve_box};
    use css::StyleMap;

    fn block() -> ContainingBlock {
        ContainingBlock {
            width: 400.0,
            height: 300.0,
            em: 16.0,
            root_em: 16.0,
            viewport: (800.0, 600.0),
        }
    }

    #[test]
    fn unset_width_fills_containing_block() {
        let style = StyleMap::new();
        let metrics = resolve_box(&style, &block(), false);
        assert_eq!(metrics.width, 400.0);
        assert!(!metrics.width_auto);
        assert!(metrics.height_auto);
        assert_eq!(metrics.height, 0.0);
    }

    #[test]
    fn inline_boxes_stay_content_sized() {
        let style = StyleMap::new();
        let metrics = resolve_box(&style, &block(), true);
        assert_eq!(metrics.width, 0.0);
        assert!(metrics.width_auto);
    }

    #[test]
    fn percentages_resolve_against_containing_block() {
        let mut style = StyleMap::new();
        style.set("width", "50%");
        style.set("height", "10%");
        let metrics = resolve_box(&style, &block(), false);
        assert_eq!(metrics.width, 200.0);
        assert_eq!(metrics.height, 30.0);
    }

    #[test]
    fn min_max_clamp_after_base_resolution() {
        let mut style = StyleMap::new();
        style.set("width", "50%");
        style.set("max-width", "150px");
        let metrics = resolve_box(&style, &block(), false);
        assert_eq!(metrics.width, 150.0);

        style.set("min-width", "180px");
        let metrics = resolve_box(&style, &block(), false);
        assert_eq!(metrics.width, 180.0, "min wins over max");
    }

    #[test]
    fn shorthand_then_longhand_override() {
        let mut style = StyleMap::new();
        style.set("margin", "10px 20px");
        style.set("margin-left", "auto");
        style.set("padding", "5px");
        let metrics = resolve_box(&style, &block(), false);
        assert_eq!(metrics.margin.top, 10.0);
        assert_eq!(metrics.margin.right, 20.0);
        assert_eq!(metrics.margin.left, 0.0);
        assert!(metrics.margin_left_auto);
        assert!(!metrics.margin_right_auto);
        assert_eq!(metrics.padding.top, 5.0);
        assert_eq!(metrics.padding.left, 5.0);
    }

    #[test]
    fn unparsable_lengths_resolve_to_zero() {
        let mut style = StyleMap::new();
        style.set("width", "wat");
        style.set("margin", "nonsense");
        let metrics = resolve_box(&style, &block(), false);
        // "wat" parses to nothing, so width falls back to the default fill.
        assert_eq!(metrics.width, 400.0);
        assert_eq!(metrics.margin.top, 0.0);
    }
}
