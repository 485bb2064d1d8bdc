//! Flexbox layout: main-axis distribution, wrapping, and alignment.
//!
//! Children arrive already sized by the walker; this pass re-derives their
//! main-axis sizes and both-axis positions. Every repositioning goes through
//! offset propagation since state holds absolute coordinates.

use crate::fonts::FontSpec;
use crate::offset;
use crate::passes::{LayoutPass, PassContext, in_flow_children};
use css::{AlignItems, Display, FlexDirection, JustifyContent, LengthContext, StyleMap};
use dom::{Node, NodeId};

pub struct FlexPass;

impl LayoutPass for FlexPass {
    fn name(&self) -> &'static str {
        "flex"
    }

    fn applies(&self, _node: &Node, style: &StyleMap, _ctx: &PassContext<'_>) -> bool {
        style.display() == Display::Flex
    }

    fn apply(&self, node: &Node, ctx: &mut PassContext<'_>) {
        layout_flex_children(node, ctx);
    }
}

#[derive(Clone, Debug)]
struct Item {
    id: NodeId,
    /// Border-box extent along the main axis.
    main: f32,
    min_main: f32,
    cross: f32,
    margin_main: (f32, f32),
    margin_cross: (f32, f32),
    /// Share weight for over-full lines; derived from subtree text length.
    weight: f32,
    cross_is_auto: bool,
}

impl Item {
    fn outer_main(&self) -> f32 {
        self.main + self.margin_main.0 + self.margin_main.1
    }

    fn outer_cross(&self) -> f32 {
        self.cross + self.margin_cross.0 + self.margin_cross.1
    }
}

fn layout_flex_children(node: &Node, ctx: &mut PassContext<'_>) {
    let Some(container) = ctx.state.get(node.id()) else {
        return;
    };
    let content_x = container.content_x();
    let content_y = container.content_y();
    let content_width = container.content_width();
    let content_height = container.content_height();
    let style = ctx.styles.get(node.id()).cloned().unwrap_or_default();
    let direction = style.flex_direction();
    let wrap = style.flex_wrap();
    let justify = style.justify_content();
    let align_items = style.align_items();
    let align_content = style.align_content();

    let main_available = if direction.is_row() { content_width } else { content_height };

    let mut items = collect_items(node, ctx, direction, main_available);
    if items.is_empty() {
        return;
    }

    // Main-axis distribution: when the line overflows, give each child a
    // text-weighted share, never shrinking below its minimum.
    if !wrap {
        distribute_main(&mut items, main_available);
    }

    let mut lines = break_lines(items, main_available, wrap);
    if direction.is_reverse() {
        for line in &mut lines {
            line.reverse();
        }
    }

    // Cross-axis placement of whole lines. The container's cross extent only
    // constrains lines when it is definite; an auto-height row container is
    // still growing to its content at this point.
    let total_cross: f32 = lines.iter().map(|line| line_cross(line)).sum();
    let cross_available = if direction.is_row() { content_height } else { content_width };
    let cross_definite = if direction.is_row() {
        style.contains("height")
    } else {
        style.contains("width") || !container.inline
    };
    let (cross_lead, cross_gap) = if cross_definite {
        spacing(align_content, (cross_available - total_cross).max(0.0), lines.len())
    } else {
        (0.0, 0.0)
    };

    let single_line = lines.len() == 1;
    let mut cross_cursor = cross_lead;
    for line in &lines {
        let mut extent = line_cross(line);
        if single_line && cross_definite && cross_available > extent {
            extent = cross_available;
        }
        place_line(
            line,
            ctx,
            PlaceArgs {
                direction,
                justify,
                align_items,
                main_available,
                line_cross: extent,
                content_x,
                content_y,
                cross_cursor,
            },
        );
        cross_cursor += extent + cross_gap;
    }
}

fn collect_items(
    node: &Node,
    ctx: &PassContext<'_>,
    direction: FlexDirection,
    main_available: f32,
) -> Vec<Item> {
    let mut items = Vec::new();
    for id in in_flow_children(node, ctx.state) {
        let Some(entry) = ctx.state.get(&id) else {
            continue;
        };
        let length_ctx = LengthContext {
            em_px: entry.em,
            root_em_px: ctx.root_em,
            percent_base_px: main_available,
            viewport: ctx.viewport,
        };
        let child_style = ctx.styles.get(&id);
        let (min_prop, cross_prop) = if direction.is_row() {
            ("min-width", "height")
        } else {
            ("min-height", "width")
        };
        let explicit_min = child_style
            .and_then(|style| style.length(min_prop, &length_ctx))
            .unwrap_or(0.0);
        // On the row axis text cannot shrink past its longest word.
        let min_main = if direction.is_row() {
            explicit_min.max(min_content_width(ctx, &id, child_style, entry.em))
        } else {
            explicit_min
        };
        let cross_is_auto = child_style.is_none_or(|style| !style.contains(cross_prop));

        let (main, cross, margin_main, margin_cross) = if direction.is_row() {
            (
                entry.width,
                entry.height,
                (entry.margin.left, entry.margin.right),
                (entry.margin.top, entry.margin.bottom),
            )
        } else {
            (
                entry.height,
                entry.width,
                (entry.margin.top, entry.margin.bottom),
                (entry.margin.left, entry.margin.right),
            )
        };

        let weight = ctx
            .doc
            .find(&id)
            .map(|child| {
                child
                    .descendants()
                    .map(|descendant| descendant.text().chars().count())
                    .sum::<usize>() as f32
            })
            .unwrap_or(0.0)
            .max(1.0);

        items.push(Item {
            id,
            main,
            min_main,
            cross,
            margin_main,
            margin_cross,
            weight,
            cross_is_auto,
        });
    }
    items
}

/// Min-content width of an item's subtree text: its longest whitespace
/// separated word, measured in the item's own font.
fn min_content_width(
    ctx: &PassContext<'_>,
    id: &NodeId,
    style: Option<&StyleMap>,
    em: f32,
) -> f32 {
    let Some(node) = ctx.doc.find(id) else {
        return 0.0;
    };
    let font = FontSpec::from_style(style.unwrap_or(&StyleMap::default()), em);
    node.descendants()
        .flat_map(|descendant| descendant.text().split_whitespace())
        .map(|word| ctx.fonts.measure(&font, word))
        .fold(0.0, f32::max)
}

/// Shrink an over-full line to fit, giving each unfrozen item a share of the
/// available space proportional to its weight. Items whose share would fall
/// below their minimum freeze at that minimum and their deficit is
/// redistributed; a handful of rounds always suffices.
fn distribute_main(items: &mut [Item], main_available: f32) {
    let total: f32 = items.iter().map(Item::outer_main).sum();
    if total <= main_available || main_available <= 0.0 {
        return;
    }
    let margins: f32 = items
        .iter()
        .map(|item| item.margin_main.0 + item.margin_main.1)
        .sum();
    let mut budget = (main_available - margins).max(0.0);
    let mut frozen = vec![false; items.len()];

    for _ in 0..8 {
        let pool_weight: f32 = items
            .iter()
            .zip(&frozen)
            .filter(|(_, is_frozen)| !**is_frozen)
            .map(|(item, _)| item.weight)
            .sum();
        if pool_weight <= 0.0 {
            break;
        }
        let mut any_newly_frozen = false;
        // Freeze decisions compare against the round-start share, so one
        // freeze does not starve the items after it in the same round.
        let round_budget = budget;
        for (index, item) in items.iter_mut().enumerate() {
            if frozen[index] {
                continue;
            }
            let share = round_budget * item.weight / pool_weight;
            if share < item.min_main {
                item.main = item.min_main;
                frozen[index] = true;
                budget = (budget - item.min_main).max(0.0);
                any_newly_frozen = true;
            }
        }
        if !any_newly_frozen {
            let remaining_weight: f32 = items
                .iter()
                .zip(&frozen)
                .filter(|(_, is_frozen)| !**is_frozen)
                .map(|(item, _)| item.weight)
                .sum();
            for (index, item) in items.iter_mut().enumerate() {
                if !frozen[index] && remaining_weight > 0.0 {
                    item.main = (budget * item.weight / remaining_weight).max(0.0);
                }
            }
            break;
        }
    }
}

/// Greedy line breaking by accumulated outer main extent.
fn break_lines(items: Vec<Item>, main_available: f32, wrap: bool) -> Vec<Vec<Item>> {
    if !wrap {
        return vec![items];
    }
    let mut lines: Vec<Vec<Item>> = Vec::new();
    let mut current: Vec<Item> = Vec::new();
    let mut used = 0.0_f32;
    for item in items {
        let extent = item.outer_main();
        if !current.is_empty() && used + extent > main_available {
            lines.push(std::mem::take(&mut current));
            used = 0.0;
        }
        used += extent;
        current.push(item);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn line_cross(line: &[Item]) -> f32 {
    line.iter().map(Item::outer_cross).fold(0.0, f32::max)
}

/// Leading offset and inter-item gap for a distribution keyword. Single-item
/// lines degenerate safely: every denominator is kept at one or above.
fn spacing(mode: JustifyContent, leftover: f32, count: usize) -> (f32, f32) {
    let leftover = leftover.max(0.0);
    match mode {
        JustifyContent::FlexStart => (0.0, 0.0),
        JustifyContent::FlexEnd => (leftover, 0.0),
        JustifyContent::Center => (leftover / 2.0, 0.0),
        JustifyContent::SpaceBetween => (0.0, leftover / count.saturating_sub(1).max(1) as f32),
        JustifyContent::SpaceAround => {
            let gap = leftover / count.max(1) as f32;
            (gap / 2.0, gap)
        }
        JustifyContent::SpaceEvenly => {
            let gap = leftover / (count + 1) as f32;
            (gap, gap)
        }
    }
}

struct PlaceArgs {
    direction: FlexDirection,
    justify: JustifyContent,
    align_items: AlignItems,
    main_available: f32,
    line_cross: f32,
    content_x: f32,
    content_y: f32,
    cross_cursor: f32,
}

fn place_line(line: &[Item], ctx: &mut PassContext<'_>, args: PlaceArgs) {
    let used: f32 = line.iter().map(Item::outer_main).sum();
    let (lead, gap) = spacing(args.justify, args.main_available - used, line.len());

    let mut main_cursor = lead;
    for item in line {
        let stretch = args.align_items == AlignItems::Stretch && item.cross_is_auto;
        let cross_size = if stretch {
            (args.line_cross - item.margin_cross.0 - item.margin_cross.1).max(0.0)
        } else {
            item.cross
        };
        let align_offset = match args.align_items {
            AlignItems::Center => (args.line_cross - item.outer_cross()) / 2.0,
            AlignItems::FlexEnd => args.line_cross - item.outer_cross(),
            AlignItems::FlexStart | AlignItems::Stretch => 0.0,
        }
        .max(0.0);

        let main_pos = main_cursor + item.margin_main.0;
        let cross_pos = args.cross_cursor + align_offset + item.margin_cross.0;
        let (x, y) = if args.direction.is_row() {
            (args.content_x + main_pos, args.content_y + cross_pos)
        } else {
            (args.content_x + cross_pos, args.content_y + main_pos)
        };

        offset::move_to(ctx.doc, ctx.state, &item.id, x, y);
        if let Some(entry) = ctx.state.get_mut(&item.id) {
            if args.direction.is_row() {
                entry.width = item.main;
                entry.height = cross_size;
            } else {
                entry.height = item.main;
                entry.width = cross_size;
            }
        }
        main_cursor += item.outer_main() + gap;
    }
}
