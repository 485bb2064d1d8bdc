//! Paint record export: flattening computed state into the ordered tuple list
//! the rendering backend consumes.

use css::Rgba;
use dom::{Document, NodeId};
use layouter::{Border, Layouter, Rect};

/// One paintable box, in absolute coordinates. Records are ordered back to
/// front: ascending z, document order within a z level.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintRecord {
    pub id: NodeId,
    pub rect: Rect,
    pub z: i32,
    pub background: Option<Rgba>,
    pub border: Border,
    pub crop: Option<Rect>,
    /// Bitmap cache keys to composite inside the rect (shaped text).
    pub texture_keys: Vec<String>,
}

/// Collect paint records for every rendered node, sorted for painting.
pub fn build_records(doc: &Document, layouter: &Layouter) -> Vec<PaintRecord> {
    let mut records = Vec::new();
    for node in doc.iter() {
        let Some(entry) = layouter.state().get(node.id()) else {
            continue;
        };
        if entry.hidden {
            continue;
        }
        let background = layouter
            .style_of(node.id())
            .and_then(|style| style.color("background-color"));
        records.push(PaintRecord {
            id: node.id().clone(),
            rect: entry.border_box(),
            z: entry.z,
            background,
            border: entry.border,
            crop: entry.crop,
            texture_keys: entry.texture_keys.clone(),
        });
    }
    // Stable sort keeps document order within one z level.
    records.sort_by_key(|record| record.z);
    records
}
