//! Box-model and flow/flex layout: turns a document plus resolved styles into
//! absolutely positioned, sized computed state per node.

pub mod box_model;
pub mod crop;
pub mod flex;
pub mod fonts;
pub mod inline;
pub mod offset;
pub mod passes;
pub mod state;
pub mod text_align;
pub mod walker;

pub use box_model::{BoxMetrics, ContainingBlock, resolve_box};
pub use fonts::{CharcellMetrics, FontMeasure, FontSpec};
pub use passes::{LayoutPass, PASS_ORDER, PassContext, run_passes};
pub use state::{Border, ComputedState, EdgeSizes, Rect, StateMap};
pub use walker::Layouter;
