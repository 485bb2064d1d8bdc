//! External collaborator seams: the rendering backend and the font service.
//!
//! The engine never rasterizes box geometry itself; it uploads bitmaps under
//! string keys and hands the backend an ordered list of paint records.

use layouter::{FontMeasure, FontSpec};

/// A decoded RGBA bitmap produced by the font service.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Capabilities the windowing/GPU side must provide.
pub trait RenderBackend {
    /// Current viewport size in CSS pixels.
    fn viewport(&self) -> (f32, f32);

    /// Upload a bitmap under a cache key; re-uploading the same key is a
    /// no-op for the engine's purposes.
    fn upload_texture(&mut self, key: &str, bitmap: Bitmap);

    /// Release a texture; called exactly once per key when its owning node
    /// leaves the tree.
    fn evict_texture(&mut self, key: &str);

    /// Hand over one frame's paint records, ordered back to front.
    fn present(&mut self, records: &[crate::paint::PaintRecord]);
}

/// Text shaping and measurement, keyed by the composite font spec so results
/// cache cleanly. `measure` must be total: a missing font falls back to
/// default metrics instead of failing the session.
pub trait FontService {
    fn measure(&self, font: &FontSpec, text: &str) -> f32;

    fn line_height(&self, font: &FontSpec) -> f32 {
        font.size * 1.2
    }

    fn render(&self, font: &FontSpec, text: &str) -> Bitmap;
}

/// Adapter exposing a shared [`FontService`] to the layouter's measurement
/// seam. The engine keeps the other handle for glyph rendering.
pub(crate) struct MeasureAdapter(pub std::rc::Rc<dyn FontService>);

impl FontMeasure for MeasureAdapter {
    fn measure(&self, font: &FontSpec, text: &str) -> f32 {
        self.0.measure(font, text)
    }

    fn line_height(&self, font: &FontSpec) -> f32 {
        self.0.line_height(font)
    }
}
