use engine::{Bitmap, Engine, FontService, PaintRecord, RenderBackend};
use layouter::FontSpec;

/// Backend double that records every call for assertions.
#[derive(Default)]
pub struct RecordingBackend {
    pub viewport: (f32, f32),
    pub uploaded: Vec<String>,
    pub evicted: Vec<String>,
    pub frames: usize,
}

impl RecordingBackend {
    pub fn new(width: f32, height: f32) -> Self {
        Self { viewport: (width, height), ..Self::default() }
    }
}

impl RenderBackend for RecordingBackend {
    fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    fn upload_texture(&mut self, key: &str, _bitmap: Bitmap) {
        self.uploaded.push(key.to_string());
    }

    fn evict_texture(&mut self, key: &str) {
        self.evicted.push(key.to_string());
    }

    fn present(&mut self, _records: &[PaintRecord]) {
        self.frames += 1;
    }
}

/// Fixed-advance font service: half an em per character.
pub struct FixedFonts;

impl FontService for FixedFonts {
    fn measure(&self, font: &FontSpec, text: &str) -> f32 {
        text.chars().count() as f32 * font.size * 0.5
    }

    fn render(&self, _font: &FontSpec, _text: &str) -> Bitmap {
        Bitmap { width: 1, height: 1, pixels: vec![0, 0, 0, 255] }
    }
}

pub fn engine(width: f32, height: f32) -> Engine<RecordingBackend> {
    let _ = env_logger::builder().is_test(true).try_init();
    Engine::new(RecordingBackend::new(width, height), FixedFonts)
}
