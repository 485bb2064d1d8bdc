//! Font measurement seam.
//!
//! Layout only needs advance widths; glyph rendering stays behind the render
//! side of the engine. Keys are composite so shaping results cache cleanly.

use css::StyleMap;

/// Composite font identity: every field participates in the cache key.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f32,
    pub weight: u16,
    pub italic: bool,
    pub decoration: Option<String>,
}

impl FontSpec {
    /// Derive the font spec from a computed style and resolved em size.
    pub fn from_style(style: &StyleMap, em: f32) -> Self {
        let weight = match style.get("font-weight") {
            Some("bold") => 700,
            Some(value) => value.trim().parse().unwrap_or(400),
            None => 400,
        };
        Self {
            family: style.get("font-family").unwrap_or("sans-serif").to_string(),
            size: em,
            weight,
            italic: matches!(style.get("font-style"), Some("italic") | Some("oblique")),
            decoration: style.get("text-decoration").map(str::to_string),
        }
    }

    /// Stable cache key for shaped-text bitmaps.
    pub fn cache_key(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            self.family,
            self.size,
            self.weight,
            self.italic,
            self.decoration.as_deref().unwrap_or("none"),
        )
    }
}

/// Text measurement provider. `measure` must be total: unknown fonts fall
/// back to default metrics instead of failing the layout pass.
pub trait FontMeasure {
    fn measure(&self, font: &FontSpec, text: &str) -> f32;

    /// Line height for the font; default is the usual 1.2 multiplier.
    fn line_height(&self, font: &FontSpec) -> f32 {
        font.size * 1.2
    }
}

/// Fixed-advance metrics used in tests and as the missing-font fallback.
#[derive(Clone, Copy, Debug)]
pub struct CharcellMetrics {
    /// Advance per character as a fraction of the font size.
    pub advance_em: f32,
}

impl Default for CharcellMetrics {
    fn default() -> Self {
        Self { advance_em: 0.5 }
    }
}

impl FontMeasure for CharcellMetrics {
    fn measure(&self, font: &FontSpec, text: &str) -> f32 {
        text.chars().count() as f32 * font.size * self.advance_em
    }
}

#[cfg(test)]
mod tests {
    use super::{CharcellMetrics, FontMeasure, FontSpec, StyleMap};

    #[test]
    fn cache_key_covers_every_field() {
        let mut style = StyleMap::new();
        style.set("font-family", "serif");
        style.set("font-weight", "bold");
        style.set("font-style", "italic");
        let spec = FontSpec::from_style(&style, 18.0);
        assert_eq!(spec.cache_key(), "serif:18:700:true:none");
    }

    #[test]
    fn charcell_measures_by_count() {
        let style = StyleMap::new();
        let spec = FontSpec::from_style(&style, 16.0);
        let metrics = CharcellMetrics::default();
        assert_eq!(metrics.measure(&spec, "abcd"), 32.0);
        assert_eq!(metrics.line_height(&spec), 19.2);
    }
}
