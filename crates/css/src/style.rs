//! The flat computed-style mapping and its typed views.
//!
//! The cascade produces a string-keyed property map (CSS-like extensibility:
//! unknown properties pass through untouched); the fixed property subset the
//! box and flex algorithms consume is read through the typed accessors here.

use crate::value::{LengthContext, convert_to_pixels};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self { red: 0, green: 0, blue: 0, alpha: 0 };
    pub const BLACK: Self = Self { red: 0, green: 0, blue: 0, alpha: 255 };
}

/// Parse any CSS color form (hex, `rgb()`, named). `None` on failure.
pub fn parse_color(value: &str) -> Option<Rgba> {
    let parsed = csscolorparser::parse(value.trim()).ok()?;
    let [red, green, blue, alpha] = parsed.to_rgba8();
    Some(Rgba { red, green, blue, alpha })
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Display {
    #[default]
    Block,
    Inline,
    Flex,
    None,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Auto,
    Scroll,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BorderStyle {
    #[default]
    None,
    Solid,
    Dashed,
    Dotted,
}

impl BorderStyle {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "none" | "hidden" => Some(Self::None),
            "solid" => Some(Self::Solid),
            "dashed" => Some(Self::Dashed),
            "dotted" => Some(Self::Dotted),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlexDirection {
    #[default]
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

impl FlexDirection {
    pub fn is_row(self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, Self::RowReverse | Self::ColumnReverse)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JustifyContent {
    #[default]
    FlexStart,
    FlexEnd,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlignItems {
    #[default]
    FlexStart,
    FlexEnd,
    Center,
    Stretch,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A per-side border as carried in computed state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BorderSide {
    pub width: f32,
    pub style: BorderStyle,
    pub color: Rgba,
}

/// Flat property mapping. Last write wins; values stay strings until a
/// consumer asks for a typed view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleMap {
    properties: HashMap<String, String>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let _previous = self.properties.insert(property.into(), value.into());
    }

    pub fn contains(&self, property: &str) -> bool {
        self.properties.contains_key(property)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Overlay `(property, value)` pairs, last write wins.
    pub fn overlay<'decl>(
        &mut self,
        declarations: impl IntoIterator<Item = (&'decl str, &'decl str)>,
    ) {
        for (property, value) in declarations {
            self.set(property, value);
        }
    }

    // Typed views -----------------------------------------------------------

    pub fn display(&self) -> Display {
        match self.get("display").unwrap_or("") {
            "none" => Display::None,
            "inline" | "inline-block" => Display::Inline,
            "flex" | "inline-flex" => Display::Flex,
            _ => Display::Block,
        }
    }

    pub fn position(&self) -> Position {
        match self.get("position").unwrap_or("") {
            "relative" => Position::Relative,
            "absolute" | "fixed" => Position::Absolute,
            _ => Position::Static,
        }
    }

    pub fn overflow(&self) -> Overflow {
        match self.get("overflow").unwrap_or("") {
            "hidden" => Overflow::Hidden,
            "auto" => Overflow::Auto,
            "scroll" => Overflow::Scroll,
            _ => Overflow::Visible,
        }
    }

    pub fn flex_direction(&self) -> FlexDirection {
        match self.get("flex-direction").unwrap_or("") {
            "row-reverse" => FlexDirection::RowReverse,
            "column" => FlexDirection::Column,
            "column-reverse" => FlexDirection::ColumnReverse,
            _ => FlexDirection::Row,
        }
    }

    pub fn flex_wrap(&self) -> bool {
        matches!(self.get("flex-wrap"), Some("wrap") | Some("wrap-reverse"))
    }

    pub fn justify_content(&self) -> JustifyContent {
        match self.get("justify-content").unwrap_or("") {
            "flex-end" | "end" => JustifyContent::FlexEnd,
            "center" => JustifyContent::Center,
            "space-between" => JustifyContent::SpaceBetween,
            "space-around" => JustifyContent::SpaceAround,
            "space-evenly" => JustifyContent::SpaceEvenly,
            _ => JustifyContent::FlexStart,
        }
    }

    pub fn align_items(&self) -> AlignItems {
        match self.get("align-items").unwrap_or("") {
            "flex-end" | "end" => AlignItems::FlexEnd,
            "center" => AlignItems::Center,
            "stretch" => AlignItems::Stretch,
            _ => AlignItems::FlexStart,
        }
    }

    pub fn align_content(&self) -> JustifyContent {
        match self.get("align-content").unwrap_or("") {
            "flex-end" | "end" => JustifyContent::FlexEnd,
            "center" => JustifyContent::Center,
            "space-between" => JustifyContent::SpaceBetween,
            "space-around" => JustifyContent::SpaceAround,
            "space-evenly" => JustifyContent::SpaceEvenly,
            _ => JustifyContent::FlexStart,
        }
    }

    pub fn text_align(&self) -> TextAlign {
        match self.get("text-align").unwrap_or("") {
            "center" => TextAlign::Center,
            "right" => TextAlign::Right,
            _ => TextAlign::Left,
        }
    }

    /// Resolved z-index; `None` stands for `auto`.
    pub fn z_index(&self) -> Option<i32> {
        self.get("z-index").and_then(|value| value.trim().parse().ok())
    }

    /// Resolve a length-valued property to pixels, `None` when absent or
    /// unparsable.
    pub fn length(&self, property: &str, ctx: &LengthContext) -> Option<f32> {
        convert_to_pixels(self.get(property)?, ctx)
    }

    pub fn color(&self, property: &str) -> Option<Rgba> {
        parse_color(self.get(property)?)
    }

    /// The node's em size: `font-size` resolved against the parent em.
    pub fn em_size(&self, parent_em: f32, root_em: f32) -> f32 {
        let ctx = LengthContext {
            em_px: parent_em,
            root_em_px: root_em,
            percent_base_px: parent_em,
            viewport: (0.0, 0.0),
        };
        self.length("font-size", &ctx).unwrap_or(parent_em)
    }

    /// Parse a `border` / `border-<side>` shorthand: any order of width,
    /// style keyword and color.
    pub fn border_side(&self, property: &str, ctx: &LengthContext) -> Option<BorderSide> {
        let value = self.get(property)?;
        let mut side = BorderSide { width: 0.0, style: BorderStyle::Solid, color: Rgba::BLACK };
        let mut saw_any = false;
        for token in crate::value::split_value_tokens(value) {
            if let Some(style) = BorderStyle::from_keyword(token) {
                side.style = style;
                saw_any = true;
            } else if let Some(width) = convert_to_pixels(token, ctx) {
                side.width = width;
                saw_any = true;
            } else if let Some(color) = parse_color(token) {
                side.color = color;
                saw_any = true;
            }
        }
        if saw_any { Some(side) } else { None }
    }
}

impl FromIterator<(String, String)> for StyleMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self { properties: iter.into_iter().collect() }
    }
}
