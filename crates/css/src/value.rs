//! CSS value parsing and pixel conversion.
//!
//! Length resolution follows the engine's degraded-but-present policy:
//! unparsable values and unknown units convert to `None`, and callers fall
//! back to zero instead of propagating an error.

#[derive(Debug, Clone, PartialEq)]
pub enum Unit {
    Px,
    Em,
    Rem,
    Percent,
    Vw,
    Vh,
    Other(String),
}

impl Unit {
    pub fn from_suffix(unit: &str) -> Self {
        match unit.to_ascii_lowercase().as_str() {
            "px" | "" => Unit::Px,
            "em" => Unit::Em,
            "rem" => Unit::Rem,
            "%" => Unit::Percent,
            "vw" => Unit::Vw,
            "vh" => Unit::Vh,
            other => Unit::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Length {
    pub value: f32,
    pub unit: Unit,
}

/// Context for resolving relative lengths to pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthContext {
    /// The node's own em size, for `em` values.
    pub em_px: f32,
    /// Root em size, for `rem` values.
    pub root_em_px: f32,
    /// Containing-block extent percentages resolve against.
    pub percent_base_px: f32,
    /// Viewport dimensions, for `vw`/`vh`.
    pub viewport: (f32, f32),
}

impl Default for LengthContext {
    fn default() -> Self {
        Self {
            em_px: 16.0,
            root_em_px: 16.0,
            percent_base_px: 0.0,
            viewport: (0.0, 0.0),
        }
    }
}

impl LengthContext {
    /// Same context with a different percentage base (e.g. switching from the
    /// parent's width to its height for vertical properties).
    pub fn with_percent_base(mut self, base: f32) -> Self {
        self.percent_base_px = base;
        self
    }
}

impl Length {
    pub fn to_px(&self, ctx: &LengthContext) -> Option<f32> {
        match &self.unit {
            Unit::Px => Some(self.value),
            Unit::Em => Some(self.value * ctx.em_px),
            Unit::Rem => Some(self.value * ctx.root_em_px),
            Unit::Percent => Some(self.value * ctx.percent_base_px / 100.0),
            Unit::Vw => Some(self.value * ctx.viewport.0 / 100.0),
            Unit::Vh => Some(self.value * ctx.viewport.1 / 100.0),
            Unit::Other(_) => None,
        }
    }
}

/// Parse a single length token (e.g. `12px`, `1.5em`, `50%`).
pub fn parse_length(input: &str) -> Option<Length> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(number) = trimmed.strip_suffix('%') {
        let value: f32 = number.trim().parse().ok()?;
        return Some(Length { value, unit: Unit::Percent });
    }
    let (number_part, unit_part) = split_number_and_unit(trimmed);
    if number_part.is_empty() {
        return None;
    }
    let value: f32 = number_part.parse().ok()?;
    Some(Length { value, unit: Unit::from_suffix(unit_part) })
}

/// Convert a CSS length expression to pixels.
///
/// Accepts bare lengths and `calc()` expressions combining lengths with
/// `+`/`-`. Returns `None` when nothing parsable remains; callers treat that
/// as zero per the engine's error policy.
pub fn convert_to_pixels(input: &str, ctx: &LengthContext) -> Option<f32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(body) = strip_function(trimmed, "calc") {
        return eval_calc(body, ctx);
    }
    parse_length(trimmed)?.to_px(ctx)
}

/// Like [`convert_to_pixels`] but applying the zero fallback directly.
pub fn pixels_or_zero(input: &str, ctx: &LengthContext) -> f32 {
    convert_to_pixels(input, ctx).unwrap_or(0.0)
}

/// Evaluate the body of a `calc()` expression: terms joined by top-level
/// `+` and `-`, each term a length or a nested `calc()`.
fn eval_calc(body: &str, ctx: &LengthContext) -> Option<f32> {
    let mut total = 0.0;
    let mut term = String::new();
    let mut sign = 1.0;
    let mut depth = 0usize;
    let mut chars = body.chars().peekable();
    while let Some(character) = chars.next() {
        match character {
            '(' => {
                depth += 1;
                term.push(character);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                term.push(character);
            }
            '+' | '-' if depth == 0 && !term.trim().is_empty() => {
                // A sign glued to digits (e.g. "-5px" in "10px -5px") is not
                // written in valid calc; require the operator form.
                total += sign * convert_to_pixels(term.trim(), ctx)?;
                term.clear();
                sign = if character == '+' { 1.0 } else { -1.0 };
            }
            _ => term.push(character),
        }
    }
    if term.trim().is_empty() {
        return None;
    }
    total += sign * convert_to_pixels(term.trim(), ctx)?;
    Some(total)
}

/// Strip `name(...)` and return the inner body, if the input is exactly that
/// function call.
pub fn strip_function<'input>(input: &'input str, name: &str) -> Option<&'input str> {
    let rest = input.strip_prefix(name)?.trim_start();
    let rest = rest.strip_prefix('(')?;
    rest.strip_suffix(')')
}

fn split_number_and_unit(input: &str) -> (&str, &str) {
    let bytes = input.as_bytes();
    let mut idx = 0usize;
    if idx < bytes.len() && (bytes[idx] == b'+' || bytes[idx] == b'-') {
        idx += 1;
    }
    let mut has_digits = false;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
        has_digits = true;
    }
    if idx < bytes.len() && bytes[idx] == b'.' {
        idx += 1;
    }
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
        has_digits = true;
    }
    if !has_digits {
        return ("", "");
    }
    let (number, tail) = input.split_at(idx);
    (number, tail.trim())
}

/// Expand a 1..4 value shorthand (margin/padding style) into
/// `[top, right, bottom, left]` component strings.
pub fn expand_sides(value: &str) -> [String; 4] {
    let parts: Vec<&str> = split_value_tokens(value);
    match parts.as_slice() {
        &[all] => [all, all, all, all].map(str::to_string),
        &[vertical, horizontal] => {
            [vertical, horizontal, vertical, horizontal].map(str::to_string)
        }
        &[top, horizontal, bottom] => [top, horizontal, bottom, horizontal].map(str::to_string),
        &[top, right, bottom, left, ..] => [top, right, bottom, left].map(str::to_string),
        &[] => [const { String::new() }; 4],
    }
}

/// Split a value on whitespace, keeping function calls like `calc(a + b)`
/// together as single tokens.
pub fn split_value_tokens(value: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    for (idx, character) in value.char_indices() {
        match character {
            '(' => {
                depth += 1;
                start.get_or_insert(idx);
            }
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(begin) = start.take() {
                    tokens.push(&value[begin..idx]);
                }
            }
            _ => {
                start.get_or_insert(idx);
            }
        }
    }
    if let Some(begin) = start {
        tokens.push(&value[begin..]);
    }
    tokens
}
