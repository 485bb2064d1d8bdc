//! Cascading style engine: values and units, stylesheet rules, the rule
//! index, selector matching, and per-node cascade resolution.

mod cascade;
mod matcher;
mod rule;
mod ruledb;
mod style;
mod value;

pub use cascade::{Resolved, is_inherited, resolve};
pub use matcher::{ForcedFlag, MatchOutcome, Matcher};
pub use rule::{Declaration, Rule, Stylesheet, parse_declarations, parse_stylesheet};
pub use ruledb::{BucketKey, RuleDb};
pub use style::{
    AlignItems, BorderSide, BorderStyle, Display, FlexDirection, JustifyContent, Overflow,
    Position, Rgba, StyleMap, TextAlign, parse_color,
};
pub use value::{
    Length, LengthContext, Unit, convert_to_pixels, expand_sides, parse_length, pixels_or_zero,
    split_value_tokens, strip_function,
};
