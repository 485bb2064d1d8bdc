//! Cascade resolution for one node.
//!
//! Order: inherited seed, matched rules in sheet order (last write wins),
//! inline style, then structural defaults. Pseudo-element declarations are
//! split into their own mappings, and `:hover`/`:focus` rules that do not
//! match under current flags are evaluated speculatively into a
//! conditional-style cache so flag flips can be assessed without a full
//! re-resolve.

use crate::matcher::{ForcedFlag, Matcher};
use crate::ruledb::RuleDb;
use crate::style::StyleMap;
use dom::{Document, Node};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Properties copied from the parent's resolved style before rule
/// application. `font-*` and `text-*` inherit as families.
static INHERITED_PROPERTIES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "color",
        "cursor",
        "visibility",
        "display",
        "direction",
        "font",
        "line-height",
        "letter-spacing",
        "word-spacing",
        "white-space",
        "list-style",
    ]
    .into_iter()
    .collect()
});

pub fn is_inherited(property: &str) -> bool {
    INHERITED_PROPERTIES.contains(property)
        || property.starts_with("font-")
        || property.starts_with("text-")
}

/// Output of [`resolve`] for one node.
#[derive(Clone, Debug, Default)]
pub struct Resolved {
    /// The currently active cascade result.
    pub style: StyleMap,
    /// Declarations for matched pseudo-elements, keyed by name
    /// (`"before"` / `"after"`).
    pub pseudo: HashMap<String, StyleMap>,
    /// What would additionally apply if an interaction flag flipped, keyed
    /// by `":hover"` / `":focus"`. Invalidated when rules are reloaded.
    pub conditional: HashMap<String, StyleMap>,
}

/// Resolve the full cascade for `node`.
pub fn resolve(
    doc: &Document,
    node: &Node,
    parent_style: Option<&StyleMap>,
    rules: &RuleDb,
) -> Resolved {
    let mut resolved = Resolved::default();

    // 1. Seed with inherited properties from the parent's resolved style.
    if let Some(parent) = parent_style {
        for (property, value) in parent.iter() {
            if is_inherited(property) {
                resolved.style.set(property, value);
            }
        }
    }

    // 2-4. Matched rules in sheet order, with pseudo-element split and
    // speculative flag evaluation.
    let matcher = Matcher::new(doc);
    let hover_matcher = Matcher::with_forced_flag(doc, ForcedFlag::Hover);
    let focus_matcher = Matcher::with_forced_flag(doc, ForcedFlag::Focus);

    for rule in rules.candidates(node) {
        let outcome = matcher.matches(node, &rule.selector);
        if outcome.matched {
            let declarations = rule
                .declarations
                .iter()
                .map(|decl| (decl.name.as_str(), decl.value.as_str()));
            match outcome.pseudo_element {
                Some(name) => resolved
                    .pseudo
                    .entry(name)
                    .or_default()
                    .overlay(declarations),
                None => resolved.style.overlay(declarations),
            }
            continue;
        }

        for (marker, flag_matcher) in [
            (":hover", &hover_matcher),
            (":focus", &focus_matcher),
        ] {
            if !rule.selector.contains(marker) {
                continue;
            }
            let speculative = flag_matcher.matches(node, &rule.selector);
            if speculative.matched && speculative.pseudo_element.is_none() {
                resolved.conditional.entry(marker.to_string()).or_default().overlay(
                    rule.declarations
                        .iter()
                        .map(|decl| (decl.name.as_str(), decl.value.as_str())),
                );
            }
        }
    }

    // 5. Inline style wins last.
    resolved.style.overlay(
        node.inline_style()
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str())),
    );

    // 6. Structural default: z-index stacks one above the parent when the
    // parent carries a concrete value and the node has none of its own.
    if !resolved.style.contains("z-index")
        && let Some(parent) = parent_style
        && let Some(parent_z) = parent.z_index()
    {
        resolved.style.set("z-index", (parent_z + 1).to_string());
    }

    resolved
}
