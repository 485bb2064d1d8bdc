//! Rule index keyed by base selector token.
//!
//! Rules are bucketed by the rightmost compound's most specific token
//! (id > class > tag > attribute, else universal) so cascade resolution only
//! tests the rules that could possibly apply to a node, instead of every rule
//! against every node.

use crate::matcher::split_rightmost_combinator;
use crate::rule::{Rule, Stylesheet, parse_stylesheet};
use dom::Node;
use std::collections::HashMap;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum BucketKey {
    Id(String),
    Class(String),
    Tag(String),
    Attr(String),
    Universal,
}

#[derive(Clone, Debug, Default)]
pub struct RuleDb {
    entries: Vec<Rule>,
    buckets: HashMap<BucketKey, Vec<usize>>,
    next_order: u32,
}

impl RuleDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `source` and append its rules, continuing the monotonic sheet
    /// order across loads.
    pub fn load_sheet_source(&mut self, source: &str) {
        let sheet = parse_stylesheet(source, self.next_order);
        self.add_sheet(sheet);
    }

    /// Append an already-parsed sheet.
    pub fn add_sheet(&mut self, sheet: Stylesheet) {
        for rule in sheet.rules {
            self.next_order = self.next_order.max(rule.sheet_order.saturating_add(1));
            let index = self.entries.len();
            let key = base_key(&rule.selector);
            self.buckets.entry(key).or_default().push(index);
            self.entries.push(rule);
        }
        log::debug!(
            "rule index: {} rules in {} buckets",
            self.entries.len(),
            self.buckets.len()
        );
    }

    /// Drop every rule. Conditional-style caches derived from this index are
    /// invalidated by the next resolve.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.buckets.clear();
        self.next_order = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The union of bucket entries that could apply to `node`, sheet order
    /// ascending.
    pub fn candidates(&self, node: &Node) -> Vec<&Rule> {
        let mut indices: Vec<usize> = Vec::new();
        let mut push_bucket = |key: &BucketKey| {
            if let Some(bucket) = self.buckets.get(key) {
                indices.extend_from_slice(bucket);
            }
        };
        push_bucket(&BucketKey::Universal);
        push_bucket(&BucketKey::Tag(node.tag().to_ascii_lowercase()));
        if let Some(id) = node.attr("id") {
            push_bucket(&BucketKey::Id(id.to_string()));
        }
        for class in node.classes() {
            push_bucket(&BucketKey::Class(class.clone()));
        }
        for name in node.attrs().keys() {
            push_bucket(&BucketKey::Attr(name.clone()));
        }
        indices.sort_unstable();
        indices.dedup();
        let mut rules: Vec<&Rule> = indices.into_iter().map(|idx| &self.entries[idx]).collect();
        rules.sort_by_key(|rule| rule.sheet_order);
        rules
    }
}

/// Derive the bucket key from a selector's rightmost compound, preferring
/// id > class > tag > attribute. Empty and universal selectors land in the
/// universal fallback bucket.
fn base_key(selector: &str) -> BucketKey {
    let mut compound = selector.trim();
    while let Some((_, _, right)) = split_rightmost_combinator(compound) {
        compound = right;
    }
    // Strip the pseudo chain; the base decides the bucket.
    let mut depth = 0usize;
    let mut base_end = compound.len();
    for (idx, character) in compound.char_indices() {
        match character {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => {
                base_end = idx;
                break;
            }
            _ => {}
        }
    }
    let base = &compound[..base_end];

    if let Some(id) = capture_token(base, '#') {
        return BucketKey::Id(id);
    }
    if let Some(class) = capture_token(base, '.') {
        return BucketKey::Class(class);
    }
    let tag: String = base
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if !tag.is_empty() {
        return BucketKey::Tag(tag.to_ascii_lowercase());
    }
    if let Some(open) = base.find('[') {
        let name: String = base[open + 1..]
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        if !name.is_empty() {
            return BucketKey::Attr(name);
        }
    }
    BucketKey::Universal
}

/// First `marker`-prefixed identifier in a compound, outside brackets.
fn capture_token(base: &str, marker: char) -> Option<String> {
    let mut depth = 0usize;
    let mut chars = base.char_indices().peekable();
    while let Some((idx, character)) = chars.next() {
        match character {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            c if c == marker && depth == 0 => {
                let token: String = base[idx + c.len_utf8()..]
                    .chars()
                    .take_while(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
                    .collect();
                if !token.is_empty() {
                    return Some(token);
                }
            }
            _ => {}
        }
    }
    None
}
