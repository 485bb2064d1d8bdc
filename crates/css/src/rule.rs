//! Stylesheet rules and the source parser.

use crate::matcher::split_top_level;
use smallvec::SmallVec;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
}

/// One selector with its declaration block. Comma lists are flattened at
/// parse time, one `Rule` per branch, all sharing the block's sheet order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub selector: String,
    pub declarations: SmallVec<[Declaration; 8]>,
    /// Monotonic counter assigned at stylesheet-load time. The cascade
    /// tie-break is "higher sheet order wins"; there is no specificity
    /// weighting by selector complexity.
    pub sheet_order: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    /// Sheet order the next loaded sheet should continue from.
    pub fn next_order(&self) -> u32 {
        self.rules
            .last()
            .map_or(0, |rule| rule.sheet_order.saturating_add(1))
    }
}

/// Parse stylesheet source into rules, assigning sheet orders starting at
/// `base_order`. At-rules and malformed blocks are skipped, never errors.
pub fn parse_stylesheet(source: &str, base_order: u32) -> Stylesheet {
    let source = strip_comments(source);
    let mut sheet = Stylesheet::default();
    let mut order = base_order;
    let mut rest = source.as_str();

    while let Some(open) = rest.find('{') {
        let selector_text = rest[..open].trim();
        let body_rest = &rest[open + 1..];
        let Some(close) = find_block_end(body_rest) else {
            break;
        };
        let body = &body_rest[..close];
        rest = &body_rest[close + 1..];

        if selector_text.starts_with('@') {
            // Conditional group rules are out of scope; drop the whole block.
            log::debug!("skipping at-rule block: {selector_text}");
            continue;
        }

        let declarations = parse_declarations(body);
        if declarations.is_empty() {
            continue;
        }
        for branch in split_top_level(selector_text, ',') {
            let branch = branch.trim();
            if branch.is_empty() {
                continue;
            }
            sheet.rules.push(Rule {
                selector: branch.to_string(),
                declarations: declarations.clone(),
                sheet_order: order,
            });
        }
        order = order.saturating_add(1);
    }
    sheet
}

/// Parse a declaration block body into `(name, value)` pairs.
/// Fragments without a colon are dropped.
pub fn parse_declarations(body: &str) -> SmallVec<[Declaration; 8]> {
    body.split(';')
        .filter_map(|fragment| {
            let (name, value) = fragment.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            if name.is_empty() || value.is_empty() {
                None
            } else {
                Some(Declaration { name, value })
            }
        })
        .collect()
}

/// Index of the `}` closing the block whose `{` was consumed, tolerating
/// nested braces from skipped at-rule bodies.
fn find_block_end(input: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (idx, character) in input.char_indices() {
        match character {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}
