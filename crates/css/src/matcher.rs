//! Selector matching.
//!
//! Selectors are decomposed outside-in: comma alternation first, then the
//! rightmost combinator (`>`, `+`, `~`, descendant space), recursing into the
//! matcher for the reduced left-hand selector, and finally the rightmost
//! compound with its pseudo chain. Malformed selectors degrade to "no match";
//! an empty selector matches everything (the universal fallback bucket).

use dom::{Document, Node};

/// Result of testing one selector against one node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    pub matched: bool,
    /// Set when the match was against `::before` / `::after` rather than the
    /// element itself.
    pub pseudo_element: Option<String>,
}

impl MatchOutcome {
    fn no() -> Self {
        Self::default()
    }

    fn yes() -> Self {
        Self { matched: true, pseudo_element: None }
    }
}

/// Interaction flag forced on during speculative cascade evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForcedFlag {
    Hover,
    Focus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

/// Pure selector predicate over one document.
pub struct Matcher<'doc> {
    doc: &'doc Document,
    force: Option<ForcedFlag>,
}

impl<'doc> Matcher<'doc> {
    pub fn new(doc: &'doc Document) -> Self {
        Self { doc, force: None }
    }

    /// A matcher that evaluates `:hover` / `:focus` as if the flag were set
    /// on every node. Used to build the conditional-style cache.
    pub fn with_forced_flag(doc: &'doc Document, flag: ForcedFlag) -> Self {
        Self { doc, force: Some(flag) }
    }

    /// Test `selector` against `node`.
    pub fn matches(&self, node: &Node, selector: &str) -> MatchOutcome {
        let selector = selector.trim();
        if selector.is_empty() {
            return MatchOutcome::yes();
        }
        for branch in split_top_level(selector, ',') {
            let branch = branch.trim();
            if branch.is_empty() {
                continue;
            }
            let outcome = self.match_complex(node, branch);
            if outcome.matched {
                return outcome;
            }
        }
        MatchOutcome::no()
    }

    fn match_complex(&self, node: &Node, selector: &str) -> MatchOutcome {
        let Some((left, combinator, right)) = split_rightmost_combinator(selector) else {
            return self.match_compound(node, selector);
        };
        if left.is_empty() || right.is_empty() {
            // Dangling combinator; malformed selectors never match.
            return MatchOutcome::no();
        }
        let outcome = self.match_compound(node, right);
        if !outcome.matched {
            return MatchOutcome::no();
        }
        // A combinator referencing a nonexistent parent/sibling at the tree
        // root is "no match", not an error.
        let anchored = match combinator {
            Combinator::Child => self
                .doc
                .parent_of(node.id())
                .is_some_and(|parent| self.match_complex(parent, left).matched),
            Combinator::AdjacentSibling => self
                .doc
                .previous_sibling(node.id())
                .is_some_and(|sibling| self.match_complex(sibling, left).matched),
            Combinator::GeneralSibling => self
                .doc
                .previous_siblings(node.id())
                .iter()
                .any(|sibling| self.match_complex(sibling, left).matched),
            Combinator::Descendant => node.id().ancestors().any(|ancestor_id| {
                self.doc
                    .find(&ancestor_id)
                    .is_some_and(|ancestor| self.match_complex(ancestor, left).matched)
            }),
        };
        if anchored { outcome } else { MatchOutcome::no() }
    }

    /// Match a compound selector (base plus pseudo chain) against a node.
    fn match_compound(&self, node: &Node, compound: &str) -> MatchOutcome {
        let compound = compound.trim();
        let (base, pseudos) = match split_pseudo_chain(compound) {
            Some(parts) => parts,
            None => return MatchOutcome::no(),
        };
        if !self.match_simple(node, base) {
            return MatchOutcome::no();
        }
        let mut pseudo_element = None;
        for pseudo in pseudos {
            if pseudo.is_element {
                match pseudo.name.as_str() {
                    "before" | "after" => pseudo_element = Some(pseudo.name),
                    _ => return MatchOutcome::no(),
                }
            } else if !self.match_pseudo_class(node, &pseudo.name, pseudo.argument.as_deref()) {
                return MatchOutcome::no();
            }
        }
        MatchOutcome { matched: true, pseudo_element }
    }

    /// Match the base part of a compound: tag, `#id`, `.class`, `[attr]`,
    /// `*`, in any combination. An empty base matches.
    fn match_simple(&self, node: &Node, base: &str) -> bool {
        let mut chars = base.chars().peekable();
        while let Some(&character) = chars.peek() {
            match character {
                '*' => {
                    let _ = chars.next();
                }
                '#' => {
                    let _ = chars.next();
                    let wanted = consume_ident(&mut chars);
                    if node.attr("id") != Some(wanted.as_str()) {
                        return false;
                    }
                }
                '.' => {
                    let _ = chars.next();
                    let wanted = consume_ident(&mut chars);
                    if !node.has_class(&wanted) {
                        return false;
                    }
                }
                '[' => {
                    let _ = chars.next();
                    let mut body = String::new();
                    for inner in chars.by_ref() {
                        if inner == ']' {
                            break;
                        }
                        body.push(inner);
                    }
                    if !match_attribute(node, &body) {
                        return false;
                    }
                }
                c if c.is_alphanumeric() || c == '-' || c == '_' => {
                    let tag = consume_ident(&mut chars);
                    if !node.tag().eq_ignore_ascii_case(&tag) {
                        return false;
                    }
                }
                _ => return false,
            }
        }
        true
    }

    fn match_pseudo_class(&self, node: &Node, name: &str, argument: Option<&str>) -> bool {
        match name {
            "hover" => node.flags.hovered || self.force == Some(ForcedFlag::Hover),
            "focus" => node.flags.focused || self.force == Some(ForcedFlag::Focus),
            "checked" => node.flags.checked,
            "disabled" => node.flags.disabled,
            "enabled" => !node.flags.disabled,
            "required" => node.is_required(),
            "first-child" => node.id().sibling_index() == 0,
            "last-child" => {
                node.id().sibling_index() + 1 == self.doc.sibling_count(node.id())
            }
            "not" => match argument.map(str::trim).filter(|arg| !arg.is_empty()) {
                Some(inner) => !self.matches(node, inner).matched,
                None => false,
            },
            "is" | "where" => self.matches(node, argument.unwrap_or("")).matched,
            "has" => self.match_has(node, argument.unwrap_or("")),
            "nth-child" => {
                let Some((step, offset)) = argument.and_then(parse_nth) else {
                    return false;
                };
                nth_matches(step, offset, self.doc.nth_position(node.id()) as i32)
            }
            _ => false,
        }
    }

    /// `:has()` recurses structurally into the subtree. A leading `>` limits
    /// the search to direct children.
    fn match_has(&self, node: &Node, argument: &str) -> bool {
        let argument = argument.trim();
        if argument.is_empty() {
            return false;
        }
        if let Some(rest) = argument.strip_prefix('>') {
            return node
                .children()
                .iter()
                .any(|child| self.matches(child, rest.trim()).matched);
        }
        node.descendants()
            .skip(1)
            .any(|descendant| self.matches(descendant, argument).matched)
    }
}

/// Evaluate `an+b` against a 1-based sibling position.
fn nth_matches(step: i32, offset: i32, position: i32) -> bool {
    if step == 0 {
        return position == offset;
    }
    let difference = position - offset;
    difference % step == 0 && difference / step >= 0
}

/// Parse an `:nth-child` argument: `odd`, `even`, or `an+b` with optional
/// sign and whitespace. `None` for anything malformed.
fn parse_nth(argument: &str) -> Option<(i32, i32)> {
    let normalized: String = argument
        .chars()
        .filter(|character| !character.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    match normalized.as_str() {
        "odd" => return Some((2, 1)),
        "even" => return Some((2, 0)),
        _ => {}
    }
    if let Some(position) = normalized.find('n') {
        let (step_part, offset_part) = normalized.split_at(position);
        let step = match step_part {
            "" | "+" => 1,
            "-" => -1,
            other => other.parse().ok()?,
        };
        let offset = match &offset_part[1..] {
            "" => 0,
            other => other.trim_start_matches('+').parse().ok()?,
        };
        Some((step, offset))
    } else {
        Some((0, normalized.parse().ok()?))
    }
}

/// Match an attribute selector body (`name` or `name=value`, value possibly
/// quoted).
fn match_attribute(node: &Node, body: &str) -> bool {
    let body = body.trim();
    match body.split_once('=') {
        None => node.attr(body).is_some(),
        Some((name, value)) => {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            node.attr(name.trim()) == Some(value)
        }
    }
}

fn consume_ident<I>(chars: &mut std::iter::Peekable<I>) -> String
where
    I: Iterator<Item = char>,
{
    let mut out = String::new();
    while let Some(&character) = chars.peek() {
        if character.is_alphanumeric() || character == '-' || character == '_' {
            out.push(character);
            let _ = chars.next();
        } else {
            break;
        }
    }
    out
}

/// One `:name` / `::name` link of a pseudo chain.
struct PseudoItem {
    name: String,
    argument: Option<String>,
    is_element: bool,
}

/// Split a compound into its base and pseudo chain. `None` when the chain is
/// malformed (unbalanced parentheses, empty pseudo name).
fn split_pseudo_chain(compound: &str) -> Option<(&str, Vec<PseudoItem>)> {
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
    let mut pseudos = Vec::new();
    let mut rest = &compound[base_end..];
    while let Some(stripped) = rest.strip_prefix(':') {
        let (is_element, after) = match stripped.strip_prefix(':') {
            Some(after) => (true, after),
            None => (false, stripped),
        };
        let name_end = after
            .find(|c: char| !(c.is_alphanumeric() || c == '-'))
            .unwrap_or(after.len());
        if name_end == 0 {
            return None;
        }
        let name = after[..name_end].to_ascii_lowercase();
        let mut tail = &after[name_end..];
        let mut argument = None;
        if let Some(arg_rest) = tail.strip_prefix('(') {
            let close = find_balanced_close(arg_rest)?;
            argument = Some(arg_rest[..close].to_string());
            tail = &arg_rest[close + 1..];
        }
        pseudos.push(PseudoItem { name, argument, is_element });
        rest = tail;
    }
    if rest.is_empty() { Some((base, pseudos)) } else { None }
}

/// Index of the `)` closing a parenthesized body whose `(` was consumed.
fn find_balanced_close(input: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (idx, character) in input.char_indices() {
        match character {
            '(' => depth += 1,
            ')' => {
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

/// Split on `separator` at parenthesis/bracket depth zero.
pub(crate) fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (idx, character) in input.char_indices() {
        match character {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                pieces.push(&input[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&input[start..]);
    pieces
}

/// Find the rightmost top-level combinator and split the selector around it.
/// Returns `(left, combinator, right)`, or `None` for a plain compound.
pub(crate) fn split_rightmost_combinator(selector: &str) -> Option<(&str, Combinator, &str)> {
    let bytes = selector.as_bytes();
    let mut depth = 0usize;
    let mut found: Option<(usize, usize, Combinator)> = None;
    let mut idx = 0usize;
    while idx < bytes.len() {
        let byte = bytes[idx];
        match byte {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b'>' | b'+' | b'~' if depth == 0 => {
                let kind = match byte {
                    b'>' => Combinator::Child,
                    b'+' => Combinator::AdjacentSibling,
                    _ => Combinator::GeneralSibling,
                };
                found = Some((idx, idx + 1, kind));
            }
            b' ' | b'\t' if depth == 0 => {
                // A space run is a descendant combinator only when it does
                // not just pad an explicit combinator on either side.
                let run_start = idx;
                while idx + 1 < bytes.len() && (bytes[idx + 1] == b' ' || bytes[idx + 1] == b'\t')
                {
                    idx += 1;
                }
                let next_is_combinator = bytes
                    .get(idx + 1)
                    .is_some_and(|b| matches!(b, b'>' | b'+' | b'~'));
                let prev_is_combinator = run_start
                    .checked_sub(1)
                    .is_some_and(|p| matches!(bytes[p], b'>' | b'+' | b'~'));
                let at_edge = run_start == 0 || idx + 1 == bytes.len();
                if !next_is_combinator && !prev_is_combinator && !at_edge {
                    found = Some((run_start, idx + 1, Combinator::Descendant));
                }
            }
            _ => {}
        }
        idx += 1;
    }
    let (split_start, split_end, combinator) = found?;
    let left = selector[..split_start].trim();
    let right = selector[split_end..].trim();
    Some((left, combinator, right))
}
