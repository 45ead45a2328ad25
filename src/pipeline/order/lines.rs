//! Shared line-scanning machinery for the dialect parsers.
//!
//! Both parsers walk the normalized message as a finite-state machine over a
//! line index: collecting sections (address, items, notes) check the line
//! against the dialect's section-label set *before* consuming it, and a
//! terminator closes the section and re-dispatches the same line without
//! advancing the cursor.

use std::sync::LazyLock;

use regex::Regex;

use super::types::OrderItem;

/// Cursor over the lines of a normalized message. `peek` + explicit `advance`
/// let a collecting section hand the current line back to top-level dispatch
/// without index arithmetic.
pub struct LineCursor<'a> {
    lines: Vec<&'a str>,
    idx: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            idx: 0,
        }
    }

    /// Current line, untrimmed, or `None` past the end.
    pub fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.idx).copied()
    }

    pub fn advance(&mut self) {
        self.idx += 1;
    }

    /// 1-based line number of the current position, for log context.
    pub fn line_number(&self) -> usize {
        self.idx + 1
    }
}

/// Active collection mode of the parser state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    None,
    Address,
    Items,
    Notes,
}

/// Bullet tolerance per dialect. The legacy template only ever circulated
/// with dash/asterisk/numbered lists; the structured template is broadcast
/// with `•` bullets which customers re-type in many glyph variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletSet {
    Basic,
    Full,
}

static BULLET_BASIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[*\-]+|\d{1,2}[.)])\s*").unwrap());

static BULLET_FULL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:[\u{2022}\u{25E6}\u{25AA}\u{2023}\u{00B7}>*\-\u{2013}\u{2014}]+|\d{1,2}[.)])\s*",
    )
    .unwrap()
});

/// Item body: positive count, optional `x`/`*` multiplier glyph, then the
/// item name.
static ITEM_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,4})(?:\s*[x\u{00D7}*]\s*|\s+)(\S.*)$").unwrap());

/// Outcome of testing a line against the item grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemLine {
    /// Recognized `quantity x name` line.
    Item(OrderItem),
    /// Starts with a digit but is not a well-formed item; dropped, not
    /// demoted to a note; malformed counts must not silently become prose.
    MalformedCount,
    /// Does not start with a digit; inside an items section this is a note.
    Prose,
}

/// Strip a leading bullet or list-number prefix.
pub fn strip_bullet(line: &str, bullets: BulletSet) -> &str {
    let pattern = match bullets {
        BulletSet::Basic => &*BULLET_BASIC,
        BulletSet::Full => &*BULLET_FULL,
    };
    match pattern.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

/// Classify a line inside an active items section.
pub fn parse_item_line(line: &str, bullets: BulletSet) -> ItemLine {
    let body = strip_bullet(line, bullets).trim();
    if body.is_empty() {
        return ItemLine::Prose;
    }
    if !body.starts_with(|c: char| c.is_ascii_digit()) {
        return ItemLine::Prose;
    }

    match ITEM_BODY.captures(body) {
        Some(caps) => {
            let quantity: u32 = match caps[1].parse() {
                Ok(q) if q > 0 => q,
                _ => return ItemLine::MalformedCount,
            };
            let name = caps[2].trim().to_string();
            // A bare "2x" with nothing behind it is a malformed count, and so
            // is a "name" that is itself only the multiplier glyph.
            if name.is_empty() || name.chars().all(|c| matches!(c, 'x' | 'X' | '*')) {
                return ItemLine::MalformedCount;
            }
            ItemLine::Item(OrderItem { quantity, name })
        }
        None => ItemLine::MalformedCount,
    }
}

/// Split a `Label: value` line at the first colon, returning the trimmed
/// value. Lines without a colon yield an empty value.
pub fn label_value(line: &str) -> &str {
    match line.split_once(':') {
        Some((_, value)) => value.trim(),
        None => "",
    }
}
