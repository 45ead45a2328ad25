//! Parser for the legacy free-form order template (V1).
//!
//! V1 messages use short generic labels ("Nama", "Alamat", "Pesanan") and
//! carry no event, packaging, shipping-method, or fee fields. The state
//! machine mirrors the V2 parser with a smaller label set and the plain
//! bullet vocabulary.

use std::sync::LazyLock;

use regex::Regex;

use super::lines::{label_value, parse_item_line, strip_bullet, BulletSet, ItemLine, LineCursor, Section};
use super::time::normalize_time;
use super::types::DraftOrder;
use super::OrderParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Name,
    Phone,
    Address,
    Date,
    Time,
    ItemsOpen,
    NotesOpen,
}

struct LabelRule {
    regex: Regex,
    kind: FieldKind,
}

fn rule(pattern: &str, kind: FieldKind) -> LabelRule {
    LabelRule {
        regex: Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid label pattern {pattern:?}: {e}")),
        kind,
    }
}

static LABEL_RULES: LazyLock<Vec<LabelRule>> = LazyLock::new(|| {
    vec![
        rule(r"(?i)^\s*nama\s*:", FieldKind::Name),
        rule(r"(?i)^\s*(?:no\.?|nomor)\s*(?:hp|wa|telp(?:on)?)\s*:", FieldKind::Phone),
        rule(r"(?i)^\s*alamat\s*:", FieldKind::Address),
        rule(r"(?i)^\s*tanggal\s*:", FieldKind::Date),
        rule(r"(?i)^\s*(?:jam|waktu)\s*:", FieldKind::Time),
        rule(r"(?i)^\s*pesanan\s*:?", FieldKind::ItemsOpen),
        rule(r"(?i)^\s*catatan\s*:?", FieldKind::NotesOpen),
    ]
});

fn match_label(line: &str) -> Option<FieldKind> {
    LABEL_RULES
        .iter()
        .find(|r| r.regex.is_match(line))
        .map(|r| r.kind)
}

/// Parse a normalized V1 message into a draft order. V1 has no fee field,
/// so the fee source always stays `NOT_PROVIDED` and parsing cannot fail;
/// the `Result` keeps the signature uniform across dialects.
pub fn parse(text: &str) -> Result<DraftOrder, OrderParseError> {
    let mut draft = DraftOrder::new();
    let mut section = Section::None;
    let mut address_lines: Vec<String> = Vec::new();
    let mut cursor = LineCursor::new(text);

    while let Some(raw) = cursor.peek() {
        let line = raw.trim();
        if line.is_empty() {
            cursor.advance();
            continue;
        }

        if section != Section::None && match_label(line).is_some() {
            section = Section::None;
            continue;
        }

        match section {
            Section::Address => {
                address_lines.push(line.to_string());
                cursor.advance();
            }
            Section::Items => {
                match parse_item_line(line, BulletSet::Basic) {
                    ItemLine::Item(item) => draft.items.push(item),
                    ItemLine::MalformedCount => tracing::debug!(
                        line = cursor.line_number(),
                        content = line,
                        "Dropping malformed item line"
                    ),
                    ItemLine::Prose => {
                        draft
                            .notes
                            .push(strip_bullet(line, BulletSet::Basic).trim().to_string());
                    }
                }
                cursor.advance();
            }
            Section::Notes => {
                let note = strip_bullet(line, BulletSet::Basic).trim();
                if !note.is_empty() {
                    draft.notes.push(note.to_string());
                }
                cursor.advance();
            }
            Section::None => {
                match match_label(line) {
                    Some(kind) => apply_label(kind, line, &mut draft, &mut section, &mut address_lines),
                    None => tracing::debug!(
                        line = cursor.line_number(),
                        content = line,
                        "Dropping unrecognized line"
                    ),
                }
                cursor.advance();
            }
        }
    }

    draft.address = address_lines.join("\n");
    super::parser_v2::finish(&mut draft, text);
    Ok(draft)
}

fn apply_label(
    kind: FieldKind,
    line: &str,
    draft: &mut DraftOrder,
    section: &mut Section,
    address_lines: &mut Vec<String>,
) {
    let value = label_value(line);
    match kind {
        FieldKind::Name => draft.customer_name = value.to_string(),
        FieldKind::Phone => draft.phone_number = value.to_string(),
        FieldKind::Address => {
            *section = Section::Address;
            if !value.is_empty() {
                address_lines.push(value.to_string());
            }
        }
        FieldKind::Date => draft.event_date = value.to_string(),
        FieldKind::Time => {
            draft.delivery_time = match normalize_time(value) {
                Ok(canonical) => canonical,
                Err(_) => value.to_string(),
            };
        }
        FieldKind::ItemsOpen => *section = Section::Items,
        FieldKind::NotesOpen => {
            *section = Section::Notes;
            if !value.is_empty() {
                draft.notes.push(value.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::order::types::DeliveryFeeSource;

    const LEGACY_MESSAGE: &str = "\
Nama: Budi
No HP: 08123456789
Alamat: Jl. Kenanga 4
Blok C no 2
Tanggal: 5 Feb
Jam: jam 2 siang
Pesanan:
- 10 x Dawet Small
- 1 x Dawet Large
Catatan: kurangi es";

    #[test]
    fn legacy_message_parses() {
        let draft = parse(LEGACY_MESSAGE).unwrap();
        assert_eq!(draft.customer_name, "Budi");
        assert_eq!(draft.receiver_name, "Budi");
        assert_eq!(draft.phone_number, "08123456789");
        assert_eq!(draft.address, "Jl. Kenanga 4\nBlok C no 2");
        assert_eq!(draft.event_date, "5 Feb");
        assert_eq!(draft.delivery_time, "14:00");
        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.items[1].name, "Dawet Large");
        assert_eq!(draft.notes, vec!["kurangi es".to_string()]);
    }

    #[test]
    fn fee_is_never_touched_by_v1() {
        let draft = parse(LEGACY_MESSAGE).unwrap();
        assert_eq!(draft.delivery_fee, 0);
        assert_eq!(draft.delivery_fee_source, DeliveryFeeSource::NotProvided);
    }

    #[test]
    fn fancy_bullets_are_prose_in_v1() {
        // The V1 bullet set is plain; a "\u{2022}" line is not an item.
        let text = "Pesanan:\n\u{2022} 2 x Dawet Small";
        let draft = parse(text).unwrap();
        assert!(draft.items.is_empty());
        assert_eq!(draft.notes, vec!["\u{2022} 2 x Dawet Small".to_string()]);
    }

    #[test]
    fn unbulleted_items_still_parse() {
        let draft = parse("Pesanan:\n3 x Dawet Medium").unwrap();
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.items[0].quantity, 3);
    }
}
