//! Parser for the structured Indonesian order template (V2).
//!
//! The template is a labeled form; customers fill it in-place and frequently
//! mangle it: reordered fields, multi-line addresses, re-typed bullets,
//! fields left on their placeholder text. The parser is a line state machine:
//! top-level label dispatch plus three collecting sections (address, items,
//! notes), where every collecting section checks the line against the label
//! set before consuming it and hands terminator lines back to dispatch
//! without advancing.

use std::sync::LazyLock;

use regex::Regex;

use super::lines::{label_value, parse_item_line, strip_bullet, BulletSet, ItemLine, LineCursor, Section};
use super::time::{extract_time, normalize_time};
use super::types::{DeliveryFeeSource, DraftOrder};
use super::OrderParseError;

/// What a matched label line means to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    CustomerName,
    ReceiverName,
    EventName,
    Phone,
    Address,
    EventDuration,
    EventDate,
    DeliveryTime,
    ItemsOpen,
    Packaging,
    Method,
    Fee,
    NotesOpen,
    Referral,
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

/// Label dispatch table, in priority order. Compound name labels come before
/// the plain "Nama" fallback; the regex crate has no lookahead, so the
/// "Nama" vs "Nama Event"/"Nama Penerima"/"Nama Pemesan" disambiguation is
/// done by ordering instead.
static LABEL_RULES: LazyLock<Vec<LabelRule>> = LazyLock::new(|| {
    vec![
        rule(r"(?i)^\s*nama\s+pemesan\s*:", FieldKind::CustomerName),
        rule(r"(?i)^\s*nama\s+penerima\s*:", FieldKind::ReceiverName),
        rule(r"(?i)^\s*nama\s+event\s*:", FieldKind::EventName),
        rule(r"(?i)^\s*nama\s*:", FieldKind::CustomerName),
        rule(r"(?i)^\s*(?:no\.?|nomor)\s*(?:hp|wa|telp(?:on)?)\s*:", FieldKind::Phone),
        rule(r"(?i)^\s*alamat(?:\s+pengiriman)?\s*:", FieldKind::Address),
        rule(r"(?i)^\s*durasi(?:\s+event)?\s*:", FieldKind::EventDuration),
        rule(r"(?i)^\s*tanggal(?:\s+event)?\s*:", FieldKind::EventDate),
        rule(
            r"(?i)^\s*(?:jam|waktu)\s+(?:pengiriman|kirim)\s*:",
            FieldKind::DeliveryTime,
        ),
        rule(r"(?i)^\s*detail\s+pesanan\s*:?", FieldKind::ItemsOpen),
        rule(r"(?i)^\s*packaging\s+styrofoam\s*:", FieldKind::Packaging),
        rule(r"(?i)^\s*metode\s+pengiriman\s*:", FieldKind::Method),
        rule(r"(?i)^\s*ongkir\s*:", FieldKind::Fee),
        rule(r"(?i)^\s*catatan\s*:?", FieldKind::NotesOpen),
        rule(r"(?i)^\s*tahu\s+.*dari\s+mana", FieldKind::Referral),
    ]
});

/// The shipping-method placeholder menu words. A value still containing the
/// full menu (slash-separated) means the customer never picked one.
const METHOD_MENU_WORDS: [&str; 3] = ["pickup", "grabexpress", "custom"];

fn match_label(line: &str) -> Option<FieldKind> {
    LABEL_RULES
        .iter()
        .find(|r| r.regex.is_match(line))
        .map(|r| r.kind)
}

/// Parse a normalized V2 message into a draft order.
///
/// The only fatal error is a malformed delivery fee; everything else degrades
/// (unrecognized lines are logged and dropped, times fall back to raw text).
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

        // Terminator check before consuming: a label line closes the active
        // section and is re-dispatched as-is.
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
                match parse_item_line(line, BulletSet::Full) {
                    ItemLine::Item(item) => draft.items.push(item),
                    ItemLine::MalformedCount => tracing::debug!(
                        line = cursor.line_number(),
                        content = line,
                        "Dropping malformed item line"
                    ),
                    ItemLine::Prose => {
                        draft
                            .notes
                            .push(strip_bullet(line, BulletSet::Full).trim().to_string());
                    }
                }
                cursor.advance();
            }
            Section::Notes => {
                let note = strip_bullet(line, BulletSet::Full).trim();
                if !note.is_empty() {
                    draft.notes.push(note.to_string());
                }
                cursor.advance();
            }
            Section::None => {
                match match_label(line) {
                    Some(kind) => {
                        apply_label(kind, line, &mut draft, &mut section, &mut address_lines)?;
                    }
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
    finish(&mut draft, text);
    Ok(draft)
}

fn apply_label(
    kind: FieldKind,
    line: &str,
    draft: &mut DraftOrder,
    section: &mut Section,
    address_lines: &mut Vec<String>,
) -> Result<(), OrderParseError> {
    let value = label_value(line);
    match kind {
        FieldKind::CustomerName => draft.customer_name = value.to_string(),
        FieldKind::ReceiverName => draft.receiver_name = value.to_string(),
        FieldKind::EventName => draft.event_name = value.to_string(),
        FieldKind::Phone => draft.phone_number = value.to_string(),
        FieldKind::Address => {
            *section = Section::Address;
            if !value.is_empty() {
                address_lines.push(value.to_string());
            }
        }
        FieldKind::EventDuration => draft.event_duration = value.to_string(),
        FieldKind::EventDate => draft.event_date = value.to_string(),
        FieldKind::DeliveryTime => {
            // Normalize immediately; keep the raw value on failure so the
            // end-of-parse fallback can still improve on it.
            draft.delivery_time = match normalize_time(value) {
                Ok(canonical) => canonical,
                Err(_) => value.to_string(),
            };
        }
        FieldKind::ItemsOpen => *section = Section::Items,
        FieldKind::Packaging => {
            if is_affirmative(value) {
                // Mapped to a synthetic note, not a structured field, so fee
                // computation downstream sees one packaging convention across
                // both dialects.
                draft.notes.push("Packaging Styrofoam: YA".to_string());
            }
        }
        FieldKind::Method => draft.delivery_method = normalize_method(value),
        FieldKind::Fee => {
            let (fee, source) = parse_delivery_fee(value)?;
            draft.delivery_fee = fee;
            draft.delivery_fee_source = source;
        }
        FieldKind::NotesOpen => {
            *section = Section::Notes;
            if !value.is_empty() {
                draft.notes.push(value.to_string());
            }
        }
        FieldKind::Referral => draft.referral_source = value.to_string(),
    }
    Ok(())
}

fn is_affirmative(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "ya" | "iya" | "yes" | "y" | "yaa" | "ya." | "iya."
    )
}

/// Detect the untouched placeholder menu ("Pickup / GrabExpress / Custom")
/// and collapse it to the `"-"` not-selected sentinel.
fn normalize_method(value: &str) -> String {
    let lower = value.to_lowercase();
    let untouched_menu =
        value.contains('/') && METHOD_MENU_WORDS.iter().all(|w| lower.contains(w));
    if untouched_menu {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// Parse the delivery-fee value. Empty (or a bare dash) means the customer
/// left the field blank; anything non-numeric or negative is a hard error
/// tagged with the field name, never a silent default.
fn parse_delivery_fee(value: &str) -> Result<(i64, DeliveryFeeSource), OrderParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Ok((0, DeliveryFeeSource::UserEmpty));
    }

    let invalid = || OrderParseError::InvalidField {
        field: "delivery_fee",
        value: value.to_string(),
    };

    let mut digits = trimmed.to_lowercase();
    for prefix in ["rp.", "rp ", "rp", "idr"] {
        if let Some(rest) = digits.strip_prefix(prefix) {
            digits = rest.trim_start().to_string();
            break;
        }
    }
    if digits.starts_with('-') {
        return Err(invalid());
    }
    let digits: String = digits
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | ' '))
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let fee: i64 = digits.parse().map_err(|_| invalid())?;
    Ok((fee, DeliveryFeeSource::UserInput))
}

/// End-of-parse cleanup shared by both dialects' semantics: receiver falls
/// back to the customer, and a missing or non-canonical delivery time gets
/// one best-effort extraction pass over the whole message.
pub(super) fn finish(draft: &mut DraftOrder, full_text: &str) {
    if draft.receiver_name.trim().is_empty() {
        draft.receiver_name = draft.customer_name.clone();
    }

    let time_ok =
        !draft.delivery_time.is_empty() && normalize_time(&draft.delivery_time).is_ok();
    if !time_ok {
        if let Some(found) = extract_time(full_text) {
            tracing::debug!(time = %found, "Delivery time recovered from free text");
            draft.delivery_time = found;
        }
    }
}
