//! Delivery-time extraction and normalization.
//!
//! Customers write times every way imaginable: "08.00", "8:00 WIB", "jam 8",
//! "8 pagi". All of it must land on canonical zero-padded 24h `HH:MM` before
//! the draft order leaves the parser.

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;

use super::OrderParseError;

/// Trailing timezone abbreviations (western/central/eastern Indonesia).
static TZ_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\b(?:wib|wita|wit)\b\.?\s*$").unwrap());

/// Hour with optional `:` or `.` separated minutes, e.g. "8", "08.00", "8:30".
static HOUR_MINUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})(?:\s*[:.]\s*(\d{2}))?$").unwrap());

/// Free-text candidates, tried in order: explicit HH:MM / HH.MM first, then
/// "jam N [daypart]", then bare "N daypart".
static TIME_CANDIDATES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\b(\d{1,2}[:.]\d{2})(?:\s*(pagi|siang|sore|petang|malam))?\b").unwrap(),
        Regex::new(r"(?i)\bjam\s+(\d{1,2}(?:[:.]\d{2})?)(?:\s*(pagi|siang|sore|petang|malam))?\b")
            .unwrap(),
        Regex::new(r"(?i)\b(\d{1,2})\s*(pagi|siang|sore|petang|malam)\b").unwrap(),
    ]
});

/// Normalize a free-form time expression to canonical `HH:MM`.
///
/// Accepts `HH:MM`, `HH.MM` (the common local separator), bare hours, a
/// leading "jam"/"pukul", daypart words, and trailing timezone abbreviations.
/// Returns [`OrderParseError::UnparseableTime`] when nothing time-shaped
/// remains; callers fall back to the raw string rather than failing a parse.
pub fn normalize_time(raw: &str) -> Result<String, OrderParseError> {
    let err = || OrderParseError::UnparseableTime(raw.to_string());

    let mut s = TZ_SUFFIX.replace(raw.trim(), "").to_lowercase();
    for prefix in ["jam ", "pukul ", "jam", "pukul"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest.trim_start().to_string();
            break;
        }
    }

    // Pull off a trailing daypart word, if any.
    let mut daypart = None;
    for word in ["pagi", "siang", "sore", "petang", "malam"] {
        if let Some(rest) = s.strip_suffix(word) {
            daypart = Some(word);
            s = rest.trim_end().to_string();
            break;
        }
    }

    let caps = HOUR_MINUTE.captures(s.trim()).ok_or_else(err)?;
    let mut hour: u32 = caps[1].parse().map_err(|_| err())?;
    let minute: u32 = caps
        .get(2)
        .map(|m| m.as_str().parse())
        .transpose()
        .map_err(|_| err())?
        .unwrap_or(0);

    hour = apply_daypart(hour, daypart);

    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(err)?;
    Ok(time.format("%H:%M").to_string())
}

/// Shift an hour into 24h form based on the Indonesian daypart word.
///
/// pagi = morning (12 pagi is midnight), siang = midday (1 siang is 13:00 but
/// 11 siang stays 11:00), sore/petang = afternoon/evening, malam = night
/// (12 malam is midnight).
fn apply_daypart(hour: u32, daypart: Option<&str>) -> u32 {
    match daypart {
        Some("pagi") => {
            if hour == 12 {
                0
            } else {
                hour
            }
        }
        Some("siang") => {
            if hour < 10 {
                hour + 12
            } else {
                hour
            }
        }
        Some("sore") | Some("petang") => {
            if hour < 12 {
                hour + 12
            } else {
                hour
            }
        }
        Some("malam") => {
            if hour == 12 {
                0
            } else if hour < 12 {
                hour + 12
            } else {
                hour
            }
        }
        _ => hour,
    }
}

/// Scan free text for the first normalizable time expression.
/// Used as the parser fallback when no delivery-time field was filled in.
pub fn extract_time(text: &str) -> Option<String> {
    for pattern in TIME_CANDIDATES.iter() {
        for caps in pattern.captures_iter(text) {
            let mut expr = caps[1].to_string();
            if let Some(part) = caps.get(2) {
                expr.push(' ');
                expr.push_str(part.as_str());
            }
            if let Ok(normalized) = normalize_time(&expr) {
                return Some(normalized);
            }
        }
    }
    None
}
