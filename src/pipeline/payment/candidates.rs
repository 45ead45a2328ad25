//! Amount-candidate extraction from OCR text.
//!
//! Four regex families, each with a fixed weight reflecting how strongly its
//! shape implies "this is the transferred amount". Candidates are deduped by
//! amount (first family wins) and sorted by weight, then by smaller amount.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Which regex family produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CandidateFamily {
    /// Currency marker plus thousands separators, "Rp 235.000".
    CurrencySeparated,
    /// Currency marker plus a plain digit run, "Rp 50000".
    CurrencyPlain,
    /// A number next to a transfer keyword, "transfer 50.000".
    KeywordContext,
    /// A bare separator-grouped number with nothing vouching for it.
    StandaloneGrouped,
}

impl CandidateFamily {
    /// Fixed selection weight for the family.
    pub fn weight(self) -> u32 {
        match self {
            CandidateFamily::CurrencySeparated => 10,
            CandidateFamily::CurrencyPlain => 8,
            CandidateFamily::KeywordContext => 5,
            CandidateFamily::StandaloneGrouped => 2,
        }
    }
}

/// One plausible amount found in OCR text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountCandidate {
    pub amount: i64,
    pub family: CandidateFamily,
    pub weight: u32,
    /// The matched text as OCR produced it.
    pub original: String,
    /// Byte offset of the match in the OCR text.
    pub position: usize,
}

struct Family {
    regex: Regex,
    family: CandidateFamily,
}

fn family(pattern: &str, family: CandidateFamily) -> Family {
    Family {
        regex: Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid candidate pattern {pattern:?}: {e}")),
        family,
    }
}

static FAMILIES: LazyLock<Vec<Family>> = LazyLock::new(|| {
    vec![
        family(
            r"(?i)(?:rp|idr)\s*\.?\s*(\d{1,3}(?:[.,]\d{3})+)",
            CandidateFamily::CurrencySeparated,
        ),
        family(
            r"(?i)(?:rp|idr)\s*\.?\s*(\d{4,9})\b",
            CandidateFamily::CurrencyPlain,
        ),
        family(
            r"(?i)(?:transfer|trf|pembayaran|bayar|nominal|total|jumlah)\D{0,10}(\d{1,3}(?:[.,]\d{3})+|\d{4,9})\b",
            CandidateFamily::KeywordContext,
        ),
        family(
            r"(\d{1,3}(?:[.,]\d{3})+)",
            CandidateFamily::StandaloneGrouped,
        ),
    ]
});

/// Context words that mark a bare grouped number as something other than an
/// amount: account numbers, reference codes, dates.
static REJECT_CONTEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:rek(?:ening)?|ref(?:erensi)?|resi|va|tanggal|tgl|date|kode)\b")
        .unwrap_or_else(|e| panic!("invalid reject-context pattern: {e}"))
});

/// Characters of surrounding text inspected for rejection words.
const CONTEXT_WINDOW: usize = 24;

/// Extract, filter, dedup, and rank amount candidates from one OCR pass.
///
/// `min_amount` and `max_amount` bound plausible transfer sizes; candidates
/// outside the range are dropped. Duplicate amounts keep the occurrence from
/// the highest-priority family seen first.
pub fn extract_candidates(text: &str, min_amount: i64, max_amount: i64) -> Vec<AmountCandidate> {
    let mut found: Vec<AmountCandidate> = Vec::new();

    for fam in FAMILIES.iter() {
        for caps in fam.regex.captures_iter(text) {
            let m = match caps.get(1) {
                Some(m) => m,
                None => continue,
            };
            let Some(amount) = parse_amount(m.as_str()) else {
                continue;
            };
            if amount < min_amount || amount > max_amount {
                continue;
            }
            if fam.family == CandidateFamily::StandaloneGrouped
                && rejected_by_context(text, m.start(), m.end())
            {
                continue;
            }
            if found.iter().any(|c| c.amount == amount) {
                continue;
            }
            found.push(AmountCandidate {
                amount,
                family: fam.family,
                weight: fam.family.weight(),
                original: m.as_str().to_string(),
                position: m.start(),
            });
        }
    }

    // Stable sort keeps first-seen order within equal keys.
    found.sort_by(|a, b| b.weight.cmp(&a.weight).then(a.amount.cmp(&b.amount)));
    found
}

fn parse_amount(raw: &str) -> Option<i64> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Look a short window around a bare number for words that mark it as a
/// non-amount. Window bounds are snapped to char boundaries.
fn rejected_by_context(text: &str, start: usize, end: usize) -> bool {
    let mut lo = start.saturating_sub(CONTEXT_WINDOW);
    while !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (end + CONTEXT_WINDOW).min(text.len());
    while !text.is_char_boundary(hi) {
        hi += 1;
    }
    REJECT_CONTEXT.is_match(&text[lo..hi])
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: i64 = 10_000;
    const MAX: i64 = 50_000_000;

    #[test]
    fn currency_separated_wins_top_weight() {
        let found = extract_candidates("Total Rp 235.000 Transfer berhasil", MIN, MAX);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].amount, 235_000);
        assert_eq!(found[0].family, CandidateFamily::CurrencySeparated);
        assert_eq!(found[0].weight, 10);
    }

    #[test]
    fn plain_digit_run_needs_currency_marker() {
        let found = extract_candidates("Rp50000 berhasil", MIN, MAX);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].family, CandidateFamily::CurrencyPlain);
        assert_eq!(found[0].amount, 50_000);
    }

    #[test]
    fn keyword_context_catches_unmarked_numbers() {
        let found = extract_candidates("transfer 75.000 sudah masuk", MIN, MAX);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].family, CandidateFamily::KeywordContext);
        assert_eq!(found[0].amount, 75_000);
    }

    #[test]
    fn standalone_grouped_is_last_resort() {
        let found = extract_candidates("saldo 120.000", MIN, MAX);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].family, CandidateFamily::StandaloneGrouped);
        assert_eq!(found[0].weight, 2);
    }

    #[test]
    fn duplicate_amount_keeps_first_family() {
        let found = extract_candidates("Rp 50.000 dikirim, total 50.000", MIN, MAX);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].family, CandidateFamily::CurrencySeparated);
    }

    #[test]
    fn equal_weight_prefers_smaller_amount() {
        let found = extract_candidates("transfer 30.000 dan bayar 25.000", MIN, MAX);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].amount, 25_000);
        assert_eq!(found[1].amount, 30_000);
    }

    #[test]
    fn out_of_range_amounts_dropped() {
        let found = extract_candidates("Rp 5.000 dan Rp 90.000.000", MIN, MAX);
        assert!(found.is_empty());
    }

    #[test]
    fn account_number_context_rejects_bare_number() {
        let found = extract_candidates("rekening 123.456", MIN, MAX);
        assert!(found.is_empty());
    }

    #[test]
    fn rejection_only_applies_to_bare_numbers() {
        let found = extract_candidates("rekening tujuan Rp 123.456", MIN, MAX);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].family, CandidateFamily::CurrencySeparated);
    }

    #[test]
    fn two_families_rank_by_weight() {
        let found = extract_candidates("Rp 235.000 transfer 15.000", MIN, MAX);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].amount, 235_000);
        assert_eq!(found[0].weight, 10);
        assert_eq!(found[1].amount, 15_000);
        assert_eq!(found[1].weight, 5);
    }

    #[test]
    fn higher_weight_family_wins_regardless_of_magnitude() {
        let found = extract_candidates("Rp 235.000 sisa 2.350.000", MIN, MAX);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].amount, 235_000);
        assert_eq!(found[0].family, CandidateFamily::CurrencySeparated);
        assert_eq!(found[1].amount, 2_350_000);
        assert_eq!(found[1].family, CandidateFamily::StandaloneGrouped);
    }

    #[test]
    fn candidate_records_original_text_and_position() {
        let found = extract_candidates("Total Rp 235.000 Transfer berhasil", MIN, MAX);
        assert_eq!(found[0].original, "235.000");
        assert_eq!(found[0].position, 9);
    }

    #[test]
    fn comma_separators_parse_like_dots() {
        let found = extract_candidates("IDR 1,250,000", MIN, MAX);
        assert_eq!(found[0].amount, 1_250_000);
    }
}
