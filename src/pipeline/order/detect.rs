//! Template dialect detection.
//!
//! Two template layouts circulate among customers: the structured Indonesian
//! form ("V2", the current broadcast template) and the legacy short form
//! ("V1"). Detection counts labeled-field indicators per set; it is a
//! heuristic over labels, not a grammar.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Supported order template layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateDialect {
    /// Legacy short form: seven loosely-labeled fields.
    V1,
    /// Structured Indonesian form: fourteen labeled fields.
    V2,
}

fn indicator(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid indicator pattern {pattern:?}: {e}"))
}

/// Labeled-field indicators of the structured (V2) template.
static V2_INDICATORS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        indicator(r"(?im)^\s*nama\s+pemesan\s*:"),
        indicator(r"(?im)^\s*nama\s+penerima\s*:"),
        indicator(r"(?im)^\s*no\.?\s*hp\s*:"),
        indicator(r"(?im)^\s*alamat\s+pengiriman\s*:"),
        indicator(r"(?im)^\s*nama\s+event\s*:"),
        indicator(r"(?im)^\s*durasi\s+event\s*:"),
        indicator(r"(?im)^\s*tanggal\s+event\s*:"),
        indicator(r"(?im)^\s*jam\s+(?:pengiriman|kirim)\s*:"),
        indicator(r"(?im)^\s*detail\s+pesanan\s*:?"),
        indicator(r"(?im)^\s*packaging\s+styrofoam\s*:"),
        indicator(r"(?im)^\s*metode\s+pengiriman\s*:"),
        indicator(r"(?im)^\s*ongkir\s*:"),
        indicator(r"(?im)^\s*catatan\s*:?"),
        indicator(r"(?im)^\s*tahu\s+.*\s+dari\s+mana\s*:?"),
    ]
});

/// Labeled-field indicators of the legacy (V1) template. The plain labels
/// require word boundaries so they do not fire on V2 compound labels
/// ("Nama Pemesan" must not count as V1 "Nama").
static V1_INDICATORS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        indicator(r"(?im)^\s*nama\s*:"),
        indicator(r"(?im)^\s*no\.?\s*hp\s*:"),
        indicator(r"(?im)^\s*alamat\s*:"),
        indicator(r"(?im)^\s*tanggal\s*:"),
        indicator(r"(?im)^\s*jam\s*:"),
        indicator(r"(?im)^\s*pesanan\s*:?"),
        indicator(r"(?im)^\s*catatan\s*:?"),
    ]
});

/// Minimum co-occurring V2 labels before a message counts as V2.
///
/// A single label hit is weak evidence, since several labels ("Catatan",
/// "No HP") sit in both sets; three co-occurring V2 labels identify the
/// broadcast template reliably. Changing the threshold reclassifies real
/// traffic.
const V2_MIN_INDICATORS: usize = 3;

/// Detect which template dialect a message is written in, or `None` when it
/// matches neither indicator set.
pub fn detect_format(text: &str) -> Option<TemplateDialect> {
    let v2_hits = V2_INDICATORS.iter().filter(|r| r.is_match(text)).count();
    if v2_hits >= V2_MIN_INDICATORS {
        tracing::debug!(v2_hits, "Detected structured template");
        return Some(TemplateDialect::V2);
    }

    let v1_hits = V1_INDICATORS.iter().filter(|r| r.is_match(text)).count();
    if v1_hits > 0 {
        tracing::debug!(v1_hits, v2_hits, "Detected legacy template");
        return Some(TemplateDialect::V1);
    }

    None
}
