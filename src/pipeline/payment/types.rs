//! Result and parameter types for amount extraction.

use serde::{Deserialize, Serialize};

use super::candidates::AmountCandidate;

/// Tesseract page-segmentation modes the pipeline uses. The numeric values
/// are Tesseract's own PSM identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentationMode {
    /// Uniform block of text (PSM 6).
    SingleBlock = 6,
    /// Single text line (PSM 7).
    SingleLine = 7,
    /// Single word (PSM 8).
    SingleWord = 8,
    /// Sparse text, find as much as possible in no particular order (PSM 11).
    SparseText = 11,
    /// Sparse text with orientation and script detection (PSM 12).
    SparseTextOsd = 12,
    /// Raw line, bypassing Tesseract-specific hacks (PSM 13).
    RawLine = 13,
}

impl SegmentationMode {
    pub fn psm(self) -> u8 {
        self as u8
    }
}

/// Why an extraction was flagged for manual confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfirmationReason {
    /// More than one plausible amount survived filtering.
    MultipleCandidates,
    /// OCR confidence for the winning pass was below the floor.
    LowConfidence,
    /// No amount was found at all.
    NoAmount,
}

/// The outcome of running amount extraction on one screenshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmountExtraction {
    /// The selected amount in whole rupiah, if any candidate survived.
    pub amount: Option<i64>,
    /// OCR confidence (0-100) of the pass that produced the selection.
    pub confidence: f32,
    /// Every surviving candidate, best first.
    pub candidates: Vec<AmountCandidate>,
    /// True when the operator should verify the amount by eye.
    pub needs_confirmation: bool,
    /// Set iff `needs_confirmation` is true.
    pub confirmation_reason: Option<ConfirmationReason>,
    /// Preprocessing mode of the winning pass.
    pub preprocess_mode: String,
    /// Tesseract page-segmentation mode of the winning OCR pass (0 when no
    /// pass succeeded).
    pub psm: u8,
    /// Raw OCR text of the winning pass, for diagnostics.
    pub ocr_text: String,
}

impl AmountExtraction {
    pub fn empty() -> Self {
        AmountExtraction {
            amount: None,
            confidence: 0.0,
            candidates: Vec::new(),
            needs_confirmation: true,
            confirmation_reason: Some(ConfirmationReason::NoAmount),
            preprocess_mode: String::new(),
            psm: 0,
            ocr_text: String::new(),
        }
    }
}
