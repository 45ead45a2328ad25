//! Multi-pass OCR recognition.
//!
//! One preprocessed screenshot is read several ways: first the cropped
//! prominent band where banking apps print the amount, then the full image
//! under a sequence of page-segmentation modes. Every pass is scored by
//! confidence plus amount-shaped-content bonuses and folded into a running
//! best; a good-enough full-text pass stops the sequence early.

use std::sync::LazyLock;

use regex::Regex;

use super::ocr::{OcrEngine, OcrOutcome};
use super::preprocess::crop_prominent_band;
use super::types::SegmentationMode;
use super::AmountError;

/// Segmentation modes tried on the cropped amount band.
const BAND_MODES: [SegmentationMode; 2] =
    [SegmentationMode::SingleLine, SegmentationMode::SingleWord];

/// Segmentation modes tried on the full image, in order of expected yield.
const FULL_MODES: [SegmentationMode; 4] = [
    SegmentationMode::SparseText,
    SegmentationMode::SingleBlock,
    SegmentationMode::SparseTextOsd,
    SegmentationMode::RawLine,
];

/// Score at which a full-image pass is good enough to stop the sequence.
const EARLY_EXIT_SCORE: f32 = 95.0;

/// Bonus for a currency marker in band text.
const BAND_CURRENCY_BONUS: f32 = 15.0;
/// Bonus for a three-digit run in band text.
const BAND_DIGITS_BONUS: f32 = 10.0;
/// Bonus for a currency marker in full text.
const FULL_CURRENCY_BONUS: f32 = 25.0;
/// Bonus for separator-grouped digits in full text.
const FULL_GROUPED_BONUS: f32 = 10.0;

/// Characters allowed in the digits-only retry pass.
const DIGIT_WHITELIST: &str = "0123456789.,RpIDR ";

static CURRENCY_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:rp|idr)\b")
        .unwrap_or_else(|e| panic!("invalid currency-marker pattern: {e}"))
});
static TRIPLE_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{3}").unwrap_or_else(|e| panic!("invalid digit pattern: {e}"))
});
static GROUPED_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,3}[.,]\d{3}")
        .unwrap_or_else(|e| panic!("invalid grouped-digit pattern: {e}"))
});

/// Running maximum over scored values.
pub struct ScoredBest<T> {
    best: Option<(f32, T)>,
}

impl<T> ScoredBest<T> {
    pub fn new() -> Self {
        ScoredBest { best: None }
    }

    /// Fold in one scored value; keeps the strictly higher score.
    pub fn offer(&mut self, score: f32, value: T) {
        match &self.best {
            Some((current, _)) if *current >= score => {}
            _ => self.best = Some((score, value)),
        }
    }

    pub fn score(&self) -> Option<f32> {
        self.best.as_ref().map(|(s, _)| *s)
    }

    pub fn value(&self) -> Option<&T> {
        self.best.as_ref().map(|(_, v)| v)
    }

    pub fn into_best(self) -> Option<(f32, T)> {
        self.best
    }
}

impl<T> Default for ScoredBest<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The winning OCR pass for one preprocessed image.
#[derive(Debug, Clone)]
pub struct RecognitionPass {
    pub text: String,
    pub confidence: f32,
    /// Segmentation mode of the winning pass.
    pub mode: SegmentationMode,
}

fn band_score(outcome: &OcrOutcome) -> f32 {
    let mut score = outcome.confidence;
    if CURRENCY_MARKER.is_match(&outcome.text) {
        score += BAND_CURRENCY_BONUS;
    }
    if TRIPLE_DIGITS.is_match(&outcome.text) {
        score += BAND_DIGITS_BONUS;
    }
    score
}

fn full_score(outcome: &OcrOutcome) -> f32 {
    let mut score = outcome.confidence;
    if CURRENCY_MARKER.is_match(&outcome.text) {
        score += FULL_CURRENCY_BONUS;
    }
    if GROUPED_DIGITS.is_match(&outcome.text) {
        score += FULL_GROUPED_BONUS;
    }
    score
}

/// Run the full recognition sequence over one preprocessed PNG and return
/// the best pass. Individual pass failures are logged and skipped; the error
/// of the last pass is returned only if every pass failed.
pub fn recognize_amount_text(
    engine: &dyn OcrEngine,
    image_bytes: &[u8],
    lang: &str,
) -> Result<RecognitionPass, AmountError> {
    let mut best: ScoredBest<(SegmentationMode, OcrOutcome)> = ScoredBest::new();
    let mut last_error: Option<AmountError> = None;

    // Band passes. A failed crop (image too small) just skips the strategy.
    if let Ok(band) = crop_prominent_band(image_bytes) {
        for mode in BAND_MODES {
            match engine.recognize(&band, mode, None, lang) {
                Ok(outcome) => {
                    let score = band_score(&outcome);
                    tracing::trace!(psm = mode.psm(), score, "Band OCR pass");
                    best.offer(score, (mode, outcome));
                }
                Err(e) => {
                    tracing::warn!(psm = mode.psm(), error = %e, "Band OCR pass failed");
                    last_error = Some(e);
                }
            }
        }
    }

    for mode in FULL_MODES {
        match engine.recognize(image_bytes, mode, None, lang) {
            Ok(outcome) => {
                let score = full_score(&outcome);
                tracing::trace!(psm = mode.psm(), score, "Full-image OCR pass");
                best.offer(score, (mode, outcome));
                if score >= EARLY_EXIT_SCORE {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(psm = mode.psm(), error = %e, "Full-image OCR pass failed");
                last_error = Some(e);
            }
        }
    }

    // If the best text carries no digits at all, one constrained retry with
    // a numeric whitelist sometimes recovers stylized amount fonts.
    let needs_retry = best
        .value()
        .map_or(true, |(_, o)| !o.text.chars().any(|c| c.is_ascii_digit()));
    if needs_retry {
        match engine.recognize(
            image_bytes,
            SegmentationMode::SparseText,
            Some(DIGIT_WHITELIST),
            lang,
        ) {
            Ok(outcome) => {
                best.offer(full_score(&outcome), (SegmentationMode::SparseText, outcome));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Whitelist retry failed");
                last_error = Some(e);
            }
        }
    }

    match best.into_best() {
        Some((_, (mode, outcome))) => Ok(RecognitionPass {
            text: outcome.text,
            confidence: outcome.confidence,
            mode,
        }),
        None => Err(last_error.unwrap_or_else(|| {
            AmountError::OcrProcessing("no OCR pass produced output".to_string())
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::payment::ocr::MockOcrEngine;
    use image::{DynamicImage, ImageOutputFormat, RgbImage};
    use std::io::Cursor;

    fn sample_png() -> Vec<u8> {
        let img = RgbImage::from_fn(400, 400, |x, y| {
            image::Rgb([((x + y) % 256) as u8, 0, 0])
        });
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn scored_best_keeps_maximum() {
        let mut best = ScoredBest::new();
        best.offer(10.0, "a");
        best.offer(30.0, "b");
        best.offer(20.0, "c");
        assert_eq!(best.into_best(), Some((30.0, "b")));
    }

    #[test]
    fn scored_best_first_wins_on_tie() {
        let mut best = ScoredBest::new();
        best.offer(10.0, "a");
        best.offer(10.0, "b");
        assert_eq!(best.into_best(), Some((10.0, "a")));
    }

    #[test]
    fn band_scoring_rewards_currency_and_digits() {
        let plain = OcrOutcome {
            text: "hello".to_string(),
            confidence: 50.0,
        };
        let rich = OcrOutcome {
            text: "Rp 235.000".to_string(),
            confidence: 50.0,
        };
        assert_eq!(band_score(&plain), 50.0);
        assert_eq!(band_score(&rich), 75.0);
    }

    #[test]
    fn full_scoring_rewards_grouped_digits() {
        let grouped = OcrOutcome {
            text: "total 75.000".to_string(),
            confidence: 40.0,
        };
        assert_eq!(full_score(&grouped), 50.0);
    }

    #[test]
    fn good_full_pass_exits_early() {
        // Two band passes, then the first full pass scores past the exit
        // threshold; the later, higher-confidence outcome must never be read.
        let engine = MockOcrEngine::scripted(vec![
            ("junk", 10.0),
            ("junk", 10.0),
            ("Rp 235.000 berhasil", 70.0),
            ("Rp 999.000", 99.0),
        ]);
        let pass = recognize_amount_text(&engine, &sample_png(), "ind").unwrap();
        assert_eq!(pass.text, "Rp 235.000 berhasil");
        assert_eq!(pass.confidence, 70.0);
        assert_eq!(pass.mode, SegmentationMode::SparseText);
    }

    #[test]
    fn digitless_best_triggers_whitelist_retry() {
        let engine = MockOcrEngine::scripted(vec![
            ("a", 10.0),
            ("a", 10.0),
            ("a", 10.0),
            ("a", 10.0),
            ("a", 10.0),
            ("a", 10.0),
            ("Rp 50.000", 80.0),
        ]);
        let pass = recognize_amount_text(&engine, &sample_png(), "ind").unwrap();
        assert_eq!(pass.text, "Rp 50.000");
    }

    #[test]
    fn best_pass_wins_without_early_exit() {
        // No pass reaches the exit score; the highest-scoring one is kept.
        let engine = MockOcrEngine::scripted(vec![
            ("saldo 12", 20.0),
            ("saldo 12", 20.0),
            ("transfer 30.000", 40.0),
            ("transfer 30.000 ok", 55.0),
            ("x9", 5.0),
            ("x9", 5.0),
        ]);
        let pass = recognize_amount_text(&engine, &sample_png(), "ind").unwrap();
        assert_eq!(pass.text, "transfer 30.000 ok");
    }
}
