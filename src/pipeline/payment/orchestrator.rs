//! Amount-extraction orchestration.
//!
//! Walks the preprocessing modes in order, runs the recognition sequence on
//! each, extracts candidates, and keeps the best attempt across modes. A
//! clearly good attempt stops the walk; otherwise every mode gets its turn
//! and the strongest result wins.

use std::path::PathBuf;

use crate::config;

use super::candidates::extract_candidates;
use super::ocr::OcrEngine;
use super::preprocess::{preprocess, PreprocessMode};
use super::recognize::{recognize_amount_text, RecognitionPass, ScoredBest};
use super::types::{AmountExtraction, ConfirmationReason};
use super::AmountError;

/// OCR confidence below which even a single clean candidate is flagged for
/// manual confirmation.
const CONFIDENCE_FLOOR: f32 = 60.0;

/// Combined score (confidence + 4x best candidate weight) at which an
/// attempt is accepted without trying further preprocessing modes.
const VERY_GOOD_SCORE: f32 = 130.0;

/// Multiplier folding the best candidate's family weight into the combined
/// attempt score.
const WEIGHT_SCALE: f32 = 4.0;

/// Knobs for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Smallest plausible transfer, in rupiah.
    pub min_amount: i64,
    /// Largest plausible transfer, in rupiah.
    pub max_amount: i64,
    /// Tesseract language code.
    pub lang: String,
    /// Force a single preprocessing mode instead of walking the whole order.
    pub preprocess: Option<PreprocessMode>,
    /// Save preprocessed images and OCR text to the debug directory.
    pub debug_save: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            min_amount: config::DEFAULT_MIN_AMOUNT,
            max_amount: config::DEFAULT_MAX_AMOUNT,
            lang: "ind".to_string(),
            preprocess: None,
            debug_save: false,
        }
    }
}

struct Attempt {
    extraction: AmountExtraction,
}

fn combined_score(extraction: &AmountExtraction) -> f32 {
    match extraction.candidates.first() {
        Some(best) => extraction.confidence + best.weight as f32 * WEIGHT_SCALE,
        // Candidate-less attempts only compete with each other.
        None => extraction.confidence / 1000.0,
    }
}

/// Extract the transfer amount from an encoded screenshot.
///
/// Returns `Err` only when no preprocessing mode could even be attempted
/// (unreadable image, OCR engine failing on every pass). A readable image
/// with no recognizable amount is an `Ok` result with `amount: None`.
pub fn extract_amount_from_image(
    engine: &dyn OcrEngine,
    image_bytes: &[u8],
    options: &ExtractOptions,
) -> Result<AmountExtraction, AmountError> {
    let mut best: ScoredBest<Attempt> = ScoredBest::new();
    let mut last_error: Option<AmountError> = None;

    let modes: Vec<PreprocessMode> = match options.preprocess {
        Some(mode) => vec![mode],
        None => PreprocessMode::ATTEMPT_ORDER.to_vec(),
    };

    for mode in modes {
        let prepared = match preprocess(image_bytes, mode) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(mode = mode.as_str(), error = %e, "Preprocessing failed");
                last_error = Some(e);
                continue;
            }
        };
        if options.debug_save {
            dump_artifact(mode, "png", &prepared);
        }

        let pass = match recognize_amount_text(engine, &prepared, &options.lang) {
            Ok(pass) => pass,
            Err(e) => {
                tracing::warn!(mode = mode.as_str(), error = %e, "Recognition failed");
                last_error = Some(e);
                continue;
            }
        };
        if options.debug_save {
            dump_artifact(mode, "txt", pass.text.as_bytes());
        }

        let candidates = extract_candidates(&pass.text, options.min_amount, options.max_amount);
        let extraction = assemble(mode, pass, candidates);
        let score = combined_score(&extraction);
        tracing::debug!(
            mode = mode.as_str(),
            confidence = extraction.confidence,
            candidates = extraction.candidates.len(),
            score,
            "Extraction attempt"
        );

        best.offer(score, Attempt { extraction });
        if score >= VERY_GOOD_SCORE {
            tracing::debug!(mode = mode.as_str(), "Attempt good enough, stopping");
            break;
        }
    }

    match best.into_best() {
        Some((_, attempt)) => Ok(attempt.extraction),
        None => Err(last_error.unwrap_or_else(|| {
            AmountError::ImageProcessing("no preprocessing mode produced output".to_string())
        })),
    }
}

fn assemble(
    mode: PreprocessMode,
    pass: RecognitionPass,
    candidates: Vec<super::candidates::AmountCandidate>,
) -> AmountExtraction {
    let amount = candidates.first().map(|c| c.amount);
    let (needs_confirmation, confirmation_reason) = match (&amount, candidates.len()) {
        (None, _) => (true, Some(ConfirmationReason::NoAmount)),
        (Some(_), n) if n > 1 => (true, Some(ConfirmationReason::MultipleCandidates)),
        (Some(_), _) if pass.confidence < CONFIDENCE_FLOOR => {
            (true, Some(ConfirmationReason::LowConfidence))
        }
        _ => (false, None),
    };

    AmountExtraction {
        amount,
        confidence: pass.confidence,
        candidates,
        needs_confirmation,
        confirmation_reason,
        preprocess_mode: mode.as_str().to_string(),
        psm: pass.mode.psm(),
        ocr_text: pass.text,
    }
}

/// Best-effort write of a debug artifact; failures are logged, never raised.
fn dump_artifact(mode: PreprocessMode, ext: &str, bytes: &[u8]) {
    let dir = config::debug_dump_dir();
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(dir = %dir.display(), error = %e, "Cannot create dump dir");
        return;
    }
    let path: PathBuf = dir.join(format!("attempt-{}.{ext}", mode.as_str()));
    if let Err(e) = std::fs::write(&path, bytes) {
        tracing::warn!(path = %path.display(), error = %e, "Cannot write dump file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::payment::candidates::CandidateFamily;
    use crate::pipeline::payment::ocr::MockOcrEngine;
    use crate::pipeline::payment::types::SegmentationMode;
    use image::{DynamicImage, ImageOutputFormat, RgbImage};
    use std::io::Cursor;

    fn sample_png() -> Vec<u8> {
        let img = RgbImage::from_fn(640, 640, |x, y| {
            image::Rgb([((x * y) % 256) as u8, (x % 256) as u8, (y % 256) as u8])
        });
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn clean_screenshot_extracts_single_amount() {
        let engine = MockOcrEngine::fixed("Transfer berhasil Rp 235.000", 88.0);
        let result =
            extract_amount_from_image(&engine, &sample_png(), &ExtractOptions::default())
                .unwrap();
        assert_eq!(result.amount, Some(235_000));
        assert!(!result.needs_confirmation);
        assert!(result.confirmation_reason.is_none());
        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.candidates[0].family, CandidateFamily::CurrencySeparated);
    }

    #[test]
    fn multiple_candidates_need_confirmation() {
        let engine = MockOcrEngine::fixed("Rp 235.000 dikirim, transfer 15.000", 90.0);
        let result =
            extract_amount_from_image(&engine, &sample_png(), &ExtractOptions::default())
                .unwrap();
        assert_eq!(result.amount, Some(235_000));
        assert!(result.needs_confirmation);
        assert_eq!(
            result.confirmation_reason,
            Some(ConfirmationReason::MultipleCandidates)
        );
        assert_eq!(result.candidates.len(), 2);
    }

    #[test]
    fn low_confidence_needs_confirmation() {
        let engine = MockOcrEngine::fixed("Rp 50.000", 35.0);
        let result =
            extract_amount_from_image(&engine, &sample_png(), &ExtractOptions::default())
                .unwrap();
        assert_eq!(result.amount, Some(50_000));
        assert!(result.needs_confirmation);
        assert_eq!(
            result.confirmation_reason,
            Some(ConfirmationReason::LowConfidence)
        );
    }

    #[test]
    fn no_amount_found_is_ok_with_none() {
        let engine = MockOcrEngine::fixed("tidak ada angka di sini", 80.0);
        let result =
            extract_amount_from_image(&engine, &sample_png(), &ExtractOptions::default())
                .unwrap();
        assert_eq!(result.amount, None);
        assert!(result.needs_confirmation);
        assert_eq!(result.confirmation_reason, Some(ConfirmationReason::NoAmount));
        assert!(!result.ocr_text.is_empty());
    }

    #[test]
    fn unreadable_image_is_error() {
        let engine = MockOcrEngine::fixed("Rp 50.000", 90.0);
        let err = extract_amount_from_image(&engine, b"junk", &ExtractOptions::default())
            .unwrap_err();
        assert!(matches!(err, AmountError::ImageProcessing(_)));
    }

    #[test]
    fn good_first_attempt_skips_remaining_modes() {
        // High confidence plus a top-weight candidate crosses the very-good
        // threshold on the first preprocessing mode; the later scripted junk
        // must never be consumed.
        let engine = MockOcrEngine::scripted(vec![
            ("Rp 235.000", 95.0),
            ("Rp 235.000", 95.0),
            ("Rp 235.000", 95.0),
            ("Rp 111.000", 99.0),
        ]);
        let result =
            extract_amount_from_image(&engine, &sample_png(), &ExtractOptions::default())
                .unwrap();
        assert_eq!(result.amount, Some(235_000));
        assert_eq!(result.preprocess_mode, "balanced");
    }

    #[test]
    fn forced_preprocess_mode_is_honored() {
        let engine = MockOcrEngine::fixed("Rp 50.000", 90.0);
        let options = ExtractOptions {
            preprocess: Some(PreprocessMode::Aggressive),
            ..ExtractOptions::default()
        };
        let result = extract_amount_from_image(&engine, &sample_png(), &options).unwrap();
        assert_eq!(result.preprocess_mode, "aggressive");
        assert_eq!(result.psm, SegmentationMode::SparseText.psm());
    }

    #[test]
    fn debug_dump_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("WARUNG_DUMP_DIR", dir.path());
        let engine = MockOcrEngine::fixed("Rp 235.000", 95.0);
        let options = ExtractOptions {
            debug_save: true,
            ..ExtractOptions::default()
        };
        extract_amount_from_image(&engine, &sample_png(), &options).unwrap();
        std::env::remove_var("WARUNG_DUMP_DIR");
        assert!(dir.path().join("attempt-balanced.png").exists());
        assert!(dir.path().join("attempt-balanced.txt").exists());
    }

    #[test]
    fn amount_range_is_configurable() {
        let engine = MockOcrEngine::fixed("Rp 5.000", 90.0);
        let options = ExtractOptions {
            min_amount: 1_000,
            ..ExtractOptions::default()
        };
        let result = extract_amount_from_image(&engine, &sample_png(), &options).unwrap();
        assert_eq!(result.amount, Some(5_000));
    }
}
