//! OCR engine abstraction.
//!
//! The pipeline talks to OCR through a trait so the recognition and
//! orchestration logic is testable without Tesseract installed. The real
//! engine is behind the `ocr` feature; tests use [`MockOcrEngine`].

use super::types::SegmentationMode;
use super::AmountError;

/// Text plus mean word confidence from one OCR pass.
#[derive(Debug, Clone)]
pub struct OcrOutcome {
    pub text: String,
    /// Mean confidence over recognized words, 0-100.
    pub confidence: f32,
}

/// A text recognizer. `image_bytes` is an encoded PNG.
pub trait OcrEngine: Send + Sync {
    fn recognize(
        &self,
        image_bytes: &[u8],
        mode: SegmentationMode,
        whitelist: Option<&str>,
        lang: &str,
    ) -> Result<OcrOutcome, AmountError>;
}

/// Tesseract-backed engine. Each call builds a fresh session, so native
/// resources are released when the call returns and no state leaks between
/// segmentation modes.
#[cfg(feature = "ocr")]
pub struct TesseractEngine;

#[cfg(feature = "ocr")]
impl OcrEngine for TesseractEngine {
    fn recognize(
        &self,
        image_bytes: &[u8],
        mode: SegmentationMode,
        whitelist: Option<&str>,
        lang: &str,
    ) -> Result<OcrOutcome, AmountError> {
        let mut session = tesseract::Tesseract::new(None, Some(lang))
            .map_err(|e| AmountError::OcrInit(e.to_string()))?
            .set_variable("tessedit_pageseg_mode", &mode.psm().to_string())
            .map_err(|e| AmountError::OcrConfig(e.to_string()))?;
        if let Some(chars) = whitelist {
            session = session
                .set_variable("tessedit_char_whitelist", chars)
                .map_err(|e| AmountError::OcrConfig(e.to_string()))?;
        }
        let mut session = session
            .set_image_from_mem(image_bytes)
            .map_err(|e| AmountError::OcrProcessing(e.to_string()))?;
        let text = session
            .get_text()
            .map_err(|e| AmountError::OcrProcessing(e.to_string()))?;
        let confidence = session.mean_text_conf() as f32;
        Ok(OcrOutcome {
            text,
            confidence: confidence.clamp(0.0, 100.0),
        })
    }
}

/// Scripted engine for tests. Either returns one fixed outcome for every
/// call, or plays back a queue of outcomes in order (repeating the last one
/// once the queue is exhausted).
pub struct MockOcrEngine {
    script: std::sync::Mutex<std::collections::VecDeque<OcrOutcome>>,
    fallback: OcrOutcome,
}

impl MockOcrEngine {
    pub fn fixed(text: &str, confidence: f32) -> Self {
        MockOcrEngine {
            script: std::sync::Mutex::new(std::collections::VecDeque::new()),
            fallback: OcrOutcome {
                text: text.to_string(),
                confidence,
            },
        }
    }

    pub fn scripted(outcomes: Vec<(&str, f32)>) -> Self {
        let mut queue: std::collections::VecDeque<OcrOutcome> = outcomes
            .into_iter()
            .map(|(text, confidence)| OcrOutcome {
                text: text.to_string(),
                confidence,
            })
            .collect();
        let fallback = queue
            .back()
            .cloned()
            .unwrap_or(OcrOutcome {
                text: String::new(),
                confidence: 0.0,
            });
        // Keep the queue strictly ahead of the fallback.
        if queue.len() == 1 {
            queue.clear();
        }
        MockOcrEngine {
            script: std::sync::Mutex::new(queue),
            fallback,
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize(
        &self,
        _image_bytes: &[u8],
        _mode: SegmentationMode,
        _whitelist: Option<&str>,
        _lang: &str,
    ) -> Result<OcrOutcome, AmountError> {
        let mut script = self.script.lock().unwrap();
        Ok(script.pop_front().unwrap_or_else(|| self.fallback.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_mock_repeats() {
        let engine = MockOcrEngine::fixed("Rp 50.000", 90.0);
        for _ in 0..3 {
            let out = engine
                .recognize(&[], SegmentationMode::SingleBlock, None, "ind")
                .unwrap();
            assert_eq!(out.text, "Rp 50.000");
            assert_eq!(out.confidence, 90.0);
        }
    }

    #[test]
    fn scripted_mock_plays_in_order_then_repeats_last() {
        let engine = MockOcrEngine::scripted(vec![("first", 10.0), ("second", 20.0)]);
        let a = engine
            .recognize(&[], SegmentationMode::SingleLine, None, "ind")
            .unwrap();
        let b = engine
            .recognize(&[], SegmentationMode::SingleLine, None, "ind")
            .unwrap();
        let c = engine
            .recognize(&[], SegmentationMode::SingleLine, None, "ind")
            .unwrap();
        assert_eq!(a.text, "first");
        assert_eq!(b.text, "second");
        assert_eq!(c.text, "second");
    }
}
