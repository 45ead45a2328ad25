//! Payment-evidence amount extraction.
//!
//! Takes a customer's transfer screenshot and produces the rupiah amount it
//! most likely shows, with a confidence verdict. The pipeline is
//! preprocess -> OCR (several page-segmentation passes) -> regex candidate
//! extraction -> scoring, retrying across preprocessing modes until a result
//! is good enough to stop early.

pub mod candidates;
pub mod ocr;
pub mod orchestrator;
pub mod preprocess;
pub mod recognize;
pub mod types;

pub use candidates::{extract_candidates, AmountCandidate, CandidateFamily};
pub use ocr::{MockOcrEngine, OcrEngine, OcrOutcome};
pub use orchestrator::{extract_amount_from_image, ExtractOptions};
pub use preprocess::PreprocessMode;
pub use types::{AmountExtraction, ConfirmationReason, SegmentationMode};

use thiserror::Error;

/// Errors from the amount-extraction pipeline.
#[derive(Debug, Error)]
pub enum AmountError {
    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    #[error("OCR engine initialization failed: {0}")]
    OcrInit(String),

    #[error("OCR engine configuration failed: {0}")]
    OcrConfig(String),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for AmountError {
    fn from(e: image::ImageError) -> Self {
        AmountError::ImageProcessing(e.to_string())
    }
}
