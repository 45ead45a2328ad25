pub mod config;
pub mod pipeline;

pub use pipeline::order::{
    detect_format, format_order_summary, normalize_text, parse_order, validate_order, DraftOrder,
    OrderParseError, TemplateDialect, ValidationReport,
};
pub use pipeline::payment::{
    extract_amount_from_image, AmountError, AmountExtraction, ExtractOptions, OcrEngine,
};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries and integration harnesses.
/// Respects `RUST_LOG` when set, otherwise uses the crate default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
