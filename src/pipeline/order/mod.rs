pub mod detect;
pub mod lines;
pub mod normalize;
pub mod parser_v1;
pub mod parser_v2;
pub mod summary;
pub mod time;
pub mod types;
pub mod validate;

pub use detect::{detect_format, TemplateDialect};
pub use normalize::normalize_text;
pub use summary::format_order_summary;
pub use types::{DeliveryFeeSource, DraftOrder, OrderItem};
pub use validate::{validate_order, ValidationReport};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrderParseError {
    /// A labeled field carries a value that fails domain validation.
    /// Fatal to the parse; surfaced verbatim so the submitter can correct it.
    #[error("field '{field}' has an invalid value: {value:?}")]
    InvalidField { field: &'static str, value: String },

    /// A time expression could not be normalized to HH:MM.
    /// Callers catch this and fall back to the raw string.
    #[error("time expression not recognized: {0:?}")]
    UnparseableTime(String),
}

impl OrderParseError {
    /// Name of the offending field, when the error is tied to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            OrderParseError::InvalidField { field, .. } => Some(field),
            OrderParseError::UnparseableTime(_) => None,
        }
    }
}

/// Parse a free-text order template into a draft order.
///
/// The dialect is auto-detected; messages matching neither indicator set are
/// parsed with the structured (V2) parser, which tolerates partial templates.
pub fn parse_order(text: &str) -> Result<DraftOrder, OrderParseError> {
    let normalized = normalize_text(text);
    let dialect = detect_format(&normalized).unwrap_or(TemplateDialect::V2);
    tracing::debug!(?dialect, chars = normalized.len(), "Parsing order template");
    match dialect {
        TemplateDialect::V1 => parser_v1::parse(&normalized),
        TemplateDialect::V2 => parser_v2::parse(&normalized),
    }
}
