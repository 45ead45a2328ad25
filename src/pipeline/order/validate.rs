//! Draft-order validation. Collects every violation instead of stopping at
//! the first, so the operator sees the full list of gaps in one pass.

use serde::Serialize;

use super::types::DraftOrder;

/// One validation failure, tied to the field it concerns. The field names are
/// fixed identifiers, so this serializes for the caller but is never read
/// back in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

/// Outcome of validating a draft order.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

fn error(field: &'static str, message: &str) -> ValidationError {
    ValidationError {
        field,
        message: message.to_string(),
    }
}

/// Check a draft order for completeness. Required: a customer name, a phone
/// number, a delivery address, and at least one order item. Item quantities
/// of zero cannot occur here (the parsers drop them), so they are not
/// re-checked.
pub fn validate_order(draft: &DraftOrder) -> ValidationReport {
    let mut errors = Vec::new();

    if draft.customer_name.trim().is_empty() {
        errors.push(error("customer_name", "Nama pemesan belum diisi"));
    }
    if draft.phone_number.trim().is_empty() {
        errors.push(error("phone_number", "Nomor HP belum diisi"));
    }
    if draft.address.trim().is_empty() {
        errors.push(error("address", "Alamat pengiriman belum diisi"));
    }
    if draft.items.is_empty() {
        errors.push(error("items", "Belum ada item pesanan"));
    }

    if !errors.is_empty() {
        tracing::debug!(count = errors.len(), "Draft order failed validation");
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}
