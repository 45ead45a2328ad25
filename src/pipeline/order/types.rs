use serde::{Deserialize, Serialize};

/// Where the delivery-fee value came from. The distinction between "field
/// present but blank" and "field absent" is load-bearing for billing: a blank
/// field means the customer saw it and left the fee to us, an absent field
/// means the template never asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryFeeSource {
    UserInput,
    UserEmpty,
    NotProvided,
}

/// A single ordered line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub quantity: u32,
    pub name: String,
}

/// Structured result of parsing an order template. Built incrementally while
/// scanning lines; not yet persisted, since validation and human confirmation
/// happen downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftOrder {
    pub customer_name: String,
    /// Falls back to `customer_name` when the template has no receiver field
    /// or it was left blank.
    pub receiver_name: String,
    pub phone_number: String,
    /// May span multiple template lines; joined with newlines.
    pub address: String,
    pub event_name: String,
    pub event_duration: String,
    /// Free-form as written; date normalization happens downstream.
    pub event_date: String,
    /// Canonical `HH:MM` when normalization succeeded, otherwise the raw
    /// expression (best effort, never fatal).
    pub delivery_time: String,
    /// Append-only during a single parse pass.
    pub items: Vec<OrderItem>,
    pub notes: Vec<String>,
    pub delivery_fee: i64,
    pub delivery_fee_source: DeliveryFeeSource,
    /// Normalized method name, or `"-"` when the field still contains the
    /// untouched placeholder menu of options.
    pub delivery_method: String,
    /// "How did you hear about us" trailing field (V2 only).
    pub referral_source: String,
}

impl DraftOrder {
    pub fn new() -> Self {
        Self {
            customer_name: String::new(),
            receiver_name: String::new(),
            phone_number: String::new(),
            address: String::new(),
            event_name: String::new(),
            event_duration: String::new(),
            event_date: String::new(),
            delivery_time: String::new(),
            items: Vec::new(),
            notes: Vec::new(),
            delivery_fee: 0,
            delivery_fee_source: DeliveryFeeSource::NotProvided,
            delivery_method: String::new(),
            referral_source: String::new(),
        }
    }
}

impl Default for DraftOrder {
    fn default() -> Self {
        Self::new()
    }
}
