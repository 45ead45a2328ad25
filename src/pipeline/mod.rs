pub mod order; // Free-text order template parsing (two dialects)
pub mod payment; // Payment screenshot amount extraction
