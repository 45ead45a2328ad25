use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "WarungIntake";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Smallest transfer amount accepted as a plausible payment, in rupiah.
/// Anything below this is OCR noise (dates, counters, partial digits).
pub const DEFAULT_MIN_AMOUNT: i64 = 10_000;

/// Largest transfer amount accepted as a plausible payment, in rupiah.
pub const DEFAULT_MAX_AMOUNT: i64 = 50_000_000;

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "warung_intake=debug,info"
}

/// Directory where intermediate preprocessed images are written when
/// `debug_save` is enabled. Overridable via `WARUNG_DUMP_DIR`.
pub fn debug_dump_dir() -> PathBuf {
    match std::env::var_os("WARUNG_DUMP_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::temp_dir().join("warung-intake-dump"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_bounds_are_sane() {
        assert!(DEFAULT_MIN_AMOUNT < DEFAULT_MAX_AMOUNT);
        assert_eq!(DEFAULT_MIN_AMOUNT, 10_000);
        assert_eq!(DEFAULT_MAX_AMOUNT, 50_000_000);
    }

    #[test]
    fn dump_dir_has_crate_component() {
        // Only meaningful without the env override, which tests don't set.
        if std::env::var_os("WARUNG_DUMP_DIR").is_none() {
            assert!(debug_dump_dir().ends_with("warung-intake-dump"));
        }
    }
}
