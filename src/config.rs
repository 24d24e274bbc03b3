/// Application-level constants
pub const APP_NAME: &str = "scanner-pdf";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Confidence label applied when a payload does not carry one.
pub const DEFAULT_CONFIDENCE_LEVEL: &str = "alta";

/// Confidence label of a merged record when none of its sources carries one.
pub const MERGED_FALLBACK_CONFIDENCE_LEVEL: &str = "baixa";

/// Joins sequence values in summaries and copy-text.
pub const SUMMARY_SEPARATOR: &str = ", ";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "scanner_pdf_lib=debug,scanner_pdf=debug"
    } else {
        "scanner_pdf_lib=info,scanner_pdf=info"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_binary_name() {
        assert_eq!(APP_NAME, "scanner-pdf");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn default_confidence_is_highest_label() {
        assert_eq!(DEFAULT_CONFIDENCE_LEVEL, "alta");
        assert_ne!(DEFAULT_CONFIDENCE_LEVEL, MERGED_FALLBACK_CONFIDENCE_LEVEL);
    }

    #[test]
    fn log_filter_targets_this_crate() {
        assert!(default_log_filter().contains("scanner_pdf_lib"));
    }
}
