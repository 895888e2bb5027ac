//! Logging and observability
//!
//! Structured logging with:
//! - Configurable log levels (overridable through `RUST_LOG`)
//! - Console output on stderr
//! - Optional JSON file logging with rotation
//!
//! Element values are PHI and are never logged; records are identified by
//! SOP class and action counts only.
//!
//! # Example
//!
//! ```no_run
//! use dicom_deid::logging::init_logging;
//! use dicom_deid::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a record the procedure refused to release
///
/// # Example
///
/// ```no_run
/// use dicom_deid::log_record_rejected;
///
/// log_record_rejected!(Some("1.2.840.10008.5.1.4.1.1.4"), "MR not released");
/// ```
#[macro_export]
macro_rules! log_record_rejected {
    ($sop_class_uid:expr, $justification:expr) => {
        tracing::warn!(
            sop_class_uid = $sop_class_uid.unwrap_or("(missing)"),
            justification = %$justification,
            "Record rejected"
        );
    };
}

/// Log the action counts of a de-identified record
///
/// # Example
///
/// ```no_run
/// use dicom_deid::log_record_processed;
/// use dicom_deid::deid::DeidentificationReport;
///
/// let report = DeidentificationReport::default();
/// log_record_processed!(&report);
/// ```
#[macro_export]
macro_rules! log_record_processed {
    ($report:expr) => {
        tracing::info!(
            sop_class_uid = $report.sop_class_uid.as_deref().unwrap_or("(missing)"),
            class_matched = $report.class_matched,
            visited = $report.elements_visited,
            removed = $report.removed,
            kept = $report.kept,
            replaced = $report.replaced,
            remapped = $report.remapped,
            "Record de-identified"
        );
    };
}

/// Log an error with context
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
