//! Logging and observability
//!
//! Structured logging built on `tracing`:
//! - human-readable console output
//! - optional JSON file output with rotation
//! - level from configuration, overridable with `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use bindery::logging::init_logging;
//! use bindery::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a pipeline stage transition for a job
///
/// # Example
///
/// ```no_run
/// use bindery::log_stage;
///
/// let uid = "7d44b88c-4199-4bad-97dc-d78268e01398";
/// log_stage!(uid, "render");
/// ```
#[macro_export]
macro_rules! log_stage {
    ($uid:expr, $stage:expr) => {
        tracing::debug!(job_uid = %$uid, stage = $stage, "Entering stage");
    };
}

/// Log progress of the batch scheduler
///
/// # Example
///
/// ```no_run
/// use bindery::log_batch_processing;
///
/// log_batch_processing!(2, 3, 5);
/// ```
#[macro_export]
macro_rules! log_batch_processing {
    ($current:expr, $total:expr, $size:expr) => {
        tracing::debug!(
            batch = $current,
            batches = $total,
            batch_size = $size,
            progress_pct = ($current as f64 / $total as f64 * 100.0),
            "Rendering batch"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use bindery::log_error_with_context;
/// use bindery::domain::ExportError;
///
/// let error = ExportError::MergeFailure("bad xref".to_string());
/// log_error_with_context!(&error, "merge");
/// ```
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
