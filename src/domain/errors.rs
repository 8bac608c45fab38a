//! Domain error types
//!
//! This module defines the error hierarchy for Bindery. Pipeline failures are
//! typed so callers can tell an unreachable inventory from a render timeout.
//! Third-party error types are flattened to strings at the adapter boundary.

use thiserror::Error;

/// Main Bindery error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum BinderyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Export pipeline errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Export pipeline failures
///
/// Any of these aborts the running job. The type is `Clone` because a single
/// job result is handed to every caller coalesced onto that job.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExportError {
    /// The inventory endpoint is unreachable or returned a malformed payload
    #[error("Inventory unavailable: {0}")]
    UpstreamUnavailable(String),

    /// A page did not settle within the navigation wait
    #[error("Render timed out for '{path}' after {timeout_ms}ms")]
    RenderTimeout { path: String, timeout_ms: u64 },

    /// Any other rendering error
    #[error("Render failed for '{path}': {message}")]
    RenderFailure { path: String, message: String },

    /// Concatenating the per-page artifacts failed
    #[error("Merge failed: {0}")]
    MergeFailure(String),

    /// The job task itself panicked or was aborted
    #[error("Export job failed: {0}")]
    Internal(String),
}

impl ExportError {
    /// Short machine-readable name used in log records
    pub fn kind(&self) -> &'static str {
        match self {
            ExportError::UpstreamUnavailable(_) => "upstream_unavailable",
            ExportError::RenderTimeout { .. } => "render_timeout",
            ExportError::RenderFailure { .. } => "render_failure",
            ExportError::MergeFailure(_) => "merge_failure",
            ExportError::Internal(_) => "internal",
        }
    }

    /// Builds a render failure for the given page path
    pub fn render_failure(path: impl Into<String>, message: impl Into<String>) -> Self {
        ExportError::RenderFailure {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Housekeeping failures
///
/// These never abort a job; the sweeper logs them and moves on.
#[derive(Debug, Error)]
pub enum CleanupError {
    /// The output directory could not be listed
    #[error("Failed to scan {dir}: {message}")]
    Scan { dir: String, message: String },

    /// A single file could not be removed
    #[error("Failed to remove {path}: {message}")]
    Remove { path: String, message: String },
}

// Conversion from std::io::Error
impl From<std::io::Error> for BinderyError {
    fn from(err: std::io::Error) -> Self {
        BinderyError::Io(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for BinderyError {
    fn from(err: toml::de::Error) -> Self {
        BinderyError::Configuration(format!("TOML parse error: {err}"))
    }
}
