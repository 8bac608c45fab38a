//! Domain models and types for Bindery.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Content items** ([`ContentItem`]) and the export selection rule
//! - **Job bookkeeping** ([`ExportJob`], [`RenderJob`], [`JobUid`]) and the
//!   artifact naming convention ([`ArtifactLayout`])
//! - **Error types** ([`BinderyError`], [`ExportError`], [`CleanupError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! ```rust
//! use bindery::domain::{BinderyError, ExportError, Result};
//!
//! fn example() -> Result<()> {
//!     let failed: std::result::Result<(), ExportError> =
//!         Err(ExportError::MergeFailure("bad xref".to_string()));
//!     // Export errors convert into BinderyError with `?`
//!     failed?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod item;
pub mod job;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{BinderyError, CleanupError, ExportError};
pub use item::{select_exportable, ContentItem, DEFAULT_EXCLUSION_TAG};
pub use job::{
    ArtifactLayout, CachedArtifact, ExportJob, ExportRequest, JobUid, RenderJob,
    DEFAULT_DEST_PREFIX, DEFAULT_TEMP_PREFIX,
};
pub use result::Result;
