//! Core business logic for Bindery.
//!
//! # Modules
//!
//! - [`export`] - Export orchestration, batch scheduling and single-flight
//! - [`render`] - Browser-backed page rendering
//! - [`merge`] - PDF concatenation with an outline per page
//! - [`cache`] - Lookup of fresh merged documents
//! - [`cleanup`] - Prefix-scoped deletion of old files
//!
//! # Export Workflow
//!
//! 1. **Cache check**: serve a merged document younger than the TTL
//! 2. **Pre-cleanup**: sweep stale temporary and merged files
//! 3. **Fetch**: list pages, drop excluded ones, sort by path
//! 4. **Render**: print every page to its own PDF, batch by batch
//! 5. **Merge**: concatenate the page PDFs in order
//! 6. **Post-cleanup**: remove the job's temporary files
//!
//! # Example
//!
//! ```rust,no_run
//! use bindery::config::load_config_or_default;
//! use bindery::core::export::ExportOrchestrator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config_or_default("bindery.toml")?;
//! let orchestrator = ExportOrchestrator::from_config(&config)?;
//!
//! let path = orchestrator.export_document(false).await?;
//! println!("Document: {}", path.display());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cleanup;
pub mod export;
pub mod merge;
pub mod render;
