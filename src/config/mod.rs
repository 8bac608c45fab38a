//! Configuration management for Bindery.
//!
//! Bindery reads an optional TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Default values for every setting
//! - `BINDERY_*` environment overrides
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bindery::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("bindery.toml")?;
//!
//! println!("Inventory: {}", config.inventory.endpoint);
//! println!("Batch size: {}", config.export.batch_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [inventory]
//! endpoint = "http://localhost:3000/graphql"
//! exclusion_tag = "no-pdf"
//!
//! [renderer]
//! executable = "chromium"
//! base_url = "http://localhost:3000"
//! mode = "batched"
//!
//! [export]
//! output_dir = "./server/pdf"
//! batch_size = 5
//!
//! [cache]
//! ttl_minutes = 21600
//!
//! [cleanup]
//! max_age_seconds = 60
//! max_deletions = 100
//! ```
//!
//! # Environment Variables
//!
//! ```bash
//! export BINDERY_EXPORT_BATCH_SIZE=8
//! export BINDERY_CACHE_TTL_MINUTES=60
//! ```
//!
//! `PDF_EXPORT_BATCH_SIZE` is accepted as an older spelling of
//! `BINDERY_EXPORT_BATCH_SIZE`; the latter wins when both are set.

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{
    ApplicationConfig, BinderyConfig, CacheConfig, CleanupConfig, ExportConfig, InventoryConfig,
    LoggingConfig, RenderMode, RendererConfig, WaitUntil,
};
