// Bindery - wiki to PDF exporter
// Copyright (c) 2025 Bindery Contributors
// Licensed under the MIT License

//! # Bindery - wiki to PDF exporter
//!
//! Bindery turns a wiki into one downloadable PDF on demand. It lists the
//! wiki's pages, prints each one with a headless browser, merges the page
//! PDFs in path order and keeps the result around for reuse.
//!
//! ## Overview
//!
//! - **Inventory**: pages are listed through the wiki's GraphQL API; pages
//!   tagged `no-pdf` are left out and the rest are sorted by path
//! - **Render**: each page is printed to its own PDF by Chromium, a bounded
//!   batch at a time
//! - **Merge**: page PDFs are concatenated in order with one outline entry per page
//! - **Cache**: a merged document younger than the TTL is served as-is
//! - **Cleanup**: stale temporary and merged files are swept by prefix
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (orchestration, rendering, merge, cache, cleanup)
//! - [`adapters`] - External integrations (wiki GraphQL, headless browser)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bindery::config::load_config_or_default;
//! use bindery::core::export::ExportOrchestrator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config_or_default("bindery.toml")?;
//!     let orchestrator = ExportOrchestrator::from_config(&config)?;
//!
//!     // Reuses a fresh document unless refresh is true
//!     let path = orchestrator.export_document(false).await?;
//!     println!("{}", path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Pipeline failures are typed as [`domain::ExportError`]; everything else
//! uses [`domain::BinderyError`]:
//!
//! ```rust,no_run
//! use bindery::domain::BinderyError;
//!
//! fn example() -> Result<(), BinderyError> {
//!     let config = bindery::config::load_config("bindery.toml")?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
