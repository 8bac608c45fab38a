//! Export orchestration and batch processing
//!
//! This module provides the export pipeline:
//! - batch scheduling of page renders
//! - single-flight coalescing of concurrent requests
//! - orchestration of the cache, render, merge and cleanup stages
//! - outcome reporting

pub mod orchestrator;
pub mod scheduler;
pub mod single_flight;
pub mod summary;

pub use orchestrator::ExportOrchestrator;
pub use scheduler::{BatchScheduler, DEFAULT_BATCH_SIZE};
pub use single_flight::SingleFlight;
pub use summary::{ExportOutcome, OutcomeSource};
