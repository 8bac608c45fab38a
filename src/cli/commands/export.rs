//! Export command implementation
//!
//! This module implements the `export` command, which produces (or reuses)
//! the merged document and prints its path.

use crate::config::{load_config_or_default, RenderMode};
use crate::core::export::ExportOrchestrator;
use crate::domain::{BinderyError, ExportError, ExportRequest};
use clap::Args;
use std::str::FromStr;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Regenerate even if a fresh document exists
    #[arg(long)]
    pub refresh: bool,

    /// Override the number of pages rendered per batch
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Override the render mode (single or batched)
    #[arg(long, value_name = "MODE")]
    pub render_mode: Option<String>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(refresh = self.refresh, "Starting export command");

        let mut config = match load_config_or_default(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        // Apply CLI overrides
        if let Some(batch_size) = self.batch_size {
            tracing::info!(batch_size, "Overriding batch size from CLI");
            config.export.batch_size = batch_size;
        }

        if let Some(mode) = &self.render_mode {
            match RenderMode::from_str(mode) {
                Ok(mode) => {
                    tracing::info!(mode = %mode, "Overriding render mode from CLI");
                    config.renderer.mode = mode;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Invalid render mode");
                    eprintln!("{e}");
                    return Ok(2);
                }
            }
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let orchestrator = match ExportOrchestrator::from_config(&config) {
            Ok(orchestrator) => orchestrator,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create export orchestrator");
                eprintln!("Failed to initialize export: {e}");
                return Ok(setup_exit_code(&e));
            }
        };

        match orchestrator
            .export(ExportRequest {
                refresh: self.refresh,
            })
            .await
        {
            Ok(outcome) => {
                if outcome.is_cache_hit() {
                    eprintln!("♻️  Reusing cached document");
                } else {
                    eprintln!(
                        "✅ Exported {} page(s) in {:.1}s",
                        outcome.item_count,
                        outcome.duration.as_secs_f64()
                    );
                }
                println!("{}", outcome.path.display());
                Ok(0)
            }
            Err(e) => {
                eprintln!("❌ Export failed: {e}");
                Ok(export_exit_code(&e))
            }
        }
    }
}

/// Exit code for a failed export
pub fn export_exit_code(error: &ExportError) -> i32 {
    match error {
        ExportError::UpstreamUnavailable(_) => 4,
        _ => 5,
    }
}

fn setup_exit_code(error: &BinderyError) -> i32 {
    match error {
        BinderyError::Configuration(_) => 2,
        _ => 5,
    }
}
