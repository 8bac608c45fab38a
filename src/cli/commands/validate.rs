//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Bindery configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading applies env overrides and validates
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Inventory Endpoint: {}", config.inventory.endpoint);
        println!("  Exclusion Tag: {}", config.inventory.exclusion_tag);
        println!("  Browser: {}", config.renderer.executable);
        println!("  Render Base URL: {}", config.renderer.base_url);
        println!("  Render Mode: {}", config.renderer.mode);
        println!(
            "  Navigation Timeout: {}ms",
            config.renderer.navigation_timeout_ms
        );
        println!("  Output Directory: {}", config.export.output_dir);
        println!("  Batch Size: {}", config.export.batch_size);
        println!("  Cache TTL: {} minutes", config.cache.ttl_minutes);
        println!(
            "  Cleanup: files older than {}s, at most {} per sweep",
            config.cleanup.max_age_seconds, config.cleanup.max_deletions
        );
        if config.logging.local_enabled {
            println!(
                "  File Logging: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        }
        println!();

        Ok(0)
    }
}
