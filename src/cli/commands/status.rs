//! Status command implementation
//!
//! Lists merged documents in the output directory with their age and whether
//! the next export would reuse them, plus any leftover temporary files.

use crate::config::load_config_or_default;
use crate::core::cache::ArtifactCache;
use chrono::{DateTime, Utc};
use clap::Args;
use std::time::SystemTime;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Also list temporary per-page files
    #[arg(long)]
    pub show_temp: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking export status");

        println!("📊 Export Status");
        println!();

        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(2);
            }
        };

        let cache = ArtifactCache::new(&config.export.output_dir);
        let documents = match cache.list(&config.export.dest_prefix).await {
            Ok(documents) => documents,
            Err(e) => {
                println!("❌ Failed to read output directory");
                println!("   Error: {}", e);
                return Ok(5);
            }
        };

        let now = SystemTime::now();
        let ttl = config.cache.ttl();

        if documents.is_empty() {
            println!("No merged documents in {}.", config.export.output_dir);
            println!("Run 'bindery export' to create one.");
        } else {
            println!("Found {} document(s):", documents.len());
            println!();
            println!("{:<56} {:<26} {:>12} {:>6}", "File", "Created", "Age", "Fresh");
            println!("{}", "-".repeat(104));
            for document in &documents {
                let age = document.age_at(now);
                let created: DateTime<Utc> = document.created_at.into();
                println!(
                    "{:<56} {:<26} {:>12} {:>6}",
                    document.file_name,
                    created.format("%Y-%m-%d %H:%M:%S UTC"),
                    format_age(age.as_secs()),
                    if age < ttl { "yes" } else { "no" }
                );
            }
        }

        let temporary = cache.list(&config.export.temp_prefix).await.unwrap_or_default();
        println!();
        println!("Temporary files: {}", temporary.len());
        if self.show_temp {
            for file in &temporary {
                println!("  {}", file.file_name);
            }
        }
        println!();

        Ok(0)
    }
}

fn format_age(secs: u64) -> String {
    match secs {
        s if s < 60 => format!("{s}s"),
        s if s < 3_600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h {}m", s / 3_600, (s % 3_600) / 60),
        s => format!("{}d {}h", s / 86_400, (s % 86_400) / 3_600),
    }
}
