//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "bindery.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Bindery configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Point [inventory] and [renderer] at your wiki");
                println!("  2. Make sure a Chromium binary is installed (renderer.executable)");
                println!("  3. Validate configuration: bindery validate-config");
                println!("  4. Run export: bindery export");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Bindery Configuration File
# Wiki to PDF exporter

[application]
log_level = "info"

[inventory]
endpoint = "http://localhost:3000/graphql"

[renderer]
executable = "chromium"
base_url = "http://localhost:3000"

[export]
output_dir = "./server/pdf"
batch_size = 5
"#
        .to_string()
    }

    /// Generate configuration with every option documented
    fn generate_config_with_examples() -> String {
        r#"# Bindery Configuration File
# Wiki to PDF exporter
#
# Values may reference environment variables as ${VAR_NAME}.
# Every option can also be overridden with BINDERY_<SECTION>_<KEY>,
# e.g. BINDERY_EXPORT_BATCH_SIZE=8.

[application]
# trace | debug | info | warn | error
log_level = "info"

[inventory]
# GraphQL endpoint listing the wiki pages
endpoint = "http://localhost:3000/graphql"
# Pages carrying this tag are left out of the document
exclusion_tag = "no-pdf"
timeout_seconds = 60

[renderer]
# Chromium or Chrome, driven over the DevTools protocol
executable = "chromium"
# Pages are rendered from {base_url}/{path}
base_url = "http://localhost:3000"
# single: one browser tab, pages one at a time
# batched: one tab per page, a whole batch in parallel
mode = "batched"
# Per-page wait before the render is abandoned
navigation_timeout_ms = 120000
# Page state to wait for before printing:
# load, network_almost_idle (at most 2 open requests) or network_idle
wait_until = "network_almost_idle"
extra_args = ["--disable-dev-shm-usage"]

[export]
output_dir = "./server/pdf"
# Per-page files are named {temp_prefix}{uid}_{index}.pdf
temp_prefix = "bd_tmp_"
# Merged documents are named {dest_prefix}{uid}.pdf
dest_prefix = "BookOfData_"
# Pages rendered concurrently (1-50)
batch_size = 5

[cache]
# A merged document younger than this is reused (default 15 days)
ttl_minutes = 21600

[cleanup]
# Only files older than this are swept
max_age_seconds = 60
# Upper bound on deletions per sweep
max_deletions = 100

[logging]
# JSON log files in addition to console output
local_enabled = false
local_path = "./logs"
# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}
