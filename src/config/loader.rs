//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::BinderyConfig;
use crate::domain::errors::BinderyError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Legacy variable honoured for the batch size
const LEGACY_BATCH_SIZE_VAR: &str = "PDF_EXPORT_BATCH_SIZE";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into BinderyConfig
/// 4. Applies environment variable overrides (BINDERY_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsing fails, a referenced
/// environment variable is missing, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use bindery::config::loader::load_config;
///
/// let config = load_config("bindery.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<BinderyConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(BinderyError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BinderyError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: BinderyConfig = toml::from_str(&contents)
        .map_err(|e| BinderyError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    finish(&mut config)?;
    Ok(config)
}

/// Loads the file if it exists, otherwise starts from defaults
///
/// Environment overrides and validation apply in both cases.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<BinderyConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(
        path = %path.display(),
        "Configuration file not found, using defaults"
    );
    let mut config = BinderyConfig::default();
    finish(&mut config)?;
    Ok(config)
}

fn finish(config: &mut BinderyConfig) -> Result<()> {
    apply_env_overrides(config)?;

    config.validate().map_err(|e| {
        BinderyError::Configuration(format!("Configuration validation failed: {}", e))
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| BinderyError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(BinderyError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Parses a numeric override, rejecting garbage instead of ignoring it
fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        BinderyError::Configuration(format!("Invalid value '{value}' for {name}"))
    })
}

/// Applies environment variable overrides using the BINDERY_* prefix
///
/// Variables follow the pattern `BINDERY_<SECTION>_<KEY>`, for example
/// `BINDERY_EXPORT_BATCH_SIZE` or `BINDERY_CACHE_TTL_MINUTES`.
fn apply_env_overrides(config: &mut BinderyConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("BINDERY_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Inventory overrides
    if let Ok(val) = std::env::var("BINDERY_INVENTORY_ENDPOINT") {
        config.inventory.endpoint = val;
    }
    if let Ok(val) = std::env::var("BINDERY_INVENTORY_EXCLUSION_TAG") {
        config.inventory.exclusion_tag = val;
    }
    if let Ok(val) = std::env::var("BINDERY_INVENTORY_TIMEOUT_SECONDS") {
        config.inventory.timeout_seconds =
            parse_override("BINDERY_INVENTORY_TIMEOUT_SECONDS", &val)?;
    }

    // Renderer overrides
    if let Ok(val) = std::env::var("BINDERY_RENDERER_EXECUTABLE") {
        config.renderer.executable = val;
    }
    if let Ok(val) = std::env::var("BINDERY_RENDERER_BASE_URL") {
        config.renderer.base_url = val;
    }
    if let Ok(val) = std::env::var("BINDERY_RENDERER_MODE") {
        config.renderer.mode = val.parse().map_err(BinderyError::Configuration)?;
    }
    if let Ok(val) = std::env::var("BINDERY_RENDERER_NAVIGATION_TIMEOUT_MS") {
        config.renderer.navigation_timeout_ms =
            parse_override("BINDERY_RENDERER_NAVIGATION_TIMEOUT_MS", &val)?;
    }
    if let Ok(val) = std::env::var("BINDERY_RENDERER_WAIT_UNTIL") {
        config.renderer.wait_until = val.parse().map_err(BinderyError::Configuration)?;
    }

    // Export overrides
    if let Ok(val) = std::env::var("BINDERY_EXPORT_OUTPUT_DIR") {
        config.export.output_dir = val;
    }
    if let Ok(val) = std::env::var(LEGACY_BATCH_SIZE_VAR) {
        config.export.batch_size = parse_override(LEGACY_BATCH_SIZE_VAR, &val)?;
    }
    if let Ok(val) = std::env::var("BINDERY_EXPORT_BATCH_SIZE") {
        config.export.batch_size = parse_override("BINDERY_EXPORT_BATCH_SIZE", &val)?;
    }

    // Cache overrides
    if let Ok(val) = std::env::var("BINDERY_CACHE_TTL_MINUTES") {
        config.cache.ttl_minutes = parse_override("BINDERY_CACHE_TTL_MINUTES", &val)?;
    }

    // Cleanup overrides
    if let Ok(val) = std::env::var("BINDERY_CLEANUP_MAX_AGE_SECONDS") {
        config.cleanup.max_age_seconds =
            parse_override("BINDERY_CLEANUP_MAX_AGE_SECONDS", &val)?;
    }
    if let Ok(val) = std::env::var("BINDERY_CLEANUP_MAX_DELETIONS") {
        config.cleanup.max_deletions = parse_override("BINDERY_CLEANUP_MAX_DELETIONS", &val)?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("BINDERY_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("BINDERY_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
