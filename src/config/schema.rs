//! Configuration schema types
//!
//! Every section has serde defaults, so an empty file (or no file at all)
//! yields a working configuration that matches the stock wiki deployment.

use crate::domain::{DEFAULT_DEST_PREFIX, DEFAULT_EXCLUSION_TAG, DEFAULT_TEMP_PREFIX};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How the render pool schedules browser sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// One session reused for every page, strictly serial
    Single,
    /// One session per page, a whole batch in parallel
    #[default]
    Batched,
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(RenderMode::Single),
            "batched" => Ok(RenderMode::Batched),
            _ => Err(format!(
                "Invalid render mode '{s}'. Must be one of: single, batched"
            )),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Single => write!(f, "single"),
            RenderMode::Batched => write!(f, "batched"),
        }
    }
}

/// Page lifecycle event a render waits for before printing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WaitUntil {
    /// The `load` event fired
    Load,
    /// At most two network connections for 500 ms
    #[default]
    NetworkAlmostIdle,
    /// No network connections for 500 ms
    NetworkIdle,
}

impl WaitUntil {
    /// Name of the DevTools `Page.lifecycleEvent` that satisfies the wait
    pub fn lifecycle_event(&self) -> &'static str {
        match self {
            WaitUntil::Load => "load",
            WaitUntil::NetworkAlmostIdle => "networkAlmostIdle",
            WaitUntil::NetworkIdle => "networkIdle",
        }
    }
}

impl FromStr for WaitUntil {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "load" => Ok(WaitUntil::Load),
            "network_almost_idle" => Ok(WaitUntil::NetworkAlmostIdle),
            "network_idle" => Ok(WaitUntil::NetworkIdle),
            _ => Err(format!(
                "Invalid wait condition '{s}'. Must be one of: load, network_almost_idle, network_idle"
            )),
        }
    }
}

impl fmt::Display for WaitUntil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitUntil::Load => write!(f, "load"),
            WaitUntil::NetworkAlmostIdle => write!(f, "network_almost_idle"),
            WaitUntil::NetworkIdle => write!(f, "network_idle"),
        }
    }
}

/// Main Bindery configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BinderyConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Page inventory endpoint
    #[serde(default)]
    pub inventory: InventoryConfig,

    /// Headless browser settings
    #[serde(default)]
    pub renderer: RendererConfig,

    /// Output layout and batching
    #[serde(default)]
    pub export: ExportConfig,

    /// Reuse of previously merged documents
    #[serde(default)]
    pub cache: CacheConfig,

    /// Temporary file housekeeping
    #[serde(default)]
    pub cleanup: CleanupConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BinderyConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.inventory.validate()?;
        self.renderer.validate()?;
        self.export.validate()?;
        self.cache.validate()?;
        self.cleanup.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Page inventory (GraphQL) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// GraphQL endpoint answering `pages { list { path, tags } }`
    #[serde(default = "default_inventory_endpoint")]
    pub endpoint: String,

    /// Pages carrying this tag are left out of the document
    #[serde(default = "default_exclusion_tag")]
    pub exclusion_tag: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl InventoryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_empty() {
            return Err("inventory.endpoint cannot be empty".to_string());
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err("inventory.endpoint must start with http:// or https://".to_string());
        }

        if self.exclusion_tag.trim().is_empty() {
            return Err("inventory.exclusion_tag cannot be empty".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("inventory.timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }

    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            endpoint: default_inventory_endpoint(),
            exclusion_tag: default_exclusion_tag(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Headless browser configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Chromium (or Chrome) executable name or path
    #[serde(default = "default_browser_executable")]
    pub executable: String,

    /// Base address the wiki pages are served from
    #[serde(default = "default_render_base_url")]
    pub base_url: String,

    /// Session scheduling mode
    #[serde(default)]
    pub mode: RenderMode,

    /// Wall-clock limit for one page, in milliseconds
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Lifecycle event that marks a page as ready to print
    #[serde(default)]
    pub wait_until: WaitUntil,

    /// Extra command line flags passed to the browser
    #[serde(default = "default_browser_args")]
    pub extra_args: Vec<String>,
}

impl RendererConfig {
    fn validate(&self) -> Result<(), String> {
        if self.executable.trim().is_empty() {
            return Err("renderer.executable cannot be empty".to_string());
        }

        if url::Url::parse(&self.base_url).is_err() {
            return Err(format!(
                "renderer.base_url '{}' is not a valid URL",
                self.base_url
            ));
        }

        if self.navigation_timeout_ms == 0 {
            return Err("renderer.navigation_timeout_ms must be > 0".to_string());
        }

        Ok(())
    }

    /// Navigation limit as a duration
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            executable: default_browser_executable(),
            base_url: default_render_base_url(),
            mode: RenderMode::default(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            wait_until: WaitUntil::default(),
            extra_args: default_browser_args(),
        }
    }
}

/// Export output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory holding temporary and merged documents
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// File name prefix of per-page artifacts
    #[serde(default = "default_temp_prefix")]
    pub temp_prefix: String,

    /// File name prefix of merged documents
    #[serde(default = "default_dest_prefix")]
    pub dest_prefix: String,

    /// Pages rendered concurrently per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.output_dir.trim().is_empty() {
            return Err("export.output_dir cannot be empty".to_string());
        }

        if self.temp_prefix.is_empty() || self.dest_prefix.is_empty() {
            return Err("export.temp_prefix and export.dest_prefix cannot be empty".to_string());
        }

        // Prefix matching must never confuse the two kinds of files
        if self.dest_prefix.starts_with(&self.temp_prefix)
            || can_appear_in_temp_name(&self.temp_prefix, &self.dest_prefix)
        {
            return Err(format!(
                "export.temp_prefix '{}' and export.dest_prefix '{}' must not overlap",
                self.temp_prefix, self.dest_prefix
            ));
        }

        if self.batch_size == 0 || self.batch_size > 50 {
            return Err(format!(
                "export.batch_size must be between 1 and 50, got {}",
                self.batch_size
            ));
        }

        Ok(())
    }
}

/// Characters that may follow the temp prefix in a temporary file name:
/// the hyphenated lowercase uid, the index or `merged`, and the extension
const TEMP_NAME_TAIL_CHARS: &str = "0123456789abcdef-_.pdfmerg";

/// True if `dest_prefix` can occur anywhere inside
/// `{temp_prefix}{uid}_{index}.pdf` or `{temp_prefix}{uid}_merged.pdf`
fn can_appear_in_temp_name(temp_prefix: &str, dest_prefix: &str) -> bool {
    if temp_prefix.contains(dest_prefix) {
        return true;
    }

    // A match may start inside the temp prefix and run on into the tail
    (0..=dest_prefix.len())
        .filter(|&split| dest_prefix.is_char_boundary(split))
        .filter(|&split| temp_prefix.ends_with(&dest_prefix[..split]))
        .any(|split| {
            dest_prefix[split..]
                .chars()
                .all(|c| TEMP_NAME_TAIL_CHARS.contains(c))
        })
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            temp_prefix: default_temp_prefix(),
            dest_prefix: default_dest_prefix(),
            batch_size: default_batch_size(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// A merged document younger than this is reused (minutes)
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: u64,
}

impl CacheConfig {
    fn validate(&self) -> Result<(), String> {
        if self.ttl_minutes == 0 {
            return Err("cache.ttl_minutes must be > 0".to_string());
        }
        Ok(())
    }

    /// Freshness window as a duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_minutes.saturating_mul(60))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_ttl_minutes(),
        }
    }
}

/// Cleanup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Files older than this are eligible for removal (seconds)
    #[serde(default = "default_cleanup_max_age_seconds")]
    pub max_age_seconds: u64,

    /// Upper bound of removals per sweep
    #[serde(default = "default_cleanup_max_deletions")]
    pub max_deletions: usize,
}

impl CleanupConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_deletions == 0 {
            return Err("cleanup.max_deletions must be > 0".to_string());
        }
        Ok(())
    }

    /// Age threshold as a duration
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            max_age_seconds: default_cleanup_max_age_seconds(),
            max_deletions: default_cleanup_max_deletions(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log file directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_inventory_endpoint() -> String {
    "http://localhost:3000/graphql".to_string()
}

fn default_exclusion_tag() -> String {
    DEFAULT_EXCLUSION_TAG.to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_browser_executable() -> String {
    "chromium".to_string()
}

fn default_render_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_navigation_timeout_ms() -> u64 {
    120_000
}

fn default_browser_args() -> Vec<String> {
    vec!["--disable-dev-shm-usage".to_string()]
}

fn default_output_dir() -> String {
    "./server/pdf".to_string()
}

fn default_temp_prefix() -> String {
    DEFAULT_TEMP_PREFIX.to_string()
}

fn default_dest_prefix() -> String {
    DEFAULT_DEST_PREFIX.to_string()
}

fn default_batch_size() -> usize {
    5
}

fn default_ttl_minutes() -> u64 {
    21_600
}

fn default_cleanup_max_age_seconds() -> u64 {
    60
}

fn default_cleanup_max_deletions() -> usize {
    100
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BinderyConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inventory_config_validation() {
        let mut config = InventoryConfig::default();
        assert!(config.validate().is_ok());

        config.endpoint = "localhost:3000/graphql".to_string();
        assert!(config.validate().is_err());

        config.endpoint = String::new();
        assert!(config.validate().is_err());

        config = InventoryConfig::default();
        config.exclusion_tag = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_renderer_config_validation() {
        let mut config = RendererConfig::default();
        assert!(config.validate().is_ok());

        config.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config = RendererConfig::default();
        config.navigation_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wait_until_parsing() {
        assert_eq!(WaitUntil::default(), WaitUntil::NetworkAlmostIdle);
        assert_eq!("load".parse::<WaitUntil>().unwrap(), WaitUntil::Load);
        assert_eq!(
            "NETWORK_IDLE".parse::<WaitUntil>().unwrap(),
            WaitUntil::NetworkIdle
        );
        assert!("networkidle2".parse::<WaitUntil>().is_err());
        assert_eq!(WaitUntil::NetworkAlmostIdle.lifecycle_event(), "networkAlmostIdle");
        assert_eq!(WaitUntil::NetworkIdle.to_string(), "network_idle");
    }

    #[test]
    fn test_export_config_validation() {
        let mut config = ExportConfig::default();
        assert!(config.validate().is_ok());

        config.batch_size = 0;
        assert!(config.validate().is_err());

        config.batch_size = 51;
        assert!(config.validate().is_err());

        config.batch_size = 5;
        config.dest_prefix = "bd_tmp_".to_string();
        assert!(config.validate().is_err());

        config.dest_prefix = "bd_".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dest_prefix_must_not_match_temporary_names() {
        let mut config = ExportConfig::default();

        // Each of these occurs in some `bd_tmp_<uid>_<n>.pdf`
        for prefix in ["a", "0", "be", "3fa85f64-", "_merged", "p_a", "tmp_", ".pdf"] {
            config.dest_prefix = prefix.to_string();
            assert!(
                config.validate().is_err(),
                "dest_prefix '{prefix}' should be rejected"
            );
        }

        for prefix in ["BookOfData_", "Handbook_", "wiki-export-", "x"] {
            config.dest_prefix = prefix.to_string();
            assert!(
                config.validate().is_ok(),
                "dest_prefix '{prefix}' should be accepted"
            );
        }
    }

    #[test]
    fn test_cache_ttl_is_minutes() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl_minutes, 21_600);
        assert_eq!(config.ttl(), Duration::from_secs(15 * 24 * 60 * 60));

        let zero = CacheConfig { ttl_minutes: 0 };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_cache_ttl_saturates_for_huge_values() {
        let config = CacheConfig {
            ttl_minutes: u64::MAX / 2,
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.ttl(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_cleanup_config_validation() {
        let mut config = CleanupConfig::default();
        assert_eq!(config.max_deletions, 100);
        assert!(config.validate().is_ok());

        config.max_deletions = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(!config.local_enabled);
        assert_eq!(config.local_rotation, "daily");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_render_mode_parsing() {
        assert_eq!("single".parse::<RenderMode>().unwrap(), RenderMode::Single);
        assert_eq!("BATCHED".parse::<RenderMode>().unwrap(), RenderMode::Batched);
        assert!("parallel".parse::<RenderMode>().is_err());
        assert_eq!(RenderMode::default().to_string(), "batched");
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_batch_size(), 5);
        assert_eq!(default_temp_prefix(), "bd_tmp_");
        assert_eq!(default_dest_prefix(), "BookOfData_");
        assert_eq!(default_exclusion_tag(), "no-pdf");
        assert_eq!(default_cleanup_max_deletions(), 100);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: BinderyConfig = toml::from_str("").unwrap();
        assert_eq!(config.export.batch_size, 5);
        assert_eq!(config.renderer.mode, RenderMode::Batched);
        assert_eq!(config.inventory.endpoint, "http://localhost:3000/graphql");
    }
}
