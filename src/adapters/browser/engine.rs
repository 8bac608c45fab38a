//! Headless browser traits
//!
//! The render pool drives a browser through three levels:
//!
//! - [`BrowserEngine`] launches an instance
//! - [`BrowserInstance`] hands out isolated sessions
//! - [`BrowserSession`] prints one URL to one PDF file at a time
//!
//! Whether sessions share an instance for the whole job or are opened per
//! page is decided by the pool, not by the backend.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Failure reported by a browser backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    /// The page did not settle before the navigation timeout
    #[error("navigation did not settle within {0:?}")]
    Timeout(Duration),

    /// Launch, navigation or printing failed
    #[error("{0}")]
    Failed(String),
}

/// Launches browser instances
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Start a new headless instance
    async fn launch(&self) -> Result<Box<dyn BrowserInstance>, RenderError>;

    /// Backend name used in log records
    fn name(&self) -> &str;
}

/// A running browser
#[async_trait]
pub trait BrowserInstance: Send + Sync {
    /// Open an isolated session (tab or profile)
    async fn open_session(&self) -> Result<Box<dyn BrowserSession>, RenderError>;

    /// Release every resource held by the instance
    async fn close(&self);
}

/// One browser tab
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate to `url`, wait for the network to go idle and write the page
    /// as PDF to `target`
    async fn print_to_pdf(&mut self, url: &Url, target: &Path) -> Result<(), RenderError>;

    /// Release the session
    async fn close(&self);
}
