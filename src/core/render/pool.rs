//! Render session pool

use crate::adapters::browser::{BrowserEngine, BrowserInstance, BrowserSession, RenderError};
use crate::config::{RenderMode, RendererConfig};
use crate::domain::{BinderyError, ContentItem, ExportError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

/// Path reported when the browser itself cannot be started
const BROWSER_PLACEHOLDER_PATH: &str = "<browser>";

/// Renders one content item into one PDF file
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, item: &ContentItem, target: &Path) -> std::result::Result<(), ExportError>;
}

/// Factory for per-job render runs
#[derive(Clone)]
pub struct RenderPool {
    engine: Arc<dyn BrowserEngine>,
    base_url: Url,
    mode: RenderMode,
}

impl RenderPool {
    /// Create a pool from renderer configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `base_url` is not a valid URL.
    pub fn new(engine: Arc<dyn BrowserEngine>, config: &RendererConfig) -> Result<Self> {
        Self::with_mode(engine, &config.base_url, config.mode)
    }

    /// Create a pool with an explicit base URL and mode
    pub fn with_mode(engine: Arc<dyn BrowserEngine>, base_url: &str, mode: RenderMode) -> Result<Self> {
        // Url::join replaces the last segment unless the base ends with '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized).map_err(|e| {
            BinderyError::Configuration(format!("Invalid render base URL '{base_url}': {e}"))
        })?;

        Ok(Self {
            engine,
            base_url,
            mode,
        })
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// URL the browser navigates to for `item`
    pub fn page_url(&self, item: &ContentItem) -> std::result::Result<Url, ExportError> {
        self.base_url
            .join(item.path.trim_start_matches('/'))
            .map_err(|e| ExportError::render_failure(&item.path, format!("invalid page URL: {e}")))
    }

    /// Launch a browser instance for one job
    ///
    /// In single mode the only session is opened here as well.
    pub async fn start(&self) -> std::result::Result<RenderRun, ExportError> {
        let instance = self
            .engine
            .launch()
            .await
            .map_err(|e| map_render_error(BROWSER_PLACEHOLDER_PATH, e))?;

        let shared_session = match self.mode {
            RenderMode::Single => match instance.open_session().await {
                Ok(session) => Some(Mutex::new(session)),
                Err(e) => {
                    instance.close().await;
                    return Err(map_render_error(BROWSER_PLACEHOLDER_PATH, e));
                }
            },
            RenderMode::Batched => None,
        };

        tracing::debug!(engine = self.engine.name(), mode = %self.mode, "Render run started");

        Ok(RenderRun {
            pool: self.clone(),
            instance,
            shared_session,
        })
    }
}

/// One job's browser instance and, in single mode, its only session
pub struct RenderRun {
    pool: RenderPool,
    instance: Box<dyn BrowserInstance>,
    shared_session: Option<Mutex<Box<dyn BrowserSession>>>,
}

impl RenderRun {
    /// Close the session (single mode) and the browser instance
    pub async fn shutdown(self) {
        if let Some(session) = self.shared_session {
            session.into_inner().close().await;
        }
        self.instance.close().await;
        tracing::debug!("Render run shut down");
    }
}

#[async_trait]
impl PageRenderer for RenderRun {
    async fn render(&self, item: &ContentItem, target: &Path) -> std::result::Result<(), ExportError> {
        let url = self.pool.page_url(item)?;
        tracing::debug!(path = %item.path, url = %url, target = %target.display(), "Rendering page");

        let result = match &self.shared_session {
            Some(shared) => {
                let mut session = shared.lock().await;
                session.print_to_pdf(&url, target).await
            }
            None => {
                let mut session = self
                    .instance
                    .open_session()
                    .await
                    .map_err(|e| map_render_error(&item.path, e))?;
                let result = session.print_to_pdf(&url, target).await;
                session.close().await;
                result
            }
        };

        result.map_err(|e| map_render_error(&item.path, e))
    }
}

fn map_render_error(path: &str, error: RenderError) -> ExportError {
    match error {
        RenderError::Timeout(wait) => ExportError::RenderTimeout {
            path: path.to_string(),
            timeout_ms: wait.as_millis() as u64,
        },
        RenderError::Failed(message) => ExportError::render_failure(path, message),
    }
}
