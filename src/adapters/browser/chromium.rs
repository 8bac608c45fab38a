//! Chromium backend over the DevTools protocol
//!
//! One Chromium process is launched per instance, with a throwaway profile
//! directory. Every session is a tab in that process. A render navigates the
//! tab, waits for the configured `Page.lifecycleEvent` of the new document
//! and prints it with `Page.printToPDF`.

use super::engine::{BrowserEngine, BrowserInstance, BrowserSession, RenderError};
use crate::config::{RendererConfig, WaitUntil};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    EventLifecycleEvent, PrintToPdfParams, SetLifecycleEventsEnabledParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use url::Url;

/// Flags passed on every launch, before the configured extras
const BASE_ARGS: &[&str] = &["--disable-gpu", "--hide-scrollbars"];

/// Page margin on every side, one CSS pixel in inches
const PAGE_MARGIN_INCHES: f64 = 1.0 / 96.0;

#[derive(Debug)]
struct LaunchSettings {
    executable: PathBuf,
    navigation_timeout: Duration,
    wait_until: WaitUntil,
    extra_args: Vec<String>,
}

impl LaunchSettings {
    fn args(&self) -> Vec<String> {
        BASE_ARGS
            .iter()
            .map(|arg| arg.to_string())
            .chain(self.extra_args.iter().cloned())
            .collect()
    }

    fn browser_config(&self, profile_dir: &Path) -> Result<BrowserConfig, RenderError> {
        BrowserConfig::builder()
            .chrome_executable(&self.executable)
            .user_data_dir(profile_dir)
            .request_timeout(self.navigation_timeout)
            .args(self.args())
            .build()
            .map_err(|e| RenderError::Failed(format!("invalid browser configuration: {e}")))
    }
}

/// Chromium-family browser driven through DevTools
pub struct ChromiumEngine {
    settings: Arc<LaunchSettings>,
}

impl ChromiumEngine {
    /// Create an engine from renderer configuration
    pub fn new(config: &RendererConfig) -> Self {
        Self {
            settings: Arc::new(LaunchSettings {
                executable: PathBuf::from(&config.executable),
                navigation_timeout: config.navigation_timeout(),
                wait_until: config.wait_until,
                extra_args: config.extra_args.clone(),
            }),
        }
    }
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    async fn launch(&self) -> Result<Box<dyn BrowserInstance>, RenderError> {
        let profile_root = tempfile::Builder::new()
            .prefix("bindery-chromium-")
            .tempdir()
            .map_err(|e| RenderError::Failed(format!("failed to create browser profile: {e}")))?;

        let config = self.settings.browser_config(profile_root.path())?;
        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            RenderError::Failed(format!(
                "failed to launch {}: {e}",
                self.settings.executable.display()
            ))
        })?;

        // The connection only makes progress while its handler is polled
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "DevTools connection error");
                }
            }
        });

        tracing::debug!(
            executable = %self.settings.executable.display(),
            profile_root = %profile_root.path().display(),
            "Launched Chromium instance"
        );

        Ok(Box::new(ChromiumInstance {
            settings: Arc::clone(&self.settings),
            browser: Mutex::new(browser),
            handler_task,
            _profile_root: profile_root,
            sessions: AtomicUsize::new(0),
        }))
    }

    fn name(&self) -> &str {
        "chromium"
    }
}

struct ChromiumInstance {
    settings: Arc<LaunchSettings>,
    browser: Mutex<Browser>,
    handler_task: JoinHandle<()>,
    _profile_root: TempDir,
    sessions: AtomicUsize,
}

#[async_trait]
impl BrowserInstance for ChromiumInstance {
    async fn open_session(&self) -> Result<Box<dyn BrowserSession>, RenderError> {
        let page = {
            let browser = self.browser.lock().await;
            browser.new_page("about:blank").await
        }
        .map_err(|e| cdp_error("failed to open tab", e, self.settings.navigation_timeout))?;

        page.execute(SetLifecycleEventsEnabledParams::new(true))
            .await
            .map_err(|e| {
                cdp_error(
                    "failed to enable lifecycle events",
                    e,
                    self.settings.navigation_timeout,
                )
            })?;

        self.sessions.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(ChromiumSession {
            settings: Arc::clone(&self.settings),
            page,
        }))
    }

    async fn close(&self) {
        let mut browser = self.browser.lock().await;
        if let Err(e) = browser.close().await {
            tracing::debug!(error = %e, "Chromium did not acknowledge close");
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!(error = %e, "Failed to reap Chromium process");
        }
        self.handler_task.abort();

        tracing::debug!(
            sessions = self.sessions.load(Ordering::Relaxed),
            "Closed Chromium instance"
        );
    }
}

struct ChromiumSession {
    settings: Arc<LaunchSettings>,
    page: Page,
}

impl ChromiumSession {
    /// Navigate and wait until the new document reaches the wanted state
    async fn settle(&self, url: &Url) -> Result<(), RenderError> {
        let wait = self.settings.navigation_timeout;
        let main_frame = self
            .page
            .mainframe()
            .await
            .map_err(|e| cdp_error("failed to resolve main frame", e, wait))?;

        // Subscribed before navigating so no event of the new document is missed
        let mut lifecycle = self
            .page
            .event_listener::<EventLifecycleEvent>()
            .await
            .map_err(|e| cdp_error("failed to watch page lifecycle", e, wait))?;

        self.page
            .goto(url.as_str())
            .await
            .map_err(|e| cdp_error("navigation failed", e, wait))?;

        let wanted = self.settings.wait_until.lifecycle_event();
        let mut loader = None;
        while let Some(event) = lifecycle.next().await {
            if main_frame.as_ref().is_some_and(|frame| *frame != event.frame_id) {
                continue;
            }
            // `init` starts the events of a new document
            if event.name == "init" {
                loader = Some(event.loader_id.clone());
            } else if event.name == wanted && loader.as_ref() == Some(&event.loader_id) {
                return Ok(());
            }
        }

        Err(RenderError::Failed(
            "tab closed before the page settled".to_string(),
        ))
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn print_to_pdf(&mut self, url: &Url, target: &Path) -> Result<(), RenderError> {
        let started_at = Instant::now();
        let wait = self.settings.navigation_timeout;

        match tokio::time::timeout(wait, self.settle(url)).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(
                    url = %url,
                    wait_until = %self.settings.wait_until,
                    "Page did not settle before the navigation timeout"
                );
                return Err(RenderError::Timeout(wait));
            }
        }

        let pdf = self
            .page
            .pdf(print_params())
            .await
            .map_err(|e| cdp_error("printing failed", e, wait))?;
        if pdf.is_empty() {
            return Err(RenderError::Failed(format!(
                "browser produced an empty document for {url}"
            )));
        }

        tokio::fs::write(target, &pdf).await.map_err(|e| {
            RenderError::Failed(format!("failed to write {}: {e}", target.display()))
        })?;

        tracing::trace!(
            url = %url,
            bytes = pdf.len(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "Printed page"
        );
        Ok(())
    }

    async fn close(&self) {
        if let Err(e) = self.page.clone().close().await {
            tracing::debug!(error = %e, "Failed to close tab");
        }
    }
}

fn print_params() -> PrintToPdfParams {
    PrintToPdfParams::builder()
        .print_background(true)
        .margin_top(PAGE_MARGIN_INCHES)
        .margin_bottom(PAGE_MARGIN_INCHES)
        .margin_left(PAGE_MARGIN_INCHES)
        .margin_right(PAGE_MARGIN_INCHES)
        .build()
}

fn cdp_error(context: &str, error: CdpError, wait: Duration) -> RenderError {
    match error {
        CdpError::Timeout => RenderError::Timeout(wait),
        other => RenderError::Failed(format!("{context}: {other}")),
    }
}
