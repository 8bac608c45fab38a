//! Shared fakes for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use bindery::adapters::browser::{BrowserEngine, BrowserInstance, BrowserSession, RenderError};
use bindery::adapters::inventory::InventorySource;
use bindery::config::{BinderyConfig, RenderMode};
use bindery::domain::{ContentItem, ExportError};
use lopdf::{dictionary, Document, Object, Stream};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Write a one-page PDF whose page carries a `Marker` string
pub fn write_marked_pdf(path: &Path, marker: &str) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(dictionary! {}, b"BT ET".to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Marker" => Object::string_literal(marker),
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

/// Page markers of a merged document, in page order
pub fn page_markers(path: &Path) -> Vec<String> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|page_id| {
            let page = doc.get_dictionary(*page_id).unwrap();
            let marker = page.get(b"Marker").unwrap().as_str().unwrap();
            String::from_utf8_lossy(marker).into_owned()
        })
        .collect()
}

/// File names in `dir` starting with `prefix`
pub fn files_with_prefix(dir: &Path, prefix: &str) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(prefix))
        .collect();
    names.sort();
    names
}

pub fn page(path: &str, tags: &[&str]) -> ContentItem {
    ContentItem::new(path, tags.iter().copied())
}

/// Configuration rooted at `output_dir`
pub fn test_config(output_dir: &Path, mode: RenderMode, batch_size: usize) -> BinderyConfig {
    let mut config = BinderyConfig::default();
    config.export.output_dir = output_dir.display().to_string();
    config.export.batch_size = batch_size;
    config.renderer.mode = mode;
    config
}

/// Inventory with a fixed page list and a call counter
#[derive(Default)]
pub struct FakeInventory {
    pages: Mutex<Vec<ContentItem>>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl FakeInventory {
    pub fn with_pages(pages: Vec<ContentItem>) -> Arc<Self> {
        Arc::new(Self {
            pages: Mutex::new(pages),
            ..Default::default()
        })
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InventorySource for FakeInventory {
    async fn list_pages(&self) -> Result<Vec<ContentItem>, ExportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ExportError::UpstreamUnavailable(
                "connection refused".to_string(),
            ));
        }
        Ok(self.pages.lock().unwrap().clone())
    }

    fn describe(&self) -> String {
        "fake".to_string()
    }
}

/// Counters shared by a fake browser and everything it opens
#[derive(Default)]
pub struct BrowserStats {
    pub launches: AtomicUsize,
    pub closed_instances: AtomicUsize,
    pub sessions: AtomicUsize,
    pub closed_sessions: AtomicUsize,
    pub renders: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl BrowserStats {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Scripted misbehaviour for one page path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The render reports a failure
    Fail,
    /// The render reports a navigation timeout
    Timeout,
    /// The render succeeds but writes something that is not a PDF
    Corrupt,
}

/// Browser that prints a one-page PDF marked with the page path
pub struct FakeBrowser {
    pub stats: Arc<BrowserStats>,
    delay: Duration,
    faults: Mutex<HashMap<String, Fault>>,
}

impl FakeBrowser {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            stats: Arc::new(BrowserStats::default()),
            delay,
            faults: Mutex::new(HashMap::new()),
        })
    }

    /// Make renders of `path` fail
    pub fn fail_on(&self, path: &str) {
        self.inject(path, Fault::Fail);
    }

    /// Make renders of `path` time out
    pub fn time_out_on(&self, path: &str) {
        self.inject(path, Fault::Timeout);
    }

    /// Make renders of `path` write a non-PDF file
    pub fn corrupt_on(&self, path: &str) {
        self.inject(path, Fault::Corrupt);
    }

    fn inject(&self, path: &str, fault: Fault) {
        self.faults.lock().unwrap().insert(path.to_string(), fault);
    }
}

#[async_trait]
impl BrowserEngine for FakeBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserInstance>, RenderError> {
        self.stats.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeInstance {
            stats: Arc::clone(&self.stats),
            delay: self.delay,
            faults: self.faults.lock().unwrap().clone(),
        }))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

struct FakeInstance {
    stats: Arc<BrowserStats>,
    delay: Duration,
    faults: HashMap<String, Fault>,
}

#[async_trait]
impl BrowserInstance for FakeInstance {
    async fn open_session(&self) -> Result<Box<dyn BrowserSession>, RenderError> {
        self.stats.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            stats: Arc::clone(&self.stats),
            delay: self.delay,
            faults: self.faults.clone(),
        }))
    }

    async fn close(&self) {
        self.stats.closed_instances.fetch_add(1, Ordering::SeqCst);
    }
}

struct FakeSession {
    stats: Arc<BrowserStats>,
    delay: Duration,
    faults: HashMap<String, Fault>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn print_to_pdf(&mut self, url: &Url, target: &Path) -> Result<(), RenderError> {
        let now = self.stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);

        let path = url.path().trim_start_matches('/').to_string();
        // Written inline so a dropped render never writes late
        match self.faults.get(&path) {
            Some(Fault::Fail) => {
                return Err(RenderError::Failed(format!("cannot render {path}")));
            }
            Some(Fault::Timeout) => {
                return Err(RenderError::Timeout(Duration::from_millis(1_500)));
            }
            Some(Fault::Corrupt) => {
                std::fs::write(target, b"<html>not a pdf</html>").unwrap();
            }
            None => write_marked_pdf(target, &path),
        }
        self.stats.renders.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) {
        self.stats.closed_sessions.fetch_add(1, Ordering::SeqCst);
    }
}
