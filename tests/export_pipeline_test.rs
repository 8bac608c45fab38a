//! End-to-end tests of the export pipeline with fake inventory and browser

mod common;

use bindery::config::RenderMode;
use bindery::core::export::ExportOrchestrator;
use bindery::domain::{ExportError, ExportRequest};
use common::{
    files_with_prefix, page, page_markers, test_config, BrowserStats, FakeBrowser, FakeInventory,
};
use std::fs::File;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn orchestrator(
    dir: &TempDir,
    inventory: &Arc<FakeInventory>,
    browser: &Arc<FakeBrowser>,
    mode: RenderMode,
    batch_size: usize,
) -> ExportOrchestrator {
    let config = test_config(dir.path(), mode, batch_size);
    ExportOrchestrator::new(&config, inventory.clone(), browser.clone()).unwrap()
}

fn numbered_pages(count: usize) -> Vec<bindery::domain::ContentItem> {
    (0..count).map(|i| page(&format!("page-{i:02}"), &[])).collect()
}

#[tokio::test]
async fn test_export_drops_excluded_pages_and_sorts() {
    let dir = TempDir::new().unwrap();
    let inventory = FakeInventory::with_pages(vec![
        page("b", &[]),
        page("a", &["no-pdf"]),
        page("c", &["guide"]),
    ]);
    let browser = FakeBrowser::new(Duration::ZERO);
    let orchestrator = orchestrator(&dir, &inventory, &browser, RenderMode::Batched, 5);

    let outcome = orchestrator.export(ExportRequest::default()).await.unwrap();

    assert!(!outcome.is_cache_hit());
    assert_eq!(outcome.item_count, 2);
    assert_eq!(page_markers(&outcome.path), vec!["b", "c"]);

    let file_name = outcome.path.file_name().unwrap().to_string_lossy().to_string();
    let uid = outcome.uid.unwrap();
    assert_eq!(file_name, format!("BookOfData_{uid}.pdf"));

    // Nothing temporary survives a successful job
    assert!(files_with_prefix(dir.path(), "bd_tmp_").is_empty());
}

#[tokio::test]
async fn test_second_export_is_served_from_cache() {
    let dir = TempDir::new().unwrap();
    let inventory = FakeInventory::with_pages(vec![page("home", &[]), page("about", &[])]);
    let browser = FakeBrowser::new(Duration::ZERO);
    let orchestrator = orchestrator(&dir, &inventory, &browser, RenderMode::Batched, 5);

    let first = orchestrator.export_document(false).await.unwrap();
    let second = orchestrator.export(ExportRequest::default()).await.unwrap();

    assert!(second.is_cache_hit());
    assert_eq!(second.path, first);
    assert_eq!(inventory.calls(), 1);
    assert_eq!(BrowserStats::get(&browser.stats.launches), 1);
    assert_eq!(BrowserStats::get(&browser.stats.renders), 2);
}

#[tokio::test]
async fn test_refresh_generates_a_new_document() {
    let dir = TempDir::new().unwrap();
    let inventory = FakeInventory::with_pages(vec![page("home", &[])]);
    let browser = FakeBrowser::new(Duration::ZERO);
    let orchestrator = orchestrator(&dir, &inventory, &browser, RenderMode::Batched, 5);

    let first = orchestrator.export(ExportRequest::default()).await.unwrap();
    let refreshed = orchestrator
        .export(ExportRequest { refresh: true })
        .await
        .unwrap();

    assert!(!refreshed.is_cache_hit());
    assert_ne!(refreshed.uid, first.uid);
    assert_ne!(refreshed.path, first.path);
    assert!(refreshed.path.exists());
    assert_eq!(inventory.calls(), 2);
}

#[tokio::test]
async fn test_render_failure_leaves_no_destination() {
    let dir = TempDir::new().unwrap();
    let inventory = FakeInventory::with_pages(numbered_pages(7));
    let browser = FakeBrowser::new(Duration::from_millis(5));
    browser.fail_on("page-03");
    let orchestrator = orchestrator(&dir, &inventory, &browser, RenderMode::Batched, 5);

    let err = orchestrator
        .export(ExportRequest::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "render_failure");
    assert!(files_with_prefix(dir.path(), "BookOfData_").is_empty());
    assert!(files_with_prefix(dir.path(), "bd_tmp_").is_empty());

    // Fail-fast: the second batch never starts
    assert!(BrowserStats::get(&browser.stats.sessions) <= 5);
    // The browser is torn down on failure too
    assert_eq!(
        BrowserStats::get(&browser.stats.closed_instances),
        BrowserStats::get(&browser.stats.launches)
    );
}

#[tokio::test]
async fn test_render_timeout_is_reported() {
    let dir = TempDir::new().unwrap();
    let inventory = FakeInventory::with_pages(numbered_pages(3));
    let browser = FakeBrowser::new(Duration::ZERO);
    browser.time_out_on("page-01");
    let orchestrator = orchestrator(&dir, &inventory, &browser, RenderMode::Single, 5);

    let err = orchestrator.export_document(false).await.unwrap_err();

    assert_eq!(
        err,
        ExportError::RenderTimeout {
            path: "page-01".to_string(),
            timeout_ms: 1_500,
        }
    );
    assert!(files_with_prefix(dir.path(), "BookOfData_").is_empty());
    assert!(files_with_prefix(dir.path(), "bd_tmp_").is_empty());
    assert_eq!(BrowserStats::get(&browser.stats.closed_instances), 1);
}

#[tokio::test]
async fn test_merge_failure_leaves_no_files() {
    let dir = TempDir::new().unwrap();
    let inventory = FakeInventory::with_pages(numbered_pages(4));
    let browser = FakeBrowser::new(Duration::ZERO);
    browser.corrupt_on("page-02");
    let orchestrator = orchestrator(&dir, &inventory, &browser, RenderMode::Batched, 5);

    let err = orchestrator.export_document(false).await.unwrap_err();

    assert!(matches!(err, ExportError::MergeFailure(_)), "{err:?}");
    assert!(files_with_prefix(dir.path(), "BookOfData_").is_empty());
    // Neither per-page files nor the merge scratch file survive
    assert!(files_with_prefix(dir.path(), "bd_tmp_").is_empty());
    assert_eq!(BrowserStats::get(&browser.stats.renders), 4);
}

#[tokio::test]
async fn test_failed_refresh_keeps_existing_document() {
    let dir = TempDir::new().unwrap();
    let inventory = FakeInventory::with_pages(vec![page("home", &[]), page("team", &[])]);
    let browser = FakeBrowser::new(Duration::ZERO);
    let orchestrator = orchestrator(&dir, &inventory, &browser, RenderMode::Single, 5);

    let existing = orchestrator.export_document(false).await.unwrap();
    // Older than the cleanup age but well within the cache TTL
    File::options()
        .write(true)
        .open(&existing)
        .unwrap()
        .set_modified(SystemTime::now() - Duration::from_secs(600))
        .unwrap();

    browser.fail_on("team");
    let result = orchestrator.export_document(true).await;

    assert!(result.is_err());
    assert!(existing.exists());
    assert_eq!(files_with_prefix(dir.path(), "BookOfData_").len(), 1);
}

#[tokio::test]
async fn test_unavailable_inventory_on_refresh_keeps_cached_document() {
    let dir = TempDir::new().unwrap();
    let prior = dir.path().join("BookOfData_prior.pdf");
    common::write_marked_pdf(&prior, "prior");
    File::options()
        .write(true)
        .open(&prior)
        .unwrap()
        .set_modified(SystemTime::now() - Duration::from_secs(600))
        .unwrap();

    let inventory = FakeInventory::with_pages(vec![page("home", &[])]);
    inventory.set_unavailable(true);
    let browser = FakeBrowser::new(Duration::ZERO);
    let orchestrator = orchestrator(&dir, &inventory, &browser, RenderMode::Batched, 5);

    let err = orchestrator.export_document(true).await.unwrap_err();
    assert_eq!(err.kind(), "upstream_unavailable");
    assert!(prior.exists());

    // The surviving document is still served to plain requests
    inventory.set_unavailable(false);
    let served = orchestrator.export_document(false).await.unwrap();
    assert_eq!(served, prior);
}

#[tokio::test]
async fn test_documents_past_ttl_are_swept() {
    let dir = TempDir::new().unwrap();
    let expired = dir.path().join("BookOfData_expired.pdf");
    common::write_marked_pdf(&expired, "expired");
    File::options()
        .write(true)
        .open(&expired)
        .unwrap()
        .set_modified(SystemTime::now() - Duration::from_secs(3 * 3_600))
        .unwrap();

    let mut config = test_config(dir.path(), RenderMode::Batched, 5);
    config.cache.ttl_minutes = 60;
    let inventory = FakeInventory::with_pages(vec![page("home", &[])]);
    let browser = FakeBrowser::new(Duration::ZERO);
    let orchestrator = ExportOrchestrator::new(&config, inventory, browser).unwrap();

    orchestrator.export_document(true).await.unwrap();

    assert!(!expired.exists());
    assert_eq!(files_with_prefix(dir.path(), "BookOfData_").len(), 1);
}

#[tokio::test]
async fn test_unavailable_inventory_aborts_before_rendering() {
    let dir = TempDir::new().unwrap();
    let inventory = FakeInventory::with_pages(vec![page("home", &[])]);
    inventory.set_unavailable(true);
    let browser = FakeBrowser::new(Duration::ZERO);
    let orchestrator = orchestrator(&dir, &inventory, &browser, RenderMode::Batched, 5);

    let err = orchestrator.export_document(false).await.unwrap_err();

    assert_eq!(
        err,
        ExportError::UpstreamUnavailable("connection refused".to_string())
    );
    assert_eq!(BrowserStats::get(&browser.stats.launches), 0);
    assert!(files_with_prefix(dir.path(), "BookOfData_").is_empty());
}

#[tokio::test]
async fn test_empty_inventory_yields_empty_document() {
    let dir = TempDir::new().unwrap();
    let inventory = FakeInventory::with_pages(vec![page("private", &["no-pdf"])]);
    let browser = FakeBrowser::new(Duration::ZERO);
    let orchestrator = orchestrator(&dir, &inventory, &browser, RenderMode::Batched, 5);

    let outcome = orchestrator.export(ExportRequest::default()).await.unwrap();

    assert_eq!(outcome.item_count, 0);
    assert_eq!(outcome.page_count, 0);
    assert!(page_markers(&outcome.path).is_empty());
    assert_eq!(BrowserStats::get(&browser.stats.launches), 0);
}

#[tokio::test]
async fn test_batched_mode_bounds_concurrency() {
    let dir = TempDir::new().unwrap();
    let inventory = FakeInventory::with_pages(numbered_pages(12));
    let browser = FakeBrowser::new(Duration::from_millis(20));
    let orchestrator = orchestrator(&dir, &inventory, &browser, RenderMode::Batched, 5);

    let outcome = orchestrator.export(ExportRequest::default()).await.unwrap();

    let max = BrowserStats::get(&browser.stats.max_in_flight);
    assert!(max <= 5, "max in flight was {max}");
    assert_eq!(BrowserStats::get(&browser.stats.launches), 1);
    assert_eq!(BrowserStats::get(&browser.stats.sessions), 12);
    assert_eq!(BrowserStats::get(&browser.stats.closed_sessions), 12);
    assert_eq!(BrowserStats::get(&browser.stats.closed_instances), 1);

    let expected: Vec<String> = (0..12).map(|i| format!("page-{i:02}")).collect();
    assert_eq!(page_markers(&outcome.path), expected);
}

#[tokio::test]
async fn test_single_mode_reuses_one_session() {
    let dir = TempDir::new().unwrap();
    let inventory = FakeInventory::with_pages(numbered_pages(6));
    let browser = FakeBrowser::new(Duration::from_millis(5));
    let orchestrator = orchestrator(&dir, &inventory, &browser, RenderMode::Single, 5);

    let outcome = orchestrator.export(ExportRequest::default()).await.unwrap();

    assert_eq!(BrowserStats::get(&browser.stats.sessions), 1);
    assert_eq!(BrowserStats::get(&browser.stats.max_in_flight), 1);
    assert_eq!(BrowserStats::get(&browser.stats.closed_instances), 1);
    assert_eq!(page_markers(&outcome.path).len(), 6);
}

#[tokio::test]
async fn test_concurrent_requests_share_one_job() {
    let dir = TempDir::new().unwrap();
    let inventory = FakeInventory::with_pages(numbered_pages(3));
    let browser = FakeBrowser::new(Duration::from_millis(30));
    let orchestrator = Arc::new(orchestrator(
        &dir,
        &inventory,
        &browser,
        RenderMode::Batched,
        5,
    ));

    let (a, b, c) = tokio::join!(
        orchestrator.export_document(false),
        orchestrator.export_document(false),
        orchestrator.export_document(false),
    );

    let a = a.unwrap();
    assert_eq!(b.unwrap(), a);
    assert_eq!(c.unwrap(), a);
    assert_eq!(inventory.calls(), 1);
    assert_eq!(BrowserStats::get(&browser.stats.launches), 1);
    assert_eq!(files_with_prefix(dir.path(), "BookOfData_").len(), 1);
}

#[tokio::test]
async fn test_stale_temporary_files_are_swept() {
    let dir = TempDir::new().unwrap();
    let stale = dir.path().join("bd_tmp_abandoned_0.pdf");
    File::create(&stale)
        .unwrap()
        .set_modified(SystemTime::now() - Duration::from_secs(600))
        .unwrap();
    let unrelated = dir.path().join("notes.txt");
    std::fs::write(&unrelated, "keep me").unwrap();

    let inventory = FakeInventory::with_pages(vec![page("home", &[])]);
    let browser = FakeBrowser::new(Duration::ZERO);
    let orchestrator = orchestrator(&dir, &inventory, &browser, RenderMode::Batched, 5);

    orchestrator.export_document(false).await.unwrap();

    assert!(!stale.exists());
    assert!(unrelated.exists());
}

#[tokio::test]
async fn test_output_directory_is_created() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("server").join("pdf");
    let config = test_config(&nested, RenderMode::Batched, 5);
    let inventory = FakeInventory::with_pages(vec![page("home", &[])]);
    let browser = FakeBrowser::new(Duration::ZERO);

    let orchestrator = ExportOrchestrator::new(&config, inventory, browser).unwrap();
    let path = orchestrator.export_document(false).await.unwrap();

    assert!(nested.is_dir());
    assert!(path.starts_with(&nested));
}
