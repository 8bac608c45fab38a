//! Export orchestrator - drives one export request end to end
//!
//! ```text
//! START -> CACHE_CHECK -> HIT: DONE
//!                      -> MISS: PRE_CLEANUP -> FETCH -> RENDER -> MERGE -> POST_CLEANUP -> DONE
//! ```
//!
//! Any stage failure ends in FAILED: the error is returned to every caller of
//! the job, the job's temporary files are discarded and no destination file
//! exists for its uid. Documents of other jobs are never touched by a failed
//! job.

use super::scheduler::BatchScheduler;
use super::single_flight::SingleFlight;
use super::summary::ExportOutcome;
use crate::adapters::browser::{BrowserEngine, ChromiumEngine};
use crate::adapters::inventory::{GraphQlInventory, InventoryClient, InventorySource};
use crate::config::BinderyConfig;
use crate::core::cache::ArtifactCache;
use crate::core::cleanup::CleanupSweeper;
use crate::core::merge::{MergePart, PdfMerger};
use crate::core::render::RenderPool;
use crate::domain::{
    ArtifactLayout, BinderyError, ExportError, ExportJob, ExportRequest, RenderJob, Result,
};
use crate::{log_error_with_context, log_stage};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Entry point of the export pipeline
///
/// Cheap to share behind an `Arc`; concurrent requests for the same output
/// are coalesced onto one job.
pub struct ExportOrchestrator {
    pipeline: Arc<Pipeline>,
    flights: SingleFlight<ExportOutcome>,
}

struct Pipeline {
    layout: ArtifactLayout,
    inventory: InventoryClient,
    pool: RenderPool,
    scheduler: BatchScheduler,
    cache: ArtifactCache,
    sweeper: CleanupSweeper,
    merger: PdfMerger,
    cache_ttl: Duration,
    cleanup_age: Duration,
    cleanup_limit: usize,
}

impl ExportOrchestrator {
    /// Create an orchestrator with explicit adapters
    ///
    /// Creates the output directory if it does not exist.
    pub fn new(
        config: &BinderyConfig,
        source: Arc<dyn InventorySource>,
        engine: Arc<dyn BrowserEngine>,
    ) -> Result<Self> {
        let output_dir = PathBuf::from(&config.export.output_dir);
        std::fs::create_dir_all(&output_dir).map_err(|e| {
            BinderyError::Io(format!(
                "Failed to create output directory {}: {e}",
                output_dir.display()
            ))
        })?;

        let layout = ArtifactLayout::new(
            &output_dir,
            &config.export.temp_prefix,
            &config.export.dest_prefix,
        );

        let pipeline = Pipeline {
            inventory: InventoryClient::new(source, &config.inventory.exclusion_tag),
            pool: RenderPool::new(engine, &config.renderer)?,
            scheduler: BatchScheduler::new(config.export.batch_size),
            cache: ArtifactCache::new(&output_dir),
            sweeper: CleanupSweeper::new(&output_dir),
            merger: PdfMerger::new(),
            cache_ttl: config.cache.ttl(),
            cleanup_age: config.cleanup.max_age(),
            cleanup_limit: config.cleanup.max_deletions,
            layout,
        };

        tracing::debug!(
            output_dir = %output_dir.display(),
            batch_size = config.export.batch_size,
            render_mode = %config.renderer.mode,
            "Export orchestrator ready"
        );

        Ok(Self {
            pipeline: Arc::new(pipeline),
            flights: SingleFlight::new(),
        })
    }

    /// Create an orchestrator backed by the wiki GraphQL API and Chromium
    pub fn from_config(config: &BinderyConfig) -> Result<Self> {
        let source = GraphQlInventory::new(&config.inventory)?;
        let engine = ChromiumEngine::new(&config.renderer);
        Self::new(config, Arc::new(source), Arc::new(engine))
    }

    /// Produce the merged document, reusing a fresh one unless `refresh`
    pub async fn export_document(&self, refresh: bool) -> std::result::Result<PathBuf, ExportError> {
        self.export(ExportRequest { refresh })
            .await
            .map(|outcome| outcome.path)
    }

    /// Run an export request and return its outcome
    pub async fn export(
        &self,
        request: ExportRequest,
    ) -> std::result::Result<ExportOutcome, ExportError> {
        let key = self.flight_key();
        let pipeline = Arc::clone(&self.pipeline);
        let refresh = request.refresh;

        self.flights
            .run(&key, refresh, move || {
                let pipeline = Arc::clone(&pipeline);
                async move { pipeline.execute(refresh).await }
            })
            .await
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.pipeline.layout
    }

    /// Requests for the same destination share one job
    fn flight_key(&self) -> String {
        let layout = &self.pipeline.layout;
        format!(
            "{}/{}",
            layout.output_dir().display(),
            layout.dest_prefix()
        )
    }
}

impl Pipeline {
    async fn execute(&self, refresh: bool) -> std::result::Result<ExportOutcome, ExportError> {
        let started = Instant::now();
        let started_at = Utc::now();

        if !refresh {
            if let Some(path) = self.cached_document().await {
                let outcome =
                    ExportOutcome::cached(path, started_at).with_duration(started.elapsed());
                outcome.log_summary();
                return Ok(outcome);
            }
        }

        self.sweep(self.layout.temp_prefix(), self.cleanup_age).await;
        // A document is only stale once the cache would no longer serve it
        self.sweep(self.layout.dest_prefix(), self.dest_sweep_age())
            .await;

        let mut job = ExportJob::new(&self.layout);
        tracing::info!(job_uid = %job.uid, refresh, "Starting export job");

        log_stage!(job.uid, "fetch");
        job.items = self.inventory.fetch_inventory().await.map_err(|e| {
            log_error_with_context!(&e, "fetch");
            e
        })?;

        let plan = RenderJob::plan(&job.items, &job.uid, &self.layout);
        match self.produce(&mut job, &plan).await {
            Ok(page_count) => {
                log_stage!(job.uid, "post_cleanup");
                self.sweeper.discard(&job.artifacts).await;
                self.sweep(self.layout.temp_prefix(), self.cleanup_age).await;

                let outcome = ExportOutcome::generated(
                    job.destination_path.clone(),
                    job.uid,
                    job.items.len(),
                    page_count,
                    started_at,
                )
                .with_duration(started.elapsed());
                outcome.log_summary();
                Ok(outcome)
            }
            Err(e) => {
                log_error_with_context!(&e, e.kind());
                let mut leftovers: Vec<PathBuf> =
                    plan.iter().map(|r| r.artifact_path.clone()).collect();
                leftovers.push(self.layout.merge_scratch_path(&job.uid));
                leftovers.push(job.destination_path.clone());
                self.sweeper.discard(&leftovers).await;
                Err(e)
            }
        }
    }

    /// Fresh cached document; lookup errors count as a miss
    async fn cached_document(&self) -> Option<PathBuf> {
        match self
            .cache
            .find_fresh(self.layout.dest_prefix(), self.cache_ttl)
            .await
        {
            Ok(Some(artifact)) => {
                tracing::info!(path = %artifact.path.display(), "Serving cached document");
                Some(artifact.path)
            }
            Ok(None) => {
                tracing::debug!("No fresh document in cache");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cache lookup failed, generating a new document");
                None
            }
        }
    }

    /// RENDER and MERGE; returns the merged page count
    async fn produce(
        &self,
        job: &mut ExportJob,
        plan: &[RenderJob],
    ) -> std::result::Result<usize, ExportError> {
        log_stage!(job.uid, "render");
        job.artifacts = self.render(plan).await?;

        log_stage!(job.uid, "merge");
        let parts: Vec<MergePart> = plan
            .iter()
            .zip(&job.artifacts)
            .map(|(render_job, artifact)| MergePart::new(&render_job.item.path, artifact))
            .collect();

        // Merge into a temporary name so the destination only ever appears complete
        let scratch = self.layout.merge_scratch_path(&job.uid);
        let page_count = self.merger.merge_titled(&parts, &scratch).await?;
        tokio::fs::rename(&scratch, &job.destination_path)
            .await
            .map_err(|e| {
                ExportError::MergeFailure(format!(
                    "failed to move {} into place: {e}",
                    scratch.display()
                ))
            })?;

        Ok(page_count)
    }

    async fn render(&self, plan: &[RenderJob]) -> std::result::Result<Vec<PathBuf>, ExportError> {
        if plan.is_empty() {
            return Ok(Vec::new());
        }

        let run = self.pool.start().await?;
        let result = self.scheduler.run(&run, plan).await;
        run.shutdown().await;
        result
    }

    /// Age past which a merged document may be swept
    fn dest_sweep_age(&self) -> Duration {
        self.cleanup_age.max(self.cache_ttl)
    }

    async fn sweep(&self, prefix: &str, max_age: Duration) {
        self.sweeper.sweep(prefix, max_age, self.cleanup_limit).await;
    }
}
