//! Batch scheduler
//!
//! Renders jobs in consecutive batches. Pages inside a batch render
//! concurrently; a batch starts only after the previous one has finished.
//! The first failure aborts the job: the rest of the batch is dropped and no
//! later batch starts.

use crate::core::render::PageRenderer;
use crate::domain::{ExportError, RenderJob};
use crate::log_batch_processing;
use futures::future::try_join_all;
use std::path::PathBuf;

/// Default number of pages per batch
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Splits render jobs into batches and runs them
#[derive(Debug, Clone, Copy)]
pub struct BatchScheduler {
    batch_size: usize,
}

impl BatchScheduler {
    /// Create a scheduler; a zero batch size is treated as one
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Consecutive batches of at most `batch_size` jobs
    pub fn partition<'a>(&self, jobs: &'a [RenderJob]) -> Vec<&'a [RenderJob]> {
        jobs.chunks(self.batch_size).collect()
    }

    /// Render every job and return the artifact paths in job order
    pub async fn run<R>(&self, renderer: &R, jobs: &[RenderJob]) -> Result<Vec<PathBuf>, ExportError>
    where
        R: PageRenderer + ?Sized,
    {
        let batches = self.partition(jobs);
        let total = batches.len();
        let mut artifacts = Vec::with_capacity(jobs.len());

        for (index, batch) in batches.into_iter().enumerate() {
            log_batch_processing!(index + 1, total, batch.len());

            try_join_all(
                batch
                    .iter()
                    .map(|job| renderer.render(&job.item, &job.artifact_path)),
            )
            .await?;

            artifacts.extend(batch.iter().map(|job| job.artifact_path.clone()));
        }

        Ok(artifacts)
    }
}

impl Default for BatchScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}
