//! Export outcome and reporting
//!
//! Every finished export yields an [`ExportOutcome`], whether it produced a
//! new document or served a cached one.

use crate::domain::JobUid;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;

/// How an export request was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeSource {
    /// A fresh document already existed
    Cache,
    /// A new document was rendered and merged
    Generated,
}

/// Result of one export request
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    /// Path of the merged document
    pub path: PathBuf,

    /// Job uid; `None` for cache hits
    pub uid: Option<JobUid>,

    /// Pages merged into the document; zero for cache hits
    pub item_count: usize,

    /// Pages in the merged document
    pub page_count: usize,

    /// Where the document came from
    pub source: OutcomeSource,

    /// When the request started
    pub started_at: DateTime<Utc>,

    /// Wall time of the request
    pub duration: Duration,
}

impl ExportOutcome {
    /// Outcome of a request answered from the cache
    pub fn cached(path: PathBuf, started_at: DateTime<Utc>) -> Self {
        Self {
            path,
            uid: None,
            item_count: 0,
            page_count: 0,
            source: OutcomeSource::Cache,
            started_at,
            duration: Duration::ZERO,
        }
    }

    /// Outcome of a newly generated document
    pub fn generated(
        path: PathBuf,
        uid: JobUid,
        item_count: usize,
        page_count: usize,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            path,
            uid: Some(uid),
            item_count,
            page_count,
            source: OutcomeSource::Generated,
            started_at,
            duration: Duration::ZERO,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn is_cache_hit(&self) -> bool {
        self.source == OutcomeSource::Cache
    }

    /// Log the outcome
    pub fn log_summary(&self) {
        let uid = self.uid.map(|uid| uid.to_string()).unwrap_or_default();
        tracing::info!(
            path = %self.path.display(),
            job_uid = %uid,
            cache_hit = self.is_cache_hit(),
            items = self.item_count,
            pages = self.page_count,
            started_at = %self.started_at.to_rfc3339(),
            duration_ms = self.duration.as_millis() as u64,
            "Export completed"
        );
    }
}
