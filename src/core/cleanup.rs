//! Cleanup sweeper
//!
//! Deletes old files from the output directory by name prefix. Cleanup never
//! fails an export: every error is logged and the sweep carries on.

use crate::domain::CleanupError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// What one sweep did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Files deleted, oldest first
    pub removed: Vec<PathBuf>,
    /// Files that matched but could not be deleted
    pub failed: usize,
}

/// Prefix-scoped deleter for the output directory
#[derive(Debug, Clone)]
pub struct CleanupSweeper {
    output_dir: PathBuf,
}

impl CleanupSweeper {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Delete files named `prefix*` older than `max_age`, at most `limit`
    pub async fn sweep(&self, prefix: &str, max_age: Duration, limit: usize) -> SweepReport {
        self.sweep_at(prefix, max_age, limit, SystemTime::now()).await
    }

    /// [`sweep`](Self::sweep) evaluated at `now`
    pub async fn sweep_at(
        &self,
        prefix: &str,
        max_age: Duration,
        limit: usize,
        now: SystemTime,
    ) -> SweepReport {
        let mut report = SweepReport::default();

        let candidates = match self.expired(prefix, max_age, now).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(error = %e, prefix, "Cleanup scan failed");
                return report;
            }
        };

        for path in candidates.into_iter().take(limit) {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => report.removed.push(path),
                // Another sweep got there first
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    let error = CleanupError::Remove {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    };
                    tracing::warn!(error = %error, "Cleanup failed to remove file");
                    report.failed += 1;
                }
            }
        }

        if !report.removed.is_empty() || report.failed > 0 {
            tracing::debug!(
                prefix,
                removed = report.removed.len(),
                failed = report.failed,
                "Swept output directory"
            );
        }

        report
    }

    /// Best-effort removal of known paths; missing files are ignored
    pub async fn discard(&self, paths: &[PathBuf]) -> usize {
        let mut removed = 0;
        for path in paths {
            match tokio::fs::remove_file(path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    let error = CleanupError::Remove {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    };
                    tracing::warn!(error = %error, "Failed to discard artifact");
                }
            }
        }
        removed
    }

    /// Matching regular files older than `max_age`, oldest first
    async fn expired(
        &self,
        prefix: &str,
        max_age: Duration,
        now: SystemTime,
    ) -> Result<Vec<PathBuf>, CleanupError> {
        let scan_error = |e: std::io::Error| CleanupError::Scan {
            dir: self.output_dir.display().to_string(),
            message: e.to_string(),
        };

        let mut entries = match tokio::fs::read_dir(&self.output_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(scan_error(e)),
        };

        let mut expired = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(scan_error)? {
            if !entry.file_name().to_string_lossy().starts_with(prefix) {
                continue;
            }

            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let Ok(modified) = metadata.modified() else {
                continue;
            };

            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            if age > max_age {
                expired.push((modified, entry.path()));
            }
        }

        expired.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(expired.into_iter().map(|(_, path)| path).collect())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
