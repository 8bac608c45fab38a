//! Artifact cache
//!
//! Merged documents double as the cache: a document whose name contains the
//! destination prefix and which is younger than the TTL is served as-is.
//! Lookups are read-only.

use crate::domain::{BinderyError, CachedArtifact, Result};
use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Read-only view of merged documents in the output directory
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    output_dir: PathBuf,
}

impl ArtifactCache {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Most recent document younger than `ttl`, if any
    pub async fn find_fresh(&self, prefix: &str, ttl: Duration) -> Result<Option<CachedArtifact>> {
        self.find_fresh_at(prefix, ttl, SystemTime::now()).await
    }

    /// [`find_fresh`](Self::find_fresh) evaluated at `now`
    pub async fn find_fresh_at(
        &self,
        prefix: &str,
        ttl: Duration,
        now: SystemTime,
    ) -> Result<Option<CachedArtifact>> {
        let candidates = self.list(prefix).await?;
        Ok(freshest(candidates, ttl, now))
    }

    /// Every document whose name contains `prefix`, most recent first
    ///
    /// A missing output directory yields an empty list.
    pub async fn list(&self, prefix: &str) -> Result<Vec<CachedArtifact>> {
        let mut entries = match tokio::fs::read_dir(&self.output_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(BinderyError::Io(format!(
                    "Failed to list {}: {e}",
                    self.output_dir.display()
                )))
            }
        };

        let mut artifacts = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            BinderyError::Io(format!("Failed to list {}: {e}", self.output_dir.display()))
        })? {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !file_name.contains(prefix) {
                continue;
            }

            // Entries may vanish between listing and stat
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(BinderyError::Io(format!(
                        "Failed to stat {}: {e}",
                        entry.path().display()
                    )))
                }
            };
            if !metadata.is_file() {
                continue;
            }

            artifacts.push(CachedArtifact {
                file_name,
                path: entry.path(),
                created_at: created_at(&metadata)?,
            });
        }

        artifacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(artifacts)
    }
}

/// Birth time where the filesystem records one, modification time otherwise
pub(crate) fn created_at(metadata: &Metadata) -> Result<SystemTime> {
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .map_err(|e| BinderyError::Io(format!("File timestamps unavailable: {e}")))
}

fn freshest(candidates: Vec<CachedArtifact>, ttl: Duration, now: SystemTime) -> Option<CachedArtifact> {
    candidates
        .into_iter()
        .filter(|artifact| artifact.age_at(now) < ttl)
        .max_by_key(|artifact| artifact.created_at)
}
