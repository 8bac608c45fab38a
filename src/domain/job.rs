//! Export jobs and artifact naming
//!
//! Every file the pipeline writes is named from a per-job uid:
//!
//! - temporary per-page artifacts: `{temp_prefix}{uid}_{index}.pdf`
//! - the merge scratch file: `{temp_prefix}{uid}_merged.pdf`
//! - the final document: `{dest_prefix}{uid}.pdf`
//!
//! The sweeper relies on these prefixes to tell temporary files from final
//! ones, and the uid keeps concurrent or abandoned jobs apart.

use super::item::ContentItem;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use uuid::Uuid;

/// Default prefix of per-page artifacts
pub const DEFAULT_TEMP_PREFIX: &str = "bd_tmp_";

/// Default prefix of merged documents
pub const DEFAULT_DEST_PREFIX: &str = "BookOfData_";

/// Extension of every artifact
pub const ARTIFACT_EXTENSION: &str = "pdf";

/// Unique identifier of one export job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobUid(Uuid);

impl JobUid {
    /// Generate a fresh random uid
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing uuid
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for JobUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where artifacts live and how they are named
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    output_dir: PathBuf,
    temp_prefix: String,
    dest_prefix: String,
}

impl ArtifactLayout {
    /// Create a layout rooted at `output_dir`
    pub fn new(
        output_dir: impl Into<PathBuf>,
        temp_prefix: impl Into<String>,
        dest_prefix: impl Into<String>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            temp_prefix: temp_prefix.into(),
            dest_prefix: dest_prefix.into(),
        }
    }

    /// Layout with the default prefixes
    pub fn with_default_prefixes(output_dir: impl Into<PathBuf>) -> Self {
        Self::new(output_dir, DEFAULT_TEMP_PREFIX, DEFAULT_DEST_PREFIX)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn temp_prefix(&self) -> &str {
        &self.temp_prefix
    }

    pub fn dest_prefix(&self) -> &str {
        &self.dest_prefix
    }

    /// Prefix shared by every temporary file of one job
    pub fn job_temp_prefix(&self, uid: &JobUid) -> String {
        format!("{}{}_", self.temp_prefix, uid)
    }

    /// Path of the per-page artifact at `sequence_index`
    pub fn temp_artifact_path(&self, uid: &JobUid, sequence_index: usize) -> PathBuf {
        self.output_dir.join(format!(
            "{}{}.{}",
            self.job_temp_prefix(uid),
            sequence_index,
            ARTIFACT_EXTENSION
        ))
    }

    /// Scratch file the merge writes before it is renamed into place
    pub fn merge_scratch_path(&self, uid: &JobUid) -> PathBuf {
        self.output_dir.join(format!(
            "{}merged.{}",
            self.job_temp_prefix(uid),
            ARTIFACT_EXTENSION
        ))
    }

    /// Final document path for a job
    pub fn destination_path(&self, uid: &JobUid) -> PathBuf {
        self.output_dir
            .join(format!("{}{}.{}", self.dest_prefix, uid, ARTIFACT_EXTENSION))
    }
}

/// Caller-supplied export options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportRequest {
    /// Regenerate even if a fresh document exists
    pub refresh: bool,
}

/// One page scheduled for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    pub item: ContentItem,
    /// Position of the item in the sorted inventory
    pub sequence_index: usize,
    pub artifact_path: PathBuf,
}

impl RenderJob {
    /// Build the render jobs for a sorted item list
    pub fn plan(items: &[ContentItem], uid: &JobUid, layout: &ArtifactLayout) -> Vec<RenderJob> {
        items
            .iter()
            .enumerate()
            .map(|(sequence_index, item)| RenderJob {
                item: item.clone(),
                sequence_index,
                artifact_path: layout.temp_artifact_path(uid, sequence_index),
            })
            .collect()
    }
}

/// A merged document found in the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedArtifact {
    pub file_name: String,
    pub path: PathBuf,
    pub created_at: SystemTime,
}

impl CachedArtifact {
    /// Age relative to `now`; zero if the timestamp lies in the future
    pub fn age_at(&self, now: SystemTime) -> Duration {
        now.duration_since(self.created_at).unwrap_or(Duration::ZERO)
    }
}

/// State of one end-to-end export
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub uid: JobUid,
    pub items: Vec<ContentItem>,
    pub artifacts: Vec<PathBuf>,
    pub destination_path: PathBuf,
}

impl ExportJob {
    /// Start a job with a fresh uid
    pub fn new(layout: &ArtifactLayout) -> Self {
        let uid = JobUid::generate();
        Self {
            uid,
            items: Vec::new(),
            artifacts: Vec::new(),
            destination_path: layout.destination_path(&uid),
        }
    }
}
