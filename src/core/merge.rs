//! PDF merge stage
//!
//! Each input's page tree is grafted, unchanged, under a new root page tree
//! in input order. Attributes inherited from an input's root (media box,
//! resources) keep applying because that root survives as an intermediate
//! node. Every input also gets one outline entry pointing at its first page.

use crate::domain::ExportError;
use lopdf::{dictionary, Bookmark, Document, Object, ObjectId};
use std::path::{Path, PathBuf};

/// One input of a merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePart {
    /// Outline title for the part
    pub title: String,
    pub path: PathBuf,
}

impl MergePart {
    pub fn new(title: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
        }
    }
}

/// Concatenates single-item PDFs into one document
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfMerger;

impl PdfMerger {
    pub fn new() -> Self {
        Self
    }

    /// Merge `paths` into `dest`, titling each outline entry with its file name
    pub async fn merge(&self, paths: &[PathBuf], dest: &Path) -> Result<usize, ExportError> {
        let parts = paths
            .iter()
            .map(|path| {
                let title = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                MergePart::new(title, path)
            })
            .collect::<Vec<_>>();
        self.merge_titled(&parts, dest).await
    }

    /// Merge `parts` into `dest` in order and return the total page count
    ///
    /// Runs on the blocking pool; PDF parsing is CPU-bound.
    pub async fn merge_titled(&self, parts: &[MergePart], dest: &Path) -> Result<usize, ExportError> {
        let parts = parts.to_vec();
        let dest = dest.to_path_buf();

        tokio::task::spawn_blocking(move || merge_blocking(&parts, &dest))
            .await
            .map_err(|e| ExportError::MergeFailure(format!("merge task failed: {e}")))?
    }
}

fn merge_blocking(parts: &[MergePart], dest: &Path) -> Result<usize, ExportError> {
    let mut merged = Document::with_version("1.5");
    let pages_id = merged.new_object_id();

    let mut kids: Vec<Object> = Vec::with_capacity(parts.len());
    let mut page_count = 0usize;
    let mut bookmarks: Vec<(String, ObjectId)> = Vec::with_capacity(parts.len());

    for part in parts {
        let mut doc = Document::load(&part.path).map_err(|e| {
            ExportError::MergeFailure(format!("failed to read {}: {e}", part.path.display()))
        })?;
        doc.renumber_objects_with(merged.max_id + 1);
        merged.max_id = doc.max_id;

        let catalog_id = doc
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .map_err(|e| invalid(&part.path, "missing document catalog", e))?;
        let root_pages_id = doc
            .get_dictionary(catalog_id)
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(Object::as_reference)
            .map_err(|e| invalid(&part.path, "missing page tree", e))?;

        let pages = doc.get_pages();
        if let Some(first_page) = pages.values().next() {
            bookmarks.push((part.title.clone(), *first_page));
        }
        page_count += pages.len();

        doc.get_object_mut(root_pages_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| invalid(&part.path, "malformed page tree", e))?
            .set("Parent", Object::Reference(pages_id));
        doc.objects.remove(&catalog_id);

        kids.push(Object::Reference(root_pages_id));
        merged.objects.extend(doc.objects);
    }

    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );

    for (title, page_id) in bookmarks {
        merged.add_bookmark(Bookmark::new(title, [0.0, 0.0, 0.0], 0, page_id), None);
    }
    let outline_id = merged.build_outline();

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    };
    if let Some(outline_id) = outline_id {
        catalog.set("Outlines", Object::Reference(outline_id));
        catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));
    }
    let catalog_id = merged.add_object(catalog);
    merged.trailer.set("Root", Object::Reference(catalog_id));

    merged.prune_objects();
    merged.renumber_objects();
    merged.compress();

    merged
        .save(dest)
        .map_err(|e| ExportError::MergeFailure(format!("failed to write {}: {e}", dest.display())))?;

    tracing::debug!(
        parts = parts.len(),
        pages = page_count,
        dest = %dest.display(),
        "Merged document"
    );
    Ok(page_count)
}

fn invalid(path: &Path, what: &str, error: lopdf::Error) -> ExportError {
    ExportError::MergeFailure(format!("{}: {what}: {error}", path.display()))
}
