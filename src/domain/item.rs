//! Content items as reported by the inventory
//!
//! A [`ContentItem`] is one wiki page: its path and its tags. The export
//! order of items is part of the output contract, so the selection rules live
//! here rather than in the HTTP adapter.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tag that keeps a page out of the exported document
pub const DEFAULT_EXCLUSION_TAG: &str = "no-pdf";

/// A single exportable page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Page path relative to the wiki root (e.g. `guides/setup`)
    pub path: String,

    /// Tags attached to the page
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl ContentItem {
    /// Create a new content item
    pub fn new<I, S>(path: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the item carries `tag`
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Drops excluded items and orders the rest by path
///
/// Paths are compared by UTF-16 code units, which is the order the wiki's
/// own tooling uses. It differs from byte order only between characters
/// outside the Basic Multilingual Plane and those in U+E000..=U+FFFF. The
/// sort is stable, so items with equal paths keep their inventory order.
pub fn select_exportable(items: Vec<ContentItem>, exclusion_tag: &str) -> Vec<ContentItem> {
    let mut selected: Vec<ContentItem> = items
        .into_iter()
        .filter(|item| !item.has_tag(exclusion_tag))
        .collect();
    selected.sort_by(|a, b| a.path.encode_utf16().cmp(b.path.encode_utf16()));
    selected
}
