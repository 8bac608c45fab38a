//! GraphQL wire models for the page inventory

use crate::domain::ContentItem;
use serde::{Deserialize, Serialize};

/// Query listing every page with its tags
pub const PAGES_QUERY: &str = "query{pages{list{path,tags}}}";

/// GraphQL request body
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
}

/// GraphQL response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,

    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

/// One entry of the GraphQL `errors` array
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// `data` payload of [`PAGES_QUERY`]
#[derive(Debug, Clone, Deserialize)]
pub struct PagesData {
    pub pages: PagesQuery,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PagesQuery {
    pub list: Vec<PageRecord>,
}

/// A page as listed by the wiki
#[derive(Debug, Clone, Deserialize)]
pub struct PageRecord {
    pub path: String,

    /// The wiki reports `null` for untagged pages on some versions
    #[serde(default)]
    pub tags: Option<Vec<Option<String>>>,
}

impl From<PageRecord> for ContentItem {
    fn from(record: PageRecord) -> Self {
        let tags = record.tags.unwrap_or_default().into_iter().flatten();
        ContentItem::new(record.path, tags)
    }
}
