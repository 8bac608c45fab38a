//! Inventory client wrapper
//!
//! Wraps an [`InventorySource`] and applies the export selection rule: pages
//! carrying the exclusion tag are dropped and the rest are sorted by path.

use super::InventorySource;
use crate::domain::{select_exportable, ContentItem, ExportError};
use std::sync::Arc;

/// Inventory client used by the export pipeline
#[derive(Clone)]
pub struct InventoryClient {
    source: Arc<dyn InventorySource>,
    exclusion_tag: String,
}

impl InventoryClient {
    /// Create a new inventory client
    pub fn new(source: Arc<dyn InventorySource>, exclusion_tag: impl Into<String>) -> Self {
        Self {
            source,
            exclusion_tag: exclusion_tag.into(),
        }
    }

    /// Fetch the pages to export, filtered and in document order
    pub async fn fetch_inventory(&self) -> Result<Vec<ContentItem>, ExportError> {
        let pages = self.source.list_pages().await?;
        let listed = pages.len();
        let selected = select_exportable(pages, &self.exclusion_tag);

        tracing::info!(
            source = %self.source.describe(),
            listed,
            selected = selected.len(),
            excluded = listed - selected.len(),
            "Fetched page inventory"
        );

        Ok(selected)
    }

    pub fn exclusion_tag(&self) -> &str {
        &self.exclusion_tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StaticSource(Result<Vec<ContentItem>, ExportError>);

    #[async_trait]
    impl InventorySource for StaticSource {
        async fn list_pages(&self) -> Result<Vec<ContentItem>, ExportError> {
            self.0.clone()
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    #[tokio::test]
    async fn test_fetch_inventory_filters_and_sorts() {
        let source = StaticSource(Ok(vec![
            ContentItem::new("b", Vec::<String>::new()),
            ContentItem::new("a", ["no-pdf"]),
            ContentItem::new("c", Vec::<String>::new()),
        ]));
        let client = InventoryClient::new(Arc::new(source), "no-pdf");

        let items = client.fetch_inventory().await.unwrap();
        let paths: Vec<&str> = items.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_fetch_inventory_propagates_upstream_error() {
        let source = StaticSource(Err(ExportError::UpstreamUnavailable("down".to_string())));
        let client = InventoryClient::new(Arc::new(source), "no-pdf");

        let err = client.fetch_inventory().await.unwrap_err();
        assert_eq!(err, ExportError::UpstreamUnavailable("down".to_string()));
    }
}
