//! Wiki GraphQL inventory source
//!
//! Issues a single read-only `pages.list` query per export.

use super::models::{GraphQlRequest, GraphQlResponse, PagesData, PAGES_QUERY};
use super::InventorySource;
use crate::config::InventoryConfig;
use crate::domain::{BinderyError, ContentItem, ExportError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Longest response body excerpt kept in error messages
const BODY_EXCERPT_LEN: usize = 512;

/// Inventory source backed by the wiki's GraphQL endpoint
pub struct GraphQlInventory {
    endpoint: String,
    client: Client,
}

impl GraphQlInventory {
    /// Create a new GraphQL inventory source
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bindery::adapters::inventory::GraphQlInventory;
    /// use bindery::config::InventoryConfig;
    ///
    /// let source = GraphQlInventory::new(&InventoryConfig::default()).unwrap();
    /// ```
    pub fn new(config: &InventoryConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                BinderyError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    async fn query_pages(&self) -> std::result::Result<PagesData, ExportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&GraphQlRequest { query: PAGES_QUERY })
            .send()
            .await
            .map_err(|e| {
                ExportError::UpstreamUnavailable(format!(
                    "request to {} failed: {e}",
                    self.endpoint
                ))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ExportError::UpstreamUnavailable(format!("failed to read response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(ExportError::UpstreamUnavailable(format!(
                "{} answered {status}: {}",
                self.endpoint,
                excerpt(&body)
            )));
        }

        let envelope: GraphQlResponse<PagesData> = serde_json::from_str(&body).map_err(|e| {
            ExportError::UpstreamUnavailable(format!("malformed inventory payload: {e}"))
        })?;

        if !envelope.errors.is_empty() {
            let messages: Vec<&str> = envelope.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(ExportError::UpstreamUnavailable(format!(
                "inventory query rejected: {}",
                messages.join("; ")
            )));
        }

        envelope.data.ok_or_else(|| {
            ExportError::UpstreamUnavailable("inventory payload has no data".to_string())
        })
    }
}

#[async_trait]
impl InventorySource for GraphQlInventory {
    async fn list_pages(&self) -> std::result::Result<Vec<ContentItem>, ExportError> {
        tracing::debug!(endpoint = %self.endpoint, "Querying page inventory");

        let data = self.query_pages().await?;
        Ok(data.pages.list.into_iter().map(ContentItem::from).collect())
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
