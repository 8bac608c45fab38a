//! Inventory source trait definition
//!
//! An `InventorySource` answers one question: which pages exist and how are
//! they tagged. Filtering and ordering are applied on top by
//! [`InventoryClient`](super::InventoryClient), so every source stays a thin
//! transport.

use crate::domain::{ContentItem, ExportError};
use async_trait::async_trait;

/// Trait for page inventory backends
///
/// # Errors
///
/// Implementations report every transport or payload problem as
/// [`ExportError::UpstreamUnavailable`].
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Fetch all pages, unfiltered and in source order
    async fn list_pages(&self) -> Result<Vec<ContentItem>, ExportError>;

    /// Human-readable location of the source, used in log records
    fn describe(&self) -> String;
}
