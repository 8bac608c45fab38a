//! External system integrations for Bindery.
//!
//! - [`inventory`] - page inventory (wiki GraphQL endpoint)
//! - [`browser`] - headless browser used to print pages
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with fake implementations. Both adapters expose a trait
//! ([`inventory::InventorySource`], [`browser::BrowserEngine`]) so the export
//! pipeline never talks to reqwest or the browser directly.
//!
//! ```rust,no_run
//! use bindery::adapters::inventory::{GraphQlInventory, InventoryClient};
//! use bindery::config::InventoryConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = InventoryConfig::default();
//! let source = GraphQlInventory::new(&config)?;
//! let client = InventoryClient::new(Arc::new(source), &config.exclusion_tag);
//! let pages = client.fetch_inventory().await?;
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod inventory;
