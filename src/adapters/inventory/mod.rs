//! Page inventory adapters
//!
//! The inventory tells the pipeline which pages exist. The wiki exposes it
//! through GraphQL; other sources only need to implement [`InventorySource`].

pub mod client;
pub mod graphql;
pub mod models;
pub mod source;

pub use client::InventoryClient;
pub use graphql::GraphQlInventory;
pub use source::InventorySource;
