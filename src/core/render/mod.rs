//! Page rendering
//!
//! [`RenderPool`] turns content items into single-item PDF artifacts using a
//! [`BrowserEngine`](crate::adapters::browser::BrowserEngine). A pool is
//! long-lived; each export job starts its own [`RenderRun`], which owns one
//! browser instance until [`RenderRun::shutdown`].

pub mod pool;

pub use pool::{PageRenderer, RenderPool, RenderRun};
