//! Headless browser adapters
//!
//! [`ChromiumEngine`] drives a Chromium-family binary over the DevTools
//! protocol. Tests substitute their own [`BrowserEngine`].

pub mod chromium;
pub mod engine;

pub use chromium::ChromiumEngine;
pub use engine::{BrowserEngine, BrowserInstance, BrowserSession, RenderError};
