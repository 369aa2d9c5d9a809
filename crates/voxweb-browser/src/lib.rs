//! # voxweb Browser
//!
//! Thin browser collaborator driving Chrome over the DevTools Protocol.
//!
//! Chrome is launched lazily with a persistent profile (login state survives
//! restarts) on first use; if an instance is already listening on the debug
//! port it is reused. Page interaction happens through `Runtime.evaluate` -
//! fuzzy clicking, scrolling and cookie dismissal are small injected scripts.

mod capture;
mod cdp;
mod driver;
mod scripts;

pub use capture::ScreenshotCapture;
pub use driver::{ChromeDriver, DriverConfig};
