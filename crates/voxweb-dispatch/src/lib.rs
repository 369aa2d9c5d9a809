//! # voxweb Dispatch
//!
//! Maps recognized command phrases to browser actions and cache-aware page
//! analyses, and decides per command whether a background enrichment should
//! follow.

pub mod dispatcher;
pub mod phrase;

pub use dispatcher::CommandDispatcher;
