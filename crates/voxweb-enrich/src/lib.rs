//! # voxweb Enrich
//!
//! Analysis cache and background enrichment engine.
//!
//! ## Features
//!
//! - Two independent page-keyed caches (description, content)
//! - Cache-aware inline analysis for direct describe/read commands
//! - Non-blocking background enrichment through a FIFO queue
//! - One long-lived worker, so at most one analysis call is ever in flight

pub mod cache;
pub mod engine;
pub mod task;
mod worker;

pub use cache::AnalysisCache;
pub use engine::{Analysis, AnalysisEngine, AnalysisSource};
pub use task::EnrichmentTask;
