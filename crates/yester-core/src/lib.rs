//! yester-core - Core library for Yester
//!
//! Resolves historical event cards for a `(year, region, topic)` selection
//! through a tiered pipeline:
//!
//! - **orchestrator**: debounce, cancellation, skeleton dwell, tier cascade
//! - **cache**: per-device content cache and its persistent store
//! - **remote**: shared cache across devices (SQLite with the `db` feature)
//! - **generator**: text + image generation over pluggable backends
//! - **client**: Gemini REST backend (`client` feature)
//! - **fallback**: deterministic fallback imagery and result sets

pub mod cache;
#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod generator;
pub mod orchestrator;
pub mod remote;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::ContentConfig;
pub use error::{Error, Result};
pub use orchestrator::{ContentOrchestrator, ContentState, ResolutionPhase};
pub use types::{CacheKey, CacheStats, ContentSource, GenerationParams, HistoricalEvent};
