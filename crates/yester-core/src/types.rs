//! Shared types for yester-core.
//!
//! These types flow through every cache tier and out to the presentation layer.

use serde::{Deserialize, Serialize};
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Entity Types
// ─────────────────────────────────────────────────────────────────────────────

/// A single historical event card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalEvent {
    pub id: String,
    pub title: String,
    #[serde(alias = "content")]
    pub short_content: String,
    pub full_content: String,
    pub year: i32,
    pub region: String,
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

/// The request key: which year, region and topic to show.
///
/// Equality is exact, including case, on region and topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenerationParams {
    pub year: i32,
    pub region: String,
    pub topic: String,
}

impl GenerationParams {
    pub fn new(year: i32, region: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            year,
            region: region.into(),
            topic: topic.into(),
        }
    }

    /// Decade bucket, e.g. 1994 -> 1990
    pub fn decade(&self) -> i32 {
        self.year.div_euclid(10) * 10
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::from(self)
    }
}

impl fmt::Display for GenerationParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.year, self.region, self.topic)
    }
}

/// Composite `year-region-topic` key shared by all cache tiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&GenerationParams> for CacheKey {
    fn from(params: &GenerationParams) -> Self {
        Self(format!("{}-{}-{}", params.year, params.region, params.topic))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolution Types
// ─────────────────────────────────────────────────────────────────────────────

/// Which tier produced a visible result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    Memory,
    Remote,
    Generated,
    Fallback,
}

impl ContentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Remote => "remote",
            Self::Generated => "generated",
            Self::Fallback => "fallback",
        }
    }
}

/// Cache usage figures shown on the profile screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub local: usize,
    pub global: u64,
    pub total_usage: u64,
}
