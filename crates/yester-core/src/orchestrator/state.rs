//! Observable resolution state.

use serde::Serialize;

use crate::types::{CacheKey, CacheStats, ContentSource, HistoricalEvent};

/// Where the latest request is in its lifecycle.
///
/// `Idle -> Debouncing -> {CacheHitSkeleton | RemoteHitSkeleton | Generating}
/// -> {Settled | FallbackSettled | Cancelled}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPhase {
    #[default]
    Idle,
    Debouncing,
    /// Local hit, holding the skeleton for the minimum dwell
    CacheHitSkeleton,
    /// Remote hit, holding the skeleton for what is left of the dwell
    RemoteHitSkeleton,
    /// Full-takeover loading while the generator runs
    Generating,
    Settled,
    FallbackSettled,
    Cancelled,
}

impl ResolutionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Debouncing => "debouncing",
            Self::CacheHitSkeleton => "cache_hit_skeleton",
            Self::RemoteHitSkeleton => "remote_hit_skeleton",
            Self::Generating => "generating",
            Self::Settled => "settled",
            Self::FallbackSettled => "fallback_settled",
            Self::Cancelled => "cancelled",
        }
    }

    /// A result set was committed for the request
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled | Self::FallbackSettled)
    }

    pub fn is_terminal(&self) -> bool {
        self.is_settled() || *self == Self::Cancelled
    }

    pub fn shows_skeleton(&self) -> bool {
        matches!(self, Self::CacheHitSkeleton | Self::RemoteHitSkeleton)
    }
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentState {
    /// Visible result set; primary first
    pub events: Vec<HistoricalEvent>,
    /// Full-takeover loading (generation only)
    pub is_loading: bool,
    /// Lightweight placeholder (cache-hit paths only)
    pub show_skeleton: bool,
    pub error: Option<String>,
    pub cache_stats: Option<CacheStats>,
    pub phase: ResolutionPhase,
    /// Request the phase refers to; after a cancel, the request `events` came from
    pub key: Option<CacheKey>,
    /// Tier that produced `events`
    pub source: Option<ContentSource>,
}

impl ContentState {
    pub(crate) fn enter(&mut self, key: &CacheKey, phase: ResolutionPhase) {
        self.key = Some(key.clone());
        self.phase = phase;
        self.show_skeleton = phase.shows_skeleton();
        self.is_loading = phase == ResolutionPhase::Generating;
        if self.is_loading {
            self.error = None;
        }
    }

    pub(crate) fn settle(
        &mut self,
        key: &CacheKey,
        events: Vec<HistoricalEvent>,
        source: ContentSource,
        error: Option<String>,
    ) {
        let phase = if source == ContentSource::Fallback {
            ResolutionPhase::FallbackSettled
        } else {
            ResolutionPhase::Settled
        };
        self.enter(key, phase);
        self.events = events;
        self.source = Some(source);
        self.error = error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::fallback_events;
    use crate::types::GenerationParams;

    #[test]
    fn test_phase_flags() {
        let key = GenerationParams::new(1990, "Europe", "History").cache_key();
        let mut state = ContentState {
            error: Some("old".into()),
            ..Default::default()
        };

        state.enter(&key, ResolutionPhase::RemoteHitSkeleton);
        assert!(state.show_skeleton && !state.is_loading);
        assert_eq!(state.error.as_deref(), Some("old"));

        state.enter(&key, ResolutionPhase::Generating);
        assert!(!state.show_skeleton && state.is_loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_settle() {
        let params = GenerationParams::new(1990, "Europe", "History");
        let mut state = ContentState::default();

        state.settle(
            &params.cache_key(),
            fallback_events(&params, 3),
            ContentSource::Fallback,
            Some("boom".into()),
        );
        assert_eq!(state.phase, ResolutionPhase::FallbackSettled);
        assert!(state.phase.is_terminal());
        assert!(!state.is_loading && !state.show_skeleton);
        assert_eq!(state.events.len(), 3);
        assert_eq!(state.error.as_deref(), Some("boom"));

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["phase"], "fallback_settled");
        assert_eq!(json["source"], "fallback");
        assert_eq!(json["isLoading"], false);
    }
}
