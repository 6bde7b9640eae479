//! Resolution orchestrator - tiered content resolution for the UI.
//!
//! Turns a stream of `(year, region, topic)` requests into exactly one
//! visible result set per settled request.
//!
//! ## Tiers
//!
//! ```text
//! request ──▶ debounce ──▶ memory ──hit──▶ skeleton dwell ──▶ Settled
//!                            │miss
//!                            ▼
//!                          remote ──hit──▶ store local ──▶ dwell ──▶ Settled
//!                            │miss/error
//!                            ▼
//!                         generate ──ok──▶ store local + remote ──▶ Settled
//!                            │fail
//!                            ▼
//!                   fallback set ──▶ store local ──▶ FallbackSettled (+ error)
//! ```
//!
//! ## Ordering
//!
//! Every visible write goes through one gate: the epoch token is not
//! cancelled and the resolved key is still the last requested key. The check
//! and the write happen under the same lock. A superseded resolution still
//! fills the caches; a cancelled one discards its result.
//!
//! All operations spawn onto the ambient Tokio runtime.

mod state;

pub use state::{ContentState, ResolutionPhase};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{watch, Mutex as AsyncMutex, OnceCell, RwLock};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::cache::{ContentCache, KeyValueStore};
use crate::config::{ContentConfig, ResolutionConfig};
use crate::error::{Error, Result};
use crate::fallback::fallback_events;
use crate::generator::ContentGenerator;
use crate::remote::RemoteCache;
use crate::types::{CacheKey, CacheStats, ContentSource, GenerationParams, HistoricalEvent};

/// Handle to the orchestrator. Cheap to clone.
#[derive(Clone)]
pub struct ContentOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    config: ResolutionConfig,
    max_events: usize,
    generator: ContentGenerator,
    remote: Arc<dyn RemoteCache>,
    storage: Arc<dyn KeyValueStore>,
    cache: RwLock<ContentCache>,
    loaded: OnceCell<()>,
    persist_lock: AsyncMutex<()>,
    control: Mutex<Control>,
    state: watch::Sender<ContentState>,
}

/// Request bookkeeping; every field is read and written under one lock.
struct Control {
    /// Key of the last initiated request
    current_key: Option<CacheKey>,
    next_request_id: u64,
    /// Debounce timer of the newest request
    debounce: Option<CancellationToken>,
    /// Replaced on every `cancel()`
    epoch: CancellationToken,
    in_flight: HashMap<CacheKey, InFlight>,
    /// Key and tier of the events currently on screen
    shown: Option<(CacheKey, ContentSource)>,
}

#[derive(Clone, Copy)]
struct InFlight {
    id: u64,
    phase: ResolutionPhase,
}

/// Removes an in-flight registration however the resolution ends.
struct InFlightGuard {
    inner: Arc<Inner>,
    key: CacheKey,
    id: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut control = self.inner.control();
        if control.in_flight.get(&self.key).is_some_and(|f| f.id == self.id) {
            control.in_flight.remove(&self.key);
        }
    }
}

impl ContentOrchestrator {
    pub fn new(
        config: &ContentConfig,
        generator: ContentGenerator,
        remote: Arc<dyn RemoteCache>,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        let control = Control {
            current_key: None,
            next_request_id: 0,
            debounce: None,
            epoch: CancellationToken::new(),
            in_flight: HashMap::new(),
            shown: None,
        };

        Self {
            inner: Arc::new(Inner {
                config: config.resolution.clone(),
                max_events: config.generator.max_events,
                generator,
                remote,
                storage,
                cache: RwLock::new(ContentCache::new()),
                loaded: OnceCell::new(),
                persist_lock: AsyncMutex::new(()),
                control: Mutex::new(control),
                state: watch::Sender::new(ContentState::default()),
            }),
        }
    }

    /// Load the persisted cache and compute initial stats.
    ///
    /// Optional: the first resolution loads the cache lazily.
    pub async fn initialize(&self) -> CacheStats {
        self.inner.ensure_loaded().await;
        self.refresh_cache_stats().await
    }

    pub fn subscribe(&self) -> watch::Receiver<ContentState> {
        self.inner.state.subscribe()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> ContentState {
        self.inner.state.borrow().clone()
    }

    /// Fire-and-forget request; results arrive through [`Self::subscribe`].
    ///
    /// A request for the key of the last initiated request is a no-op.
    pub fn request_content(&self, params: GenerationParams) {
        let key = params.cache_key();

        let (debounce, epoch, id) = {
            let mut control = self.inner.control();
            if control.current_key.as_ref() == Some(&key) {
                trace!(key = %key, "Same key as last request, ignoring");
                return;
            }

            if let Some(previous) = control.debounce.take() {
                previous.cancel();
            }

            let debounce = control.epoch.child_token();
            control.debounce = Some(debounce.clone());
            control.current_key = Some(key.clone());
            control.next_request_id += 1;

            self.inner
                .state
                .send_modify(|state| state.enter(&key, ResolutionPhase::Debouncing));

            (debounce, control.epoch.clone(), control.next_request_id)
        };

        debug!(key = %key, request = id, "Content requested");
        tokio::spawn(self.inner.clone().run(params, key, debounce, epoch, id));
    }

    /// Request and wait until the request settles.
    ///
    /// Returns [`Error::Cancelled`] if `cancel()` intervenes and
    /// [`Error::Superseded`] if a newer request takes over.
    pub async fn resolve(&self, params: GenerationParams) -> Result<ContentState> {
        let key = params.cache_key();
        let mut rx = self.subscribe();
        self.request_content(params);

        let state = rx
            .wait_for(|state| state.phase.is_terminal() || state.key.as_ref() != Some(&key))
            .await
            .map_err(|_| Error::Cancelled)?
            .clone();

        if state.phase == ResolutionPhase::Cancelled {
            Err(Error::Cancelled)
        } else if state.key.as_ref() != Some(&key) {
            Err(Error::Superseded)
        } else {
            Ok(state)
        }
    }

    /// Abort whatever is pending or running. Visible events are left alone and
    /// `key`/`source` are restored to the request they came from.
    pub fn cancel(&self) {
        let mut control = self.inner.control();
        control.epoch.cancel();
        control.epoch = CancellationToken::new();
        control.debounce = None;
        control.current_key = None;
        control.in_flight.clear();

        let shown = control.shown.clone();
        self.inner.state.send_modify(|state| {
            state.is_loading = false;
            state.show_skeleton = false;
            state.error = None;
            state.phase = ResolutionPhase::Cancelled;
            state.key = shown.as_ref().map(|(key, _)| key.clone());
            state.source = shown.map(|(_, source)| source);
        });
        info!("Resolution cancelled");
    }

    pub fn clear_error(&self) {
        self.inner.state.send_if_modified(|state| state.error.take().is_some());
    }

    /// Clear the error and request `params` again, even if it is the current key.
    pub fn retry(&self, params: GenerationParams) {
        self.clear_error();
        self.inner.control().current_key = None;
        self.request_content(params);
    }

    /// Drop the local entry for `params` so the next request skips Tier 1.
    pub async fn invalidate(&self, params: &GenerationParams) -> bool {
        self.inner.ensure_loaded().await;
        let key = params.cache_key();

        let removed = self.inner.cache.write().await.remove(&key).is_some();
        if removed {
            self.inner.persist().await;
        }

        let mut control = self.inner.control();
        if control.current_key.as_ref() == Some(&key) {
            control.current_key = None;
        }
        removed
    }

    /// Recompute and publish cache statistics. Remote failures count as zero.
    pub async fn refresh_cache_stats(&self) -> CacheStats {
        self.inner.refresh_cache_stats().await
    }

    /// Locally cached keys, sorted
    pub async fn local_keys(&self) -> Vec<CacheKey> {
        self.inner.ensure_loaded().await;
        self.inner.cache.read().await.keys()
    }

    /// Locally cached result set for `params`, without side effects
    pub async fn cached(&self, params: &GenerationParams) -> Option<Vec<HistoricalEvent>> {
        self.inner.ensure_loaded().await;
        self.inner.cache.read().await.get(&params.cache_key()).cloned()
    }

    /// Empty the local cache, memory and persisted snapshot alike.
    pub async fn clear_local(&self) -> Result<usize> {
        self.inner.ensure_loaded().await;

        let cleared = {
            let mut cache = self.inner.cache.write().await;
            let count = cache.len();
            cache.clear();
            count
        };
        self.inner
            .storage
            .remove(&self.inner.config.cache_storage_key)
            .await?;
        self.inner.control().current_key = None;

        info!(cleared, "Local cache cleared");
        Ok(cleared)
    }

    pub fn remote(&self) -> &Arc<dyn RemoteCache> {
        &self.inner.remote
    }
}

impl Inner {
    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn ensure_loaded(&self) {
        self.loaded
            .get_or_init(|| async {
                let key = &self.config.cache_storage_key;
                match self.storage.get_string(key).await {
                    Ok(Some(raw)) => match self.cache.write().await.deserialize(&raw) {
                        Ok(count) => info!(entries = count, "Loaded persisted content cache"),
                        Err(e) => warn!(error = %e, "Persisted content cache is unreadable"),
                    },
                    Ok(None) => debug!("No persisted content cache"),
                    Err(e) => warn!(error = %e, "Could not load persisted content cache"),
                }
            })
            .await;
    }

    /// Write the whole cache snapshot. Failures are logged and swallowed.
    async fn persist(&self) {
        let _ordered = self.persist_lock.lock().await;

        let snapshot = match self.cache.read().await.serialize() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Could not serialize content cache");
                return;
            }
        };

        if let Err(e) = self
            .storage
            .set_string(&self.config.cache_storage_key, &snapshot)
            .await
        {
            warn!(error = %e, "Could not persist content cache");
        }
    }

    /// Write through to the local cache. Returns false if `epoch` was
    /// cancelled before or during the write.
    async fn store_local(
        &self,
        key: &CacheKey,
        events: Vec<HistoricalEvent>,
        epoch: &CancellationToken,
    ) -> bool {
        let stored = {
            let mut cache = self.cache.write().await;
            if epoch.is_cancelled() {
                return false;
            }
            cache.set(key.clone(), events)
        };
        if stored {
            self.persist().await;
        }
        !epoch.is_cancelled()
    }

    async fn refresh_cache_stats(&self) -> CacheStats {
        let local = self.cache.read().await.len();
        let remote = self.remote.usage_stats().await.unwrap_or_else(|e| {
            debug!(error = %e, "Remote stats unavailable");
            Default::default()
        });

        let stats = CacheStats {
            local,
            global: remote.total_content,
            total_usage: remote.total_usage,
        };
        self.state
            .send_modify(|state| state.cache_stats = Some(stats));
        stats
    }

    fn is_current(control: &Control, key: &CacheKey, epoch: &CancellationToken) -> bool {
        !epoch.is_cancelled() && control.current_key.as_ref() == Some(key)
    }

    /// Register a resolution for `key`, or adopt the one already running.
    fn begin(
        self: &Arc<Self>,
        key: &CacheKey,
        id: u64,
        epoch: &CancellationToken,
    ) -> Option<InFlightGuard> {
        let mut control = self.control();
        if !Self::is_current(&control, key, epoch) {
            return None;
        }

        if let Some(running) = control.in_flight.get(key).copied() {
            debug!(key = %key, adopted = running.id, "Adopting in-flight resolution");
            self.state.send_modify(|state| state.enter(key, running.phase));
            return None;
        }

        control.in_flight.insert(
            key.clone(),
            InFlight {
                id,
                phase: ResolutionPhase::Debouncing,
            },
        );
        Some(InFlightGuard {
            inner: self.clone(),
            key: key.clone(),
            id,
        })
    }

    /// Move to an intermediate phase, if this resolution is still current.
    fn publish(&self, key: &CacheKey, id: u64, epoch: &CancellationToken, phase: ResolutionPhase) {
        let mut control = self.control();
        if let Some(flight) = control.in_flight.get_mut(key).filter(|f| f.id == id) {
            flight.phase = phase;
        }
        if Self::is_current(&control, key, epoch) {
            self.state.send_modify(|state| state.enter(key, phase));
        }
    }

    /// Finish the resolution and commit its result if it is still current.
    fn finish(
        &self,
        key: &CacheKey,
        id: u64,
        epoch: &CancellationToken,
        events: Vec<HistoricalEvent>,
        source: ContentSource,
        error: Option<String>,
    ) -> bool {
        let mut control = self.control();
        if control.in_flight.get(key).is_some_and(|f| f.id == id) {
            control.in_flight.remove(key);
        }

        if !Self::is_current(&control, key, epoch) {
            debug!(key = %key, source = source.as_str(), "Result superseded, not shown");
            return false;
        }

        let count = events.len();
        control.shown = Some((key.clone(), source));
        self.state
            .send_modify(|state| state.settle(key, events, source, error));
        info!(key = %key, source = source.as_str(), events = count, "Content settled");
        true
    }

    /// Sleep unless cancelled first. Returns false on cancellation.
    async fn dwell(&self, duration: Duration, epoch: &CancellationToken) -> bool {
        if duration.is_zero() {
            return !epoch.is_cancelled();
        }
        tokio::select! {
            _ = epoch.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    async fn run(
        self: Arc<Self>,
        params: GenerationParams,
        key: CacheKey,
        debounce: CancellationToken,
        epoch: CancellationToken,
        id: u64,
    ) {
        tokio::select! {
            _ = debounce.cancelled() => {
                trace!(key = %key, request = id, "Debounce superseded");
                return;
            }
            _ = tokio::time::sleep(self.config.debounce()) => {}
        }

        self.ensure_loaded().await;

        let Some(_guard) = self.begin(&key, id, &epoch) else {
            return;
        };

        // Tier 1: memory
        let cached = self.cache.read().await.get(&key).cloned();
        if let Some(events) = cached {
            debug!(key = %key, tier = "memory", "Cache hit");
            self.publish(&key, id, &epoch, ResolutionPhase::CacheHitSkeleton);
            if !self.dwell(self.config.min_skeleton(), &epoch).await {
                return;
            }
            self.finish(&key, id, &epoch, events, ContentSource::Memory, None);
            self.refresh_cache_stats().await;
            return;
        }

        // Tier 2: remote. The skeleton is only shown once the lookup hits.
        let lookup_started = Instant::now();
        match self.remote.get(&params).await {
            Ok(Some(row)) if !row.events.is_empty() => {
                debug!(key = %key, tier = "remote", row = %row.id, "Cache hit");
                if epoch.is_cancelled() {
                    return;
                }
                self.publish(&key, id, &epoch, ResolutionPhase::RemoteHitSkeleton);

                if let Err(e) = self.remote.increment_usage(&row.id).await {
                    debug!(key = %key, error = %e, "Usage increment failed");
                }
                if !self.store_local(&key, row.events.clone(), &epoch).await {
                    return;
                }
                let remaining = self
                    .config
                    .min_skeleton()
                    .saturating_sub(lookup_started.elapsed());
                if !self.dwell(remaining, &epoch).await {
                    return;
                }
                self.finish(&key, id, &epoch, row.events, ContentSource::Remote, None);
                self.refresh_cache_stats().await;
                return;
            }
            Ok(_) => debug!(key = %key, tier = "remote", "Cache miss"),
            Err(e) if e.is_transient() => {
                debug!(
                    key = %key,
                    tier = "remote",
                    error = %e,
                    "Lookup failed, treating as miss"
                );
            }
            Err(e) => {
                warn!(
                    key = %key,
                    tier = "remote",
                    error = %e,
                    "Lookup failed, treating as miss"
                );
            }
        }

        if epoch.is_cancelled() {
            return;
        }

        // Tier 3: generate
        self.publish(&key, id, &epoch, ResolutionPhase::Generating);
        let result = self.generator.generate_events(&params).await;
        if epoch.is_cancelled() {
            debug!(key = %key, "Generation finished after cancel, discarding");
            return;
        }

        match result {
            Ok(events) => {
                if !self.store_local(&key, events.clone(), &epoch).await {
                    return;
                }
                if let Err(e) = self.remote.put(&params, &events).await {
                    debug!(key = %key, error = %e, "Remote write failed");
                }
                self.finish(&key, id, &epoch, events, ContentSource::Generated, None);
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Generation failed, using fallback set");
                let events = fallback_events(&params, self.max_events);
                if !self.store_local(&key, events.clone(), &epoch).await {
                    return;
                }
                self.finish(
                    &key,
                    id,
                    &epoch,
                    events,
                    ContentSource::Fallback,
                    Some(format!("Could not generate content: {}", e)),
                );
            }
        }
        self.refresh_cache_stats().await;
    }
}
