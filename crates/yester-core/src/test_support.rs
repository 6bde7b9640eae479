//! Scripted backends and caches for unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::cache::{KeyValueStore, MemoryStore};
use crate::error::{Error, Result};
use crate::generator::{
    ImageBackend, ImageRequest, ImageResponse, ResponsePart, TextBackend, TextRequest,
};
use crate::remote::{RemoteCache, RemoteRow, UsageStats};
use crate::types::{CacheKey, GenerationParams, HistoricalEvent};

/// A completion with `count` well-formed event blocks.
pub fn well_formed(count: usize) -> String {
    (1..=count)
        .map(|n| {
            format!(
                "EVENT_{n}:\nTitle: Generated Event {n}\nContent: 📜 Something notable happened, part {n}.\n\n"
            )
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Text backend
// ─────────────────────────────────────────────────────────────────────────────

/// Text backend replaying a script, then repeating its last reply.
pub struct FakeText {
    script: Mutex<VecDeque<Option<String>>>,
    last: Mutex<Option<String>>,
    delay: Duration,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl FakeText {
    fn scripted(first: Option<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::from([first.clone()])),
            last: Mutex::new(first),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(raw: &str) -> Self {
        Self::scripted(Some(raw.to_string()))
    }

    pub fn failing() -> Self {
        Self::scripted(None)
    }

    /// Queue a successful reply after the ones already scripted
    pub fn then(self, raw: &str) -> Self {
        self.script.lock().unwrap().push_back(Some(raw.to_string()));
        *self.last.lock().unwrap() = Some(raw.to_string());
        self
    }

    /// Queue a failure after the ones already scripted
    pub fn then_fail(self) -> Self {
        self.script.lock().unwrap().push_back(None);
        *self.last.lock().unwrap() = None;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextBackend for FakeText {
    async fn generate_text(&self, request: TextRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt);

        let reply = {
            let mut script = self.script.lock().unwrap();
            match script.pop_front() {
                Some(reply) => reply,
                None => self.last.lock().unwrap().clone(),
            }
        };

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        reply.ok_or_else(|| Error::api(503, "model overloaded"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Image backend
// ─────────────────────────────────────────────────────────────────────────────

enum ImageBehavior {
    Inline { mime_type: String, data: String },
    TextOnly,
    Fail,
    Hang,
}

pub struct FakeImage {
    behavior: ImageBehavior,
    delay: Duration,
    calls: AtomicUsize,
    requests: Mutex<Vec<ImageRequest>>,
}

impl FakeImage {
    fn with_behavior(behavior: ImageBehavior) -> Self {
        Self {
            behavior,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn inline(mime_type: &str, data: &str) -> Self {
        Self::with_behavior(ImageBehavior::Inline {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    /// Responds with a text part only
    pub fn text_only() -> Self {
        Self::with_behavior(ImageBehavior::TextOnly)
    }

    pub fn failing() -> Self {
        Self::with_behavior(ImageBehavior::Fail)
    }

    /// Never answers
    pub fn hanging() -> Self {
        Self::with_behavior(ImageBehavior::Hang)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ImageRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ImageBackend for FakeImage {
    async fn generate_image(&self, request: ImageRequest) -> Result<ImageResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.behavior {
            ImageBehavior::Inline { mime_type, data } => Ok(ImageResponse {
                parts: vec![ResponsePart::InlineImage {
                    mime_type: mime_type.clone(),
                    data: data.clone(),
                }],
            }),
            ImageBehavior::TextOnly => Ok(ImageResponse {
                parts: vec![ResponsePart::Text("I can only describe it.".into())],
            }),
            ImageBehavior::Fail => Err(Error::api(500, "image backend down")),
            ImageBehavior::Hang => std::future::pending().await,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Remote cache
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory remote cache with call counters and an outage switch.
#[derive(Default)]
pub struct FakeRemote {
    rows: Mutex<HashMap<CacheKey, RemoteRow>>,
    offline: AtomicBool,
    delay: Duration,
    gets: AtomicUsize,
    puts: AtomicUsize,
    increments: AtomicUsize,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offline() -> Self {
        let remote = Self::default();
        remote.offline.store(true, Ordering::SeqCst);
        remote
    }

    /// Answer lookups only after `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Seed a row directly, bypassing counters
    pub fn seed(&self, params: &GenerationParams, events: Vec<HistoricalEvent>) {
        let row = RemoteRow {
            id: format!("row-{}", params.cache_key()),
            year: params.year,
            region: params.region.clone(),
            topic: params.topic.clone(),
            events,
            created_at: 0,
            updated_at: 0,
            usage_count: 1,
        };
        self.rows.lock().unwrap().insert(params.cache_key(), row);
    }

    pub fn row(&self, params: &GenerationParams) -> Option<RemoteRow> {
        self.rows.lock().unwrap().get(&params.cache_key()).cloned()
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn increments(&self) -> usize {
        self.increments.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(Error::api(503, "remote unreachable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteCache for FakeRemote {
    async fn get(&self, params: &GenerationParams) -> Result<Option<RemoteRow>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.check_online()?;
        Ok(self.row(params))
    }

    async fn put(&self, params: &GenerationParams, events: &[HistoricalEvent]) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.seed(params, events.to_vec());
        Ok(())
    }

    async fn increment_usage(&self, row_id: &str) -> Result<()> {
        self.increments.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.values_mut().find(|row| row.id == row_id) {
            row.usage_count += 1;
        }
        Ok(())
    }

    async fn usage_stats(&self) -> Result<UsageStats> {
        self.check_online()?;
        let rows = self.rows.lock().unwrap();
        Ok(UsageStats {
            total_content: rows.len() as u64,
            total_usage: rows.values().map(|row| row.usage_count as u64).sum(),
        })
    }

    async fn ping(&self) -> bool {
        self.check_online().is_ok()
    }

    async fn prune(&self, _days_old: u32) -> Result<usize> {
        self.check_online()?;
        Ok(0)
    }

    async fn find_similar(
        &self,
        _params: &GenerationParams,
        _limit: usize,
    ) -> Result<Vec<RemoteRow>> {
        self.check_online()?;
        Ok(Vec::new())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Key-value store
// ─────────────────────────────────────────────────────────────────────────────

/// Memory store whose writes take `delay`.
pub struct SlowStore {
    inner: MemoryStore,
    delay: Duration,
}

impl SlowStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            delay,
        }
    }
}

#[async_trait]
impl KeyValueStore for SlowStore {
    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_string(key).await
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.set_string(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key).await
    }
}
