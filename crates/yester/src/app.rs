//! Wiring of the content pipeline for one CLI invocation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use yester_core::cache::{FileStore, KeyValueStore, MemoryStore};
use yester_core::client::GeminiClient;
use yester_core::generator::{
    ContentGenerator, ImageBackend, ImageRequest, ImageResponse, TextBackend, TextRequest,
};
use yester_core::remote::{NoopRemoteCache, RemoteCache, SqliteRemoteCache};
use yester_core::{ContentOrchestrator, Error};

use crate::config::Config;

/// How the pipeline was assembled, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub generation: bool,
    pub shared_cache: bool,
    pub persistent: bool,
}

pub struct App {
    pub orchestrator: ContentOrchestrator,
    pub storage: Arc<dyn KeyValueStore>,
    pub capabilities: Capabilities,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BuildOptions {
    pub ephemeral: bool,
    pub offline: bool,
}

impl App {
    pub fn build(config: &Config, options: BuildOptions) -> Result<Self> {
        let storage: Arc<dyn KeyValueStore> = if options.ephemeral {
            Arc::new(MemoryStore::new())
        } else {
            config.ensure_dirs()?;
            Arc::new(FileStore::new(config.cache_dir()))
        };

        let (remote, shared_cache): (Arc<dyn RemoteCache>, bool) = if options.offline {
            (Arc::new(NoopRemoteCache), false)
        } else {
            let path = config.remote_db_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create shared cache directory")?;
            }
            match SqliteRemoteCache::open(&path) {
                Ok(db) => (Arc::new(db), true),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Shared cache unavailable, continuing without it"
                    );
                    (Arc::new(NoopRemoteCache), false)
                }
            }
        };

        let (generator, generation) = match config.api_key() {
            Some(key) => {
                let client = GeminiClient::with_options(
                    key,
                    config.api.base_url.clone(),
                    config.request_timeout(),
                )
                .context("Failed to create Gemini client")?;
                (
                    ContentGenerator::gemini(client, config.content.generator.clone()),
                    true,
                )
            }
            None => {
                debug!("No Gemini API key configured, generation disabled");
                let backend = Arc::new(MissingApiKey);
                (
                    ContentGenerator::new(
                        backend.clone(),
                        backend,
                        config.content.generator.clone(),
                    ),
                    false,
                )
            }
        };

        let orchestrator =
            ContentOrchestrator::new(&config.content, generator, remote, storage.clone());

        Ok(Self {
            orchestrator,
            storage,
            capabilities: Capabilities {
                generation,
                shared_cache,
                persistent: !options.ephemeral,
            },
        })
    }
}

/// Backend used when no API key is configured; every call fails, so
/// resolution degrades to the fallback set.
struct MissingApiKey;

const MISSING_KEY_MESSAGE: &str = "no Gemini API key configured (set GEMINI_API_KEY)";

#[async_trait]
impl TextBackend for MissingApiKey {
    async fn generate_text(&self, _request: TextRequest) -> yester_core::Result<String> {
        Err(Error::Other(MISSING_KEY_MESSAGE.into()))
    }
}

#[async_trait]
impl ImageBackend for MissingApiKey {
    async fn generate_image(&self, _request: ImageRequest) -> yester_core::Result<ImageResponse> {
        Err(Error::Other(MISSING_KEY_MESSAGE.into()))
    }
}
