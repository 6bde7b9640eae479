//! Content generator.
//!
//! Turns [`GenerationParams`] into a result set of events, each with an image.
//! Text failures propagate; image failures never do, they resolve to the
//! deterministic fallback cascade per event.
//!
//! # Strategies
//!
//! - [`ImageStrategy::AttemptAi`] ("premium"): ask the image backend for every
//!   event in parallel, each under its own timeout.
//! - [`ImageStrategy::FallbackOnly`] ("optimized"): skip image generation and
//!   use curated fallbacks for every event.
//!
//! [`ContentGenerator::generate_events`] runs premium first and retries in
//! optimized mode when it fails.

mod backend;
mod parse;
mod prompt;

pub use backend::{
    ImageBackend, ImageRequest, ImageResponse, Modality, ResponsePart, TextBackend, TextRequest,
};
pub use parse::parse_events;
pub use prompt::{image_prompt, text_prompt};

use base64::Engine;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::fallback::fallback_image;
use crate::types::{GenerationParams, HistoricalEvent};

/// How event imagery is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStrategy {
    /// Try AI imagery for every event, falling back per event
    AttemptAi,
    /// Curated fallback imagery only
    FallbackOnly,
}

impl ImageStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AttemptAi => "premium",
            Self::FallbackOnly => "optimized",
        }
    }
}

/// Backend-agnostic event generator
#[derive(Clone)]
pub struct ContentGenerator {
    text: Arc<dyn TextBackend>,
    image: Arc<dyn ImageBackend>,
    config: GeneratorConfig,
}

impl ContentGenerator {
    pub fn new(
        text: Arc<dyn TextBackend>,
        image: Arc<dyn ImageBackend>,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            text,
            image,
            config,
        }
    }

    /// Generator backed by a single Gemini client for both text and images
    #[cfg(feature = "client")]
    pub fn gemini(client: crate::client::GeminiClient, config: GeneratorConfig) -> Self {
        let client = Arc::new(client);
        Self::new(client.clone(), client, config)
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Request and parse narrative text. Errors if no valid event comes back.
    pub async fn generate_text(
        &self,
        params: &GenerationParams,
        strategy: ImageStrategy,
    ) -> Result<Vec<HistoricalEvent>> {
        let request = TextRequest {
            model: self.config.text_model.clone(),
            prompt: text_prompt(params, strategy, self.config.max_events),
        };

        let raw = self.text.generate_text(request).await?;
        let events = parse_events(&raw, params, self.config.max_events);
        if events.is_empty() {
            warn!(
                key = %params.cache_key(),
                bytes = raw.len(),
                "Completion contained no parseable events"
            );
            return Err(Error::NoEvents);
        }

        debug!(key = %params.cache_key(), count = events.len(), "Parsed events");
        Ok(events)
    }

    /// Request an illustration and return it as a `data:` URL.
    ///
    /// Fails with [`Error::NoImage`] when the response carries no usable payload.
    pub async fn generate_image(&self, event: &HistoricalEvent) -> Result<String> {
        let request = ImageRequest {
            model: self.config.image_model.clone(),
            prompt: image_prompt(event),
            modalities: vec![Modality::Text, Modality::Image],
            temperature: self.config.image_temperature,
        };

        let response = self.image.generate_image(request).await?;
        let (mime_type, data) = response.first_inline_image().ok_or(Error::NoImage)?;

        if base64::engine::general_purpose::STANDARD.decode(data).is_err() {
            warn!(title = %event.title, "Image payload is not valid base64");
            return Err(Error::NoImage);
        }

        let mime_type = if mime_type.is_empty() { "image/png" } else { mime_type };
        Ok(format!("data:{};base64,{}", mime_type, data))
    }

    /// Image for the event at `index`, never failing.
    ///
    /// The backend call races its budget; a timeout or error resolves to the
    /// fallback cascade for this event only. A late backend answer is dropped.
    pub async fn resolve_image(
        &self,
        params: &GenerationParams,
        event: &HistoricalEvent,
        index: usize,
    ) -> String {
        let budget = self.config.image_timeout(index);

        let outcome = tokio::time::timeout(budget, self.generate_image(event))
            .await
            .unwrap_or_else(|_| Err(Error::timeout(budget.as_millis() as u64)));

        match outcome {
            Ok(url) => {
                debug!(index, title = %event.title, "AI image generated");
                url
            }
            Err(e) if e.is_timeout() => {
                debug!(
                    index,
                    title = %event.title,
                    error = %e,
                    "AI image timed out, using fallback"
                );
                fallback_image(params, &event.title, index).to_string()
            }
            Err(e) => {
                debug!(
                    index,
                    title = %event.title,
                    error = %e,
                    "AI image failed, using fallback"
                );
                fallback_image(params, &event.title, index).to_string()
            }
        }
    }

    /// Generate a complete result set with the given image strategy.
    pub async fn generate(
        &self,
        params: &GenerationParams,
        strategy: ImageStrategy,
    ) -> Result<Vec<HistoricalEvent>> {
        let mut events = self.generate_text(params, strategy).await?;

        let images: Vec<String> = match strategy {
            ImageStrategy::AttemptAi => {
                join_all(
                    events
                        .iter()
                        .enumerate()
                        .map(|(index, event)| self.resolve_image(params, event, index)),
                )
                .await
            }
            ImageStrategy::FallbackOnly => events
                .iter()
                .enumerate()
                .map(|(index, event)| fallback_image(params, &event.title, index).to_string())
                .collect(),
        };

        for (index, (event, image)) in events.iter_mut().zip(images).enumerate() {
            event.image_url = Some(image);
            event.is_primary = index == 0;
        }

        info!(
            key = %params.cache_key(),
            mode = strategy.as_str(),
            count = events.len(),
            "Generated events"
        );
        Ok(events)
    }

    /// Premium generation, retried once in optimized mode on failure.
    pub async fn generate_events(&self, params: &GenerationParams) -> Result<Vec<HistoricalEvent>> {
        match self.generate(params, ImageStrategy::AttemptAi).await {
            Ok(events) => Ok(events),
            Err(first) => {
                warn!(
                    key = %params.cache_key(),
                    error = %first,
                    "Premium generation failed, retrying optimized"
                );
                self.generate(params, ImageStrategy::FallbackOnly)
                    .await
                    .map_err(|e| {
                        Error::generation(format!("{}; retry without images: {}", first, e))
                    })
            }
        }
    }
}
