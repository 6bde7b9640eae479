//! Last (year, region, topic) selection, kept across runs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use yester_core::cache::KeyValueStore;
use yester_core::GenerationParams;

use crate::cli::SelectionArgs;

const SELECTION_KEY: &str = "yester-last-selection";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub year: i32,
    pub region: String,
    pub topic: String,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            year: 2024,
            region: "America".to_string(),
            topic: "History".to_string(),
        }
    }
}

impl Selection {
    /// Stored selection, or the default when missing or unreadable.
    pub async fn load(store: &dyn KeyValueStore) -> Self {
        match store.get_string(SELECTION_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring unreadable saved selection");
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read saved selection");
                Self::default()
            }
        }
    }

    pub async fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        let raw = serde_json::to_string(self).context("Failed to serialize selection")?;
        store
            .set_string(SELECTION_KEY, &raw)
            .await
            .context("Failed to save selection")
    }

    /// Override fields given on the command line.
    pub fn merge(mut self, args: &SelectionArgs) -> Self {
        if let Some(year) = args.year {
            self.year = year;
        }
        if let Some(region) = &args.region {
            self.region = region.clone();
        }
        if let Some(topic) = &args.topic {
            self.topic = topic.clone();
        }
        self
    }

    pub fn params(&self) -> GenerationParams {
        GenerationParams::new(self.year, self.region.clone(), self.topic.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yester_core::cache::MemoryStore;

    #[tokio::test]
    async fn test_load_defaults_then_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(Selection::load(&store).await, Selection::default());

        let picked = Selection::default().merge(&SelectionArgs {
            year: Some(1492),
            region: Some("Europe".into()),
            topic: None,
        });
        picked.save(&store).await.unwrap();

        let loaded = Selection::load(&store).await;
        assert_eq!(loaded.year, 1492);
        assert_eq!(loaded.region, "Europe");
        assert_eq!(loaded.topic, "History");
        assert_eq!(loaded.params().cache_key().as_str(), "1492-Europe-History");
    }

    #[test]
    fn test_corrupt_selection_uses_default() {
        let store = MemoryStore::new();
        tokio_test::block_on(store.set_string(SELECTION_KEY, "{not json")).unwrap();

        let loaded = tokio_test::block_on(Selection::load(&store));
        assert_eq!(loaded, Selection::default());
    }
}
