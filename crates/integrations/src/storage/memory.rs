//! In-memory storage for tests and demos.

use async_trait::async_trait;
use campaign_core::services::AssetStorage;
use campaign_core::{CampaignError, CampaignResult};
use dashmap::DashMap;

/// Path → bytes map; `save` returns the path unchanged.
pub struct InMemoryStorage {
    objects: DashMap<String, Vec<u8>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            objects: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetStorage for InMemoryStorage {
    async fn save(&self, path: &str, content: &[u8]) -> CampaignResult<String> {
        self.objects.insert(path.to_string(), content.to_vec());
        Ok(path.to_string())
    }

    async fn load(&self, path: &str) -> CampaignResult<Vec<u8>> {
        self.objects
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CampaignError::NotFound(path.to_string()))
    }

    async fn exists(&self, path: &str) -> CampaignResult<bool> {
        Ok(self.objects.contains_key(path))
    }

    async fn list(&self, prefix: &str) -> CampaignResult<Vec<String>> {
        let mut paths: Vec<String> = self
            .objects
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect();
        paths.sort();
        Ok(paths)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
