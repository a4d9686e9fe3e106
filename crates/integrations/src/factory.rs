//! Builds the collaborator set for a run from [`AppConfig`].

use std::sync::Arc;

use campaign_core::config::{AppConfig, StorageBackend};
use campaign_core::services::{AiService, AssetIndex, AssetStorage, BrandRepository};
use campaign_core::CampaignResult;
use tracing::info;

use crate::ai::{FakeAiService, OpenAiService};
use crate::brand::{InMemoryBrandRepository, WeaviateBrandRepository};
use crate::index::{InMemoryAssetIndex, WeaviateAssetIndex};
use crate::storage::{InMemoryStorage, LocalFsStorage, S3Storage};

/// The collaborators a campaign run is wired with.
#[derive(Clone)]
pub struct Adapters {
    pub ai: Arc<dyn AiService>,
    pub storage: Arc<dyn AssetStorage>,
    /// Absent when reuse lookups are disabled.
    pub index: Option<Arc<dyn AssetIndex>>,
    pub brands: Arc<dyn BrandRepository>,
}

impl Adapters {
    /// All in-memory adapters, index enabled.
    pub fn in_memory() -> Self {
        Self {
            ai: Arc::new(FakeAiService::new()),
            storage: Arc::new(InMemoryStorage::new()),
            index: Some(Arc::new(InMemoryAssetIndex::new())),
            brands: Arc::new(InMemoryBrandRepository::new()),
        }
    }
}

/// `use_real_adapters` selects OpenAI and Weaviate over the in-memory
/// stand-ins; storage follows `storage.backend` on its own.
pub struct AdapterFactory<'a> {
    config: &'a AppConfig,
}

impl<'a> AdapterFactory<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self { config }
    }

    pub fn ai(&self) -> CampaignResult<Arc<dyn AiService>> {
        if self.config.use_real_adapters {
            Ok(Arc::new(OpenAiService::new(&self.config.openai, &self.config.overlay)?))
        } else {
            Ok(Arc::new(FakeAiService::new()))
        }
    }

    pub async fn storage(&self) -> CampaignResult<Arc<dyn AssetStorage>> {
        let storage: Arc<dyn AssetStorage> = match self.config.storage.backend {
            StorageBackend::Memory => Arc::new(InMemoryStorage::new()),
            StorageBackend::Local => Arc::new(LocalFsStorage::new(&self.config.storage.local_root)),
            StorageBackend::S3 => Arc::new(S3Storage::connect(&self.config.storage).await?),
        };
        Ok(storage)
    }

    pub async fn index(&self) -> CampaignResult<Option<Arc<dyn AssetIndex>>> {
        if !self.config.generation.index_enabled {
            return Ok(None);
        }
        let index: Arc<dyn AssetIndex> = if self.config.use_real_adapters {
            Arc::new(WeaviateAssetIndex::connect(&self.config.weaviate).await?)
        } else {
            Arc::new(InMemoryAssetIndex::new())
        };
        Ok(Some(index))
    }

    pub async fn brands(&self) -> CampaignResult<Arc<dyn BrandRepository>> {
        if self.config.use_real_adapters {
            Ok(Arc::new(
                WeaviateBrandRepository::connect(&self.config.weaviate).await?,
            ))
        } else {
            Ok(Arc::new(InMemoryBrandRepository::new()))
        }
    }

    pub async fn build(&self) -> CampaignResult<Adapters> {
        let adapters = Adapters {
            ai: self.ai()?,
            storage: self.storage().await?,
            index: self.index().await?,
            brands: self.brands().await?,
        };
        info!(
            ai = adapters.ai.name(),
            storage = adapters.storage.name(),
            index = adapters.index.as_ref().map(|i| i.name()).unwrap_or("disabled"),
            brands = adapters.brands.name(),
            "Adapters ready"
        );
        Ok(adapters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::CampaignError;

    #[tokio::test]
    async fn test_default_config_builds_fakes() {
        let config = AppConfig::default();
        let adapters = AdapterFactory::new(&config).build().await.unwrap();
        assert_eq!(adapters.ai.name(), "fake");
        assert_eq!(adapters.storage.name(), "memory");
        assert!(adapters.index.is_none());
        assert_eq!(adapters.brands.name(), "memory");
    }

    #[tokio::test]
    async fn test_index_and_local_storage() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.generation.index_enabled = true;
        config.storage.backend = StorageBackend::Local;
        config.storage.local_root = dir.path().to_string_lossy().into_owned();

        let adapters = AdapterFactory::new(&config).build().await.unwrap();
        assert_eq!(adapters.index.unwrap().name(), "memory");
        assert_eq!(adapters.storage.name(), "local");
    }

    #[test]
    fn test_real_ai_requires_key() {
        let mut config = AppConfig::default();
        config.use_real_adapters = true;
        let result = AdapterFactory::new(&config).ai();
        assert!(matches!(result, Err(CampaignError::Config(_))));
    }

    #[test]
    fn test_in_memory_bundle() {
        let adapters = Adapters::in_memory();
        assert!(adapters.index.is_some());
    }
}
