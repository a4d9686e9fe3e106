//! Collaborator abstractions consumed by the generation pipeline.
//!
//! Every external capability (AI, blob storage, asset index, brand lookup)
//! sits behind one of these traits. `campaign-integrations` provides an
//! in-memory implementation of each for tests and demos, and a
//! network-backed one for real runs.

use async_trait::async_trait;

use crate::error::CampaignResult;
use crate::types::{BrandProfile, BrandSummary, CreativeAsset};

/// Image generation, text overlay, brand understanding and localization.
#[async_trait]
pub trait AiService: Send + Sync {
    /// Generate a hero image (PNG bytes) from a text prompt.
    async fn generate_image(&self, prompt: &str, aspect_ratio: &str) -> CampaignResult<Vec<u8>>;

    /// Render `text` onto `image`, returning new PNG bytes.
    async fn overlay_text(
        &self,
        image: &[u8],
        text: &str,
        aspect_ratio: &str,
    ) -> CampaignResult<Vec<u8>>;

    /// Extract colors, voice and typography from brand asset references.
    async fn understand_brand(&self, asset_refs: &[String]) -> CampaignResult<BrandProfile>;

    /// Translate `text` while preserving brand voice.
    async fn localize(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> CampaignResult<String>;

    /// Adapter name for logging.
    fn name(&self) -> &str;
}

/// Path-addressed blob storage.
#[async_trait]
pub trait AssetStorage: Send + Sync {
    /// Persist `content` at `path` and return its location (path or URL).
    async fn save(&self, path: &str, content: &[u8]) -> CampaignResult<String>;

    /// Fails with [`crate::CampaignError::NotFound`] when nothing is stored at `path`.
    async fn load(&self, path: &str) -> CampaignResult<Vec<u8>>;

    async fn exists(&self, path: &str) -> CampaignResult<bool>;

    async fn list(&self, prefix: &str) -> CampaignResult<Vec<String>>;

    fn name(&self) -> &str;
}

/// Searchable index of previously produced creatives.
///
/// `find_existing` is an exact match on product, aspect ratio and locale;
/// implementations must not substitute similarity matches.
#[async_trait]
pub trait AssetIndex: Send + Sync {
    async fn find_existing(
        &self,
        product_name: &str,
        aspect_ratio: &str,
        locale: &str,
        limit: usize,
    ) -> CampaignResult<Vec<CreativeAsset>>;

    async fn upsert(
        &self,
        asset: &CreativeAsset,
        image: Option<&[u8]>,
        tags: &[String],
        palette: Option<&[String]>,
    ) -> CampaignResult<()>;

    fn name(&self) -> &str;
}

/// Brand lookup and similarity search.
#[async_trait]
pub trait BrandRepository: Send + Sync {
    async fn get_by_id(&self, brand_id: &str) -> CampaignResult<Option<BrandSummary>>;

    async fn search_similar(
        &self,
        brand: &BrandSummary,
        limit: usize,
    ) -> CampaignResult<Vec<BrandSummary>>;

    /// Insert or replace a brand (used for seeding).
    async fn upsert(&self, brand: &BrandSummary) -> CampaignResult<()>;

    fn name(&self) -> &str;
}
