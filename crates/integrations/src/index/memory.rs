//! In-memory asset index with exact product/aspect/locale matching.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use campaign_core::services::AssetIndex;
use campaign_core::types::CreativeAsset;
use campaign_core::CampaignResult;
use parking_lot::RwLock;

/// A stored index record.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub asset: CreativeAsset,
    pub tags: Vec<String>,
    pub palette: Vec<String>,
    pub image_len: Option<usize>,
}

/// Insertion-ordered index; an upsert with a known asset id replaces the entry in place.
pub struct InMemoryAssetIndex {
    entries: RwLock<Vec<IndexEntry>>,
    find_calls: AtomicUsize,
    upsert_calls: AtomicUsize,
}

impl InMemoryAssetIndex {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            find_calls: AtomicUsize::new(0),
            upsert_calls: AtomicUsize::new(0),
        }
    }

    /// Pre-load an existing asset, tagged as a seed.
    pub fn with_asset(self, asset: CreativeAsset) -> Self {
        self.entries.write().push(IndexEntry {
            asset,
            tags: vec!["seed".to_string()],
            palette: Vec::new(),
            image_len: None,
        });
        self
    }

    pub fn entries(&self) -> Vec<IndexEntry> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::Relaxed)
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryAssetIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetIndex for InMemoryAssetIndex {
    async fn find_existing(
        &self,
        product_name: &str,
        aspect_ratio: &str,
        locale: &str,
        limit: usize,
    ) -> CampaignResult<Vec<CreativeAsset>> {
        self.find_calls.fetch_add(1, Ordering::Relaxed);
        let matches = self
            .entries
            .read()
            .iter()
            .filter(|e| {
                e.asset.product_name == product_name
                    && e.asset.aspect_ratio == aspect_ratio
                    && e.asset.locale == locale
            })
            .take(limit)
            .map(|e| CreativeAsset {
                reused: true,
                ..e.asset.clone()
            })
            .collect();
        Ok(matches)
    }

    async fn upsert(
        &self,
        asset: &CreativeAsset,
        image: Option<&[u8]>,
        tags: &[String],
        palette: Option<&[String]>,
    ) -> CampaignResult<()> {
        self.upsert_calls.fetch_add(1, Ordering::Relaxed);
        let entry = IndexEntry {
            asset: asset.clone(),
            tags: tags.to_vec(),
            palette: palette.map(<[String]>::to_vec).unwrap_or_default(),
            image_len: image.map(<[u8]>::len),
        };

        let mut entries = self.entries.write();
        match entries
            .iter_mut()
            .find(|e| e.asset.asset_id == asset.asset_id)
        {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;

    fn asset(id: &str, product: &str, aspect: &str, locale: &str) -> CreativeAsset {
        CreativeAsset {
            asset_id: id.to_string(),
            brief_id: "old-brief".to_string(),
            brand_id: "natural-suds-co".to_string(),
            product_name: product.to_string(),
            audience: "Everyone".to_string(),
            locale: locale.to_string(),
            aspect_ratio: aspect.to_string(),
            message: "Old message".to_string(),
            image_url: format!("s3://assets/{id}.png"),
            reused: false,
            generated_at: Utc::now(),
            meta: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_exact_match_only() {
        let index = InMemoryAssetIndex::new()
            .with_asset(asset("a1", "Soap", "1:1", "en-US"))
            .with_asset(asset("a2", "Lavender Soap", "1:1", "en-US"))
            .with_asset(asset("a3", "Soap", "9:16", "en-US"));

        let hits = index.find_existing("Soap", "1:1", "en-US", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].asset_id, "a1");
        assert!(hits[0].reused);

        assert!(index
            .find_existing("Soap", "1:1", "es-US", 5)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(index.find_calls(), 2);
    }

    #[tokio::test]
    async fn test_limit_and_order() {
        let index = InMemoryAssetIndex::new()
            .with_asset(asset("first", "Soap", "1:1", "en-US"))
            .with_asset(asset("second", "Soap", "1:1", "en-US"));

        let hits = index.find_existing("Soap", "1:1", "en-US", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].asset_id, "first");
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let index = InMemoryAssetIndex::new();
        let tags = vec!["generated".to_string()];

        index
            .upsert(&asset("a1", "Soap", "1:1", "en-US"), Some(b"png"), &tags, None)
            .await
            .unwrap();
        let mut updated = asset("a1", "Soap", "1:1", "en-US");
        updated.message = "New message".to_string();
        index.upsert(&updated, None, &tags, None).await.unwrap();

        let entries = index.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].asset.message, "New message");
        assert_eq!(entries[0].tags, tags);
        assert_eq!(index.upsert_calls(), 2);
    }
}
