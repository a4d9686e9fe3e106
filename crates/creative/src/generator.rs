//! Per-combination creative generation.
//!
//! For every (product, aspect ratio, locale) triple of a brief the generator
//! either reuses an indexed asset with an exact match or renders a new one:
//! prompt, hero image, slogan overlay, storage write and index upsert.

use std::collections::HashMap;
use std::sync::Arc;

use campaign_core::config::GenerationConfig;
use campaign_core::services::{AiService, AssetIndex, AssetStorage};
use campaign_core::types::{BrandSummary, CampaignBrief, CreativeAsset, Product};
use campaign_core::CampaignResult;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Validation status recorded on freshly generated assets until the
/// orchestrator validates them.
pub const PENDING_VALIDATION: &str = "pending";

/// Tag attached to assets this pipeline writes into the index.
pub const GENERATED_TAG: &str = "generated";

/// Deterministic asset id: leading hex chars of SHA-256 over the combination.
pub fn asset_id(
    brief_id: &str,
    product: &str,
    aspect_ratio: &str,
    locale: &str,
    len: usize,
) -> String {
    let digest =
        Sha256::digest(format!("{brief_id}-{product}-{aspect_ratio}-{locale}").as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(len);
    id
}

/// Storage path, e.g. `lavender-soap/en-US/9x16/3f2a9c01be7d.png`.
pub fn storage_path(
    product: &Product,
    aspect_ratio: &str,
    locale: &str,
    asset_id: &str,
) -> String {
    format!(
        "{}/{}/{}/{}.png",
        product.slug(),
        locale,
        aspect_ratio.replace(':', "x"),
        asset_id
    )
}

pub fn build_prompt(brand: &BrandSummary, product: &Product, aspect_ratio: &str) -> String {
    format!(
        "Professional product photography of {}. Style: {}. Brand colors: {}. \
         Mood: {}. Aspect ratio: {}. High quality, commercial, clean background.",
        product.name(),
        product.palette_words().join(", "),
        brand.colors.join(", "),
        brand.voice_tone,
        aspect_ratio
    )
}

pub struct CampaignGenerator {
    ai: Arc<dyn AiService>,
    storage: Arc<dyn AssetStorage>,
    index: Option<Arc<dyn AssetIndex>>,
    config: GenerationConfig,
}

impl CampaignGenerator {
    pub fn new(
        ai: Arc<dyn AiService>,
        storage: Arc<dyn AssetStorage>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            ai,
            storage,
            index: None,
            config,
        }
    }

    /// Consult `index` for reusable assets and record new ones in it.
    pub fn with_index(mut self, index: Arc<dyn AssetIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Produce one asset per combination, product outermost, then aspect,
    /// then locale. The first collaborator error aborts the run.
    pub async fn generate(
        &self,
        brief: &CampaignBrief,
        brand: &BrandSummary,
    ) -> CampaignResult<Vec<CreativeAsset>> {
        let slogans = self.localize_slogans(brief).await?;

        let mut assets = Vec::with_capacity(brief.total_assets_required());
        for product in &brief.products {
            for aspect_ratio in &brief.aspects {
                for locale in &brief.target_locales {
                    let slogan = &slogans[locale.as_str()];
                    let asset = self
                        .produce(brief, brand, product, aspect_ratio, locale, slogan)
                        .await?;
                    assets.push(asset);
                }
            }
        }

        let reused = assets.iter().filter(|a| a.reused).count();
        info!(
            brief_id = %brief.brief_id,
            total = assets.len(),
            reused,
            generated = assets.len() - reused,
            "Campaign assets produced"
        );
        Ok(assets)
    }

    /// Localize the slogan once per distinct locale.
    async fn localize_slogans(
        &self,
        brief: &CampaignBrief,
    ) -> CampaignResult<HashMap<String, String>> {
        let mut slogans = HashMap::new();
        for locale in &brief.target_locales {
            if slogans.contains_key(locale) {
                continue;
            }
            let localized = self
                .ai
                .localize(&brief.campaign_slogan, &self.config.source_locale, locale)
                .await?;
            debug!(locale = %locale, slogan = %localized, "Slogan localized");
            slogans.insert(locale.clone(), localized);
        }
        Ok(slogans)
    }

    async fn produce(
        &self,
        brief: &CampaignBrief,
        brand: &BrandSummary,
        product: &Product,
        aspect_ratio: &str,
        locale: &str,
        slogan: &str,
    ) -> CampaignResult<CreativeAsset> {
        if let Some(index) = &self.index {
            let candidates = index
                .find_existing(product.name(), aspect_ratio, locale, self.config.reuse_limit)
                .await?;
            if let Some(mut existing) = candidates.into_iter().next() {
                existing.brief_id = brief.brief_id.clone();
                existing.message = slogan.to_string();
                existing.reused = true;
                info!(
                    asset_id = %existing.asset_id,
                    product = product.name(),
                    aspect_ratio,
                    locale,
                    "Reusing indexed asset"
                );
                return Ok(existing);
            }
        }

        let prompt = build_prompt(brand, product, aspect_ratio);
        let image = self.ai.generate_image(&prompt, aspect_ratio).await?;
        let image = self.ai.overlay_text(&image, slogan, aspect_ratio).await?;

        let id = asset_id(
            &brief.brief_id,
            product.name(),
            aspect_ratio,
            locale,
            self.config.asset_id_length,
        );
        let image_url = self
            .storage
            .save(&storage_path(product, aspect_ratio, locale, &id), &image)
            .await?;

        let asset = CreativeAsset {
            asset_id: id,
            brief_id: brief.brief_id.clone(),
            brand_id: brand.brand_id.clone(),
            product_name: product.name().to_string(),
            audience: brief.target_audience.clone(),
            locale: locale.to_string(),
            aspect_ratio: aspect_ratio.to_string(),
            message: slogan.to_string(),
            image_url,
            reused: false,
            generated_at: Utc::now(),
            meta: HashMap::from([
                (CreativeAsset::META_PROMPT.to_string(), prompt),
                (
                    CreativeAsset::META_VALIDATION_STATUS.to_string(),
                    PENDING_VALIDATION.to_string(),
                ),
            ]),
        };

        if let Some(index) = &self.index {
            index
                .upsert(
                    &asset,
                    Some(&image),
                    &[GENERATED_TAG.to_string()],
                    Some(brand.colors.as_slice()),
                )
                .await?;
        }

        info!(
            asset_id = %asset.asset_id,
            product = product.name(),
            aspect_ratio,
            locale,
            image_url = %asset.image_url,
            "Generated asset"
        );
        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::services::AssetStorage as _;
    use campaign_integrations::{FakeAiService, InMemoryAssetIndex, InMemoryStorage};

    fn brief(products: &[&str], aspects: &[&str], locales: &[&str]) -> CampaignBrief {
        CampaignBrief {
            brief_id: "holiday-2025".to_string(),
            brand_id: "natural-suds-co".to_string(),
            campaign_slogan: "Gift Wellness".to_string(),
            target_region: "North America".to_string(),
            target_audience: "Gift shoppers".to_string(),
            target_locales: locales.iter().map(|s| s.to_string()).collect(),
            products: products
                .iter()
                .map(|p| Product::new(*p, ["calming", "natural"]).unwrap())
                .collect(),
            aspects: aspects.iter().map(|s| s.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_asset_id_is_deterministic() {
        let a = asset_id("b1", "Lavender Soap", "1:1", "en-US", 12);
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, asset_id("b1", "Lavender Soap", "1:1", "en-US", 12));
        assert_ne!(a, asset_id("b1", "Lavender Soap", "1:1", "es-US", 12));
        assert_ne!(a, asset_id("b2", "Lavender Soap", "1:1", "en-US", 12));
    }

    #[test]
    fn test_storage_path_and_prompt() {
        let product = Product::new("Citrus Shower Gel", ["fresh", "zesty"]).unwrap();
        assert_eq!(
            storage_path(&product, "9:16", "es-US", "abc"),
            "citrus-shower-gel/es-US/9x16/abc.png"
        );

        let prompt = build_prompt(&BrandSummary::natural_suds_co(), &product, "9:16");
        assert_eq!(
            prompt,
            "Professional product photography of Citrus Shower Gel. Style: fresh, zesty. \
             Brand colors: #8B7355, #E6D5B8, #4A6741. Mood: warm, natural, trustworthy. \
             Aspect ratio: 9:16. High quality, commercial, clean background."
        );
    }

    #[tokio::test]
    async fn test_generates_every_combination_in_order() {
        let ai = Arc::new(FakeAiService::new());
        let storage = Arc::new(InMemoryStorage::new());
        let generator =
            CampaignGenerator::new(ai.clone(), storage.clone(), GenerationConfig::default());
        let brief = brief(
            &["Lavender Soap", "Citrus Shower Gel"],
            &["1:1", "9:16"],
            &["en-US", "es-US"],
        );

        let assets = generator
            .generate(&brief, &BrandSummary::natural_suds_co())
            .await
            .unwrap();

        assert_eq!(assets.len(), 8);
        let order: Vec<(&str, &str, &str)> = assets
            .iter()
            .take(4)
            .map(|a| (a.product_name.as_str(), a.aspect_ratio.as_str(), a.locale.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Lavender Soap", "1:1", "en-US"),
                ("Lavender Soap", "1:1", "es-US"),
                ("Lavender Soap", "9:16", "en-US"),
                ("Lavender Soap", "9:16", "es-US"),
            ]
        );
        assert_eq!(ai.generate_calls(), 8);
        assert_eq!(ai.overlay_calls(), 8);
        assert_eq!(ai.localize_calls(), 2);
        assert_eq!(storage.len(), 8);

        let first = &assets[0];
        assert!(!first.reused);
        assert_eq!(
            first.image_url,
            format!("lavender-soap/en-US/1x1/{}.png", first.asset_id)
        );
        assert!(storage.exists(&first.image_url).await.unwrap());
        assert_eq!(
            first.meta.get(CreativeAsset::META_VALIDATION_STATUS).map(String::as_str),
            Some(PENDING_VALIDATION)
        );
        assert!(first.prompt().unwrap().contains("Lavender Soap"));
    }

    #[tokio::test]
    async fn test_duplicate_locales_localized_once() {
        let ai = Arc::new(FakeAiService::new());
        let generator = CampaignGenerator::new(
            ai.clone(),
            Arc::new(InMemoryStorage::new()),
            GenerationConfig::default(),
        );
        let brief = brief(&["Soap", "Gel"], &["1:1", "9:16", "16:9"], &["es-US", "es-US"]);

        let assets = generator
            .generate(&brief, &BrandSummary::natural_suds_co())
            .await
            .unwrap();
        assert_eq!(assets.len(), 12);
        assert_eq!(ai.localize_calls(), 1);
        assert!(assets.iter().all(|a| a.message == "Regalo Bienestar"));
    }

    #[tokio::test]
    async fn test_index_hit_skips_generation() {
        let ai = Arc::new(FakeAiService::new());
        let storage = Arc::new(InMemoryStorage::new());
        let existing = CreativeAsset {
            asset_id: "seeded000001".to_string(),
            brief_id: "old-brief".to_string(),
            brand_id: "natural-suds-co".to_string(),
            product_name: "Soap".to_string(),
            audience: "Everyone".to_string(),
            locale: "es-US".to_string(),
            aspect_ratio: "1:1".to_string(),
            message: "Old slogan".to_string(),
            image_url: "soap/es-US/1x1/seeded000001.png".to_string(),
            reused: false,
            generated_at: Utc::now(),
            meta: HashMap::new(),
        };
        let index = Arc::new(InMemoryAssetIndex::new().with_asset(existing));
        let generator =
            CampaignGenerator::new(ai.clone(), storage.clone(), GenerationConfig::default())
                .with_index(index.clone());

        let brief = brief(&["Soap"], &["1:1"], &["es-US", "en-US"]);
        let assets = generator
            .generate(&brief, &BrandSummary::natural_suds_co())
            .await
            .unwrap();

        assert_eq!(assets.len(), 2);
        let reused = &assets[0];
        assert!(reused.reused);
        assert_eq!(reused.asset_id, "seeded000001");
        assert_eq!(reused.brief_id, "holiday-2025");
        assert_eq!(reused.message, "Regalo Bienestar");

        let fresh = &assets[1];
        assert!(!fresh.reused);
        assert_eq!(ai.generate_calls(), 1);
        assert_eq!(ai.overlay_calls(), 1);
        assert_eq!(storage.len(), 1);

        // Only the freshly generated asset is written back, tagged.
        let entries = index.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].asset.asset_id, fresh.asset_id);
        assert_eq!(entries[1].tags, vec![GENERATED_TAG.to_string()]);
        assert_eq!(entries[1].palette, vec!["#8B7355", "#E6D5B8", "#4A6741"]);
        assert!(entries[1].image_len.is_some());
        assert_eq!(index.upsert_calls(), 1);
    }
}
