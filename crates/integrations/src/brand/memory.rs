//! In-memory brand repository, seeded with the example brand.

use std::collections::HashSet;

use async_trait::async_trait;
use campaign_core::services::BrandRepository;
use campaign_core::types::BrandSummary;
use campaign_core::CampaignResult;
use dashmap::DashMap;

use super::similarity_text;

fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(str::to_lowercase)
        .collect()
}

pub struct InMemoryBrandRepository {
    brands: DashMap<String, BrandSummary>,
}

impl InMemoryBrandRepository {
    /// Repository holding only "Natural Suds Co.".
    pub fn new() -> Self {
        let repo = Self::empty();
        let brand = BrandSummary::natural_suds_co();
        repo.brands.insert(brand.brand_id.clone(), brand);
        repo
    }

    pub fn empty() -> Self {
        Self {
            brands: DashMap::new(),
        }
    }

    pub fn with_brand(self, brand: BrandSummary) -> Self {
        self.brands.insert(brand.brand_id.clone(), brand);
        self
    }

    pub fn len(&self) -> usize {
        self.brands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }
}

impl Default for InMemoryBrandRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrandRepository for InMemoryBrandRepository {
    async fn get_by_id(&self, brand_id: &str) -> CampaignResult<Option<BrandSummary>> {
        Ok(self.brands.get(brand_id).map(|b| b.value().clone()))
    }

    /// Ranks other brands by shared description/voice/audience words.
    async fn search_similar(
        &self,
        brand: &BrandSummary,
        limit: usize,
    ) -> CampaignResult<Vec<BrandSummary>> {
        let query = tokens(&similarity_text(brand));

        let mut scored: Vec<(usize, BrandSummary)> = self
            .brands
            .iter()
            .filter(|entry| entry.key() != &brand.brand_id)
            .filter_map(|entry| {
                let score = tokens(&similarity_text(entry.value()))
                    .intersection(&query)
                    .count();
                (score > 0).then(|| (score, entry.value().clone()))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.brand_id.cmp(&b.1.brand_id)));
        Ok(scored.into_iter().take(limit).map(|(_, b)| b).collect())
    }

    async fn upsert(&self, brand: &BrandSummary) -> CampaignResult<()> {
        self.brands.insert(brand.brand_id.clone(), brand.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
