//! Weaviate-backed brand repository with text-vectorized similarity search.

use async_trait::async_trait;
use campaign_core::config::WeaviateConfig;
use campaign_core::services::BrandRepository;
use campaign_core::types::BrandSummary;
use campaign_core::{CampaignError, CampaignResult};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::similarity_text;
use crate::weaviate::{get_objects, gql_string, object_id, where_equal, WeaviateClient};

const BRAND_FIELDS: &str = "brand_id name description colors typography voice_tone \
     target_audiences target_regions products campaign_slogans logo_url created_at updated_at";

pub(crate) fn brand_class_definition(class: &str) -> Value {
    let text = |name: &str| json!({ "name": name, "dataType": ["text"] });
    let list = |name: &str| json!({ "name": name, "dataType": ["text[]"] });
    json!({
        "class": class,
        "description": "Brand identity and guidelines for campaign generation",
        "vectorizer": "text2vec-transformers",
        "properties": [
            { "name": "brand_id", "dataType": ["text"], "tokenization": "field" },
            text("name"),
            text("description"),
            list("colors"),
            text("typography"),
            text("voice_tone"),
            list("target_audiences"),
            list("target_regions"),
            list("products"),
            list("campaign_slogans"),
            text("logo_url"),
            { "name": "created_at", "dataType": ["date"] },
            { "name": "updated_at", "dataType": ["date"] }
        ]
    })
}

/// Stored objects keep optional text as `""`; map those back to `None`.
pub(crate) fn brand_from_object(object: Value) -> CampaignResult<BrandSummary> {
    let mut brand: BrandSummary = serde_json::from_value(object)
        .map_err(|e| CampaignError::BrandRepository(format!("malformed brand object: {e}")))?;
    brand.logo_url = brand.logo_url.filter(|s| !s.is_empty());
    brand.typography = brand.typography.filter(|s| !s.is_empty());
    Ok(brand)
}

pub(crate) fn brand_properties(brand: &BrandSummary) -> Value {
    json!({
        "brand_id": brand.brand_id,
        "name": brand.name,
        "description": brand.description,
        "colors": brand.colors,
        "typography": brand.typography.clone().unwrap_or_default(),
        "voice_tone": brand.voice_tone,
        "target_audiences": brand.target_audiences,
        "target_regions": brand.target_regions,
        "products": brand.products,
        "campaign_slogans": brand.campaign_slogans,
        "logo_url": brand.logo_url.clone().unwrap_or_default(),
        "created_at": brand.created_at.to_rfc3339(),
        "updated_at": brand.updated_at.to_rfc3339(),
    })
}

/// Drop the query brand from near-text hits and cap the result.
pub(crate) fn exclude_query_brand(
    hits: Vec<BrandSummary>,
    brand_id: &str,
    limit: usize,
) -> Vec<BrandSummary> {
    hits.into_iter()
        .filter(|b| b.brand_id != brand_id)
        .take(limit)
        .collect()
}

pub struct WeaviateBrandRepository {
    client: WeaviateClient,
    class: String,
}

impl WeaviateBrandRepository {
    pub async fn connect(config: &WeaviateConfig) -> CampaignResult<Self> {
        let client = WeaviateClient::new(&config.url, CampaignError::BrandRepository);
        let class = config.brand_collection.clone();
        client
            .ensure_class(&class, brand_class_definition(&class))
            .await?;
        info!(url = %config.url, class = %class, "Weaviate brand repository ready");
        Ok(Self { client, class })
    }

    fn parse_all(&self, data: &Value) -> Vec<BrandSummary> {
        get_objects(data, &self.class)
            .into_iter()
            .filter_map(|object| match brand_from_object(object) {
                Ok(brand) => Some(brand),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable brand object");
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl BrandRepository for WeaviateBrandRepository {
    async fn get_by_id(&self, brand_id: &str) -> CampaignResult<Option<BrandSummary>> {
        let query = format!(
            "{{ Get {{ {}(where: {}, limit: 1) {{ {BRAND_FIELDS} }} }} }}",
            self.class,
            where_equal("brand_id", brand_id)
        );
        let data = self.client.graphql(&query).await?;
        match get_objects(&data, &self.class).into_iter().next() {
            Some(object) => brand_from_object(object).map(Some),
            None => Ok(None),
        }
    }

    async fn search_similar(
        &self,
        brand: &BrandSummary,
        limit: usize,
    ) -> CampaignResult<Vec<BrandSummary>> {
        // One extra hit, since the stored copy of the brand itself ranks first.
        let query = format!(
            "{{ Get {{ {}(nearText: {{concepts: [{}]}}, limit: {}) {{ {BRAND_FIELDS} }} }} }}",
            self.class,
            gql_string(&similarity_text(brand)),
            limit + 1
        );
        let data = self.client.graphql(&query).await?;
        let similar = exclude_query_brand(self.parse_all(&data), &brand.brand_id, limit);
        debug!(brand_id = %brand.brand_id, hits = similar.len(), "brand similarity search");
        Ok(similar)
    }

    async fn upsert(&self, brand: &BrandSummary) -> CampaignResult<()> {
        let id = object_id(&self.class, &brand.brand_id);
        self.client
            .put_object(&self.class, id, brand_properties(brand))
            .await?;
        info!(brand_id = %brand.brand_id, "brand upserted");
        Ok(())
    }

    fn name(&self) -> &str {
        "weaviate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_roundtrip_through_object() {
        let brand = BrandSummary::natural_suds_co();
        let parsed = brand_from_object(brand_properties(&brand)).unwrap();
        assert_eq!(parsed.brand_id, brand.brand_id);
        assert_eq!(parsed.colors, brand.colors);
        assert_eq!(parsed.typography.as_deref(), Some("Montserrat"));
        assert!(parsed.logo_url.is_none());
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let object = json!({
            "brand_id": "acme",
            "name": "Acme",
            "description": "Tools",
            "colors": ["#000000"],
            "typography": null,
            "voice_tone": "bold",
            "logo_url": "https://cdn/acme.png",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-02T00:00:00Z"
        });
        let brand = brand_from_object(object).unwrap();
        assert!(brand.products.is_empty());
        assert_eq!(brand.logo_url.as_deref(), Some("https://cdn/acme.png"));
    }

    #[test]
    fn test_malformed_object_is_repository_error() {
        let result = brand_from_object(json!({"brand_id": "x"}));
        assert!(matches!(result, Err(CampaignError::BrandRepository(_))));
    }

    #[test]
    fn test_similar_brands_exclude_the_query_brand() {
        let brand = BrandSummary::natural_suds_co();
        let mut other = brand.clone();
        other.brand_id = "pure-wellness".to_string();
        let mut third = brand.clone();
        third.brand_id = "citrus-co".to_string();

        let hits = vec![brand.clone(), other, third];
        let similar = exclude_query_brand(hits.clone(), &brand.brand_id, 5);
        let ids: Vec<&str> = similar.iter().map(|b| b.brand_id.as_str()).collect();
        assert_eq!(ids, vec!["pure-wellness", "citrus-co"]);

        assert_eq!(exclude_query_brand(hits, &brand.brand_id, 1).len(), 1);
    }

    #[test]
    fn test_class_definition() {
        let definition = brand_class_definition("Brand");
        assert_eq!(definition["vectorizer"], "text2vec-transformers");
        assert_eq!(definition["properties"][0]["tokenization"], "field");
        assert_eq!(definition["properties"].as_array().unwrap().len(), 13);
    }
}
