//! Weaviate-backed asset index.
//!
//! Assets live in a multimodal (CLIP) class. Lookups use exact `Equal`
//! filters on field-tokenized properties and are re-checked client side, so
//! `"Soap"` never matches `"Lavender Soap"`.

use async_trait::async_trait;
use base64::Engine;
use campaign_core::config::WeaviateConfig;
use campaign_core::services::AssetIndex;
use campaign_core::types::CreativeAsset;
use campaign_core::{CampaignError, CampaignResult};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::weaviate::{get_objects, object_id, where_all, where_equal, WeaviateClient};

const RETURN_FIELDS: &str =
    "asset_id brand_id product_name locale aspect_ratio message audience image_url generated_at";

fn text_property(name: &str, exact: bool) -> Value {
    let mut property = json!({ "name": name, "dataType": ["text"] });
    if exact {
        property["tokenization"] = json!("field");
    }
    property
}

/// Class definition for the asset collection.
pub(crate) fn asset_class_definition(class: &str) -> Value {
    json!({
        "class": class,
        "vectorizer": "multi2vec-clip",
        "moduleConfig": {
            "multi2vec-clip": {
                "imageFields": ["image"],
                "textFields": ["message", "product_name"]
            }
        },
        "properties": [
            text_property("asset_id", true),
            text_property("brand_id", true),
            text_property("brief_id", true),
            text_property("product_name", true),
            text_property("locale", true),
            text_property("aspect_ratio", true),
            text_property("message", false),
            text_property("audience", false),
            text_property("image_url", true),
            { "name": "tags", "dataType": ["text[]"] },
            { "name": "palette", "dataType": ["text[]"] },
            { "name": "image", "dataType": ["blob"] },
            { "name": "generated_at", "dataType": ["date"] }
        ]
    })
}

pub(crate) fn find_query(
    class: &str,
    product_name: &str,
    aspect_ratio: &str,
    locale: &str,
    limit: usize,
) -> String {
    let filter = where_all(&[
        where_equal("product_name", product_name),
        where_equal("aspect_ratio", aspect_ratio),
        where_equal("locale", locale),
    ]);
    format!("{{ Get {{ {class}(where: {filter}, limit: {limit}) {{ {RETURN_FIELDS} }} }} }}")
}

fn str_field(object: &Value, field: &str) -> String {
    object
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Map a stored object onto a reusable asset. The brief id is left empty
/// for the caller to fill in.
pub(crate) fn asset_from_object(object: &Value) -> CreativeAsset {
    let generated_at = object
        .get("generated_at")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    CreativeAsset {
        asset_id: str_field(object, "asset_id"),
        brief_id: String::new(),
        brand_id: str_field(object, "brand_id"),
        product_name: str_field(object, "product_name"),
        audience: str_field(object, "audience"),
        locale: str_field(object, "locale"),
        aspect_ratio: str_field(object, "aspect_ratio"),
        message: str_field(object, "message"),
        image_url: str_field(object, "image_url"),
        reused: true,
        generated_at,
        meta: Default::default(),
    }
}

pub(crate) fn asset_properties(
    asset: &CreativeAsset,
    image: Option<&[u8]>,
    tags: &[String],
    palette: Option<&[String]>,
) -> Value {
    let mut properties = json!({
        "asset_id": asset.asset_id,
        "brand_id": asset.brand_id,
        "brief_id": asset.brief_id,
        "product_name": asset.product_name,
        "locale": asset.locale,
        "aspect_ratio": asset.aspect_ratio,
        "message": asset.message,
        "audience": asset.audience,
        "image_url": asset.image_url,
        "tags": tags,
        "palette": palette.unwrap_or_default(),
        "generated_at": asset.generated_at.to_rfc3339(),
    });
    if let Some(bytes) = image {
        properties["image"] = json!(base64::engine::general_purpose::STANDARD.encode(bytes));
    }
    properties
}

pub struct WeaviateAssetIndex {
    client: WeaviateClient,
    class: String,
}

impl WeaviateAssetIndex {
    /// Connect and make sure the asset class exists.
    pub async fn connect(config: &WeaviateConfig) -> CampaignResult<Self> {
        let client = WeaviateClient::new(&config.url, CampaignError::Index);
        let class = config.asset_collection.clone();
        client
            .ensure_class(&class, asset_class_definition(&class))
            .await?;
        info!(url = %config.url, class = %class, "Weaviate asset index ready");
        Ok(Self { client, class })
    }
}

#[async_trait]
impl AssetIndex for WeaviateAssetIndex {
    async fn find_existing(
        &self,
        product_name: &str,
        aspect_ratio: &str,
        locale: &str,
        limit: usize,
    ) -> CampaignResult<Vec<CreativeAsset>> {
        let query = find_query(&self.class, product_name, aspect_ratio, locale, limit);
        let data = self.client.graphql(&query).await?;

        let matches: Vec<CreativeAsset> = get_objects(&data, &self.class)
            .iter()
            .map(asset_from_object)
            .filter(|a| {
                a.product_name == product_name
                    && a.aspect_ratio == aspect_ratio
                    && a.locale == locale
            })
            .take(limit)
            .collect();
        debug!(product_name, aspect_ratio, locale, hits = matches.len(), "asset index lookup");
        Ok(matches)
    }

    async fn upsert(
        &self,
        asset: &CreativeAsset,
        image: Option<&[u8]>,
        tags: &[String],
        palette: Option<&[String]>,
    ) -> CampaignResult<()> {
        let id = object_id(&self.class, &asset.asset_id);
        self.client
            .put_object(&self.class, id, asset_properties(asset, image, tags, palette))
            .await?;
        debug!(asset_id = %asset.asset_id, "asset indexed");
        Ok(())
    }

    fn name(&self) -> &str {
        "weaviate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_class_definition_uses_field_tokenization() {
        let definition = asset_class_definition("BrandAsset");
        assert_eq!(definition["class"], "BrandAsset");
        assert_eq!(definition["vectorizer"], "multi2vec-clip");

        let properties = definition["properties"].as_array().unwrap();
        let product = properties
            .iter()
            .find(|p| p["name"] == "product_name")
            .unwrap();
        assert_eq!(product["tokenization"], "field");
        let message = properties.iter().find(|p| p["name"] == "message").unwrap();
        assert!(message.get("tokenization").is_none());
    }

    #[test]
    fn test_find_query() {
        let query = find_query("BrandAsset", "Lavender Soap", "1:1", "en-US", 1);
        assert!(query.starts_with("{ Get { BrandAsset(where: {operator: And"));
        assert!(query.contains("valueText: \"Lavender Soap\""));
        assert!(query.contains("limit: 1"));
        assert!(query.contains("image_url"));
    }

    #[test]
    fn test_asset_from_object() {
        let object = json!({
            "asset_id": "abc123def456",
            "brand_id": "natural-suds-co",
            "product_name": "Lavender Soap",
            "locale": "en-US",
            "aspect_ratio": "1:1",
            "message": "Pure Nature",
            "audience": "Gift shoppers",
            "image_url": "s3://assets/lavender-soap/en-US/1x1/abc123def456.png",
            "generated_at": "2025-11-02T10:00:00Z"
        });
        let asset = asset_from_object(&object);
        assert!(asset.reused);
        assert!(asset.brief_id.is_empty());
        assert_eq!(asset.product_name, "Lavender Soap");
        assert_eq!(asset.generated_at.to_rfc3339(), "2025-11-02T10:00:00+00:00");
    }

    #[test]
    fn test_asset_properties_encode_image() {
        let asset = CreativeAsset {
            asset_id: "a1".to_string(),
            brief_id: "brief".to_string(),
            brand_id: "brand".to_string(),
            product_name: "Soap".to_string(),
            audience: "All".to_string(),
            locale: "en-US".to_string(),
            aspect_ratio: "1:1".to_string(),
            message: "Hi".to_string(),
            image_url: "soap/en-US/1x1/a1.png".to_string(),
            reused: false,
            generated_at: Utc::now(),
            meta: HashMap::new(),
        };
        let tags = vec!["generated".to_string()];

        let with_image = asset_properties(&asset, Some(b"png"), &tags, None);
        assert_eq!(with_image["image"], "cG5n");
        assert_eq!(with_image["tags"], json!(["generated"]));
        assert_eq!(with_image["palette"], json!([]));

        let without = asset_properties(&asset, None, &tags, None);
        assert!(without.get("image").is_none());
    }
}
