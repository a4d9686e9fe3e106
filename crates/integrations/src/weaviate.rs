//! Minimal Weaviate REST/GraphQL client shared by the asset index and the
//! brand repository.

use campaign_core::{CampaignError, CampaignResult};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

/// Deterministic object id, so re-inserting the same logical record replaces it.
pub(crate) fn object_id(class: &str, key: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{class}/{key}").as_bytes())
}

/// Quote a value as a GraphQL string literal.
pub(crate) fn gql_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// `where` operand matching a text property exactly.
pub(crate) fn where_equal(property: &str, value: &str) -> String {
    format!(
        "{{path: [\"{property}\"], operator: Equal, valueText: {}}}",
        gql_string(value)
    )
}

/// Conjunction of `where` operands.
pub(crate) fn where_all(operands: &[String]) -> String {
    match operands {
        [single] => single.clone(),
        _ => format!("{{operator: And, operands: [{}]}}", operands.join(", ")),
    }
}

/// Pull the object list for `class` out of a `Get` query response.
pub(crate) fn get_objects(data: &Value, class: &str) -> Vec<Value> {
    data.get("Get")
        .and_then(|get| get.get(class))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

pub(crate) struct WeaviateClient {
    client: reqwest::Client,
    base_url: String,
    error: fn(String) -> CampaignError,
}

impl WeaviateClient {
    pub(crate) fn new(base_url: &str, error: fn(String) -> CampaignError) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            error,
        }
    }

    fn fail(&self, context: &str, err: impl std::fmt::Display) -> CampaignError {
        (self.error)(format!("{context}: {err}"))
    }

    /// Create the class from `definition` unless it already exists.
    pub(crate) async fn ensure_class(&self, class: &str, definition: Value) -> CampaignResult<()> {
        let response = self
            .client
            .get(format!("{}/v1/schema/{class}", self.base_url))
            .send()
            .await
            .map_err(|e| self.fail("schema lookup failed", e))?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                info!(class, "Creating Weaviate class");
                let response = self
                    .client
                    .post(format!("{}/v1/schema", self.base_url))
                    .json(&definition)
                    .send()
                    .await
                    .map_err(|e| self.fail("schema creation failed", e))?;
                if response.status().is_success() {
                    Ok(())
                } else {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    Err(self.fail("schema creation failed", format!("{status}: {body}")))
                }
            }
            other => Err(self.fail("schema lookup failed", other)),
        }
    }

    /// Run a GraphQL query and return its `data` member.
    pub(crate) async fn graphql(&self, query: &str) -> CampaignResult<Value> {
        debug!(query, "Weaviate GraphQL query");
        let response = self
            .client
            .post(format!("{}/v1/graphql", self.base_url))
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(|e| self.fail("GraphQL request failed", e))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| self.fail("GraphQL response unreadable", e))?;
        if !status.is_success() {
            return Err(self.fail("GraphQL request failed", format!("{status}: {body}")));
        }
        if let Some(errors) = body.get("errors").filter(|e| !e.is_null()) {
            return Err(self.fail("GraphQL query rejected", errors));
        }
        Ok(body.get("data").cloned().unwrap_or(Value::Null))
    }

    /// Insert an object with a fixed id, replacing it if it already exists.
    pub(crate) async fn put_object(
        &self,
        class: &str,
        id: Uuid,
        properties: Value,
    ) -> CampaignResult<()> {
        let object = json!({ "class": class, "id": id, "properties": properties });

        let response = self
            .client
            .post(format!("{}/v1/objects", self.base_url))
            .json(&object)
            .send()
            .await
            .map_err(|e| self.fail("object insert failed", e))?;

        let response = if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            // Already exists: replace in place.
            self.client
                .put(format!("{}/v1/objects/{class}/{id}", self.base_url))
                .json(&object)
                .send()
                .await
                .map_err(|e| self.fail("object replace failed", e))?
        } else {
            response
        };

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(self.fail("object write failed", format!("{status}: {body}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_where_clauses() {
        let clause = where_all(&[
            where_equal("product_name", "Lavender Soap"),
            where_equal("locale", "en-US"),
        ]);
        assert_eq!(
            clause,
            "{operator: And, operands: [\
             {path: [\"product_name\"], operator: Equal, valueText: \"Lavender Soap\"}, \
             {path: [\"locale\"], operator: Equal, valueText: \"en-US\"}]}"
        );
        assert_eq!(
            where_all(&[where_equal("brand_id", "x")]),
            "{path: [\"brand_id\"], operator: Equal, valueText: \"x\"}"
        );
    }

    #[test]
    fn test_gql_string_escapes_quotes() {
        assert_eq!(gql_string("Say \"hi\""), "\"Say \\\"hi\\\"\"");
    }

    #[test]
    fn test_object_id_is_stable() {
        assert_eq!(object_id("BrandAsset", "abc"), object_id("BrandAsset", "abc"));
        assert_ne!(object_id("BrandAsset", "abc"), object_id("Brand", "abc"));
    }

    #[test]
    fn test_get_objects() {
        let data = json!({"Get": {"Brand": [{"brand_id": "a"}, {"brand_id": "b"}]}});
        assert_eq!(get_objects(&data, "Brand").len(), 2);
        assert!(get_objects(&data, "BrandAsset").is_empty());
        assert!(get_objects(&Value::Null, "Brand").is_empty());
    }
}
