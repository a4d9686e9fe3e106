use serde::Deserialize;

/// Hex characters in a SHA-256 digest, the longest possible asset id.
pub const MAX_ASSET_ID_LENGTH: usize = 64;

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_GENERATOR__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Build network-backed adapters instead of the in-memory ones.
    #[serde(default)]
    pub use_real_adapters: bool,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub weaviate: WeaviateConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_source_locale")]
    pub source_locale: String,
    #[serde(default = "default_reuse_limit")]
    pub reuse_limit: usize,
    #[serde(default = "default_asset_id_length")]
    pub asset_id_length: usize,
    /// Consult and populate the asset index during generation.
    #[serde(default)]
    pub index_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_prohibited_words")]
    pub prohibited_words: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Slogan rendering for the real AI adapter. Without `font_path` the first
/// font found among a few common system locations is used.
#[derive(Debug, Clone, Deserialize)]
pub struct OverlayConfig {
    #[serde(default)]
    pub font_path: Option<String>,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_bottom_margin")]
    pub bottom_margin: u32,
    #[serde(default = "default_outline_px")]
    pub outline_px: i32,
}

/// Which storage adapter the factory builds.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Local,
    S3,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_backend")]
    pub backend: StorageBackend,
    #[serde(default = "default_local_root")]
    pub local_root: String,
    #[serde(default = "default_s3_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_s3_access_key")]
    pub access_key: String,
    #[serde(default = "default_s3_secret_key")]
    pub secret_key: String,
    #[serde(default = "default_s3_bucket")]
    pub bucket: String,
    #[serde(default = "default_s3_region")]
    pub region: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeaviateConfig {
    #[serde(default = "default_weaviate_url")]
    pub url: String,
    #[serde(default = "default_asset_collection")]
    pub asset_collection: String,
    #[serde(default = "default_brand_collection")]
    pub brand_collection: String,
}

// Default functions
fn default_local_root() -> String {
    "out/assets".to_string()
}
fn default_source_locale() -> String {
    "en-US".to_string()
}
fn default_reuse_limit() -> usize {
    1
}
fn default_asset_id_length() -> usize {
    12
}
fn default_prohibited_words() -> Vec<String> {
    ["guarantee", "miracle", "cure", "free"]
        .iter()
        .map(|w| w.to_string())
        .collect()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_image_model() -> String {
    "gpt-image-1".to_string()
}
fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_request_timeout_secs() -> u64 {
    120
}
fn default_font_size() -> f32 {
    60.0
}
fn default_bottom_margin() -> u32 {
    40
}
fn default_outline_px() -> i32 {
    2
}
fn default_storage_backend() -> StorageBackend {
    StorageBackend::Memory
}
fn default_s3_endpoint() -> String {
    "http://localhost:9000".to_string()
}
fn default_s3_access_key() -> String {
    "minio".to_string()
}
fn default_s3_secret_key() -> String {
    "minio123".to_string()
}
fn default_s3_bucket() -> String {
    "assets".to_string()
}
fn default_s3_region() -> String {
    "us-east-1".to_string()
}
fn default_weaviate_url() -> String {
    "http://127.0.0.1:8080".to_string()
}
fn default_asset_collection() -> String {
    "BrandAsset".to_string()
}
fn default_brand_collection() -> String {
    "Brand".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            source_locale: default_source_locale(),
            reuse_limit: default_reuse_limit(),
            asset_id_length: default_asset_id_length(),
            index_enabled: false,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            prohibited_words: default_prohibited_words(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openai_base_url(),
            image_model: default_image_model(),
            chat_model: default_chat_model(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            font_size: default_font_size(),
            bottom_margin: default_bottom_margin(),
            outline_px: default_outline_px(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            local_root: default_local_root(),
            endpoint: default_s3_endpoint(),
            access_key: default_s3_access_key(),
            secret_key: default_s3_secret_key(),
            bucket: default_s3_bucket(),
            region: default_s3_region(),
        }
    }
}

impl Default for WeaviateConfig {
    fn default() -> Self {
        Self {
            url: default_weaviate_url(),
            asset_collection: default_asset_collection(),
            brand_collection: default_brand_collection(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            use_real_adapters: false,
            generation: GenerationConfig::default(),
            validation: ValidationConfig::default(),
            openai: OpenAiConfig::default(),
            overlay: OverlayConfig::default(),
            storage: StorageConfig::default(),
            weaviate: WeaviateConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and an optional config file.
    pub fn load(config_file: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_file {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        let builder = builder.add_source(
            config::Environment::with_prefix("CAMPAIGN_GENERATOR")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("validation.prohibited_words"),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let id_len = self.generation.asset_id_length;
        if id_len == 0 || id_len > MAX_ASSET_ID_LENGTH {
            return Err(config::ConfigError::Message(format!(
                "generation.asset_id_length must be between 1 and {}, got {}",
                MAX_ASSET_ID_LENGTH, id_len
            )));
        }
        if self.overlay.font_size <= 0.0 {
            return Err(config::ConfigError::Message(
                "overlay.font_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(!config.use_real_adapters);
        assert_eq!(config.generation.source_locale, "en-US");
        assert_eq!(config.generation.reuse_limit, 1);
        assert_eq!(config.generation.asset_id_length, 12);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(
            config.validation.prohibited_words,
            vec!["guarantee", "miracle", "cure", "free"]
        );
    }

    #[test]
    fn test_empty_sections_fall_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"storage": {"backend": "s3"}, "generation": {}}"#).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert_eq!(config.storage.bucket, "assets");
        assert_eq!(config.weaviate.asset_collection, "BrandAsset");
        assert_eq!(config.storage.local_root, "out/assets");
        assert_eq!(config.overlay.font_size, 60.0);
        assert!(config.overlay.font_path.is_none());
    }

    #[test]
    fn test_validate_asset_id_length() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.generation.asset_id_length = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("asset_id_length"));

        config.generation.asset_id_length = MAX_ASSET_ID_LENGTH + 1;
        assert!(config.validate().is_err());

        config.generation.asset_id_length = MAX_ASSET_ID_LENGTH;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_rejects_zero_asset_id_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero-id.toml");
        std::fs::write(&path, "[generation]\nasset_id_length = 0\n").unwrap();

        let err = AppConfig::load(path.to_str()).unwrap_err();
        assert!(err.to_string().contains("asset_id_length"));
    }
}
