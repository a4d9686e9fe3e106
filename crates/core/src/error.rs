use thiserror::Error;

pub type CampaignResult<T> = Result<T, CampaignError>;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid campaign brief: {0}")]
    InvalidBrief(String),

    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    #[error("Brand not found: {0}")]
    BrandNotFound(String),

    #[error("AI service error: {0}")]
    Ai(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Asset index error: {0}")]
    Index(String),

    #[error("Brand repository error: {0}")]
    BrandRepository(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
