use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CampaignError, CampaignResult};

// ─── Campaign Brief ─────────────────────────────────────────────────────────

/// Raw product shape accepted by deserialization before the name check.
#[derive(Debug, Clone, Deserialize)]
struct RawProduct {
    name: String,
    #[serde(default)]
    palette_words: Vec<String>,
}

/// A product featured in a campaign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawProduct")]
pub struct Product {
    name: String,
    /// Visual style keywords, e.g. `["vibrant", "modern"]`.
    palette_words: Vec<String>,
}

impl Product {
    /// Fails immediately when `name` is empty.
    pub fn new(
        name: impl Into<String>,
        palette_words: impl IntoIterator<Item = impl Into<String>>,
    ) -> CampaignResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CampaignError::InvalidProduct(
                "Product name is required".to_string(),
            ));
        }
        Ok(Self {
            name,
            palette_words: palette_words.into_iter().map(Into::into).collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn palette_words(&self) -> &[String] {
        &self.palette_words
    }

    /// Lowercased name with spaces replaced by hyphens, used in storage paths.
    pub fn slug(&self) -> String {
        self.name.to_lowercase().replace(' ', "-")
    }
}

impl TryFrom<RawProduct> for Product {
    type Error = CampaignError;

    fn try_from(raw: RawProduct) -> Result<Self, Self::Error> {
        Product::new(raw.name, raw.palette_words)
    }
}

/// Input contract for campaign generation.
///
/// Construction never fails; [`CampaignBrief::validate`] reports whether the
/// brief meets the minimum shape (2 products, 3 aspect ratios, 1 locale).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignBrief {
    pub brief_id: String,
    pub brand_id: String,
    pub campaign_slogan: String,
    /// e.g. "North America", "EMEA".
    pub target_region: String,
    /// e.g. "Gen Z professionals".
    pub target_audience: String,
    /// e.g. `["en-US", "es-US"]`.
    pub target_locales: Vec<String>,
    pub products: Vec<Product>,
    /// e.g. `["1:1", "9:16", "16:9"]`.
    pub aspects: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl CampaignBrief {
    pub const MIN_PRODUCTS: usize = 2;
    pub const MIN_ASPECTS: usize = 3;
    pub const MIN_LOCALES: usize = 1;

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check the brief against its shape requirements, naming the first violation.
    pub fn validate(&self) -> CampaignResult<()> {
        let problem = if self.brief_id.trim().is_empty() {
            Some("brief_id is empty".to_string())
        } else if self.brand_id.trim().is_empty() {
            Some("brand_id is empty".to_string())
        } else if self.campaign_slogan.trim().is_empty() {
            Some("campaign_slogan is empty".to_string())
        } else if self.products.len() < Self::MIN_PRODUCTS {
            Some(format!(
                "at least {} products required, got {}",
                Self::MIN_PRODUCTS,
                self.products.len()
            ))
        } else if self.aspects.len() < Self::MIN_ASPECTS {
            Some(format!(
                "at least {} aspect ratios required, got {}",
                Self::MIN_ASPECTS,
                self.aspects.len()
            ))
        } else if self.target_locales.len() < Self::MIN_LOCALES {
            Some("at least one target locale required".to_string())
        } else {
            None
        };

        match problem {
            Some(reason) => Err(CampaignError::InvalidBrief(reason)),
            None => Ok(()),
        }
    }

    /// Number of creative assets a full run produces.
    pub fn total_assets_required(&self) -> usize {
        self.products.len() * self.aspects.len() * self.target_locales.len()
    }
}

// ─── Brand ──────────────────────────────────────────────────────────────────

/// Brand identity and guidelines used to steer image generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrandSummary {
    pub brand_id: String,
    pub name: String,
    pub description: String,
    /// Hex codes, e.g. `["#FF5733", "#33FF57"]`.
    pub colors: Vec<String>,
    pub typography: Option<String>,
    /// e.g. "professional", "playful".
    pub voice_tone: String,
    #[serde(default)]
    pub target_audiences: Vec<String>,
    #[serde(default)]
    pub target_regions: Vec<String>,
    #[serde(default)]
    pub products: Vec<String>,
    /// Historical slogans.
    #[serde(default)]
    pub campaign_slogans: Vec<String>,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BrandSummary {
    /// True when the minimum required fields are present.
    pub fn validate(&self) -> bool {
        !self.brand_id.is_empty()
            && !self.name.is_empty()
            && !self.description.is_empty()
            && !self.colors.is_empty()
            && !self.voice_tone.is_empty()
    }

    /// The example brand used by demos and the in-memory repository.
    pub fn natural_suds_co() -> Self {
        let now = Utc::now();
        Self {
            brand_id: "natural-suds-co".to_string(),
            name: "Natural Suds Co.".to_string(),
            description: "Organic personal care products".to_string(),
            colors: vec![
                "#8B7355".to_string(),
                "#E6D5B8".to_string(),
                "#4A6741".to_string(),
            ],
            typography: Some("Montserrat".to_string()),
            voice_tone: "warm, natural, trustworthy".to_string(),
            target_audiences: vec![
                "Health-conscious millennials".to_string(),
                "Eco-friendly shoppers".to_string(),
            ],
            target_regions: vec!["North America".to_string(), "Europe".to_string()],
            products: vec![
                "Lavender Soap".to_string(),
                "Citrus Shower Gel".to_string(),
                "Rose Hand Cream".to_string(),
            ],
            campaign_slogans: vec!["Pure Nature".to_string(), "Wellness Naturally".to_string()],
            logo_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Guidelines extracted from brand assets by the AI collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BrandProfile {
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub voice_tone: String,
    #[serde(default)]
    pub typography: Option<String>,
}

// ─── Creative Asset ─────────────────────────────────────────────────────────

/// One generated or reused creative for a product/aspect/locale combination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreativeAsset {
    pub asset_id: String,
    pub brief_id: String,
    pub brand_id: String,
    pub product_name: String,
    pub audience: String,
    pub locale: String,
    pub aspect_ratio: String,
    /// Localized slogan rendered on the image.
    pub message: String,
    /// Storage location returned by the storage collaborator.
    pub image_url: String,
    pub reused: bool,
    pub generated_at: DateTime<Utc>,
    /// Generation prompt, validation status and other free-form details.
    #[serde(default)]
    pub meta: HashMap<String, String>,
}

impl CreativeAsset {
    pub const META_PROMPT: &'static str = "prompt";
    pub const META_VALIDATION_STATUS: &'static str = "validation_status";

    pub fn prompt(&self) -> Option<&str> {
        self.meta.get(Self::META_PROMPT).map(String::as_str)
    }
}

// ─── Validation ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Passed,
    Failed,
    Warning,
    Skipped,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidationStatus::Passed => "passed",
            ValidationStatus::Failed => "failed",
            ValidationStatus::Warning => "warning",
            ValidationStatus::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IssueSeverity::Error => "error",
            IssueSeverity::Warning => "warning",
            IssueSeverity::Info => "info",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub check_name: String,
    pub severity: IssueSeverity,
    pub message: String,
    pub fix_suggestion: Option<String>,
}

/// Outcome of the compliance checks for a single asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationResult {
    pub asset_id: String,
    pub status: ValidationStatus,
    pub checks_run: Vec<String>,
    pub issues: Vec<ValidationIssue>,
    pub passed_count: usize,
    pub failed_count: usize,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.status == ValidationStatus::Passed && self.failed_count == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "Validation: {} passed, {} failed",
            self.passed_count, self.failed_count
        )
    }
}

// ─── Alerts ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    MissingAssets,
    InsufficientVariants,
    GenerationFailed,
    ValidationFailed,
    ApiError,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::MissingAssets => "missing_assets",
            AlertType::InsufficientVariants => "insufficient_variants",
            AlertType::GenerationFailed => "generation_failed",
            AlertType::ValidationFailed => "validation_failed",
            AlertType::ApiError => "api_error",
        }
    }
}

/// A monitoring alert raised about a campaign run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: String,
    pub brief_id: String,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    #[serde(default)]
    pub context: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution: Option<String>,
}

impl Alert {
    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }

    pub fn resolve(&mut self, resolution: impl Into<String>) {
        self.resolved_at = Some(Utc::now());
        self.resolution = Some(resolution.into());
    }

    /// One-line rendering for stakeholders, e.g. `[WARNING] insufficient_variants: ...`.
    pub fn to_human_readable(&self) -> String {
        let severity = match self.severity {
            AlertSeverity::Info => "INFO",
            AlertSeverity::Warning => "WARNING",
            AlertSeverity::Error => "ERROR",
            AlertSeverity::Critical => "CRITICAL",
        };
        format!("[{}] {}: {}", severity, self.alert_type.as_str(), self.message)
    }
}
