//! Compliance checks over generated campaign assets.

use campaign_core::config::ValidationConfig;
use campaign_core::types::{
    CreativeAsset, IssueSeverity, ValidationIssue, ValidationResult, ValidationStatus,
};
use tracing::{debug, warn};

pub const CHECK_PROHIBITED_WORDS: &str = "prohibited_words";
/// Placeholder check; always passes.
pub const CHECK_BRAND_COMPLIANCE: &str = "brand_compliance";

/// Scans asset messages for denylisted terms.
#[derive(Debug, Clone)]
pub struct CampaignValidator {
    prohibited_words: Vec<String>,
}

impl CampaignValidator {
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            prohibited_words: config.prohibited_words.clone(),
        }
    }

    /// One result per asset, in input order.
    pub fn validate(&self, assets: &[CreativeAsset]) -> Vec<ValidationResult> {
        assets.iter().map(|a| self.validate_asset(a)).collect()
    }

    pub fn validate_asset(&self, asset: &CreativeAsset) -> ValidationResult {
        let mut checks_run = vec![CHECK_PROHIBITED_WORDS.to_string()];
        let issues = self.check_prohibited_words(&asset.message);
        checks_run.push(CHECK_BRAND_COMPLIANCE.to_string());

        let failed_count = issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Error)
            .count();
        // Several denylisted terms in one message count separately.
        let passed_count = checks_run.len().saturating_sub(failed_count);
        let status = if failed_count == 0 {
            ValidationStatus::Passed
        } else {
            ValidationStatus::Failed
        };

        if failed_count > 0 {
            warn!(
                asset_id = %asset.asset_id,
                message = %asset.message,
                issues = failed_count,
                "Asset failed validation"
            );
        } else {
            debug!(asset_id = %asset.asset_id, "Asset passed validation");
        }

        ValidationResult {
            asset_id: asset.asset_id.clone(),
            status,
            checks_run,
            issues,
            passed_count,
            failed_count,
        }
    }

    fn check_prohibited_words(&self, message: &str) -> Vec<ValidationIssue> {
        let message = message.to_lowercase();
        self.prohibited_words
            .iter()
            .filter(|word| message.contains(&word.to_lowercase()))
            .map(|word| ValidationIssue {
                check_name: CHECK_PROHIBITED_WORDS.to_string(),
                severity: IssueSeverity::Error,
                message: format!("Prohibited word detected: '{word}'"),
                fix_suggestion: Some(format!("Remove or rephrase to avoid '{word}'")),
            })
            .collect()
    }
}

impl Default for CampaignValidator {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}
