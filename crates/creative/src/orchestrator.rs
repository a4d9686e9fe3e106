//! End-to-end campaign run: brand lookup, generation, validation, summary.

use std::sync::Arc;

use campaign_core::services::BrandRepository;
use campaign_core::types::{CampaignBrief, CreativeAsset, ValidationResult};
use campaign_core::{CampaignError, CampaignResult};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::generator::CampaignGenerator;
use crate::validator::CampaignValidator;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub total_assets: usize,
    pub validation_passed: usize,
    pub validation_failed: usize,
    pub brief_id: String,
    pub brand_id: String,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignOutcome {
    pub success: bool,
    pub assets: Vec<CreativeAsset>,
    pub validation_results: Vec<ValidationResult>,
    pub summary: CampaignSummary,
}

pub struct CampaignOrchestrator {
    generator: CampaignGenerator,
    validator: CampaignValidator,
    brands: Arc<dyn BrandRepository>,
}

impl CampaignOrchestrator {
    pub fn new(
        generator: CampaignGenerator,
        validator: CampaignValidator,
        brands: Arc<dyn BrandRepository>,
    ) -> Self {
        Self {
            generator,
            validator,
            brands,
        }
    }

    /// Run the full pipeline for `brief`.
    ///
    /// Fails with [`CampaignError::BrandNotFound`] when the brand is unknown
    /// and with the collaborator's error when generation fails. Validation
    /// failures are reported in the outcome, not as errors.
    pub async fn run(&self, brief: &CampaignBrief) -> CampaignResult<CampaignOutcome> {
        info!(
            brief_id = %brief.brief_id,
            brand_id = %brief.brand_id,
            expected_assets = brief.total_assets_required(),
            "Starting campaign run"
        );
        if let Err(e) = brief.validate() {
            warn!(brief_id = %brief.brief_id, error = %e, "Brief below minimum shape; continuing");
        }

        let brand = self
            .brands
            .get_by_id(&brief.brand_id)
            .await?
            .ok_or_else(|| CampaignError::BrandNotFound(brief.brand_id.clone()))?;

        let mut assets = self.generator.generate(brief, &brand).await?;
        let validation_results = self.validator.validate(&assets);

        for (asset, result) in assets.iter_mut().zip(&validation_results) {
            asset.meta.insert(
                CreativeAsset::META_VALIDATION_STATUS.to_string(),
                result.status.to_string(),
            );
        }

        let validation_failed = validation_results.iter().filter(|r| !r.is_valid()).count();
        let summary = CampaignSummary {
            total_assets: assets.len(),
            validation_passed: validation_results.len() - validation_failed,
            validation_failed,
            brief_id: brief.brief_id.clone(),
            brand_id: brief.brand_id.clone(),
        };
        info!(
            brief_id = %summary.brief_id,
            total_assets = summary.total_assets,
            validation_passed = summary.validation_passed,
            validation_failed = summary.validation_failed,
            "Campaign run complete"
        );

        Ok(CampaignOutcome {
            success: true,
            assets,
            validation_results,
            summary,
        })
    }
}
