//! Post-run inspection that turns shortfalls into stakeholder alerts.

use std::collections::HashMap;

use campaign_core::types::{Alert, AlertSeverity, AlertType, CampaignBrief};
use campaign_core::CampaignError;
use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use crate::orchestrator::CampaignOutcome;

pub struct CampaignMonitor {
    required_aspects: usize,
}

impl CampaignMonitor {
    pub fn new() -> Self {
        Self {
            required_aspects: CampaignBrief::MIN_ASPECTS,
        }
    }

    pub fn with_required_aspects(mut self, required: usize) -> Self {
        self.required_aspects = required;
        self
    }

    /// Alerts for a finished run, ordered variants, completeness, validation.
    pub fn inspect(&self, brief: &CampaignBrief, outcome: &CampaignOutcome) -> Vec<Alert> {
        let mut alerts = Vec::new();

        if brief.aspects.len() < self.required_aspects {
            alerts.push(new_alert(
                brief,
                AlertType::InsufficientVariants,
                AlertSeverity::Warning,
                format!(
                    "Only {} aspect ratio(s) requested; at least {} expected",
                    brief.aspects.len(),
                    self.required_aspects
                ),
                [
                    ("aspects", brief.aspects.join(",")),
                    ("required", self.required_aspects.to_string()),
                ],
            ));
        }

        let expected = brief.total_assets_required();
        let actual = outcome.assets.len();
        if actual != expected {
            alerts.push(new_alert(
                brief,
                AlertType::MissingAssets,
                AlertSeverity::Error,
                format!("Expected {expected} assets, produced {actual}"),
                [
                    ("expected", expected.to_string()),
                    ("actual", actual.to_string()),
                ],
            ));
        }

        for result in outcome.validation_results.iter().filter(|r| !r.is_valid()) {
            let issues: Vec<&str> = result.issues.iter().map(|i| i.message.as_str()).collect();
            alerts.push(new_alert(
                brief,
                AlertType::ValidationFailed,
                AlertSeverity::Warning,
                format!("Asset {} failed validation: {}", result.asset_id, issues.join("; ")),
                [
                    ("asset_id", result.asset_id.clone()),
                    ("failed_count", result.failed_count.to_string()),
                ],
            ));
        }

        for alert in &alerts {
            warn!(brief_id = %brief.brief_id, alert = %alert.to_human_readable(), "Campaign alert");
        }
        alerts
    }

    /// Alert for a run that aborted. AI failures are reported as API errors.
    pub fn on_error(&self, brief: &CampaignBrief, error: &CampaignError) -> Alert {
        let (alert_type, severity) = match error {
            CampaignError::Ai(_) => (AlertType::ApiError, AlertSeverity::Error),
            CampaignError::BrandNotFound(_) | CampaignError::InvalidBrief(_) => {
                (AlertType::GenerationFailed, AlertSeverity::Error)
            }
            _ => (AlertType::GenerationFailed, AlertSeverity::Critical),
        };
        new_alert(
            brief,
            alert_type,
            severity,
            format!("Campaign run aborted: {error}"),
            [("brand_id", brief.brand_id.clone())],
        )
    }
}

impl Default for CampaignMonitor {
    fn default() -> Self {
        Self::new()
    }
}

fn new_alert<const N: usize>(
    brief: &CampaignBrief,
    alert_type: AlertType,
    severity: AlertSeverity,
    message: String,
    context: [(&str, String); N],
) -> Alert {
    Alert {
        alert_id: format!("alert-{}", Uuid::new_v4()),
        brief_id: brief.brief_id.clone(),
        alert_type,
        severity,
        message,
        context: context
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<HashMap<_, _>>(),
        created_at: Utc::now(),
        resolved_at: None,
        resolution: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::CampaignSummary;
    use campaign_core::types::{
        IssueSeverity, Product, ValidationIssue, ValidationResult, ValidationStatus,
    };

    fn brief(aspects: &[&str]) -> CampaignBrief {
        CampaignBrief {
            brief_id: "b1".to_string(),
            brand_id: "natural-suds-co".to_string(),
            campaign_slogan: "Gift Wellness".to_string(),
            target_region: "North America".to_string(),
            target_audience: "Everyone".to_string(),
            target_locales: vec!["en-US".to_string()],
            products: vec![Product::new("Soap", ["clean"]).unwrap()],
            aspects: aspects.iter().map(|s| s.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    fn outcome(asset_count: usize, results: Vec<ValidationResult>) -> CampaignOutcome {
        let failed = results.iter().filter(|r| !r.is_valid()).count();
        CampaignOutcome {
            success: true,
            assets: Vec::new(),
            summary: CampaignSummary {
                total_assets: asset_count,
                validation_passed: results.len() - failed,
                validation_failed: failed,
                brief_id: "b1".to_string(),
                brand_id: "natural-suds-co".to_string(),
            },
            validation_results: results,
        }
    }

    #[test]
    fn test_insufficient_variants_and_missing_assets() {
        let brief = brief(&["1:1", "9:16"]);
        let alerts = CampaignMonitor::new().inspect(&brief, &outcome(0, vec![]));

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].alert_type, AlertType::InsufficientVariants);
        assert_eq!(alerts[0].severity, AlertSeverity::Warning);
        assert_eq!(alerts[0].context["required"], "3");
        assert_eq!(alerts[1].alert_type, AlertType::MissingAssets);
        assert_eq!(alerts[1].context["expected"], "2");
        assert_eq!(alerts[1].context["actual"], "0");
        assert!(alerts.iter().all(|a| a.brief_id == "b1" && !a.is_resolved()));
    }

    #[test]
    fn test_validation_failures_raise_one_alert_each() {
        let failed = ValidationResult {
            asset_id: "bad".to_string(),
            status: ValidationStatus::Failed,
            checks_run: vec!["prohibited_words".to_string()],
            issues: vec![ValidationIssue {
                check_name: "prohibited_words".to_string(),
                severity: IssueSeverity::Error,
                message: "Prohibited word detected: 'free'".to_string(),
                fix_suggestion: None,
            }],
            passed_count: 1,
            failed_count: 1,
        };
        let monitor = CampaignMonitor::new().with_required_aspects(1);
        let alerts = monitor.inspect(&brief(&["1:1"]), &outcome(0, vec![failed]));

        // One missing-assets alert (0 of 1) and one validation alert.
        assert_eq!(alerts.len(), 2);
        let validation = &alerts[1];
        assert_eq!(validation.alert_type, AlertType::ValidationFailed);
        assert_eq!(validation.context["asset_id"], "bad");
        assert!(validation
            .to_human_readable()
            .starts_with("[WARNING] validation_failed: Asset bad failed validation"));
    }

    #[test]
    fn test_on_error() {
        let monitor = CampaignMonitor::default();
        let alert = monitor.on_error(&brief(&["1:1"]), &CampaignError::Ai("rate limited".into()));
        assert_eq!(alert.alert_type, AlertType::ApiError);
        assert!(alert.message.contains("rate limited"));

        let alert = monitor.on_error(
            &brief(&["1:1"]),
            &CampaignError::Storage("bucket missing".into()),
        );
        assert_eq!(alert.alert_type, AlertType::GenerationFailed);
        assert_eq!(alert.severity, AlertSeverity::Critical);
    }
}
