//! Text and JSON renderings of a campaign outcome for the CLI.

use std::fmt::Write;

use campaign_core::types::{CreativeAsset, ValidationResult};
use campaign_core::CampaignResult;

use crate::orchestrator::CampaignOutcome;

const RULE_WIDTH: usize = 60;

/// Counts of assets per product, then per locale, in first-seen order.
fn group_by_product(assets: &[CreativeAsset]) -> Vec<(&str, usize, Vec<(&str, usize)>)> {
    let mut groups: Vec<(&str, usize, Vec<(&str, usize)>)> = Vec::new();
    for asset in assets {
        let index = match groups.iter().position(|g| g.0 == asset.product_name) {
            Some(i) => i,
            None => {
                groups.push((asset.product_name.as_str(), 0, Vec::new()));
                groups.len() - 1
            }
        };
        let group = &mut groups[index];
        group.1 += 1;
        match group.2.iter_mut().find(|(locale, _)| *locale == asset.locale) {
            Some((_, count)) => *count += 1,
            None => group.2.push((asset.locale.as_str(), 1)),
        }
    }
    groups
}

pub struct CampaignPresenter;

impl CampaignPresenter {
    pub fn format_summary(outcome: &CampaignOutcome) -> String {
        let summary = &outcome.summary;
        let rule = "=".repeat(RULE_WIDTH);
        let mut out = String::new();

        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "CAMPAIGN GENERATION SUMMARY");
        let _ = writeln!(out, "{rule}\n");
        let _ = writeln!(out, "Brief ID: {}", summary.brief_id);
        let _ = writeln!(out, "Brand ID: {}\n", summary.brand_id);
        let _ = writeln!(out, "Total Assets Generated: {}", summary.total_assets);
        let _ = writeln!(out, "  ✓ Validation Passed: {}", summary.validation_passed);
        let _ = writeln!(out, "  ✗ Validation Failed: {}\n", summary.validation_failed);
        let _ = writeln!(out, "Assets by Product:");
        for (product, total, locales) in group_by_product(&outcome.assets) {
            let _ = writeln!(out, "  • {product}: {total} assets");
            for (locale, count) in locales {
                let _ = writeln!(out, "    - {locale}: {count}");
            }
        }
        let _ = writeln!(out, "\n{rule}");
        out
    }

    pub fn format_assets_list(assets: &[CreativeAsset]) -> String {
        let mut out = String::from("\nGenerated Assets:");
        for (i, asset) in assets.iter().enumerate() {
            let reused = if asset.reused { " (reused)" } else { "" };
            let _ = write!(
                out,
                "\n  {}. [{}] {} / {}{}\n     Message: \"{}\"\n     Path: {}",
                i + 1,
                asset.product_name,
                asset.aspect_ratio,
                asset.locale,
                reused,
                asset.message,
                asset.image_url
            );
        }
        out
    }

    /// Lists only failing assets, with each issue and its fix suggestion.
    pub fn format_validation_report(results: &[ValidationResult]) -> String {
        let mut out = String::from("\nValidation Report:");
        let failed: Vec<&ValidationResult> = results.iter().filter(|r| !r.is_valid()).collect();
        if failed.is_empty() {
            out.push_str("\n  ✓ All assets passed validation");
            return out;
        }

        let _ = write!(out, "\n  ✗ {} assets failed validation:", failed.len());
        for result in failed {
            let _ = write!(out, "\n\n  Asset: {}", result.asset_id);
            for issue in &result.issues {
                let severity = issue.severity.to_string().to_uppercase();
                let _ = write!(out, "\n    [{severity}] {}", issue.message);
                if let Some(fix) = &issue.fix_suggestion {
                    let _ = write!(out, "\n    → {fix}");
                }
            }
        }
        out
    }

    pub fn to_json(outcome: &CampaignOutcome) -> CampaignResult<String> {
        Ok(serde_json::to_string_pretty(outcome)?)
    }
}
