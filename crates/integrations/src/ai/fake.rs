//! Deterministic AI stand-in. No network access or API keys.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use campaign_core::services::AiService;
use campaign_core::types::BrandProfile;
use campaign_core::CampaignResult;
use tracing::debug;

/// Minimal valid PNG: a single transparent RGBA pixel.
pub const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, // signature
    0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52, // IHDR
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1
    0x08, 0x06, 0x00, 0x00, 0x00, // 8-bit RGBA
    0x1f, 0x15, 0xc4, 0x89, // CRC
    0x00, 0x00, 0x00, 0x0a, 0x49, 0x44, 0x41, 0x54, // IDAT
    0x78, 0xda, 0x62, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01, // data
    0xe2, 0x21, 0xbc, 0x33, // CRC
    0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, // IEND
    0xae, 0x42, 0x60, 0x82, // CRC
];

/// Fake AI adapter with a fixed localization table and per-operation call counters.
pub struct FakeAiService {
    localization_map: HashMap<String, HashMap<String, String>>,
    generate_calls: AtomicUsize,
    overlay_calls: AtomicUsize,
    understand_calls: AtomicUsize,
    localize_calls: AtomicUsize,
}

impl FakeAiService {
    pub fn new() -> Self {
        let mut localization_map = HashMap::new();
        localization_map.insert(
            "en-US".to_string(),
            HashMap::from([
                ("Gift Wellness".to_string(), "Gift Wellness".to_string()),
                ("Pure Nature".to_string(), "Pure Nature".to_string()),
            ]),
        );
        localization_map.insert(
            "es-US".to_string(),
            HashMap::from([
                ("Gift Wellness".to_string(), "Regalo Bienestar".to_string()),
                ("Pure Nature".to_string(), "Naturaleza Pura".to_string()),
            ]),
        );

        Self {
            localization_map,
            generate_calls: AtomicUsize::new(0),
            overlay_calls: AtomicUsize::new(0),
            understand_calls: AtomicUsize::new(0),
            localize_calls: AtomicUsize::new(0),
        }
    }

    /// Add or replace a translation used by [`AiService::localize`].
    pub fn with_translation(mut self, locale: &str, source: &str, translated: &str) -> Self {
        self.localization_map
            .entry(locale.to_string())
            .or_default()
            .insert(source.to_string(), translated.to_string());
        self
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::Relaxed)
    }

    pub fn overlay_calls(&self) -> usize {
        self.overlay_calls.load(Ordering::Relaxed)
    }

    pub fn understand_calls(&self) -> usize {
        self.understand_calls.load(Ordering::Relaxed)
    }

    pub fn localize_calls(&self) -> usize {
        self.localize_calls.load(Ordering::Relaxed)
    }

    /// Total calls across every operation.
    pub fn call_count(&self) -> usize {
        self.generate_calls() + self.overlay_calls() + self.understand_calls() + self.localize_calls()
    }
}

impl Default for FakeAiService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiService for FakeAiService {
    async fn generate_image(&self, prompt: &str, aspect_ratio: &str) -> CampaignResult<Vec<u8>> {
        self.generate_calls.fetch_add(1, Ordering::Relaxed);
        debug!(aspect_ratio, prompt_len = prompt.len(), "fake image generation");
        Ok(PLACEHOLDER_PNG.to_vec())
    }

    async fn overlay_text(
        &self,
        image: &[u8],
        text: &str,
        aspect_ratio: &str,
    ) -> CampaignResult<Vec<u8>> {
        self.overlay_calls.fetch_add(1, Ordering::Relaxed);
        debug!(aspect_ratio, text, "fake text overlay");
        // The image is returned unchanged.
        Ok(image.to_vec())
    }

    async fn understand_brand(&self, asset_refs: &[String]) -> CampaignResult<BrandProfile> {
        self.understand_calls.fetch_add(1, Ordering::Relaxed);
        debug!(assets = asset_refs.len(), "fake brand understanding");
        Ok(BrandProfile {
            colors: vec![
                "#8B7355".to_string(),
                "#E6D5B8".to_string(),
                "#4A6741".to_string(),
            ],
            voice_tone: "warm, natural, trustworthy".to_string(),
            typography: Some("Montserrat".to_string()),
        })
    }

    async fn localize(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> CampaignResult<String> {
        self.localize_calls.fetch_add(1, Ordering::Relaxed);
        let localized = self
            .localization_map
            .get(target_locale)
            .and_then(|table| table.get(text))
            .cloned()
            .unwrap_or_else(|| text.to_string());
        debug!(source_locale, target_locale, %localized, "fake localization");
        Ok(localized)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_localization_table() {
        let ai = FakeAiService::new();
        assert_eq!(
            ai.localize("Gift Wellness", "en-US", "es-US").await.unwrap(),
            "Regalo Bienestar"
        );
        assert_eq!(
            ai.localize("Gift Wellness", "en-US", "en-US").await.unwrap(),
            "Gift Wellness"
        );
        // Unknown text and unknown locales fall through unchanged.
        assert_eq!(
            ai.localize("Hello", "en-US", "es-US").await.unwrap(),
            "Hello"
        );
        assert_eq!(
            ai.localize("Pure Nature", "en-US", "fr-FR").await.unwrap(),
            "Pure Nature"
        );
        assert_eq!(ai.localize_calls(), 4);
    }

    #[tokio::test]
    async fn test_custom_translation() {
        let ai = FakeAiService::new().with_translation("fr-FR", "Gift Wellness", "Offrez le bien-être");
        assert_eq!(
            ai.localize("Gift Wellness", "en-US", "fr-FR").await.unwrap(),
            "Offrez le bien-être"
        );
    }

    #[tokio::test]
    async fn test_image_calls_are_counted() {
        let ai = FakeAiService::new();
        let image = ai.generate_image("soap", "1:1").await.unwrap();
        assert!(image.starts_with(&[0x89, b'P', b'N', b'G']));

        let overlaid = ai.overlay_text(&image, "Gift Wellness", "1:1").await.unwrap();
        assert_eq!(overlaid, image);

        let profile = ai.understand_brand(&["logo.png".to_string()]).await.unwrap();
        assert_eq!(profile.colors.len(), 3);

        assert_eq!(ai.generate_calls(), 1);
        assert_eq!(ai.overlay_calls(), 1);
        assert_eq!(ai.understand_calls(), 1);
        assert_eq!(ai.call_count(), 3);
    }
}
