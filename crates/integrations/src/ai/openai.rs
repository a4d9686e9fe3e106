//! OpenAI-backed AI adapter.
//!
//! Image generation uses `/images/generations`; brand understanding and
//! localization go through `/chat/completions`. Slogans are drawn locally
//! by [`TextOverlay`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use campaign_core::config::{OpenAiConfig, OverlayConfig};
use campaign_core::services::AiService;
use campaign_core::types::BrandProfile;
use campaign_core::{CampaignError, CampaignResult};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::overlay::TextOverlay;

/// Image size requested for an aspect ratio tag. Unknown tags fall back to square.
pub fn size_for_aspect(aspect_ratio: &str) -> &'static str {
    match aspect_ratio {
        "16:9" => "1536x1024",
        "9:16" => "1024x1536",
        _ => "1024x1024",
    }
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

fn ai_error(context: &str, err: impl std::fmt::Display) -> CampaignError {
    CampaignError::Ai(format!("{context}: {err}"))
}

/// Decode the first base64 image of an images API response.
fn decode_image(body: ImageResponse) -> CampaignResult<Vec<u8>> {
    let encoded = body
        .data
        .into_iter()
        .next()
        .and_then(|d| d.b64_json)
        .ok_or_else(|| CampaignError::Ai("image response contained no data".to_string()))?;
    base64::engine::general_purpose::STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| ai_error("invalid base64 image", e))
}

fn first_message(body: ChatResponse) -> CampaignResult<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| CampaignError::Ai("chat response contained no message".to_string()))
}

pub(crate) fn localize_messages(text: &str, source_locale: &str, target_locale: &str) -> Value {
    json!([
        {
            "role": "system",
            "content": "You translate short marketing copy. Preserve brand voice, keep it \
                        concise, and reply with the translated text only."
        },
        {
            "role": "user",
            "content": format!("Translate from {source_locale} to {target_locale}: {text}")
        }
    ])
}

pub(crate) fn understand_brand_messages(asset_refs: &[String]) -> Value {
    let mut content = vec![json!({
        "type": "text",
        "text": "Analyze these brand assets. Reply with a JSON object with keys \
                 \"colors\" (array of hex codes), \"voice_tone\" (string) and \
                 \"typography\" (font family name or null)."
    })];
    content.extend(
        asset_refs
            .iter()
            .map(|url| json!({"type": "image_url", "image_url": {"url": url}})),
    );
    json!([{ "role": "user", "content": content }])
}

/// AI adapter calling the OpenAI HTTP API.
pub struct OpenAiService {
    client: reqwest::Client,
    config: OpenAiConfig,
    overlay: Arc<TextOverlay>,
}

impl OpenAiService {
    pub fn new(config: &OpenAiConfig, overlay: &OverlayConfig) -> CampaignResult<Self> {
        if config.api_key.is_empty() {
            return Err(CampaignError::Config(
                "openai.api_key is required for the OpenAI adapter".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ai_error("failed to build HTTP client", e))?;
        let overlay = Arc::new(TextOverlay::from_config(overlay)?);

        info!(base_url = %config.base_url, image_model = %config.image_model, "OpenAI adapter ready");
        Ok(Self {
            client,
            config: config.clone(),
            overlay,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        context: &str,
        request: reqwest::RequestBuilder,
    ) -> CampaignResult<T> {
        let response = request
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| ai_error(context, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CampaignError::Ai(format!("{context}: HTTP {status}: {body}")));
        }
        response.json::<T>().await.map_err(|e| ai_error(context, e))
    }

    async fn chat(&self, context: &str, messages: Value, json_mode: bool) -> CampaignResult<String> {
        let mut payload = json!({
            "model": self.config.chat_model,
            "messages": messages,
        });
        if json_mode {
            payload["response_format"] = json!({"type": "json_object"});
        }
        let body: ChatResponse = self
            .send(context, self.client.post(self.url("chat/completions")).json(&payload))
            .await?;
        first_message(body)
    }
}

#[async_trait]
impl AiService for OpenAiService {
    async fn generate_image(&self, prompt: &str, aspect_ratio: &str) -> CampaignResult<Vec<u8>> {
        let size = size_for_aspect(aspect_ratio);
        debug!(aspect_ratio, size, "requesting image generation");

        let payload = json!({
            "model": self.config.image_model,
            "prompt": prompt,
            "size": size,
            "n": 1,
        });
        let body: ImageResponse = self
            .send(
                "image generation failed",
                self.client.post(self.url("images/generations")).json(&payload),
            )
            .await?;
        decode_image(body)
    }

    async fn overlay_text(
        &self,
        image: &[u8],
        text: &str,
        aspect_ratio: &str,
    ) -> CampaignResult<Vec<u8>> {
        debug!(aspect_ratio, text, "rendering text overlay");
        let overlay = Arc::clone(&self.overlay);
        let image = image.to_vec();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || overlay.render(&image, &text))
            .await
            .map_err(|e| ai_error("text overlay task failed", e))?
    }

    async fn understand_brand(&self, asset_refs: &[String]) -> CampaignResult<BrandProfile> {
        debug!(assets = asset_refs.len(), "requesting brand understanding");
        let content = self
            .chat(
                "brand understanding failed",
                understand_brand_messages(asset_refs),
                true,
            )
            .await?;
        serde_json::from_str(&content).map_err(|e| ai_error("unparseable brand profile", e))
    }

    async fn localize(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> CampaignResult<String> {
        if source_locale.eq_ignore_ascii_case(target_locale) {
            return Ok(text.to_string());
        }
        debug!(source_locale, target_locale, "requesting localization");
        self.chat(
            "localization failed",
            localize_messages(text, source_locale, target_locale),
            false,
        )
        .await
    }

    fn name(&self) -> &str {
        "openai"
    }
}
