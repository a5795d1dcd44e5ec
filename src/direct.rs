//! The single-exchange multimodal wire contract.
//!
//! Some providers return the asset synchronously, inline in the creation
//! response itself: one `generateContent`-style call carries the prompt (and
//! optionally inline reference-image bytes), and the response carries content
//! parts holding either inline binary data or a refusal text. No polling
//! occurs.

use crate::error::BananaGenError;
use crate::provider::GenerationProvider;
use crate::reference::fetch_reference_image;
use crate::types::{AspectRatio, GeneratedAsset, GenerationRequest, GenerationSettings};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

/// The direct contract accepts the full ratio menu.
pub const SUPPORTED_ASPECT_RATIOS: &[AspectRatio] = &[
    AspectRatio::Square,
    AspectRatio::Portrait2x3,
    AspectRatio::Landscape3x2,
    AspectRatio::Portrait3x4,
    AspectRatio::Landscape4x3,
    AspectRatio::Portrait4x5,
    AspectRatio::Landscape5x4,
    AspectRatio::Portrait9x16,
    AspectRatio::Landscape16x9,
    AspectRatio::Ultrawide21x9,
];

pub struct DirectMultimodalProvider {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) model: String,
}

impl DirectMultimodalProvider {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn build_parts(&self, request: &GenerationRequest, prompt: &str) -> Result<Vec<Value>, BananaGenError> {
        let mut parts = vec![json!({ "text": prompt })];
        if let Some(url) = request.reference_image_urls.first() {
            let image = fetch_reference_image(&self.http, url).await?;
            parts.push(json!({
                "inline_data": { "mime_type": image.mime_type, "data": image.data }
            }));
        }
        Ok(parts)
    }

    /// Walk the response's content parts for inline image bytes, falling back
    /// to the provider's refusal text when no image came back.
    fn extract_asset_url(payload: &Value) -> Result<String, BananaGenError> {
        let candidates = payload
            .get("candidates")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut refusal: Option<String> = None;
        for candidate in &candidates {
            let parts = candidate
                .pointer("/content/parts")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            for part in &parts {
                let inline = part
                    .get("inlineData")
                    .or_else(|| part.get("inline_data"))
                    .and_then(Value::as_object);
                if let Some(inline) = inline {
                    let data = inline
                        .get("data")
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    if data.is_empty() {
                        continue;
                    }
                    let bytes = BASE64.decode(data.as_bytes()).map_err(|e| {
                        BananaGenError::ResultExtraction(format!(
                            "inline data is not valid base64: {e}"
                        ))
                    })?;
                    let mime = inline
                        .get("mimeType")
                        .or_else(|| inline.get("mime_type"))
                        .and_then(Value::as_str)
                        .unwrap_or("image/png");
                    return Ok(format!("data:{mime};base64,{}", BASE64.encode(bytes)));
                }
                if refusal.is_none() {
                    if let Some(text) = part.get("text").and_then(Value::as_str) {
                        if !text.trim().is_empty() {
                            refusal = Some(text.trim().to_string());
                        }
                    }
                }
            }
        }

        match refusal {
            Some(text) => Err(BananaGenError::GenerationRefused(text)),
            None => Err(BananaGenError::ResultExtraction(
                "response contained neither image data nor text".to_string(),
            )),
        }
    }
}

#[async_trait]
impl GenerationProvider for DirectMultimodalProvider {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedAsset, BananaGenError> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(BananaGenError::EmptyPrompt);
        }

        let settings = GenerationSettings {
            aspect_ratio: request.aspect_ratio.normalize(SUPPORTED_ASPECT_RATIOS),
            resolution: request.resolution,
            output_format: request.output_format,
        };

        let parts = self.build_parts(request, prompt).await?;
        let body = json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": {
                "responseModalities": ["IMAGE"],
                "imageConfig": { "aspectRatio": settings.aspect_ratio },
            },
        });

        tracing::debug!(model = %self.model, "dispatching direct generation");
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BananaGenError::Authentication { status });
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error response body".to_string());
            return Err(BananaGenError::Api { status, message });
        }

        let payload: Value = response.json().await?;
        let url = Self::extract_asset_url(&payload)?;
        Ok(GeneratedAsset {
            id: Uuid::new_v4().to_string(),
            url,
            prompt: prompt.to_string(),
            created_at: Utc::now(),
            settings,
        })
    }

    fn name(&self) -> &'static str {
        "direct-multimodal"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_inline_image_as_data_uri() {
        let data = BASE64.encode(b"fake-image-bytes");
        let payload = json!({
            "candidates": [{
                "content": {
                    "parts": [{ "inlineData": { "mimeType": "image/webp", "data": data } }]
                }
            }]
        });
        let url = DirectMultimodalProvider::extract_asset_url(&payload).unwrap();
        assert_eq!(
            url,
            format!("data:image/webp;base64,{}", BASE64.encode(b"fake-image-bytes"))
        );
    }

    #[test]
    fn snake_case_inline_data_is_accepted() {
        let data = BASE64.encode(b"x");
        let payload = json!({
            "candidates": [{
                "content": {
                    "parts": [{ "inline_data": { "mime_type": "image/png", "data": data } }]
                }
            }]
        });
        let url = DirectMultimodalProvider::extract_asset_url(&payload).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn text_only_response_is_a_refusal() {
        let payload = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "I can't generate that." }] }
            }]
        });
        let err = DirectMultimodalProvider::extract_asset_url(&payload).unwrap_err();
        match err {
            BananaGenError::GenerationRefused(text) => {
                assert_eq!(text, "I can't generate that.");
            }
            other => panic!("expected GenerationRefused, got {other:?}"),
        }
    }

    #[test]
    fn empty_response_fails_extraction() {
        let payload = json!({ "candidates": [] });
        assert!(matches!(
            DirectMultimodalProvider::extract_asset_url(&payload),
            Err(BananaGenError::ResultExtraction(_))
        ));
    }
}
