//! [`GenerationClient`] for Google's Gemini image models.
//!
//! The client calls `models/{model}:generateContent` with the primary image,
//! every auxiliary image (in order) as `inlineData` parts, followed by the
//! instruction as a text part, and returns the first image in the response as
//! a data URI.
//!
//! ```rust,no_run
//! use tryon::clients::gemini::GeminiImageClient;
//!
//! let client = GeminiImageClient::new_with_model_string(
//!     &std::env::var("GEMINI_API_KEY").unwrap(),
//!     "gemini-2.5-flash-image-preview",
//! );
//! ```

use crate::tryon::cancellation::CancellationToken;
use crate::tryon::clients::http_pool::get_http_client;
use crate::tryon::generation::{GenerationClient, GenerationError, GenerationRequest};
use crate::tryon::image_asset::ImageAsset;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::{debug, error};
use serde_json::{json, Value};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Longest service error body quoted in a [`GenerationError`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Gemini models able to return images.
pub enum Model {
    Gemini25FlashImagePreview,
    Gemini25FlashImage,
    Gemini3ProImagePreview,
}

pub fn model_to_string(model: Model) -> String {
    match model {
        Model::Gemini25FlashImagePreview => "gemini-2.5-flash-image-preview".to_string(),
        Model::Gemini25FlashImage => "gemini-2.5-flash-image".to_string(),
        Model::Gemini3ProImagePreview => "gemini-3-pro-image-preview".to_string(),
    }
}

pub struct GeminiImageClient {
    api_key: String,
    pub model: String,
    base_url: String,
}

impl GeminiImageClient {
    pub fn new_with_model_string(secret_key: &str, model_name: &str) -> Self {
        Self::new_with_base_url(secret_key, model_name, DEFAULT_BASE_URL)
    }

    pub fn new_with_model_enum(secret_key: &str, model: Model) -> Self {
        Self::new_with_model_string(secret_key, &model_to_string(model))
    }

    /// This function is used to create a GeminiImageClient against a custom base URL
    /// (a proxy or a local mock). The default is "<https://generativelanguage.googleapis.com/v1beta>"
    pub fn new_with_base_url(secret_key: &str, model_name: &str, base_url: &str) -> Self {
        GeminiImageClient {
            api_key: secret_key.to_string(),
            model: model_name.to_string(),
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        let model = self.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!("{}/{}:generateContent", self.base_url, model_path)
    }

    /// Request body for `request`: images first (primary, then auxiliaries), text last.
    pub fn build_payload(request: &GenerationRequest) -> Value {
        let mut parts = Vec::with_capacity(request.auxiliaries.len() + 2);
        parts.push(inline_image_part(&request.primary));
        for auxiliary in &request.auxiliaries {
            parts.push(inline_image_part(auxiliary));
        }
        parts.push(json!({ "text": request.instruction }));

        json!({
            "contents": [{
                "role": "user",
                "parts": parts,
            }],
            "generationConfig": {
                "responseModalities": ["IMAGE", "TEXT"],
            },
        })
    }

    /// Pull the first inline image out of a `generateContent` response.
    pub fn extract_image(response: &Value) -> Result<String, GenerationError> {
        let candidates = response
            .get("candidates")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut texts = Vec::new();
        let mut finish_reason = None;
        for candidate in candidates {
            if finish_reason.is_none() {
                finish_reason = candidate.get("finishReason").and_then(Value::as_str);
            }
            let parts = candidate
                .get("content")
                .and_then(|content| content.get("parts"))
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            for part in parts {
                if let Some(inline) = part.get("inlineData").or_else(|| part.get("inline_data")) {
                    let data = inline.get("data").and_then(Value::as_str).unwrap_or_default();
                    if data.is_empty() {
                        continue;
                    }
                    let mime_type = inline
                        .get("mimeType")
                        .or_else(|| inline.get("mime_type"))
                        .and_then(Value::as_str)
                        .filter(|mime| !mime.is_empty())
                        .unwrap_or("image/png");
                    return Ok(format!("data:{};base64,{}", mime_type, data));
                }
                if let Some(text) = part.get("text").and_then(Value::as_str) {
                    if !text.trim().is_empty() {
                        texts.push(text.trim().to_string());
                    }
                }
            }
        }

        if let Some(reason) = response
            .get("promptFeedback")
            .and_then(|feedback| feedback.get("blockReason"))
            .and_then(Value::as_str)
        {
            return Err(GenerationError::new(format!(
                "The request was blocked by the service ({}).",
                reason
            )));
        }
        if !texts.is_empty() {
            return Err(GenerationError::new(format!(
                "The model did not return an image. It responded: {}",
                texts.join(" ")
            )));
        }
        match finish_reason {
            Some(reason) => Err(GenerationError::new(format!(
                "The model did not return an image (finish reason: {}).",
                reason
            ))),
            None => Err(GenerationError::new("The model did not return an image.")),
        }
    }

    async fn post(&self, payload: &Value) -> Result<String, GenerationError> {
        let http = get_http_client(&self.base_url)
            .map_err(|e| GenerationError::new(format!("Failed to build HTTP client: {}", e)))?;

        let response = http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                let message = format!("Gemini request failed: {}", e);
                match e.status() {
                    Some(status) => GenerationError::with_status(status.as_u16(), message),
                    None => GenerationError::new(message),
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::new(format!("Gemini response body read failed: {}", e)))?;

        if !status.is_success() {
            return Err(GenerationError::with_status(
                status.as_u16(),
                service_error_message(&body),
            ));
        }

        let parsed: Value = serde_json::from_str(&body)
            .map_err(|e| GenerationError::new(format!("Gemini returned invalid JSON: {}", e)))?;
        Self::extract_image(&parsed)
    }
}

#[async_trait]
impl GenerationClient for GeminiImageClient {
    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, GenerationError> {
        let payload = Self::build_payload(request);
        debug!(
            "GeminiImageClient::generate model={} auxiliaries={} payload_bytes={}",
            self.model,
            request.auxiliaries.len(),
            request.payload_bytes()
        );

        let result = tokio::select! {
            _ = cancel.cancelled() => Err(GenerationError::cancelled()),
            result = self.post(&payload) => result,
        };

        if let Err(err) = &result {
            if !err.cancelled && log::log_enabled!(log::Level::Error) {
                error!("GeminiImageClient::generate error: {}", err);
            }
        }
        result
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn inline_image_part(asset: &ImageAsset) -> Value {
    json!({
        "inlineData": {
            "mimeType": asset.payload.mime_type(),
            "data": BASE64.encode(asset.payload.bytes()),
        }
    })
}

/// `error.message` from a Gemini error body, or the body itself, truncated.
fn service_error_message(body: &str) -> String {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|parsed| {
            parsed
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());
    truncate_text(&message, MAX_ERROR_BODY_CHARS)
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}
