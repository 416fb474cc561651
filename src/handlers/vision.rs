use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use base64::{engine::general_purpose::STANDARD, Engine};
use log::info;
use serde::Serialize;
use serde_json::{json, Value};

use crate::{app::AppState, config::VisionConfig, error::AppError, middleware::CurrentUser};

const EXTRACTION_PROMPT: &str = r#"
You are a tool that extracts data from a receipt or expense image.
Respond ONLY with valid JSON in this format:
{
  "date": "YYYY-MM-DD",
  "vendor": "string",
  "amount": 0.0
}
If any field is unknown, set it to null.
"#;

const DETAIL: &str = "low";
const MAX_TOKENS: u32 = 300;

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model returned no choices")]
    EmptyReply,
}

/// Where the receipt image comes from.
#[derive(Debug)]
pub enum ImageSource {
    Upload { bytes: Vec<u8>, content_type: String },
    Url(String),
}

impl ImageSource {
    fn to_url(&self) -> String {
        match self {
            ImageSource::Upload { bytes, content_type } => {
                format!("data:{};base64,{}", content_type, STANDARD.encode(bytes))
            }
            ImageSource::Url(url) => url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Extraction {
    pub success: bool,
    pub structured: Value,
    #[serde(rename = "rawText")]
    pub raw_text: String,
}

impl Extraction {
    /// Parses the model reply, keeping the raw text when it is not JSON.
    pub fn from_reply(reply: &str) -> Self {
        let raw_text = strip_code_fences(reply);
        let structured = serde_json::from_str(&raw_text)
            .unwrap_or_else(|_| json!({ "raw": raw_text }));

        Self {
            success: true,
            structured,
            raw_text,
        }
    }
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct VisionClient {
    http: reqwest::Client,
    config: VisionConfig,
}

impl VisionClient {
    pub fn new(config: VisionConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;
        Ok(Self { http, config })
    }

    pub async fn extract(&self, image: &ImageSource) -> Result<Extraction, VisionError> {
        let body = json!({
            "model": self.config.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": EXTRACTION_PROMPT },
                    { "type": "image_url", "image_url": { "url": image.to_url(), "detail": DETAIL } },
                ],
            }],
            "max_tokens": MAX_TOKENS,
        });

        let reply: Value = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let content = reply
            .pointer("/choices/0/message")
            .ok_or(VisionError::EmptyReply)?
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default();

        Ok(Extraction::from_reply(content))
    }
}

/// Removes markdown code fences (with or without a language tag).
pub fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("```") {
        out.push_str(&rest[..start]);
        rest = &rest[start + 3..];
        let tag_len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        rest = &rest[tag_len..];
    }
    out.push_str(rest);

    out.trim().to_string()
}

pub async fn analyze_receipt(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<Extraction>, AppError> {
    let client = state
        .vision
        .clone()
        .ok_or(AppError::Unavailable("Receipt scanning is not configured"))?;

    let mut upload = None;
    let mut url = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "imageFile" => {
                let content_type = field.content_type().unwrap_or("image/jpeg").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !bytes.is_empty() {
                    upload = Some(ImageSource::Upload {
                        bytes: bytes.to_vec(),
                        content_type,
                    });
                }
            }
            "imageUrl" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !text.trim().is_empty() {
                    url = Some(ImageSource::Url(text.trim().to_string()));
                }
            }
            _ => {}
        }
    }

    let image = upload
        .or(url)
        .ok_or_else(|| AppError::BadRequest("No imageFile or imageUrl provided".to_string()))?;

    let extraction = client
        .extract(&image)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    info!("Analyzed receipt image");
    Ok(Json(extraction))
}
