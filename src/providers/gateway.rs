//! Chat-completions gateway client.
//!
//! Used for two jobs: describing a thumbnail as image-generation prompts
//! (vision input), and generating an image when Gemini is unavailable.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::GatewayConfig;
use crate::providers::ProviderError;

const DESCRIBE_SYSTEM_PROMPT: &str = "You are an expert at analyzing images and creating detailed, creative prompts for image generation. Generate 3 distinct and detailed prompts that could recreate similar images. Each prompt should be descriptive, specific, and suitable for AI image generation. Return ONLY a JSON array of 3 strings, nothing else.";

const DESCRIBE_USER_PROMPT: &str = "Analyze this YouTube thumbnail and create 3 different creative prompts that could be used to generate similar images. Focus on the composition, style, colors, and mood. Return your response as a JSON array of exactly 3 strings.";

#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    prompt_model: String,
    image_model: String,
}

impl GatewayClient {
    /// Build a client, or `None` when no API key is configured.
    pub fn from_config(http: reqwest::Client, config: &GatewayConfig) -> Option<Self> {
        let api_key = config.api_key.clone().filter(|k| !k.trim().is_empty())?;
        Some(Self {
            http,
            url: config.url.clone(),
            api_key,
            prompt_model: config.prompt_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    /// Ask the vision model for prompts describing the thumbnail.
    ///
    /// Returns the raw assistant text; see [`crate::providers::prompts`] for
    /// turning it into a list.
    pub async fn describe_thumbnail(&self, thumbnail_url: &str) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.prompt_model,
            "messages": [
                { "role": "system", "content": DESCRIBE_SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": DESCRIBE_USER_PROMPT },
                        { "type": "image_url", "image_url": { "url": thumbnail_url } }
                    ]
                }
            ]
        });

        let message = self.complete(&body, None).await?;
        content_text(message.content)
            .filter(|c| !c.is_empty())
            .ok_or(ProviderError::MissingContent("message content"))
    }

    /// Generate an image; returns the URL (often a `data:` URL) of the first image.
    pub async fn generate_image(&self, prompt: &str, timeout: Duration) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.image_model,
            "messages": [{ "role": "user", "content": prompt }],
            "modalities": ["image", "text"]
        });

        let message = self.complete(&body, Some(timeout)).await?;
        message
            .images
            .into_iter()
            .next()
            .and_then(|img| img.image_url)
            .map(|u| u.url)
            .filter(|u| !u.is_empty())
            .ok_or(ProviderError::MissingContent("image URL"))
    }

    /// `timeout` overrides the client-wide upstream timeout for this call.
    async fn complete(&self, body: &Value, timeout: Option<Duration>) -> Result<Message, ProviderError> {
        let mut request = self.http.post(&self.url).bearer_auth(&self.api_key).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status { status: status.as_u16(), body: text });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| ProviderError::Decode(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .ok_or(ProviderError::MissingContent("choices[0].message"))
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<Message>,
}

/// Assistant text from `content`, which is either a string or a list of
/// typed parts depending on the gateway.
fn content_text(content: Option<Value>) -> Option<String> {
    match content? {
        Value::String(text) => Some(text),
        Value::Array(parts) => Some(
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(""),
        ),
        _ => None,
    }
}

#[derive(Deserialize)]
struct Message {
    content: Option<Value>,
    #[serde(default)]
    images: Vec<ImagePart>,
}

#[derive(Deserialize)]
struct ImagePart {
    image_url: Option<ImageUrl>,
}

#[derive(Deserialize)]
struct ImageUrl {
    url: String,
}
