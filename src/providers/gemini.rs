//! Direct Gemini image generation with the operator's own API key.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::config::GeminiConfig;
use crate::providers::ProviderError;

/// Client for `POST {base}/models/{model}:generateContent`.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    /// Build a client, or `None` when no API key is configured.
    pub fn from_config(http: reqwest::Client, config: &GeminiConfig) -> Option<Self> {
        let api_key = config.api_key.clone().filter(|k| !k.trim().is_empty())?;
        Some(Self {
            http,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.image_model
            ),
            api_key,
        })
    }

    /// Generate an image and return its base64 payload.
    /// Generate an image, giving up after `timeout`. Returns base64 PNG data.
    pub async fn generate_image(&self, prompt: &str, timeout: Duration) -> Result<String, ProviderError> {
        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .timeout(timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status { status: status.as_u16(), body: text });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| ProviderError::Decode(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|content| content.parts.into_iter().find_map(|p| p.inline_data))
            .map(|inline| inline.data)
            .filter(|data| !data.is_empty())
            .ok_or(ProviderError::MissingContent("inline image data"))
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
struct InlineData {
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_key() {
        let mut config = GeminiConfig::default();
        assert!(GeminiClient::from_config(reqwest::Client::new(), &config).is_none());

        config.api_key = Some("  ".into());
        assert!(GeminiClient::from_config(reqwest::Client::new(), &config).is_none());

        config.api_key = Some("k".into());
        config.base_url = "http://127.0.0.1:1/v1beta/".into();
        let client = GeminiClient::from_config(reqwest::Client::new(), &config).unwrap();
        assert_eq!(
            client.endpoint,
            "http://127.0.0.1:1/v1beta/models/gemini-2.5-flash-image-preview:generateContent"
        );
    }

    #[test]
    fn test_response_shape() {
        let body = r#"{"candidates":[{"content":{"parts":[
            {"text":"here you go"},
            {"inlineData":{"mimeType":"image/png","data":"aGVsbG8="}}
        ]}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let data = parsed.candidates[0].content.as_ref().unwrap().parts[1]
            .inline_data
            .as_ref()
            .unwrap()
            .data
            .clone();
        assert_eq!(data, "aGVsbG8=");
    }
}
