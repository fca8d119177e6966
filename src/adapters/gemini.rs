//! Vertex AI `generateContent` client.

use crate::config::toml_config::AppConfig;
use crate::domain::model::{GenerationResponse, Payload, PromptRequest};
use crate::domain::ports::GenerationClient;
use crate::utils::error::{GenAiError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    location: String,
    access_token: Option<String>,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        location: impl Into<String>,
        access_token: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            location: location.into(),
            access_token,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.endpoint_base(),
            config.gemini.project_id.clone(),
            config.gemini.location.clone(),
            config.gemini.access_token.clone(),
        )
    }

    pub fn endpoint_url(&self, model: &str) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            self.base_url, self.project_id, self.location, model
        )
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.access_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.trim())).map_err(|e| {
                GenAiError::InvalidConfigValueError {
                    field: "gemini.access_token".to_string(),
                    value: "<redacted>".to_string(),
                    reason: e.to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, model: &str, request: &PromptRequest) -> Result<GenerationResponse> {
        let url = self.endpoint_url(model);
        let body = GenerateContentRequest::from_prompt(request);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenAiError::HttpError(e).logged())?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(GenAiError::GenerationError {
                message: format!("endpoint returned {}: {}", status, text),
            }
            .logged());
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            GenAiError::GenerationError {
                message: format!("failed to parse response: {}", e),
            }
            .logged()
        })?;

        let text = parsed.first_candidate_text();
        if text.trim().is_empty() {
            return Err(GenAiError::GenerationError {
                message: "response contained no text".to_string(),
            }
            .logged());
        }

        Ok(GenerationResponse { text })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn from_prompt(request: &PromptRequest) -> Self {
        let content_part = match &request.payload {
            Payload::InlineBytes { data, mime_type } => Part::InlineData {
                inline_data: InlineData {
                    mime_type: mime_type.clone(),
                    data: STANDARD.encode(data),
                },
            },
            Payload::Text(text) => Part::Text { text: text.clone() },
        };

        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    content_part,
                    Part::Text {
                        text: request.prompt.clone(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: request.options.max_tokens,
                temperature: request.options.temperature,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    InlineData { inline_data: InlineData },
    Other(serde_json::Value),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Text parts of the first candidate, concatenated.
    fn first_candidate_text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| match part {
                        Part::Text { text } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::GenerationOptions;
    use httpmock::prelude::*;
    use serde_json::json;

    const MODEL_PATH: &str =
        "/v1/projects/demo/locations/us-central1/publishers/google/models/gemini-test:generateContent";

    fn text_request(text: &str) -> PromptRequest {
        PromptRequest {
            payload: Payload::Text(text.to_string()),
            prompt: "Summarize this text.".to_string(),
            options: GenerationOptions {
                max_tokens: 128,
                temperature: 0.5,
            },
        }
    }

    fn client_for(server: &MockServer, token: Option<&str>) -> GeminiClient {
        GeminiClient::new(
            server.base_url(),
            "demo",
            "us-central1",
            token.map(str::to_string),
        )
    }

    #[test]
    fn test_request_body_shape_for_inline_bytes() {
        let request = PromptRequest {
            payload: Payload::InlineBytes {
                data: vec![1, 2, 3],
                mime_type: "image/png".to_string(),
            },
            prompt: "Describe this image.".to_string(),
            options: GenerationOptions {
                max_tokens: 64,
                temperature: 0.0,
            },
        };

        let body = serde_json::to_value(GenerateContentRequest::from_prompt(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"inlineData": {"mimeType": "image/png", "data": "AQID"}},
                        {"text": "Describe this image."}
                    ]
                }],
                "generationConfig": {"maxOutputTokens": 64, "temperature": 0.0}
            })
        );
    }

    #[test]
    fn test_endpoint_url() {
        let client = GeminiClient::new("https://example.com/", "p", "europe-west4", None);
        assert_eq!(
            client.endpoint_url("gemini-2.0-flash"),
            "https://example.com/v1/projects/p/locations/europe-west4/publishers/google/models/gemini-2.0-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_generate_concatenates_candidate_text() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path(MODEL_PATH)
                .header("authorization", "Bearer secret-token")
                .body_contains("\"maxOutputTokens\":128")
                .body_contains("hello world");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "candidates": [{
                        "content": {
                            "role": "model",
                            "parts": [{"text": "A short "}, {"text": "greeting."}]
                        }
                    }]
                }));
        });

        let client = client_for(&server, Some("secret-token"));
        let response = client
            .generate("gemini-test", &text_request("hello world"))
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(response.text, "A short greeting.");
    }

    #[tokio::test]
    async fn test_non_success_status_is_generation_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(MODEL_PATH);
            then.status(500).body("quota exceeded");
        });

        let err = client_for(&server, None)
            .generate("gemini-test", &text_request("hi"))
            .await
            .unwrap_err();

        match err {
            GenAiError::GenerationError { message } => assert!(message.contains("quota exceeded")),
            other => panic!("Expected GenerationError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_is_generation_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(MODEL_PATH);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"candidates": []}));
        });

        let err = client_for(&server, None)
            .generate("gemini-test", &text_request("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenAiError::GenerationError { .. }));
    }
}
