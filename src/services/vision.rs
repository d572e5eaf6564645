//! Client for an OpenAI-compatible chat-completions endpoint with image input.
//!
//! Both the photo validator and the damage analyzer talk to the provider
//! through this client: one user message carrying a text prompt plus
//! base64 JPEG data URLs, and a reply expected to hold a single JSON object.

use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::debug;

use crate::config::ProviderSettings;

/// Errors talking to the vision provider.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("vision provider credential is not configured")]
    NotConfigured,

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider reply has no message content")]
    EmptyReply,

    #[error("provider reply is not a JSON object: {0}")]
    Parse(String),
}

/// Reasoning models (`o1`, `o3-mini`, `o4-mini`, ...) take a different token
/// parameter and reject `temperature`.
pub fn is_reasoning_model(model: &str) -> bool {
    model.starts_with('o')
}

/// Build the chat-completions request body.
pub fn build_request_body(
    model: &str,
    prompt: &str,
    images_base64: &[String],
    max_tokens: u32,
) -> Value {
    let mut content = vec![json!({ "type": "text", "text": prompt })];
    content.extend(images_base64.iter().map(|b64| {
        json!({
            "type": "image_url",
            "image_url": {
                "url": format!("data:image/jpeg;base64,{}", b64),
                "detail": "low",
            },
        })
    }));

    let mut body = json!({
        "model": model,
        "messages": [{ "role": "user", "content": content }],
    });

    if is_reasoning_model(model) {
        body["max_completion_tokens"] = json!(max_tokens);
    } else {
        body["max_tokens"] = json!(max_tokens);
        body["temperature"] = json!(0.1);
    }

    body
}

/// Parse a reply expected to be one JSON object, tolerating a ``` fence.
pub fn parse_json_reply(raw: &str) -> Result<Value, VisionError> {
    let mut text = raw.trim();

    if text.starts_with("```") {
        text = text
            .trim_start_matches("```json")
            .trim_start_matches("```JSON")
            .trim_start_matches("```")
            .trim_end()
            .trim_end_matches("```")
            .trim();
    }

    let value: Value =
        serde_json::from_str(text).map_err(|e| VisionError::Parse(e.to_string()))?;
    if !value.is_object() {
        return Err(VisionError::Parse(format!("expected an object, got {}", value)));
    }

    Ok(value)
}

/// Vision provider client.
#[derive(Clone)]
pub struct VisionClient {
    http: Client,
    api_key: Option<SecretString>,
    model: String,
    endpoint: String,
}

impl VisionClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self, VisionError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| VisionError::Client(e.to_string()))?;

        let api_key = settings
            .is_configured()
            .then(|| SecretString::from(settings.api_key.expose_secret().trim().to_string()));

        Ok(Self {
            http,
            api_key,
            model: settings.model.clone(),
            endpoint: format!(
                "{}/chat/completions",
                settings.base_url.trim_end_matches('/')
            ),
        })
    }

    /// Whether a credential is available. Callers decide what "no credential" means.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send the prompt and images, returning the reply's message text.
    pub async fn complete(
        &self,
        prompt: &str,
        images_base64: &[String],
        max_tokens: u32,
    ) -> Result<String, VisionError> {
        let api_key = self.api_key.as_ref().ok_or(VisionError::NotConfigured)?;
        let body = build_request_body(&self.model, prompt, images_base64, max_tokens);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: Value = response.json().await?;
        let text = reply
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or(VisionError::EmptyReply)?;

        debug!(model = %self.model, "Vision provider raw reply: {}", text);
        Ok(text.to_string())
    }

    /// Like [`complete`](Self::complete), parsing the reply as a JSON object.
    pub async fn complete_json(
        &self,
        prompt: &str,
        images_base64: &[String],
        max_tokens: u32,
    ) -> Result<Value, VisionError> {
        let text = self.complete(prompt, images_base64, max_tokens).await?;
        parse_json_reply(&text)
    }
}
