//! OpenRouter chat/completions client.
//!
//! Blocking on purpose: classification is synchronous request-per-document
//! and issues at most two sequential calls. The reply content must be a
//! JSON object (we request `response_format: json_object`); anything else
//! is a protocol violation, not something to repair.

use serde::{Deserialize, Serialize};

use super::{GatewayError, LlmClient, RawVerdict};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 90;
const TEMPERATURE: f32 = 0.1;

pub struct OpenRouterClient {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenRouterClient {
    pub fn new(api_key: &str, base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Client configured from `OPENROUTER_API_KEY`.
    pub fn from_env() -> Result<Self, GatewayError> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(GatewayError::MissingApiKey)?;
        Ok(Self::new(&api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl LlmClient for OpenRouterClient {
    fn classify(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<RawVerdict, GatewayError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        tracing::info!(model = %model, "Calling OpenRouter");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", "http://localhost")
            .header("X-Title", "Regdoc Classifier")
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    GatewayError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    GatewayError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    GatewayError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| GatewayError::ResponseParsing(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GatewayError::Protocol("reply contained no choices".to_string()))?;

        serde_json::from_str(&content).map_err(|e| {
            GatewayError::Protocol(format!("reply content is not a JSON verdict: {e}"))
        })
    }
}
