use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::debug;

use super::types::{CompletionRequest, LLMResponse, Message, ProviderAdapter, ProviderError, ToolCall, ToolSchema};

#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
}

pub struct OpenAiAdapter {
    cfg: OpenAiConfig,
    client: Client,
}

impl OpenAiAdapter {
    pub fn new(mut cfg: OpenAiConfig) -> Result<Self, ProviderError> {
        if cfg.base_url.is_empty() {
            cfg.base_url = "https://api.openai.com".to_string();
        }
        if cfg.model.is_empty() {
            cfg.model = "gpt-4o-mini".to_string();
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| ProviderError::new("client_error", &err.to_string(), false))?;
        Ok(Self { cfg, client })
    }

    pub fn model(&self) -> &str {
        &self.cfg.model
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    async fn complete(&self, request: CompletionRequest) -> Result<LLMResponse, ProviderError> {
        let model = request.model.clone().unwrap_or_else(|| self.cfg.model.clone());
        let temperature = request.temperature.unwrap_or(self.cfg.temperature);
        let payload = build_payload(&model, &request.messages, request.tools.as_ref(), temperature);

        let endpoint = format!("{}/v1/chat/completions", self.cfg.base_url.trim_end_matches('/'));
        debug!(%endpoint, %model, messages = request.messages.len(), "sending chat completion");

        let resp = self
            .client
            .post(endpoint)
            .bearer_auth(self.cfg.api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|err| ProviderError::new("network_error", &err.to_string(), true))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if status.is_client_error() || status.is_server_error() {
            let lowered = body.to_lowercase();
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(ProviderError::new("auth_error", &body, false));
            }
            if status.as_u16() == 429 || lowered.contains("insufficient_quota") {
                return Err(ProviderError::new("rate_limit", &body, true));
            }
            if status.is_server_error() {
                return Err(ProviderError::new("server_error", &body, true));
            }
            return Err(ProviderError::new("api_error", &body, false));
        }

        let raw: Value = serde_json::from_str(&body)
            .map_err(|_| ProviderError::new("parse_error", "invalid json", false))?;
        let (content, tool_calls) = parse_response(&raw);
        Ok(LLMResponse {
            content,
            tool_calls,
            raw: Some(raw),
        })
    }
}

fn build_payload(model: &str, messages: &[Message], tools: Option<&Vec<ToolSchema>>, temperature: f64) -> Value {
    let messages: Vec<Value> = messages
        .iter()
        .map(|msg| json!({"role": msg.role, "content": msg.content}))
        .collect();

    let mut payload = json!({
        "model": model,
        "messages": messages,
        "temperature": temperature,
    });

    if let Some(tools) = tools {
        let declarations: Vec<Value> = tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters.clone().unwrap_or(json!({"type": "object"})),
                    }
                })
            })
            .collect();
        if !declarations.is_empty() {
            payload["tools"] = Value::Array(declarations);
        }
    }

    payload
}

fn parse_response(raw: &Value) -> (String, Vec<ToolCall>) {
    let mut tool_calls = Vec::new();

    let message = match raw
        .get("choices")
        .and_then(|v| v.as_array())
        .and_then(|list| list.first())
        .and_then(|choice| choice.get("message"))
    {
        Some(message) => message,
        None => return (String::new(), tool_calls),
    };

    let text = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    if let Some(calls) = message.get("tool_calls").and_then(|v| v.as_array()) {
        for call in calls {
            let function = match call.get("function") {
                Some(function) => function,
                None => continue,
            };
            let name = function.get("name").and_then(|v| v.as_str()).unwrap_or("");
            // arguments arrive as a JSON-encoded string
            let args = function
                .get("arguments")
                .and_then(|v| v.as_str())
                .and_then(|s| serde_json::from_str::<Value>(s).ok())
                .unwrap_or(json!({}));
            tool_calls.push(ToolCall {
                name: name.to_string(),
                args,
            });
        }
    }

    (text, tool_calls)
}
