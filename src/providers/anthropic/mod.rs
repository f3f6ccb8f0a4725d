//! Anthropic Messages API 客户端
//!
//! 基于 API Key 认证，发送单轮非流式请求

mod constants;

use anyhow::{Context, Result};
use async_trait::async_trait;
use http::{header, HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::providers::{
    parse_anthropic_usage, Completion, CompletionClient, CompletionRequest, EmptyCompletion,
};
use crate::utils::build_http_client;
use constants::{ANTHROPIC_API_VERSION, MESSAGES_PATH};

pub use constants::{DEFAULT_API_BASE_URL, DEFAULT_MODEL};

/// Messages API 响应中本服务关心的部分
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    model: String,
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

pub struct AnthropicClient {
    http: Client,
    endpoint: String,
    headers: HeaderMap,
    model: String,
}

impl AnthropicClient {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_http_client(timeout)?,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), MESSAGES_PATH),
            headers: build_headers(api_key)?,
            model: model.to_string(),
        })
    }

    fn build_body(&self, request: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "messages": [
                { "role": "user", "content": request.prompt }
            ]
        });
        if let (Some(system), Some(obj)) = (&request.system, body.as_object_mut()) {
            obj.insert("system".to_string(), Value::String(system.clone()));
        }
        body
    }
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        let body = self.build_body(&request);

        let response = self
            .http
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Claude API")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Claude API error {}: {}", status, upstream_error_message(&error_body));
        }

        let value: Value = response
            .json()
            .await
            .context("Failed to parse Claude API response")?;
        let usage = parse_anthropic_usage(&value);
        let parsed: MessagesResponse =
            serde_json::from_value(value).context("Unexpected Claude API response shape")?;

        let text = parsed
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .ok_or(EmptyCompletion)?;

        Ok(Completion {
            text,
            model: parsed.model,
            usage,
        })
    }
}

fn build_headers(api_key: &str) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();

    let mut key = HeaderValue::from_str(api_key).context("Invalid API key for header")?;
    key.set_sensitive(true);
    map.insert("x-api-key", key);
    map.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    map.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    map.insert(
        "anthropic-version",
        HeaderValue::from_static(ANTHROPIC_API_VERSION),
    );

    Ok(map)
}

/// 从错误响应体中提取可读信息
///
/// Anthropic 的错误格式为 `{"type":"error","error":{"type":..,"message":..}}`，
/// 无法解析时返回原始响应体
fn upstream_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
