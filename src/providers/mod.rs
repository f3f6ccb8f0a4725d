//! 补全服务抽象层
//!
//! 定义上游大模型补全服务的统一接口。客户端在启动时构建一次，
//! 以只读的 `Arc<dyn CompletionClient>` 注入到所有请求处理器中。

pub mod anthropic;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::config::Config;
use anthropic::AnthropicClient;

/// 单轮补全请求：一条 user 消息加可选的 system prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
}

/// Token 使用统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// 上游回复成功但不含任何文本片段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyCompletion;

impl std::fmt::Display for EmptyCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Claude API response contained no text content")
    }
}

impl std::error::Error for EmptyCompletion {}

/// 补全结果
#[derive(Debug, Clone)]
pub struct Completion {
    /// 第一个文本片段
    pub text: String,
    /// 上游实际返回的模型标识
    pub model: String,
    pub usage: Usage,
}

/// 从 Anthropic API 响应中解析 Usage 信息
///
/// 缺失的字段按 0 处理，usage 只用于日志，不影响请求结果
pub fn parse_anthropic_usage(response: &Value) -> Usage {
    let usage = response.get("usage");
    let field = |name: &str| {
        usage
            .and_then(|u| u.get(name))
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
    };

    Usage {
        input_tokens: field("input_tokens"),
        output_tokens: field("output_tokens"),
    }
}

/// 补全客户端 Trait
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// 客户端名称（用于日志）
    fn name(&self) -> &str;
    async fn complete(&self, request: CompletionRequest) -> Result<Completion>;
}

/// 根据配置创建补全客户端
///
/// 未配置 API 密钥时返回 `None`，AI 相关路由随后以 503 响应，进程照常启动
pub fn create_client(config: &Config) -> Result<Option<Arc<dyn CompletionClient>>> {
    let Some(api_key) = config.api_key.as_deref() else {
        tracing::warn!("ANTHROPIC_API_KEY not set, AI endpoints will respond with 503");
        return Ok(None);
    };

    let client = AnthropicClient::new(
        &config.api_base_url,
        api_key,
        &config.model,
        config.upstream_timeout,
    )?;
    tracing::info!(
        base_url = %config.api_base_url,
        model = %config.model,
        timeout_secs = config.upstream_timeout.as_secs(),
        "Completion client ready"
    );
    Ok(Some(Arc::new(client)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_usage_fields() {
        let usage = parse_anthropic_usage(&json!({
            "usage": { "input_tokens": 12, "output_tokens": 34, "cache_read_input_tokens": 0 }
        }));
        assert_eq!(
            usage,
            Usage {
                input_tokens: 12,
                output_tokens: 34
            }
        );
    }

    #[test]
    fn missing_usage_is_zero() {
        assert_eq!(parse_anthropic_usage(&json!({})), Usage::default());
    }

    #[test]
    fn no_client_without_api_key() {
        let config = Config::from_lookup(|_| None).expect("default config");
        let client = create_client(&config).expect("should not fail");
        assert!(client.is_none());
    }

    #[test]
    fn client_created_with_api_key() {
        let config = Config::from_lookup(|key| {
            (key == "ANTHROPIC_API_KEY").then(|| "sk-ant-test".to_string())
        })
        .expect("config");
        let client = create_client(&config).expect("client").expect("some client");
        assert_eq!(client.name(), "anthropic");
    }
}
