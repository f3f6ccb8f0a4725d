//! 部署 Profile
//!
//! 同一套处理逻辑可以以两种形态部署：
//! - `backend`: 本地后端，路由位于根路径，响应按操作区分字段（`answer` / `summary` / `analysis`）
//! - `vercel`: Serverless 部署，路由位于 `/api` 下，响应统一为 `{success, response, error?}` 信封
//!
//! Profile 决定路由前缀、响应形态、错误文案以及内置的 prompt 集合。

use crate::providers::EmptyCompletion;

/// 部署 Profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Profile {
    #[default]
    Backend,
    Vercel,
}

/// 需要调用上游模型的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Ask,
    Summary,
    Analyze,
}

impl Operation {
    /// 日志中使用的名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Ask => "ask",
            Operation::Summary => "summary",
            Operation::Analyze => "analyze",
        }
    }

    fn path_segment(&self) -> &'static str {
        match self {
            Operation::Ask => "askAI",
            Operation::Summary => "summary",
            Operation::Analyze => "analyze",
        }
    }
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Backend => "backend",
            Profile::Vercel => "vercel",
        }
    }

    /// 操作对应的 HTTP 路由
    pub fn route(&self, operation: Operation) -> String {
        match self {
            Profile::Backend => format!("/{}", operation.path_segment()),
            Profile::Vercel => format!("/api/{}", operation.path_segment()),
        }
    }

    /// 根路径上报告的服务名
    pub fn service_name(&self) -> &'static str {
        match self {
            Profile::Backend => "AIBrowseX Backend API",
            Profile::Vercel => "AIBrowseX API",
        }
    }

    /// 未配置 API 密钥时返回的 503 文案
    pub fn unavailable_message(&self) -> &'static str {
        match self {
            Profile::Backend => "AI service not available. Please configure ANTHROPIC_API_KEY",
            Profile::Vercel => "AI service unavailable. Please configure ANTHROPIC_API_KEY.",
        }
    }

    /// 上游调用失败时返回的 500 文案，包含上游错误信息
    ///
    /// backend 只把上游调用本身的失败归为 API 错误；
    /// 回复里没有文本属于服务端处理失败
    pub fn failure_message(&self, operation: Operation, err: &anyhow::Error) -> String {
        let prefix = match (self, operation) {
            (Profile::Backend, _) if err.is::<EmptyCompletion>() => "Internal server error",
            (Profile::Backend, _) => "Anthropic API error",
            (Profile::Vercel, Operation::Ask) => "AI request failed",
            (Profile::Vercel, Operation::Summary) => "Summary generation failed",
            (Profile::Vercel, Operation::Analyze) => "Analysis failed",
        };
        format!("{}: {:#}", prefix, err)
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_follow_profile_prefix() {
        assert_eq!(Profile::Backend.route(Operation::Ask), "/askAI");
        assert_eq!(Profile::Backend.route(Operation::Analyze), "/analyze");
        assert_eq!(Profile::Vercel.route(Operation::Ask), "/api/askAI");
        assert_eq!(Profile::Vercel.route(Operation::Summary), "/api/summary");
    }

    #[test]
    fn failure_message_carries_upstream_error() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(
            Profile::Backend.failure_message(Operation::Summary, &err),
            "Anthropic API error: boom"
        );
        assert_eq!(
            Profile::Vercel.failure_message(Operation::Analyze, &err),
            "Analysis failed: boom"
        );
    }

    #[test]
    fn failure_message_includes_error_chain() {
        let err = anyhow::anyhow!("connection reset").context("Failed to send request");
        let message = Profile::Vercel.failure_message(Operation::Ask, &err);
        assert!(message.starts_with("AI request failed: Failed to send request"));
        assert!(message.contains("connection reset"));
    }

    #[test]
    fn backend_reports_empty_reply_as_internal_error() {
        let err = anyhow::Error::new(EmptyCompletion);
        assert_eq!(
            Profile::Backend.failure_message(Operation::Ask, &err),
            "Internal server error: Claude API response contained no text content"
        );
        assert_eq!(
            Profile::Vercel.failure_message(Operation::Ask, &err),
            "AI request failed: Claude API response contained no text content"
        );
    }
}
