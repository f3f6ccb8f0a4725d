//! 应用配置模块
//!
//! 负责从环境变量加载应用配置，包括：
//! - 服务器监听地址和端口
//! - 部署 Profile
//! - 上游 Anthropic API 的密钥、地址、模型和超时
//! - 可选的 prompt 配置文件路径

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

use crate::profile::Profile;
use crate::providers::anthropic::{DEFAULT_API_BASE_URL, DEFAULT_MODEL};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 120;

/// 应用配置
///
/// 进程启动时读取一次，之后只读
#[derive(Debug, Clone)]
pub struct Config {
    /// 服务器监听地址（如 "0.0.0.0" 或 "127.0.0.1"）
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
    pub profile: Profile,
    /// Anthropic API 密钥；未设置时 AI 相关路由返回 503
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub model: String,
    /// 覆盖内置 prompt 的 TOML 文件
    pub prompts_file: Option<PathBuf>,
    /// 单次上游请求的总超时
    pub upstream_timeout: Duration,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// # 环境变量
    ///
    /// - `AIBROWSEX_HOST`: 服务器监听地址（默认: "0.0.0.0"）
    /// - `AIBROWSEX_PORT`: 服务器监听端口（默认: 8000）
    /// - `AIBROWSEX_PROFILE`: `backend` 或 `vercel`（默认: backend）
    /// - `AIBROWSEX_PROMPTS_FILE`: prompt 配置文件（可选）
    /// - `AIBROWSEX_UPSTREAM_TIMEOUT_SECS`: 上游超时秒数（默认: 120）
    /// - `ANTHROPIC_API_KEY`: API 密钥（可选，空字符串视为未设置）
    /// - `ANTHROPIC_BASE_URL`: API 地址（默认: https://api.anthropic.com）
    /// - `ANTHROPIC_MODEL`: 请求的模型（默认: claude-sonnet-4-20250514）
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意键值查找函数加载配置
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = non_empty("AIBROWSEX_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match non_empty("AIBROWSEX_PORT") {
            Some(v) => v
                .trim()
                .parse()
                .context("AIBROWSEX_PORT must be a valid port number")?,
            None => DEFAULT_PORT,
        };

        let profile = match non_empty("AIBROWSEX_PROFILE") {
            Some(v) => Profile::from_str(v.trim(), true)
                .map_err(|_| anyhow::anyhow!("AIBROWSEX_PROFILE must be 'backend' or 'vercel', got '{}'", v))?,
            None => Profile::default(),
        };

        let upstream_timeout_secs: u64 = match non_empty("AIBROWSEX_UPSTREAM_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse()
                .context("AIBROWSEX_UPSTREAM_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_UPSTREAM_TIMEOUT_SECS,
        };
        if upstream_timeout_secs == 0 {
            anyhow::bail!("AIBROWSEX_UPSTREAM_TIMEOUT_SECS must be greater than zero");
        }

        let api_base_url = non_empty("ANTHROPIC_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        Ok(Self {
            host,
            port,
            profile,
            api_key: non_empty("ANTHROPIC_API_KEY").map(|v| v.trim().to_string()),
            api_base_url,
            model: non_empty("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            prompts_file: non_empty("AIBROWSEX_PROMPTS_FILE").map(PathBuf::from),
            upstream_timeout: Duration::from_secs(upstream_timeout_secs),
        })
    }

    /// 是否配置了上游密钥
    pub fn ai_available(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
