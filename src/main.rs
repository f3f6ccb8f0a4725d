//! AIBrowseX - 浏览器 AI 助手网关
//!
//! 一个轻量级的 HTTP 服务，把浏览器提交的问题或网页内容转发给 Claude，
//! 并把回答包装成 JSON 返回。
//!
//! # 功能特性
//!
//! - 带可选网页上下文的问答
//! - 网页摘要
//! - 按类别（情感、实体、SEO 等）的内容分析
//! - 两种部署 Profile：本地后端与 Serverless，路由和响应形态不同
//! - Prompt 文案以 TOML 数据维护，可通过配置文件替换
//!
//! # 命令行接口
//!
//! - `serve`: 启动 API 服务器
//! - `test`: 向本地服务器发送测试请求
//! - `prompts`: 打印生效的 prompt 集合

mod commands;
mod config;
mod gateway;
mod profile;
mod prompts;
mod providers;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use profile::Profile;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// AIBrowseX CLI
#[derive(Parser)]
#[command(name = "aibrowsex")]
#[command(about = "AI assistant gateway for the AIBrowseX browser", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// 可用的命令
#[derive(Subcommand)]
enum Commands {
    /// 启动 API 服务器
    Serve {
        /// 部署 Profile，覆盖 AIBROWSEX_PROFILE
        #[arg(short, long, value_enum)]
        profile: Option<Profile>,
    },
    /// 向本地服务器发送测试请求
    Test,
    /// 打印生效的 prompt 集合（TOML）
    Prompts {
        /// 打印指定 Profile 的内置集合
        #[arg(short, long, value_enum)]
        profile: Option<Profile>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 加载 .env 文件（如果存在）
    if let Ok(dotenv_path) = std::env::var("AIBROWSEX_ENV_FILE") {
        dotenvy::from_path(&dotenv_path).ok();
    } else {
        dotenvy::dotenv().ok();
    }

    // 初始化日志系统
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aibrowsex=info,tower_http=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Serve { profile } => commands::serve_command(config, profile).await,
        Commands::Test => commands::test_command(config).await,
        Commands::Prompts { profile } => commands::prompts_command(config, profile).await,
    }
}
