//! Serve 命令 - 启动 API 服务器

use anyhow::Result;

use crate::config::Config;
use crate::gateway;
use crate::profile::Profile;

/// 执行服务器启动命令
///
/// # 参数
///
/// * `config` - 应用配置
/// * `profile` - 命令行指定的部署 Profile，优先于 `AIBROWSEX_PROFILE`
///
/// 未配置 API 密钥时服务照常启动，AI 相关路由返回 503。
/// 支持优雅关闭（Ctrl+C 或 SIGTERM）。
pub async fn serve_command(mut config: Config, profile: Option<Profile>) -> Result<()> {
    if let Some(profile) = profile {
        config.profile = profile;
    }
    gateway::serve(config).await
}
