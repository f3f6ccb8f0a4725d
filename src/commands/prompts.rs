//! Prompts 命令 - 打印生效的 prompt 集合

use anyhow::Result;

use crate::config::Config;
use crate::profile::Profile;
use crate::prompts::PromptSet;

/// 以 TOML 格式打印当前配置下生效的 prompt 集合
///
/// 输出可以直接保存后修改，再通过 `AIBROWSEX_PROMPTS_FILE` 加载
pub async fn prompts_command(mut config: Config, profile: Option<Profile>) -> Result<()> {
    if let Some(profile) = profile {
        config.profile = profile;
        config.prompts_file = None;
    }

    let prompts = PromptSet::load(&config).await?;
    print!("{}", prompts.to_toml()?);
    Ok(())
}
