//! Gateway 应用状态

use std::sync::Arc;

use crate::profile::Profile;
use crate::prompts::PromptSet;
use crate::providers::CompletionClient;

/// Gateway 应用状态
///
/// 启动时构建，之后只读，所有请求共享
#[derive(Clone)]
pub struct AppState {
    profile: Profile,
    prompts: Arc<PromptSet>,
    client: Option<Arc<dyn CompletionClient>>,
}

impl AppState {
    pub fn new(
        profile: Profile,
        prompts: PromptSet,
        client: Option<Arc<dyn CompletionClient>>,
    ) -> Self {
        Self {
            profile,
            prompts: Arc::new(prompts),
            client,
        }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn prompts(&self) -> &PromptSet {
        &self.prompts
    }

    /// 未配置 API 密钥时为 `None`
    pub fn client(&self) -> Option<&Arc<dyn CompletionClient>> {
        self.client.as_ref()
    }

    pub fn ai_available(&self) -> bool {
        self.client.is_some()
    }
}
