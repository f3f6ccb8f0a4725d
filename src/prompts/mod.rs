//! Prompt 模板
//!
//! 所有 prompt 文案、分析类别和输出上限都是 TOML 数据，而不是代码：
//! 内置两套（`backend.toml` / `vercel.toml`），也可以通过
//! `AIBROWSEX_PROMPTS_FILE` 指定自定义文件。
//!
//! 模板使用 `{name}` 占位符，渲染时只扫描模板本身，
//! 用户提交的文本里即使出现 `{question}` 之类的字符串也不会被再次展开。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;

use crate::config::Config;
use crate::profile::Profile;
use crate::providers::CompletionRequest;
use crate::utils::truncate_chars;

/// 转发给上游的页面内容的最大字符数
pub const MAX_CONTENT_CHARS: usize = 8000;

/// 未知分析类型回退到的类别
pub const GENERAL_ANALYSIS: &str = "general";

const BACKEND_PROMPTS: &str = include_str!("backend.toml");
const VERCEL_PROMPTS: &str = include_str!("vercel.toml");

/// 一个 Profile 使用的完整 prompt 集合
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptSet {
    pub ask: AskPrompt,
    pub summary: SummaryPrompt,
    pub analysis: AnalysisPrompt,
}

/// 问答 prompt
///
/// 没有上下文时直接把问题作为 prompt 发送
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskPrompt {
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// 带上下文时使用的 system prompt，未设置则沿用 `system`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_with_context: Option<String>,
    pub with_context: String,
}

/// 网页摘要 prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryPrompt {
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub template: String,
}

/// 内容分析 prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisPrompt {
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub template: String,
    /// 分析类型 -> 关注点说明
    pub categories: BTreeMap<String, String>,
}

impl PromptSet {
    /// 加载 Profile 内置的 prompt 集合
    pub fn bundled(profile: Profile) -> Result<Self> {
        let text = match profile {
            Profile::Backend => BACKEND_PROMPTS,
            Profile::Vercel => VERCEL_PROMPTS,
        };
        Self::from_toml(text).with_context(|| format!("Invalid bundled prompts for {}", profile))
    }

    /// 解析并校验 TOML 格式的 prompt 集合
    pub fn from_toml(text: &str) -> Result<Self> {
        let set: PromptSet = toml::from_str(text).context("Failed to parse prompt TOML")?;
        set.validate()?;
        Ok(set)
    }

    /// 从文件加载
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompts file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid prompts file {}", path.display()))
    }

    /// 按配置加载：指定了文件则使用文件，否则使用 Profile 内置集合
    pub async fn load(config: &Config) -> Result<Self> {
        match &config.prompts_file {
            Some(path) => {
                let set = Self::from_file(path).await?;
                tracing::info!("Loaded prompts from {}", path.display());
                Ok(set)
            }
            None => Self::bundled(config.profile),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize prompts")
    }

    /// 校验 prompt 集合
    ///
    /// - 分析类别必须包含 `general`
    /// - 所有 `max_tokens` 必须大于 0
    /// - 模板只能引用本操作可用的占位符
    pub fn validate(&self) -> Result<()> {
        if !self.analysis.categories.contains_key(GENERAL_ANALYSIS) {
            anyhow::bail!("analysis.categories must define '{}'", GENERAL_ANALYSIS);
        }

        for (section, max_tokens) in [
            ("ask", self.ask.max_tokens),
            ("summary", self.summary.max_tokens),
            ("analysis", self.analysis.max_tokens),
        ] {
            if max_tokens == 0 {
                anyhow::bail!("{}.max_tokens must be greater than zero", section);
            }
        }

        check_placeholders("ask.with_context", &self.ask.with_context, &["context", "question"])?;
        check_placeholders("summary.template", &self.summary.template, &["url", "content"])?;
        check_placeholders(
            "analysis.template",
            &self.analysis.template,
            &["url", "focus", "content"],
        )?;
        Ok(())
    }

    /// 构建问答请求
    ///
    /// 有非空上下文时先呈现上下文、后呈现问题；否则直接发送问题
    pub fn question(&self, question: &str, context: Option<&str>) -> CompletionRequest {
        let ask = &self.ask;
        match context.filter(|c| !c.is_empty()) {
            Some(context) => CompletionRequest {
                system: ask.system_with_context.clone().or_else(|| ask.system.clone()),
                prompt: render(
                    &ask.with_context,
                    &[("context", context), ("question", question)],
                ),
                max_tokens: ask.max_tokens,
            },
            None => CompletionRequest {
                system: ask.system.clone(),
                prompt: question.to_string(),
                max_tokens: ask.max_tokens,
            },
        }
    }

    /// 构建网页摘要请求，内容截断到 [`MAX_CONTENT_CHARS`]
    pub fn summary(&self, url: &str, content: &str) -> CompletionRequest {
        let content = truncate_chars(content, MAX_CONTENT_CHARS);
        CompletionRequest {
            system: self.summary.system.clone(),
            prompt: render(&self.summary.template, &[("url", url), ("content", content)]),
            max_tokens: self.summary.max_tokens,
        }
    }

    /// 构建内容分析请求，内容截断到 [`MAX_CONTENT_CHARS`]
    pub fn analysis(&self, url: &str, content: &str, analysis_type: &str) -> CompletionRequest {
        let content = truncate_chars(content, MAX_CONTENT_CHARS);
        let focus = self.focus_for(analysis_type);
        CompletionRequest {
            system: self.analysis.system.clone(),
            prompt: render(
                &self.analysis.template,
                &[("url", url), ("focus", focus), ("content", content)],
            ),
            max_tokens: self.analysis.max_tokens,
        }
    }

    /// 分析类型对应的关注点说明，未知类型回退到 `general`
    pub fn focus_for(&self, analysis_type: &str) -> &str {
        let categories = &self.analysis.categories;
        categories
            .get(analysis_type)
            .or_else(|| categories.get(GENERAL_ANALYSIS))
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// 单遍渲染模板
///
/// 只替换 `vars` 中出现的 `{name}`，其余花括号原样保留
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let extra: usize = vars.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let value = tail
            .find('}')
            .and_then(|end| vars.iter().find(|(name, _)| *name == &tail[1..end]).map(|(_, v)| (end, *v)));

        match value {
            Some((end, value)) => {
                out.push_str(value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// 提取模板中形如 `{identifier}` 的占位符
fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let tail = &rest[start + 1..];
        match tail.find('}') {
            Some(end) => {
                let name = &tail[..end];
                let is_identifier = !name.is_empty()
                    && name.chars().all(|c| c.is_ascii_lowercase() || c == '_');
                if is_identifier {
                    names.push(name);
                }
                rest = tail;
            }
            None => break,
        }
    }

    names
}

fn check_placeholders(field: &str, template: &str, allowed: &[&str]) -> Result<()> {
    for name in placeholders(template) {
        if !allowed.contains(&name) {
            anyhow::bail!(
                "{} uses unknown placeholder {{{}}} (allowed: {})",
                field,
                name,
                allowed.join(", ")
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn backend() -> PromptSet {
        PromptSet::bundled(Profile::Backend).expect("backend prompts should parse")
    }

    fn vercel() -> PromptSet {
        PromptSet::bundled(Profile::Vercel).expect("vercel prompts should parse")
    }

    #[test]
    fn bundled_sets_have_expected_token_caps() {
        let backend = backend();
        assert_eq!(backend.ask.max_tokens, 2048);
        assert_eq!(backend.summary.max_tokens, 1024);
        assert_eq!(backend.analysis.max_tokens, 1536);

        let vercel = vercel();
        assert_eq!(vercel.ask.max_tokens, 2048);
        assert_eq!(vercel.summary.max_tokens, 1024);
        assert_eq!(vercel.analysis.max_tokens, 2048);
    }

    #[test]
    fn bundled_category_vocabularies() {
        let backend: Vec<_> = backend().analysis.categories.into_keys().collect();
        assert_eq!(backend, ["entities", "general", "key_points", "sentiment"]);

        let vercel: Vec<_> = vercel().analysis.categories.into_keys().collect();
        assert_eq!(vercel, ["general", "readability", "security", "seo", "technical"]);
    }

    #[test]
    fn bare_question_is_sent_as_is() {
        let request = backend().question("What is Rust?", None);
        assert_eq!(request.prompt, "What is Rust?");
        assert_eq!(request.max_tokens, 2048);
        let system = request.system.expect("backend has a system prompt");
        assert!(system.contains("integrated into a web browser"));
        assert!(!system.contains("provided context"));
    }

    #[test]
    fn empty_context_is_treated_as_absent() {
        let request = vercel().question("hi", Some(""));
        assert_eq!(request.prompt, "hi");
        assert_eq!(request.system, None);
    }

    #[test]
    fn context_precedes_question() {
        for set in [backend(), vercel()] {
            let request = set.question("Who wrote it?", Some("An article about ferris"));
            let context_at = request.prompt.find("An article about ferris").expect("context present");
            let question_at = request.prompt.find("Who wrote it?").expect("question present");
            assert!(context_at < question_at);
        }
    }

    #[test]
    fn context_switches_backend_system_prompt() {
        let request = backend().question("q", Some("ctx"));
        let system = request.system.expect("system prompt");
        assert!(system.contains("Always base your answers on the provided context"));
    }

    #[test]
    fn summary_truncates_content() {
        let content = "x".repeat(MAX_CONTENT_CHARS + 500);
        let request = vercel().summary("https://example.com", &content);
        assert!(request.prompt.contains(&"x".repeat(MAX_CONTENT_CHARS)));
        assert!(!request.prompt.contains(&"x".repeat(MAX_CONTENT_CHARS + 1)));
        assert!(request.prompt.contains("from https://example.com:"));
        assert!(request.prompt.contains("Keep it under 200 words."));
        assert_eq!(request.max_tokens, 1024);
    }

    #[test]
    fn summary_keeps_short_content_intact() {
        let content = "short page body";
        let request = backend().summary("https://example.com", content);
        assert!(request.prompt.contains("Content:\nshort page body\n"));
    }

    #[test]
    fn analysis_uses_category_focus() {
        let set = backend();
        let request = set.analysis("https://example.com", "body", "sentiment");
        assert!(request.prompt.contains("Analyze the sentiment and tone of this webpage"));
        assert_eq!(request.max_tokens, 1536);
    }

    #[test]
    fn unknown_analysis_type_falls_back_to_general() {
        for set in [backend(), vercel()] {
            assert_eq!(set.focus_for("astrology"), set.focus_for(GENERAL_ANALYSIS));
            let request = set.analysis("u", "c", "astrology");
            assert!(request.prompt.contains(set.focus_for(GENERAL_ANALYSIS)));
        }
    }

    #[test]
    fn analysis_truncates_content() {
        let content = "é".repeat(MAX_CONTENT_CHARS * 2);
        let request = vercel().analysis("u", &content, "seo");
        let forwarded = request.prompt.matches('é').count();
        assert_eq!(forwarded, MAX_CONTENT_CHARS);
    }

    #[test]
    fn user_text_is_not_re_expanded() {
        let request = vercel().question("{context}", Some("{question}"));
        assert_eq!(request.prompt, "Context: {question}\n\nQuestion: {context}");
    }

    #[test]
    fn render_keeps_unknown_braces() {
        let out = render("a {x} {y} {", &[("x", "1")]);
        assert_eq!(out, "a 1 {y} {");
    }

    #[test]
    fn validate_requires_general_category() {
        let text = r#"
            [ask]
            max_tokens = 10
            with_context = "{context} {question}"
            [summary]
            max_tokens = 10
            template = "{url} {content}"
            [analysis]
            max_tokens = 10
            template = "{url} {focus} {content}"
            [analysis.categories]
            seo = "seo"
        "#;
        let err = PromptSet::from_toml(text).unwrap_err();
        assert!(err.to_string().contains("general"));
    }

    #[test]
    fn validate_rejects_foreign_placeholder() {
        let text = r#"
            [ask]
            max_tokens = 10
            with_context = "{context} {question}"
            [summary]
            max_tokens = 10
            template = "{url} {focus}"
            [analysis]
            max_tokens = 10
            template = "{url} {focus} {content}"
            [analysis.categories]
            general = "all"
        "#;
        let err = PromptSet::from_toml(text).unwrap_err();
        assert!(err.to_string().contains("{focus}"));
    }

    #[test]
    fn validate_rejects_zero_max_tokens() {
        let mut set = vercel();
        set.summary.max_tokens = 0;
        assert!(set.validate().is_err());
    }

    #[test]
    fn serialized_set_parses_back() {
        let set = backend();
        let text = set.to_toml().expect("serialize");
        let parsed = PromptSet::from_toml(&text).expect("reparse");
        assert_eq!(parsed.analysis.categories, set.analysis.categories);
        assert_eq!(parsed.ask.with_context, set.ask.with_context);
    }

    #[tokio::test]
    async fn loads_prompts_file_from_config() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let mut set = vercel();
        set.analysis
            .categories
            .insert("accessibility".to_string(), "Check alt text".to_string());
        file.write_all(set.to_toml().expect("serialize").as_bytes())
            .expect("write");

        let config = Config {
            prompts_file: Some(file.path().to_path_buf()),
            ..Config::from_lookup(|_| None).expect("default config")
        };
        let loaded = PromptSet::load(&config).await.expect("load");
        assert_eq!(loaded.focus_for("accessibility"), "Check alt text");
    }

    #[tokio::test]
    async fn missing_prompts_file_is_an_error() {
        let err = PromptSet::from_file("/nonexistent/prompts.toml").await.unwrap_err();
        assert!(err.to_string().contains("Failed to read prompts file"));
    }
}
