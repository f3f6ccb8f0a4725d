use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

/// 上游客户端的 User-Agent
pub fn user_agent() -> String {
    format!("aibrowsex/{}", env!("CARGO_PKG_VERSION"))
}

/// 构建带总超时的 HTTP 客户端
///
/// 超时覆盖连接、发送和读取整个响应体；超时会以普通请求错误的形式返回给调用方。
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent())
        .pool_max_idle_per_host(10)
        .build()
        .context("Failed to create HTTP client")
}

/// 按字符（Unicode scalar value）截断字符串
///
/// # 参数
///
/// * `text` - 原始文本
/// * `max_chars` - 最多保留的字符数
///
/// # 返回值
///
/// 返回前 `max_chars` 个字符组成的切片；长度不超过上限时原样返回。
/// 不考虑单词边界，是硬截断。
#[inline]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_is_returned_unchanged() {
        assert_eq!(truncate_chars("hello", 8000), "hello");
        assert_eq!(truncate_chars("", 10), "");
    }

    #[test]
    fn exact_length_is_not_cut() {
        let text = "a".repeat(8000);
        assert_eq!(truncate_chars(&text, 8000).len(), 8000);
    }

    #[test]
    fn long_input_is_cut_at_limit() {
        let text = "b".repeat(8001);
        assert_eq!(truncate_chars(&text, 8000), "b".repeat(8000));
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "你好世界".repeat(3000);
        let cut = truncate_chars(&text, 8000);
        assert_eq!(cut.chars().count(), 8000);
        assert!(text.starts_with(cut));
    }

    #[test]
    fn cut_does_not_split_multibyte_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("🦀🦀🦀", 1), "🦀");
    }
}
