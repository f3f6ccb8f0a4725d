//! HTTP 请求处理器

pub mod assist;
mod extract;
pub mod health;
mod requests;
mod responses;

pub use assist::{handle_analyze, handle_ask, handle_summary};
pub use health::{handle_health, handle_root};

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

/// 处理器错误
///
/// 每种错误对应一个固定状态码，响应体统一为 `{"detail": "..."}`
#[derive(Debug)]
pub enum ApiError {
    /// 请求体缺字段、格式错误或字段取值非法（422）
    Validation(String),
    /// 请求体无法读取（如超过大小上限），沿用 axum 给出的状态码
    Rejected(StatusCode, String),
    /// 未配置 API 密钥（503），在任何网络调用之前返回
    Unavailable(&'static str),
    /// 上游调用失败（500），包含上游错误信息
    Upstream(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Rejected(status, _) => *status,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let detail = match self {
            ApiError::Validation(msg) | ApiError::Upstream(msg) | ApiError::Rejected(_, msg) => msg,
            ApiError::Unavailable(msg) => msg.to_string(),
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}
