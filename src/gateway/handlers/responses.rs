use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis: String,
    pub analysis_type: String,
    pub model: String,
}

/// Serverless 部署使用的统一信封
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub success: bool,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn ok(response: String) -> Self {
        Self {
            success: true,
            response,
            error: None,
        }
    }
}

/// 处理器的成功响应，形态由部署 Profile 决定
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Answer(AnswerResponse),
    Summary(SummaryResponse),
    Analysis(AnalysisResponse),
    Envelope(Envelope),
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
