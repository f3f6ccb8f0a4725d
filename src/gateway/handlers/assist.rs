//! 问答、摘要和分析处理器
//!
//! 三个处理器流程相同：检查客户端 -> 按模板构建 prompt -> 调用上游一次 -> 按 Profile 包装结果

use axum::extract::State;
use std::sync::Arc;

use super::extract::ValidJson;
use super::requests::{AnalysisRequest, QuestionRequest, SummaryRequest};
use super::responses::{AnalysisResponse, AnswerResponse, Envelope, Reply, SummaryResponse};
use super::ApiError;
use crate::gateway::state::AppState;
use crate::profile::{Operation, Profile};
use crate::providers::{Completion, CompletionClient, CompletionRequest};

/// POST /askAI
pub async fn handle_ask(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<QuestionRequest>,
) -> Result<Reply, ApiError> {
    let client = require_client(&state)?;
    let request = state
        .prompts()
        .question(&body.question, body.context.as_deref());

    let completion = complete(client, state.profile(), Operation::Ask, request).await?;

    Ok(match state.profile() {
        Profile::Backend => Reply::Answer(AnswerResponse {
            answer: completion.text,
            model: completion.model,
        }),
        Profile::Vercel => Reply::Envelope(Envelope::ok(completion.text)),
    })
}

/// POST /summary
pub async fn handle_summary(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<SummaryRequest>,
) -> Result<Reply, ApiError> {
    let client = require_client(&state)?;
    let request = state.prompts().summary(&body.url, &body.content);

    let completion = complete(client, state.profile(), Operation::Summary, request).await?;

    Ok(match state.profile() {
        Profile::Backend => Reply::Summary(SummaryResponse {
            summary: completion.text,
            model: completion.model,
        }),
        Profile::Vercel => Reply::Envelope(Envelope::ok(completion.text)),
    })
}

/// POST /analyze
///
/// 响应回显调用方提交的 `analysis_type`，即使它未知并已回退到 `general`
pub async fn handle_analyze(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<AnalysisRequest>,
) -> Result<Reply, ApiError> {
    let client = require_client(&state)?;
    let request = state
        .prompts()
        .analysis(&body.url, &body.content, &body.analysis_type);

    let completion = complete(client, state.profile(), Operation::Analyze, request).await?;

    Ok(match state.profile() {
        Profile::Backend => Reply::Analysis(AnalysisResponse {
            analysis: completion.text,
            analysis_type: body.analysis_type,
            model: completion.model,
        }),
        Profile::Vercel => Reply::Envelope(Envelope::ok(completion.text)),
    })
}

fn require_client(state: &AppState) -> Result<Arc<dyn CompletionClient>, ApiError> {
    state
        .client()
        .cloned()
        .ok_or_else(|| ApiError::Unavailable(state.profile().unavailable_message()))
}

async fn complete(
    client: Arc<dyn CompletionClient>,
    profile: Profile,
    operation: Operation,
    request: CompletionRequest,
) -> Result<Completion, ApiError> {
    tracing::info!(
        client = client.name(),
        operation = operation.as_str(),
        max_tokens = request.max_tokens,
        prompt_chars = request.prompt.chars().count(),
        "request"
    );

    let completion = client.complete(request).await.map_err(|err| {
        tracing::error!(operation = operation.as_str(), "upstream failed: {:#}", err);
        ApiError::Upstream(profile.failure_message(operation, &err))
    })?;

    tracing::info!(
        operation = operation.as_str(),
        model = %completion.model,
        input_tokens = completion.usage.input_tokens,
        output_tokens = completion.usage.output_tokens,
        "response"
    );

    Ok(completion)
}
