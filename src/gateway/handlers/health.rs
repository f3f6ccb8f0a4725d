//! 服务信息和健康检查处理器

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::gateway::state::AppState;
use crate::profile::{Operation, Profile};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GET|HEAD /
pub async fn handle_root(State(state): State<AppState>) -> Json<Value> {
    let profile = state.profile();

    let body = match profile {
        Profile::Backend => json!({
            "status": "healthy",
            "service": profile.service_name(),
            "version": VERSION,
            "ai_available": state.ai_available(),
            "endpoints": {
                "health": "GET /health",
                "ask_ai": format!("POST {}", profile.route(Operation::Ask)),
                "summary": format!("POST {}", profile.route(Operation::Summary)),
                "analyze": format!("POST {}", profile.route(Operation::Analyze)),
            },
        }),
        Profile::Vercel => {
            let ai_status = if state.ai_available() {
                "ready"
            } else {
                "no_api_key"
            };
            json!({
                "status": "healthy",
                "service": profile.service_name(),
                "version": VERSION,
                "ai_status": ai_status,
            })
        }
    };

    Json(body)
}

/// GET|HEAD /health
pub async fn handle_health(State(state): State<AppState>) -> Json<Value> {
    let body = match state.profile() {
        Profile::Backend => json!({
            "status": "healthy",
            "service": "AIBrowseX Backend",
            "version": VERSION,
            "ai_available": state.ai_available(),
        }),
        Profile::Vercel => json!({
            "status": "healthy",
            "ai_available": state.ai_available(),
        }),
    };

    Json(body)
}
