//! Gateway 应用层
//!
//! HTTP 服务器和请求处理

mod handlers;
mod middleware;
mod state;

pub use state::AppState;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::Config;
use crate::profile::Operation;
use crate::prompts::PromptSet;
use crate::providers;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// AI 路由的请求体上限
///
/// 页面内容在转发前才截断到 8000 字符，请求体本身需要容纳整页文本
const MAX_ASSIST_BODY_BYTES: usize = 32 * 1024 * 1024;

pub async fn serve(config: Config) -> Result<()> {
    let prompts = PromptSet::load(&config).await?;
    let client = providers::create_client(&config)?;
    let state = AppState::new(config.profile, prompts, client);
    let app = build_router(state);

    let addr: SocketAddr = config
        .bind_addr()
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.bind_addr()))?;
    tracing::info!(
        profile = %config.profile,
        ai_available = config.ai_available(),
        "Starting server on http://{}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 构建路由
///
/// AI 路由的路径由 Profile 决定；`/` 和 `/health` 在两种 Profile 下都存在。
/// `get` 路由同时响应 HEAD。
fn build_router(state: AppState) -> Router {
    let profile = state.profile();

    let assist_routes = Router::new()
        .route(&profile.route(Operation::Ask), post(handlers::handle_ask))
        .route(
            &profile.route(Operation::Summary),
            post(handlers::handle_summary),
        )
        .route(
            &profile.route(Operation::Analyze),
            post(handlers::handle_analyze),
        )
        .layer(DefaultBodyLimit::max(MAX_ASSIST_BODY_BYTES));

    let public_routes = Router::new()
        .route("/", get(handlers::handle_root))
        .route("/health", get(handlers::handle_health));

    Router::new()
        .merge(assist_routes)
        .merge(public_routes)
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(middleware::request_logger))
                .layer(TraceLayer::new_for_http())
                // 任意来源、方法和请求头，允许携带凭据（回显请求的 Origin）
                .layer(CorsLayer::very_permissive())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
                )),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    #[cfg(not(unix))]
    tokio::select! {
        _ = ctrl_c => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
