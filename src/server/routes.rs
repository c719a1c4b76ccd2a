//! # 路由配置

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};

use super::AppState;
use super::handlers::{auth, exercises, submissions, system};
use super::middleware::require_auth;

/// 创建所有路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes(state.clone()))
        .route("/health", get(system::health))
        .route("/", get(system::ping))
        .with_state(state)
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state))
}

/// 无需认证的路由
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/provider/login", get(auth::login))
        .route("/auth/provider/callback", get(auth::callback))
        .route("/exercises", get(exercises::list))
        .route("/exercises/{id}", get(exercises::get))
}

/// 需要会话令牌的路由
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route(
            "/submissions",
            post(submissions::create).get(submissions::list),
        )
        .route("/submissions/{challenge_id}", get(submissions::get))
        .route_layer(from_fn_with_state(state, require_auth))
}
