//! # 认证中间件
//!
//! 从请求头中提取会话令牌并验证，将账户 ID 注入请求扩展。
//! 处理器通过 [`AuthContext`] 提取器取得已认证的账户，
//! 未经过本中间件的请求无法构造该类型。

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::auth::AuthUtils;
use crate::error::AppError;
use crate::logging::{LogComponent, LogStage};
use crate::lwarn;
use crate::server::AppState;

/// 已认证请求的上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub account_id: i32,
}

/// Axum认证中间件
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(auth_header) = AuthUtils::extract_authorization_header(request.headers()) else {
        return Err(AppError::unauthorized("unauthorized"));
    };

    let Some(token) = AuthUtils::extract_bearer_token(auth_header) else {
        return Err(AppError::unauthorized("unauthorized"));
    };

    let account_id = match state.tokens.verify(token) {
        Ok(account_id) => account_id,
        Err(e) => {
            lwarn!(
                "http",
                LogStage::Authentication,
                LogComponent::Auth,
                "verify_token",
                &format!("令牌校验失败 ({}): {e}", AuthUtils::sanitize_token(token))
            );
            return Err(AppError::unauthorized("unauthorized"));
        }
    };

    request.extensions_mut().insert(AuthContext { account_id });
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .copied()
            .ok_or_else(|| AppError::unauthorized("unauthorized"))
    }
}
