//! # 登录相关处理器

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    response::Redirect,
};
use serde::Deserialize;

use crate::auth::AccountInfo;
use crate::error::{AppError, Result};
use crate::server::AppState;
use crate::server::middleware::AuthContext;
use crate::server::response::Envelope;

/// 回调查询参数
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

/// `GET /api/auth/provider/login`
pub async fn login(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.oauth.begin_login())
}

/// `GET /api/auth/provider/callback?code=...`
pub async fn callback(
    State(state): State<AppState>,
    params: std::result::Result<Query<CallbackParams>, QueryRejection>,
) -> Result<Redirect> {
    let code = params
        .ok()
        .and_then(|Query(params)| params.code)
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::validation("code not found"))?;

    let login = state.oauth.complete_login(&code).await?;
    let target = frontend_redirect(&state.config.frontend.url, &login.token)?;
    Ok(Redirect::temporary(target.as_str()))
}

/// `{frontend}/auth/callback?token=...`
fn frontend_redirect(frontend_url: &str, token: &str) -> Result<url::Url> {
    let base = format!("{}/auth/callback", frontend_url.trim_end_matches('/'));
    let mut url = url::Url::parse(&base)
        .map_err(|e| AppError::internal_with_source(format!("无效的前端地址: {base}"), e))?;
    url.query_pairs_mut().append_pair("token", token);
    Ok(url)
}

/// `GET /api/auth/me`
pub async fn me(State(state): State<AppState>, auth: AuthContext) -> Result<Envelope<AccountInfo>> {
    let account = state
        .identity_store
        .find_account_by_id(auth.account_id)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;
    Ok(Envelope::ok("user", AccountInfo::from(account)))
}
