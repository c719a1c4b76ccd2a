//! # 认证工具函数

use axum::http::{HeaderMap, header::AUTHORIZATION};

/// 认证工具类
pub struct AuthUtils;

impl AuthUtils {
    /// 令牌脱敏，仅保留前缀用于日志
    #[must_use]
    pub fn sanitize_token(token: &str) -> String {
        let prefix: String = token.chars().take(6).collect();
        if token.chars().count() > 12 {
            format!("{prefix}***")
        } else {
            "***".to_string()
        }
    }

    /// `从HTTP头中提取Authorization头的值`
    #[must_use]
    pub fn extract_authorization_header(headers: &HeaderMap) -> Option<&str> {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
    }

    /// `从Authorization头中提取Bearer` token
    ///
    /// 头部按单个空格拆分后必须恰好两段，且第一段为字面量 `Bearer`
    #[must_use]
    pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
        let parts: Vec<&str> = auth_header.split(' ').collect();
        match parts.as_slice() {
            ["Bearer", token] if !token.is_empty() => Some(*token),
            _ => None,
        }
    }
}
