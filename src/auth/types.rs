//! # 认证相关类型

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 会话令牌载荷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// 账户 ID（十进制字符串）
    pub sub: String,
    /// 过期时间 (Unix 秒)
    pub exp: i64,
    /// 签发时间 (Unix 秒)
    pub iat: i64,
}

/// 身份提供方返回的用户资料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalProfile {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// 身份提供方邮箱列表中的一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEmail {
    pub email: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub verified: bool,
}

/// 从邮箱列表中挑选同时为 primary 且已验证的邮箱
#[must_use]
pub fn select_verified_primary(emails: &[ProviderEmail]) -> Option<&str> {
    emails
        .iter()
        .find(|e| e.primary && e.verified)
        .map(|e| e.email.as_str())
}

/// 开户所需的完整身份信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdentity {
    pub external_id: i64,
    pub username: String,
    pub email: String,
    pub avatar_url: String,
}

/// 对外展示的账户信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub avatar_url: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<entity::accounts::Model> for AccountInfo {
    fn from(model: entity::accounts::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            avatar_url: model.avatar_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
