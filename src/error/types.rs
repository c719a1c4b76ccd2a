//! # 错误类型定义

use std::collections::BTreeMap;

use axum::http::StatusCode;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use super::ErrorCategory;

/// 应用主要错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 请求参数错误 (400)
    #[error("参数错误: {message}")]
    Validation { message: String },

    /// 字段级校验失败 (422)
    #[error("字段校验失败: {fields:?}")]
    ValidationFields { fields: BTreeMap<String, String> },

    /// 缺少或格式错误的认证头
    #[error("未认证: {message}")]
    Unauthorized { message: String },

    /// 会话令牌签名错误、过期或格式不正确
    #[error("令牌无效: {message}")]
    InvalidToken {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 资源不存在
    #[error("资源不存在: {message}")]
    NotFound { message: String },

    /// 唯一约束冲突
    #[error("资源冲突: {message}")]
    Conflict {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 外部身份提供方调用失败，对外表现为 500
    #[error("上游服务错误: {message}")]
    Upstream {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 外部账号没有同时为 primary 且已验证的邮箱
    #[error("没有已验证的主邮箱")]
    NoVerifiedEmail,

    /// 提交未通过测试，不予记录
    #[error("提交未通过测试")]
    NotAccepted,

    /// 请求体超过 `server.body_limit` (413)
    #[error("请求体过大")]
    PayloadTooLarge,

    /// 系统内部错误
    #[error("内部错误: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 配置相关错误
    #[error("配置错误: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 数据库相关错误
    #[error("数据库错误: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// IO相关错误
    #[error("IO错误: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// 序列化/反序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    /// 带上下文的错误
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// 去掉所有 `Context` 包装，返回最内层错误
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// HTTP 状态码
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.root() {
            Self::Validation { .. } | Self::NotAccepted | Self::NoVerifiedEmail => {
                StatusCode::BAD_REQUEST
            }
            Self::ValidationFields { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized { .. } | Self::InvalidToken { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        if self.status_code().is_server_error() {
            ErrorCategory::Server
        } else {
            ErrorCategory::Client
        }
    }

    /// 返回给客户端的 JSON 负载
    ///
    /// 5xx 错误只返回通用文案，细节仅写入日志。
    #[must_use]
    pub fn client_payload(&self) -> serde_json::Value {
        let message = match self.root() {
            Self::ValidationFields { fields } => {
                return serde_json::json!({ "error": fields });
            }
            Self::Validation { message } | Self::NotFound { message } => message.clone(),
            Self::Unauthorized { message } => message.clone(),
            Self::InvalidToken { .. } => "unauthorized".to_string(),
            Self::Conflict { message, .. } => message.clone(),
            Self::NoVerifiedEmail => "no primary verified email found".to_string(),
            Self::NotAccepted => "submission did not pass the tests".to_string(),
            Self::PayloadTooLarge => "request body too large".to_string(),
            _ => "internal server error".to_string(),
        };
        serde_json::json!({ "error": message })
    }

    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// 由 (字段, 原因) 列表构造 422 错误
    pub fn validation_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::ValidationFields {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn unauthorized<T: Into<String>>(message: T) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn invalid_token<T: Into<String>>(message: T) -> Self {
        Self::InvalidToken {
            message: message.into(),
            source: None,
        }
    }

    pub fn invalid_token_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::InvalidToken {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn not_found<T: Into<String>>(message: T) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict<T: Into<String>>(message: T) -> Self {
        Self::Conflict {
            message: message.into(),
            source: None,
        }
    }

    pub fn conflict_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Conflict {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn upstream<T: Into<String>>(message: T) -> Self {
        Self::Upstream {
            message: message.into(),
            source: None,
        }
    }

    pub fn upstream_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Upstream {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    pub fn internal_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn config<T: Into<String>>(message: T) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn database<T: Into<String>>(message: T) -> Self {
        Self::Database {
            message: message.into(),
            source: None,
        }
    }

    pub fn database_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Database {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 拼接完整的错误链，用于日志
    #[must_use]
    pub fn error_chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            message.push_str(" <- ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        message
    }

    /// 是否为唯一约束冲突
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self.root(), Self::Conflict { .. })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_with_source("TOML解析失败", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
            source: err.into(),
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return Self::conflict_with_source(
                format!("unique constraint violated: {detail}"),
                err,
            );
        }
        match err {
            DbErr::RecordNotFound(message) => Self::not_found(message),
            other => Self::database_with_source("数据库操作失败", other),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::invalid_token_with_source("JWT校验失败", err)
    }
}
