//! # 应用配置结构定义

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ensure_config;
use crate::error::{AppError, Result};

/// 会话令牌有效期上限（一年）
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// 应用主配置结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP 服务配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 数据库配置
    #[serde(default)]
    pub database: super::DatabaseConfig,
    /// 会话令牌配置
    #[serde(default)]
    pub auth: AuthConfig,
    /// 第三方登录配置
    #[serde(default)]
    pub oauth: OAuthConfig,
    /// 前端回跳配置
    #[serde(default)]
    pub frontend: FrontendConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// 允许的跨域来源，空表示任意来源
    pub cors_origins: Vec<String>,
    /// 单个请求的处理超时（秒）
    pub request_timeout: u64,
    /// 请求体大小上限（字节）
    pub body_limit: usize,
    /// 收到停止信号后等待在途请求的最长时间（秒）
    pub shutdown_grace_period: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
            request_timeout: 30,
            body_limit: 1024 * 1024,
            shutdown_grace_period: 10,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    #[must_use]
    pub const fn shutdown_grace_period(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_period)
    }
}

/// 会话令牌配置
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 签名密钥
    pub jwt_secret: String,
    /// 令牌有效期（秒）
    pub token_ttl: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl: 24 * 60 * 60,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"***")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

/// 第三方登录 (GitHub 兼容) 配置
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// 授权完成后提供方回调的地址
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    /// 用户资料 API 根地址
    pub api_base_url: String,
    pub scopes: Vec<String>,
    /// 外部调用超时（秒）
    pub request_timeout: u64,
    pub user_agent: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            authorize_url: "https://github.com/login/oauth/authorize".to_string(),
            token_url: "https://github.com/login/oauth/access_token".to_string(),
            api_base_url: "https://api.github.com".to_string(),
            scopes: vec!["user:email".to_string()],
            request_timeout: 10,
            user_agent: concat!("exercise-api/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl OAuthConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("redirect_uri", &self.redirect_uri)
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .field("scopes", &self.scopes)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

/// 前端回跳配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// 登录成功后跳转到 `{url}/auth/callback?token=...`
    pub url: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5173".to_string(),
        }
    }
}

impl AppConfig {
    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        ensure_config!(!self.database.url.is_empty(), "Database URL cannot be empty");
        ensure_config!(
            self.database.max_connections > 0,
            "Database max_connections must be greater than 0"
        );
        ensure_config!(!self.auth.jwt_secret.is_empty(), "auth.jwt_secret cannot be empty");
        ensure_config!(
            (1..=MAX_TOKEN_TTL_SECS).contains(&self.auth.token_ttl),
            "auth.token_ttl must be within 1..={} seconds, got {}",
            MAX_TOKEN_TTL_SECS,
            self.auth.token_ttl
        );
        ensure_config!(!self.oauth.client_id.is_empty(), "oauth.client_id cannot be empty");
        ensure_config!(
            !self.oauth.redirect_uri.is_empty(),
            "oauth.redirect_uri cannot be empty"
        );
        ensure_config!(
            (1..=10).contains(&self.oauth.request_timeout),
            "oauth.request_timeout must be within 1..=10 seconds, got {}",
            self.oauth.request_timeout
        );
        for (name, value) in [
            ("oauth.authorize_url", &self.oauth.authorize_url),
            ("oauth.token_url", &self.oauth.token_url),
            ("oauth.api_base_url", &self.oauth.api_base_url),
        ] {
            url::Url::parse(value).map_err(|e| {
                AppError::config_with_source(format!("{name} is not a valid URL: {value}"), e)
            })?;
        }
        ensure_config!(!self.frontend.url.is_empty(), "frontend.url cannot be empty");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "secret".to_string();
        config.oauth.client_id = "client".to_string();
        config.oauth.redirect_uri = "http://localhost:8080/api/auth/provider/callback".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.auth.token_ttl, 86_400);
        assert_eq!(config.oauth.scopes, vec!["user:email".to_string()]);
        assert_eq!(config.oauth.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_secret() {
        let mut config = valid_config();
        config.auth.jwt_secret.clear();
        assert!(matches!(config.validate(), Err(AppError::Config { .. })));
    }

    #[test]
    fn test_validate_bounds_token_ttl() {
        let mut config = valid_config();
        config.auth.token_ttl = 0;
        assert!(config.validate().is_err());
        config.auth.token_ttl = i64::MAX;
        assert!(matches!(config.validate(), Err(AppError::Config { .. })));
        config.auth.token_ttl = MAX_TOKEN_TTL_SECS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unbounded_timeout() {
        let mut config = valid_config();
        config.oauth.request_timeout = 0;
        assert!(config.validate().is_err());
        config.oauth.request_timeout = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_token_url() {
        let mut config = valid_config();
        config.oauth.token_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_masks_secrets() {
        let mut config = valid_config();
        config.oauth.client_secret = "top-secret-value".to_string();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("top-secret-value"));
        assert!(!rendered.contains("secret\""));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [auth]
            jwt_secret = "abc"

            [oauth]
            client_id = "id"
            redirect_uri = "http://localhost/cb"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.token_ttl, 86_400);
        assert!(config.validate().is_ok());
    }
}
