//! # 配置管理器
//!
//! 统一的配置加载接口：TOML 文件 + `EXERCISE_` 前缀的环境变量覆盖

use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::AppConfig;
use crate::config_error;
use crate::error::{AppError, Result};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "EXERCISE_";
/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "EXERCISE_API_CONFIG_PATH";

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    config: AppConfig,
    source: PathBuf,
    overrides_applied: usize,
}

impl ConfigManager {
    /// 按默认规则定位配置文件并加载
    pub fn new() -> Result<Self> {
        Self::from_file(Self::default_config_path())
    }

    /// 配置文件路径：优先使用环境变量，否则按 `RUST_ENV` 拼接
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        PathBuf::from(format!("config/config.{env}.toml"))
    }

    /// 从指定文件创建配置管理器，并应用进程环境变量覆盖
    pub fn from_file(config_path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_with_env(config_path, env::vars())
    }

    /// 从指定文件与给定的环境变量集合创建配置管理器
    pub fn from_file_with_env<I>(config_path: impl AsRef<Path>, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config_path = config_path.as_ref();
        let mut config = Self::load_config_file(config_path)?;
        let overrides_applied = Self::apply_env_overrides(&mut config, vars)?;
        config.validate()?;

        info!(
            path = %config_path.display(),
            overrides = overrides_applied,
            "配置管理器初始化完成"
        );

        Ok(Self {
            config,
            source: config_path.to_path_buf(),
            overrides_applied,
        })
    }

    /// 获取当前配置
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn into_config(self) -> AppConfig {
        self.config
    }

    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    #[must_use]
    pub const fn overrides_applied(&self) -> usize {
        self.overrides_applied
    }

    /// 加载配置文件
    fn load_config_file(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            return Err(config_error!("配置文件不存在: {}", path.display()));
        }

        let config_content = std::fs::read_to_string(path).map_err(|e| {
            AppError::config_with_source(format!("读取配置文件失败: {}", path.display()), e)
        })?;

        toml::from_str(&config_content).map_err(|e| {
            AppError::config_with_source(
                format!("TOML解析失败 - 配置文件: {}", path.display()),
                e,
            )
        })
    }

    /// 应用环境变量覆盖，返回生效的条目数
    ///
    /// 例如: `EXERCISE_AUTH_JWT_SECRET` -> `auth.jwt_secret`
    fn apply_env_overrides<I>(config: &mut AppConfig, vars: I) -> Result<usize>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut applied = 0;
        for (key, value) in vars {
            if key == CONFIG_PATH_ENV {
                continue;
            }
            let Some(config_key) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let path = config_key.to_lowercase();
            debug!(
                "应用环境变量覆盖: {} = {}",
                path,
                if is_sensitive(&path) { "***" } else { value.as_str() }
            );
            if Self::apply_override_to_config(config, &path, &value)? {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// 将单个覆盖项应用到配置对象，未知路径返回 `false`
    fn apply_override_to_config(config: &mut AppConfig, path: &str, value: &str) -> Result<bool> {
        match path {
            "server_host" => config.server.host = value.to_string(),
            "server_port" => config.server.port = parse_value(path, value)?,
            "server_cors_origins" => {
                config.server.cors_origins = value
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "server_request_timeout" => config.server.request_timeout = parse_value(path, value)?,
            "server_body_limit" => config.server.body_limit = parse_value(path, value)?,
            "server_shutdown_grace_period" => {
                config.server.shutdown_grace_period = parse_value(path, value)?;
            }
            "database_url" => config.database.url = value.to_string(),
            "database_max_connections" => {
                config.database.max_connections = parse_value(path, value)?;
            }
            "database_min_connections" => {
                config.database.min_connections = parse_value(path, value)?;
            }
            "auth_jwt_secret" => config.auth.jwt_secret = value.to_string(),
            "auth_token_ttl" => config.auth.token_ttl = parse_value(path, value)?,
            "oauth_client_id" => config.oauth.client_id = value.to_string(),
            "oauth_client_secret" => config.oauth.client_secret = value.to_string(),
            "oauth_redirect_uri" => config.oauth.redirect_uri = value.to_string(),
            "oauth_authorize_url" => config.oauth.authorize_url = value.to_string(),
            "oauth_token_url" => config.oauth.token_url = value.to_string(),
            "oauth_api_base_url" => config.oauth.api_base_url = value.to_string(),
            "oauth_request_timeout" => config.oauth.request_timeout = parse_value(path, value)?,
            "frontend_url" => config.frontend.url = value.to_string(),
            _ => {
                warn!("未知的配置路径，忽略环境变量覆盖: {}", path);
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn is_sensitive(path: &str) -> bool {
    path.contains("secret") || path.contains("password") || path.contains("key")
}

fn parse_value<T>(path: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|e| {
        AppError::config_with_source(format!("无效的配置值 {path}: {value}"), e)
    })
}
