//! # 测试数据 Fixtures
//!
//! 提供测试用的配置与数据构建器

use chrono::Utc;
use entity::{accounts, exercises};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, Set};

use crate::config::AppConfig;

/// 测试用 JWT 密钥
pub const TEST_JWT_SECRET: &str = "test-jwt-secret";
/// 测试用 OAuth client id
pub const TEST_CLIENT_ID: &str = "test-client-id";
/// 测试用回调地址
pub const TEST_REDIRECT_URI: &str = "http://localhost:8080/api/auth/provider/callback";
/// 测试用前端地址
pub const TEST_FRONTEND_URL: &str = "http://localhost:5173";

/// 可直接通过校验的测试配置
#[must_use]
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = "sqlite::memory:".to_string();
    config.auth.jwt_secret = TEST_JWT_SECRET.to_string();
    config.oauth.client_id = TEST_CLIENT_ID.to_string();
    config.oauth.client_secret = "test-client-secret".to_string();
    config.oauth.redirect_uri = TEST_REDIRECT_URI.to_string();
    config.frontend.url = TEST_FRONTEND_URL.to_string();
    config
}

/// 账户测试数据构建器
pub struct AccountFixture {
    pub username: String,
    pub email: String,
    pub avatar_url: String,
}

impl AccountFixture {
    /// 创建账户 fixture，邮箱默认为 `{username}@example.com`
    #[must_use]
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            avatar_url: format!("https://avatars.example.com/{username}"),
        }
    }

    /// 设置邮箱
    #[must_use]
    pub fn email(mut self, email: &str) -> Self {
        self.email = email.to_string();
        self
    }

    /// 转换为 Sea-ORM ActiveModel
    #[must_use]
    pub fn to_active_model(self) -> accounts::ActiveModel {
        let now = Utc::now().naive_utc();
        accounts::ActiveModel {
            username: Set(self.username),
            email: Set(self.email),
            avatar_url: Set(self.avatar_url),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }

    /// 写入数据库
    pub async fn insert(self, db: &DatabaseConnection) -> Result<accounts::Model, DbErr> {
        self.to_active_model().insert(db).await
    }
}

/// 练习题测试数据构建器
pub struct ExerciseFixture {
    pub slug: String,
    pub category: String,
    pub title: String,
    pub is_active: bool,
}

impl ExerciseFixture {
    /// 创建练习题 fixture，默认分类为 `basics` 且处于启用状态
    #[must_use]
    pub fn new(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            category: "basics".to_string(),
            title: slug.replace('-', " "),
            is_active: true,
        }
    }

    /// 设置分类
    #[must_use]
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    /// 设置为停用状态
    #[must_use]
    pub const fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// 转换为 Sea-ORM ActiveModel
    #[must_use]
    pub fn to_active_model(self) -> exercises::ActiveModel {
        let now = Utc::now().naive_utc();
        exercises::ActiveModel {
            description: Set(format!("Solve {}", self.title)),
            template: Set("def solve():\n    pass\n".to_string()),
            test_code: Set("assert solve() is None\n".to_string()),
            hints: Set(String::new()),
            slug: Set(self.slug),
            category: Set(self.category),
            title: Set(self.title),
            is_active: Set(self.is_active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }

    /// 写入数据库
    pub async fn insert(self, db: &DatabaseConnection) -> Result<exercises::Model, DbErr> {
        self.to_active_model().insert(db).await
    }
}
