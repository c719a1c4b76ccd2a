//! 应用上下文（DI 容器）
//!
//! 统一持有跨模块共享的服务实例，便于在测试中注入替身实现。

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::{
    DatabaseIdentityStore, GithubProvider, IdentityProvider, IdentityProvisioner, IdentityStore,
    OAuthFlowCoordinator, TokenService,
};
use crate::config::AppConfig;
use crate::error::Result;
use crate::exercises::ExerciseCatalog;
use crate::submissions::SubmissionRecorder;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub tokens: TokenService,
    pub identity_store: Arc<dyn IdentityStore>,
    pub oauth: OAuthFlowCoordinator,
    pub exercises: ExerciseCatalog,
    pub submissions: SubmissionRecorder,
}

impl AppContext {
    /// 使用 GitHub 身份提供方构建上下文
    pub fn build(config: AppConfig, db: DatabaseConnection) -> Result<Self> {
        let provider = Arc::new(GithubProvider::new(&config.oauth)?);
        Self::with_provider(config, db, provider)
    }

    /// 使用指定的身份提供方构建上下文
    pub fn with_provider(
        config: AppConfig,
        db: DatabaseConnection,
        provider: Arc<dyn IdentityProvider>,
    ) -> Result<Self> {
        let tokens = TokenService::from_config(&config.auth)?;
        let identity_store: Arc<dyn IdentityStore> =
            Arc::new(DatabaseIdentityStore::new(db.clone()));
        let provisioner = IdentityProvisioner::new(Arc::clone(&identity_store));
        let oauth = OAuthFlowCoordinator::new(provider, provisioner, tokens.clone());

        Ok(Self {
            config: Arc::new(config),
            exercises: ExerciseCatalog::new(db.clone()),
            submissions: SubmissionRecorder::new(db.clone()),
            db,
            tokens,
            identity_store,
            oauth,
        })
    }
}
