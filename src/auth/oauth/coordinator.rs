//! # 授权码登录流程
//!
//! 换取访问令牌 -> 获取资料 -> 获取已验证主邮箱 -> 开通账户 -> 签发会话令牌。
//! 任一步失败即中止，唯一的写入发生在开通步骤中。

use std::sync::Arc;

use super::provider::IdentityProvider;
use crate::auth::identity_store::Account;
use crate::auth::jwt::TokenService;
use crate::auth::provisioner::IdentityProvisioner;
use crate::auth::types::NewIdentity;
use crate::error::Result;
use crate::logging::{LogComponent, LogStage};
use crate::{ensure_validation, ldebug, linfo};

/// 登录成功的结果
#[derive(Debug, Clone)]
pub struct CompletedLogin {
    pub token: String,
    pub account: Account,
}

/// 授权码登录流程协调器
#[derive(Clone)]
pub struct OAuthFlowCoordinator {
    provider: Arc<dyn IdentityProvider>,
    provisioner: IdentityProvisioner,
    tokens: TokenService,
}

impl OAuthFlowCoordinator {
    #[must_use]
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        provisioner: IdentityProvisioner,
        tokens: TokenService,
    ) -> Self {
        Self {
            provider,
            provisioner,
            tokens,
        }
    }

    /// 提供方授权页面地址
    #[must_use]
    pub fn begin_login(&self) -> String {
        self.provider.authorize_url()
    }

    /// 用回调中的授权码完成登录并签发会话令牌
    pub async fn complete_login(&self, code: &str) -> Result<CompletedLogin> {
        ensure_validation!(!code.is_empty(), "code not found");
        let provider = self.provider.name();

        let access_token = self.provider.exchange_code(code).await?;
        let profile = self.provider.fetch_profile(&access_token).await?;
        ldebug!(
            provider,
            LogStage::ExternalApi,
            LogComponent::OAuth,
            "fetch_profile",
            &format!("获取到外部资料: id={} login={}", profile.id, profile.login)
        );

        let email = self.provider.fetch_verified_email(&access_token).await?;

        let account = self
            .provisioner
            .resolve_or_create(&NewIdentity {
                external_id: profile.id,
                username: profile.login,
                email,
                avatar_url: profile.avatar_url,
            })
            .await?;

        let token = self.tokens.issue(account.id)?;
        linfo!(
            provider,
            LogStage::Authentication,
            LogComponent::OAuth,
            "login_completed",
            &format!("账户 {} 登录成功", account.id)
        );

        Ok(CompletedLogin { token, account })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity_store::DatabaseIdentityStore;
    use crate::error::AppError;
    use crate::testing::helpers::create_test_db;
    use crate::testing::mocks::FakeIdentityProvider;
    use chrono::Duration;

    async fn coordinator(provider: FakeIdentityProvider) -> OAuthFlowCoordinator {
        let db = create_test_db().await.unwrap();
        let store = Arc::new(DatabaseIdentityStore::new(db));
        OAuthFlowCoordinator::new(
            Arc::new(provider),
            IdentityProvisioner::new(store),
            TokenService::new("coordinator-secret", Duration::hours(1)).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_complete_login_issues_token_for_account() {
        let flow = coordinator(FakeIdentityProvider::new(1001, "octo", "octo@example.com")).await;
        let login = flow.complete_login("validcode").await.unwrap();
        let tokens = TokenService::new("coordinator-secret", Duration::hours(1)).unwrap();
        assert_eq!(tokens.verify(&login.token).unwrap(), login.account.id);
        assert_eq!(login.account.email, "octo@example.com");
    }

    #[tokio::test]
    async fn test_repeat_login_reuses_account() {
        let flow = coordinator(FakeIdentityProvider::new(1001, "octo", "octo@example.com")).await;
        let first = flow.complete_login("validcode").await.unwrap();
        let second = flow.complete_login("validcode").await.unwrap();
        assert_eq!(first.account.id, second.account.id);
    }

    #[tokio::test]
    async fn test_no_verified_email_aborts() {
        let flow = coordinator(FakeIdentityProvider::new(1001, "octo", "octo@example.com").without_verified_email()).await;
        assert!(matches!(
            flow.complete_login("validcode").await,
            Err(AppError::NoVerifiedEmail)
        ));
    }

    #[tokio::test]
    async fn test_rejected_code_is_upstream() {
        let flow = coordinator(FakeIdentityProvider::new(1001, "octo", "octo@example.com")).await;
        assert!(matches!(
            flow.complete_login("wrong").await,
            Err(AppError::Upstream { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_code() {
        let flow = coordinator(FakeIdentityProvider::new(1, "a", "a@example.com")).await;
        assert!(matches!(
            flow.complete_login("").await,
            Err(AppError::Validation { .. })
        ));
    }
}
