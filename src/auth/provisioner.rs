//! # 账户开通
//!
//! 按外部身份查找账户，不存在则创建并绑定。并发首次登录时以数据库唯一约束
//! 为准：冲突的一方回滚自己的写入，再按外部 ID 重新查找胜出方创建的账户。

use std::sync::Arc;

use crate::auth::identity_store::{Account, IdentityStore};
use crate::auth::types::NewIdentity;
use crate::error::{AppError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, lerror, linfo, lwarn};

/// 账户开通服务
#[derive(Clone)]
pub struct IdentityProvisioner {
    store: Arc<dyn IdentityStore>,
}

impl IdentityProvisioner {
    #[must_use]
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// 查找或创建外部身份对应的账户
    ///
    /// 已有账户直接返回，不刷新资料字段。
    pub async fn resolve_or_create(&self, identity: &NewIdentity) -> Result<Account> {
        let request_id = format!("ext-{}", identity.external_id);

        if let Some(account) = self
            .store
            .find_by_external_id(identity.external_id)
            .await
            .map_err(|e| AppError::internal_with_source("lookup by external id failed", e))?
        {
            ldebug!(
                request_id,
                LogStage::Db,
                LogComponent::Identity,
                "resolve_existing",
                &format!("外部身份已绑定账户 {}", account.id)
            );
            return Ok(account);
        }

        match self.store.create_linked_account(identity).await {
            Ok(account) => {
                linfo!(
                    request_id,
                    LogStage::Db,
                    LogComponent::Identity,
                    "account_created",
                    &format!("新建账户 {} 并绑定外部身份", account.id)
                );
                Ok(account)
            }
            Err(err) if err.is_conflict() => self.recover_from_conflict(&request_id, identity, err).await,
            Err(err) => Err(AppError::internal_with_source("account provisioning failed", err)),
        }
    }

    /// 冲突后重新按外部 ID 查找
    async fn recover_from_conflict(
        &self,
        request_id: &str,
        identity: &NewIdentity,
        conflict: AppError,
    ) -> Result<Account> {
        lwarn!(
            request_id,
            LogStage::Db,
            LogComponent::Identity,
            "provision_conflict",
            &format!("开通时发生唯一约束冲突，重新查找: {conflict}")
        );

        let existing = self
            .store
            .find_by_external_id(identity.external_id)
            .await
            .map_err(|e| AppError::internal_with_source("lookup after conflict failed", e))?;

        if let Some(account) = existing {
            return Ok(account);
        }

        // 冲突来自邮箱：该邮箱已属于另一个未绑定此外部身份的账户
        let email_owner = match self.store.find_by_email(&identity.email).await {
            Ok(Some(account)) => format!("账户 {}", account.id),
            Ok(None) => "无".to_string(),
            Err(e) => format!("查询失败 ({e})"),
        };
        lerror!(
            request_id,
            LogStage::Db,
            LogComponent::Identity,
            "provision_unresolved",
            &format!("冲突后仍未找到绑定账户，邮箱归属: {email_owner}")
        );
        Err(AppError::internal_with_source(
            "external identity could not be resolved after conflict",
            conflict,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity_store::MockIdentityStore;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn identity() -> NewIdentity {
        NewIdentity {
            external_id: 42,
            username: "octo".to_string(),
            email: "octo@example.com".to_string(),
            avatar_url: "https://avatars.example.com/42".to_string(),
        }
    }

    fn account(id: i32) -> Account {
        let now = Utc::now().naive_utc();
        Account {
            id,
            username: "octo".to_string(),
            email: "octo@example.com".to_string(),
            avatar_url: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_existing_account_is_returned_without_writes() {
        let mut store = MockIdentityStore::new();
        store
            .expect_find_by_external_id()
            .with(eq(42))
            .times(1)
            .returning(|_| Ok(Some(account(9))));
        store.expect_create_linked_account().never();

        let provisioner = IdentityProvisioner::new(Arc::new(store));
        assert_eq!(provisioner.resolve_or_create(&identity()).await.unwrap().id, 9);
    }

    #[tokio::test]
    async fn test_new_identity_creates_account() {
        let mut store = MockIdentityStore::new();
        store.expect_find_by_external_id().returning(|_| Ok(None));
        store
            .expect_create_linked_account()
            .times(1)
            .returning(|_| Ok(account(1)));

        let provisioner = IdentityProvisioner::new(Arc::new(store));
        assert_eq!(provisioner.resolve_or_create(&identity()).await.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_lost_race_returns_winner() {
        let mut store = MockIdentityStore::new();
        let mut seq = mockall::Sequence::new();
        store
            .expect_find_by_external_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        store
            .expect_create_linked_account()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::conflict("external_id already linked")));
        store
            .expect_find_by_external_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(account(77))));

        let provisioner = IdentityProvisioner::new(Arc::new(store));
        assert_eq!(provisioner.resolve_or_create(&identity()).await.unwrap().id, 77);
    }

    #[tokio::test]
    async fn test_unresolved_conflict_is_internal() {
        let mut store = MockIdentityStore::new();
        store.expect_find_by_external_id().returning(|_| Ok(None));
        store
            .expect_create_linked_account()
            .returning(|_| Err(AppError::conflict("email taken")));
        store
            .expect_find_by_email()
            .returning(|_| Ok(Some(account(3))));

        let provisioner = IdentityProvisioner::new(Arc::new(store));
        let err = provisioner.resolve_or_create(&identity()).await.unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_unresolved_conflict_survives_email_lookup_failure() {
        let mut store = MockIdentityStore::new();
        store.expect_find_by_external_id().returning(|_| Ok(None));
        store
            .expect_create_linked_account()
            .returning(|_| Err(AppError::conflict("email taken")));
        store
            .expect_find_by_email()
            .times(1)
            .returning(|_| Err(AppError::database("connection reset")));

        let provisioner = IdentityProvisioner::new(Arc::new(store));
        let err = provisioner.resolve_or_create(&identity()).await.unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
        assert!(err.error_chain().contains("email taken"));
    }

    #[tokio::test]
    async fn test_store_failure_is_internal() {
        let mut store = MockIdentityStore::new();
        store
            .expect_find_by_external_id()
            .returning(|_| Err(AppError::database("connection reset")));

        let provisioner = IdentityProvisioner::new(Arc::new(store));
        let err = provisioner.resolve_or_create(&identity()).await.unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }
}
