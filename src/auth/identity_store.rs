//! # 身份存储
//!
//! 外部身份与内部账户的持久化映射。唯一性由数据库约束保证：
//! `accounts.email` 与 `external_identity_links.external_id`。

use async_trait::async_trait;
use chrono::Utc;
use entity::{accounts, external_identity_links};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    QueryFilter, QuerySelect, RelationTrait, Set, TransactionTrait,
};

use crate::auth::types::NewIdentity;
use crate::error::Result;

/// 内部账户
pub type Account = accounts::Model;

/// 身份存储接口
///
/// 查询类操作以 `Ok(None)` 表示不存在；写入类操作在唯一约束冲突时返回
/// [`crate::error::AppError::Conflict`]。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    async fn find_by_external_id(&self, external_id: i64) -> Result<Option<Account>>;

    async fn find_account_by_id(&self, id: i32) -> Result<Option<Account>>;

    /// 创建账户，邮箱已存在时返回 `Conflict`
    async fn create_account(&self, username: &str, email: &str, avatar_url: &str)
    -> Result<Account>;

    /// 绑定外部 ID，外部 ID 已被绑定时返回 `Conflict`
    async fn link_external_id(&self, account_id: i32, external_id: i64) -> Result<()>;

    /// 在同一事务中创建账户并绑定外部 ID
    ///
    /// 任一步冲突都会整体回滚，不会留下没有绑定的孤儿账户。
    async fn create_linked_account(&self, identity: &NewIdentity) -> Result<Account>;
}

/// 基于 Sea-ORM 的身份存储实现
#[derive(Debug, Clone)]
pub struct DatabaseIdentityStore {
    db: DatabaseConnection,
}

impl DatabaseIdentityStore {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn insert_account<C: ConnectionTrait>(
        conn: &C,
        username: &str,
        email: &str,
        avatar_url: &str,
    ) -> Result<Account> {
        let now = Utc::now().naive_utc();
        let account = accounts::ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            avatar_url: Set(avatar_url.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(account.insert(conn).await?)
    }

    async fn insert_link<C: ConnectionTrait>(
        conn: &C,
        account_id: i32,
        external_id: i64,
    ) -> Result<()> {
        let link = external_identity_links::ActiveModel {
            account_id: Set(account_id),
            external_id: Set(external_id),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };
        link.insert(conn).await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for DatabaseIdentityStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    async fn find_by_external_id(&self, external_id: i64) -> Result<Option<Account>> {
        Ok(accounts::Entity::find()
            .join(
                JoinType::InnerJoin,
                accounts::Relation::ExternalIdentityLink.def(),
            )
            .filter(external_identity_links::Column::ExternalId.eq(external_id))
            .one(&self.db)
            .await?)
    }

    async fn find_account_by_id(&self, id: i32) -> Result<Option<Account>> {
        Ok(accounts::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn create_account(
        &self,
        username: &str,
        email: &str,
        avatar_url: &str,
    ) -> Result<Account> {
        Self::insert_account(&self.db, username, email, avatar_url).await
    }

    async fn link_external_id(&self, account_id: i32, external_id: i64) -> Result<()> {
        Self::insert_link(&self.db, account_id, external_id).await
    }

    async fn create_linked_account(&self, identity: &NewIdentity) -> Result<Account> {
        let txn = self.db.begin().await?;
        let account = Self::insert_account(
            &txn,
            &identity.username,
            &identity.email,
            &identity.avatar_url,
        )
        .await?;
        Self::insert_link(&txn, account.id, identity.external_id).await?;
        txn.commit().await?;
        Ok(account)
    }
}
