//! # 身份开户测试
//!
//! 同一外部身份无论登录多少次、是否并发，都只对应一个账户

use std::sync::Arc;

use entity::{accounts, external_identity_links};
use exercise_api::auth::{DatabaseIdentityStore, IdentityProvisioner, IdentityStore, NewIdentity};
use exercise_api::testing::{AccountFixture, create_test_db, init_test_env};
use pretty_assertions::assert_eq;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

fn identity(external_id: i64, login: &str) -> NewIdentity {
    NewIdentity {
        external_id,
        username: login.to_string(),
        email: format!("{login}@example.com"),
        avatar_url: format!("https://avatars.example.com/u/{external_id}"),
    }
}

async fn setup() -> (DatabaseConnection, IdentityProvisioner) {
    init_test_env();
    let db = create_test_db().await.unwrap();
    let store: Arc<dyn IdentityStore> = Arc::new(DatabaseIdentityStore::new(db.clone()));
    (db, IdentityProvisioner::new(store))
}

async fn counts(db: &DatabaseConnection) -> (u64, u64) {
    let accounts = accounts::Entity::find().count(db).await.unwrap();
    let links = external_identity_links::Entity::find().count(db).await.unwrap();
    (accounts, links)
}

#[tokio::test]
async fn test_first_login_creates_linked_account() {
    let (db, provisioner) = setup().await;

    let account = provisioner.resolve_or_create(&identity(1001, "octocat")).await.unwrap();

    assert_eq!(account.username, "octocat");
    assert_eq!(account.email, "octocat@example.com");
    assert_eq!(counts(&db).await, (1, 1));
}

#[tokio::test]
async fn test_repeated_login_is_idempotent() {
    let (db, provisioner) = setup().await;
    let new_identity = identity(1001, "octocat");

    let first = provisioner.resolve_or_create(&new_identity).await.unwrap();
    let second = provisioner.resolve_or_create(&new_identity).await.unwrap();
    let third = provisioner.resolve_or_create(&new_identity).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.id, third.id);
    assert_eq!(counts(&db).await, (1, 1));
}

#[tokio::test]
async fn test_repeated_login_keeps_stored_profile() {
    let (_db, provisioner) = setup().await;
    let first = provisioner.resolve_or_create(&identity(1001, "octocat")).await.unwrap();

    let mut renamed = identity(1001, "octocat");
    renamed.username = "octo-renamed".to_string();
    let again = provisioner.resolve_or_create(&renamed).await.unwrap();

    assert_eq!(again.id, first.id);
    assert_eq!(again.username, "octocat");
}

#[tokio::test]
async fn test_distinct_identities_get_distinct_accounts() {
    let (db, provisioner) = setup().await;

    let a = provisioner.resolve_or_create(&identity(1, "alice")).await.unwrap();
    let b = provisioner.resolve_or_create(&identity(2, "bob")).await.unwrap();

    assert_ne!(a.id, b.id);
    assert_eq!(counts(&db).await, (2, 2));
}

#[tokio::test]
async fn test_concurrent_first_logins_create_one_account() {
    let (db, provisioner) = setup().await;
    let new_identity = identity(1001, "octocat");

    let (left, right) = futures::join!(
        provisioner.resolve_or_create(&new_identity),
        provisioner.resolve_or_create(&new_identity),
    );

    let left = left.unwrap();
    let right = right.unwrap();
    assert_eq!(left.id, right.id);
    assert_eq!(counts(&db).await, (1, 1));
}

#[tokio::test]
async fn test_email_owned_by_unlinked_account_is_not_hijacked() {
    let (db, provisioner) = setup().await;
    AccountFixture::new("octocat").insert(&db).await.unwrap();

    let result = provisioner.resolve_or_create(&identity(1001, "octocat")).await;

    assert!(result.is_err());
    assert_eq!(counts(&db).await, (1, 0));
}
