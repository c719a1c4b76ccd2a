//! # 认证模块
//!
//! 会话令牌、身份存储、账户开通与第三方登录

pub mod identity_store;
pub mod jwt;
pub mod oauth;
pub mod provisioner;
pub mod types;
pub mod utils;

pub use identity_store::{Account, DatabaseIdentityStore, IdentityStore};
pub use jwt::TokenService;
pub use oauth::{GithubProvider, IdentityProvider, OAuthFlowCoordinator};
pub use provisioner::IdentityProvisioner;
pub use types::{AccountInfo, ExternalProfile, NewIdentity, SessionClaims};
pub use utils::AuthUtils;
