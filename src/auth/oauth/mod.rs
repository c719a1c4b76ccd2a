//! # 第三方登录
//!
//! 身份提供方接口、GitHub 实现与授权码流程协调器

pub mod coordinator;
pub mod github;
pub mod provider;

pub use coordinator::{CompletedLogin, OAuthFlowCoordinator};
pub use github::GithubProvider;
pub use provider::IdentityProvider;
