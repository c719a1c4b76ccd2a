//! # 身份提供方接口

use async_trait::async_trait;

use crate::auth::types::ExternalProfile;
use crate::error::Result;

/// 第三方身份提供方
///
/// 授权码流程中与提供方交互的全部能力。实现方负责为每次外部调用设置超时。
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// 提供方名称，用于日志
    fn name(&self) -> &'static str;

    /// 构造授权页面地址，携带 client id、回调地址与 scope
    fn authorize_url(&self) -> String;

    /// 用授权码换取访问令牌
    async fn exchange_code(&self, code: &str) -> Result<String>;

    /// 获取用户资料
    async fn fetch_profile(&self, access_token: &str) -> Result<ExternalProfile>;

    /// 获取同时为 primary 且已验证的邮箱
    ///
    /// 没有符合条件的邮箱时返回 `NoVerifiedEmail`。
    async fn fetch_verified_email(&self, access_token: &str) -> Result<String>;
}
