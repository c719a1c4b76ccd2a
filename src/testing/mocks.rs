//! # 测试替身
//!
//! 不访问网络的身份提供方实现

use async_trait::async_trait;

use crate::auth::IdentityProvider;
use crate::auth::types::ExternalProfile;
use crate::error::{AppError, Result};

/// 唯一被接受的授权码
pub const FAKE_VALID_CODE: &str = "validcode";
/// 换取到的访问令牌
pub const FAKE_ACCESS_TOKEN: &str = "fake-access-token";

/// 固定返回一个外部身份的提供方
#[derive(Debug, Clone)]
pub struct FakeIdentityProvider {
    pub profile: ExternalProfile,
    pub email: String,
    pub verified: bool,
}

impl FakeIdentityProvider {
    #[must_use]
    pub fn new(external_id: i64, login: &str, email: &str) -> Self {
        Self {
            profile: ExternalProfile {
                id: external_id,
                login: login.to_string(),
                avatar_url: format!("https://avatars.example.com/u/{external_id}"),
            },
            email: email.to_string(),
            verified: true,
        }
    }

    /// 邮箱列表中没有已验证的主邮箱
    #[must_use]
    pub fn without_verified_email(mut self) -> Self {
        self.verified = false;
        self
    }

    fn check_token(access_token: &str) -> Result<()> {
        if access_token == FAKE_ACCESS_TOKEN {
            Ok(())
        } else {
            Err(AppError::upstream("unknown access token"))
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn authorize_url(&self) -> String {
        format!(
            "https://provider.test/login/oauth/authorize?client_id={}&redirect_uri={}&scope=user%3Aemail",
            super::fixtures::TEST_CLIENT_ID,
            super::fixtures::TEST_REDIRECT_URI
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<String> {
        if code == FAKE_VALID_CODE {
            Ok(FAKE_ACCESS_TOKEN.to_string())
        } else {
            Err(AppError::upstream("bad_verification_code"))
        }
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ExternalProfile> {
        Self::check_token(access_token)?;
        Ok(self.profile.clone())
    }

    async fn fetch_verified_email(&self, access_token: &str) -> Result<String> {
        Self::check_token(access_token)?;
        if self.verified {
            Ok(self.email.clone())
        } else {
            Err(AppError::NoVerifiedEmail)
        }
    }
}
