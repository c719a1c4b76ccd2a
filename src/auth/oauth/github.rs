//! # GitHub 身份提供方
//!
//! 授权地址与授权码交换通过 `oauth2` 完成，用户资料与邮箱列表通过共享的
//! `reqwest::Client` 获取。所有端点地址来自配置。

use async_trait::async_trait;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, RedirectUrl, Scope, TokenResponse, TokenUrl, basic::BasicClient,
};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use serde::de::DeserializeOwned;

use super::provider::IdentityProvider;
use crate::auth::types::{ExternalProfile, ProviderEmail, select_verified_primary};
use crate::config::OAuthConfig;
use crate::error::{AppError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, lwarn, upstream_error};

type GithubOAuthClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// GitHub 兼容的身份提供方
#[derive(Debug, Clone)]
pub struct GithubProvider {
    oauth: GithubOAuthClient,
    http: reqwest::Client,
    api_base_url: String,
    scopes: Vec<String>,
}

impl GithubProvider {
    /// 根据配置构建提供方
    pub fn new(config: &OAuthConfig) -> Result<Self> {
        let oauth = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.clone()))
            .set_auth_uri(AuthUrl::new(config.authorize_url.clone()).map_err(|e| {
                AppError::config_with_source(format!("无效的授权URL: {}", config.authorize_url), e)
            })?)
            .set_token_uri(TokenUrl::new(config.token_url.clone()).map_err(|e| {
                AppError::config_with_source(format!("无效的令牌URL: {}", config.token_url), e)
            })?)
            .set_redirect_uri(RedirectUrl::new(config.redirect_uri.clone()).map_err(|e| {
                AppError::config_with_source(
                    format!("无效的重定向URI: {}", config.redirect_uri),
                    e,
                )
            })?)
            .set_auth_type(AuthType::RequestBody);

        // 不跟随重定向
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AppError::config_with_source("HTTP客户端构建失败", e))?;

        Ok(Self {
            oauth,
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            scopes: config.scopes.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, access_token: &str) -> Result<T> {
        let url = format!("{}{}", self.api_base_url, path);
        let bearer = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .map_err(|e| AppError::upstream_with_source("访问令牌包含非法字符", e))?;

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, bearer)
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await
            .map_err(|e| AppError::upstream_with_source(format!("请求失败: GET {path}"), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(upstream_error!("GET {} 返回状态 {}", path, status));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::upstream_with_source(format!("响应解析失败: GET {path}"), e))
    }
}

#[async_trait]
impl IdentityProvider for GithubProvider {
    fn name(&self) -> &'static str {
        "github"
    }

    fn authorize_url(&self) -> String {
        let (url, _state) = self
            .oauth
            .authorize_url(CsrfToken::new_random)
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .url();
        url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<String> {
        let token = self
            .oauth
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| {
                lwarn!(
                    "oauth",
                    LogStage::ExternalApi,
                    LogComponent::OAuth,
                    "exchange_code",
                    &format!("授权码交换失败: {e}")
                );
                upstream_error!("token exchange failed: {}", e)
            })?;

        ldebug!(
            "oauth",
            LogStage::ExternalApi,
            LogComponent::OAuth,
            "exchange_code",
            "授权码交换成功"
        );
        Ok(token.access_token().secret().clone())
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ExternalProfile> {
        self.get_json("/user", access_token).await
    }

    async fn fetch_verified_email(&self, access_token: &str) -> Result<String> {
        let emails: Vec<ProviderEmail> = self.get_json("/user/emails", access_token).await?;
        select_verified_primary(&emails)
            .map(str::to_string)
            .ok_or(AppError::NoVerifiedEmail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::test_config;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider_for(server: &MockServer) -> GithubProvider {
        let mut config = test_config().oauth;
        config.token_url = format!("{}/login/oauth/access_token", server.uri());
        config.api_base_url = server.uri();
        GithubProvider::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_authorize_url_contains_client_and_scope() {
        let server = MockServer::start().await;
        let provider = provider_for(&server).await;
        let url = url::Url::parse(&provider.authorize_url()).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert!(pairs.contains(&("client_id".to_string(), "test-client-id".to_string())));
        assert!(pairs.contains(&("scope".to_string(), "user:email".to_string())));
        assert!(pairs.iter().any(|(k, _)| k == "redirect_uri"));
        assert!(pairs.iter().any(|(k, _)| k == "state"));
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "gho_test",
                "token_type": "bearer",
                "scope": "user:email"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        assert_eq!(provider.exchange_code("abc").await.unwrap(), "gho_test");
    }

    #[tokio::test]
    async fn test_exchange_code_error_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "bad_verification_code"
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let err = provider.exchange_code("expired").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_fetch_profile_sends_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer gho_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 583231,
                "login": "octocat",
                "avatar_url": "https://avatars.example.com/u/583231"
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let profile = provider.fetch_profile("gho_test").await.unwrap();
        assert_eq!(profile.id, 583_231);
        assert_eq!(profile.login, "octocat");
    }

    #[tokio::test]
    async fn test_fetch_profile_non_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        assert!(matches!(
            provider.fetch_profile("revoked").await,
            Err(AppError::Upstream { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_verified_email() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/emails"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "email": "old@example.com", "primary": false, "verified": true },
                { "email": "octo@example.com", "primary": true, "verified": true }
            ])))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        assert_eq!(
            provider.fetch_verified_email("gho_test").await.unwrap(),
            "octo@example.com"
        );
    }

    #[tokio::test]
    async fn test_fetch_verified_email_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/emails"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "email": "octo@example.com", "primary": true, "verified": false }
            ])))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        assert!(matches!(
            provider.fetch_verified_email("gho_test").await,
            Err(AppError::NoVerifiedEmail)
        ));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(std::time::Duration::from_secs(3))
                    .set_body_json(serde_json::json!({ "id": 1, "login": "slow" })),
            )
            .mount(&server)
            .await;

        let mut config = test_config().oauth;
        config.api_base_url = server.uri();
        config.request_timeout = 1;
        let provider = GithubProvider::new(&config).unwrap();
        assert!(matches!(
            provider.fetch_profile("gho_test").await,
            Err(AppError::Upstream { .. })
        ));
    }
}
