//! JWT session token service
//!
//! Issues and verifies HS256 session tokens carrying an account id and expiry

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::auth::types::SessionClaims;
use crate::config::AuthConfig;
use crate::error::{AppError, Result};
use crate::{config_error, internal_error};

/// Session token service
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service from a symmetric secret and lifetime
    pub fn new(secret: &str, ttl: Duration) -> Result<Self> {
        if secret.is_empty() {
            return Err(internal_error!("JWT secret is not configured"));
        }
        if ttl <= Duration::zero() {
            return Err(internal_error!("token lifetime must be positive"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256];
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let ttl = Duration::try_seconds(config.token_ttl).ok_or_else(|| {
            config_error!("auth.token_ttl is out of range: {}", config.token_ttl)
        })?;
        Self::new(&config.jwt_secret, ttl)
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `account_id` expiring after the configured lifetime
    pub fn issue(&self, account_id: i32) -> Result<String> {
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| internal_error!("token expiry overflows"))?;
        self.issue_expiring_at(account_id, expires_at)
    }

    /// Issue a token with an explicit expiry
    pub fn issue_expiring_at(&self, account_id: i32, expires_at: DateTime<Utc>) -> Result<String> {
        let claims = SessionClaims {
            sub: account_id.to_string(),
            exp: expires_at.timestamp(),
            iat: Utc::now().timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal_with_source("Token generation failed", e))
    }

    /// Verify signature, algorithm and expiry, then return the account id
    pub fn verify(&self, token: &str) -> Result<i32> {
        if token.is_empty() {
            return Err(AppError::invalid_token("empty token"));
        }

        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?;

        // jsonwebtoken treats exp == now as still valid
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(AppError::invalid_token("token expired"));
        }

        data.claims
            .sub
            .parse::<i32>()
            .map_err(|e| AppError::invalid_token_with_source("subject is not numeric", e))
    }
}
