//! Token issuance, verification, and rotation.
//!
//! Access and refresh tokens are signed with distinct secrets and carry
//! independently configured expiries. Refresh only ever mints a new access
//! token; the refresh token itself is never rotated.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use tracing::warn;

use super::error::AuthError;
use super::models::{AccessClaims, RefreshClaims, TokenPair, User};
use crate::common::config::AuthConfig;
use crate::common::helpers::safe_token_log;
use crate::repository::AuthRepository;

/// Issues and verifies the access/refresh token pair.
///
/// Pure over configuration plus claims: no locks, no I/O, except
/// [`TokenService::rotate_access`] which consults the credential store to
/// recover the email claim.
#[derive(Clone)]
pub struct TokenService {
    config: Arc<AuthConfig>,
}

impl TokenService {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        TokenService { config }
    }

    fn access_secret(&self) -> Result<&[u8], AuthError> {
        if self.config.access_secret.is_empty() {
            return Err(AuthError::Configuration(
                "access token secret is not set".to_string(),
            ));
        }
        Ok(self.config.access_secret.as_bytes())
    }

    fn refresh_secret(&self) -> Result<&[u8], AuthError> {
        if self.config.refresh_secret.is_empty() {
            return Err(AuthError::Configuration(
                "refresh token secret is not set".to_string(),
            ));
        }
        Ok(self.config.refresh_secret.as_bytes())
    }

    /// Sign an access token for a user id/email.
    pub fn issue_access(&self, user_id: &str, email: &str) -> Result<String, AuthError> {
        let secret = self.access_secret()?;
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + self.config.access_expiry_secs,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .map_err(|e| AuthError::Configuration(format!("jwt encode: {}", e)))
    }

    /// Sign a refresh token. Carries only the user id.
    pub fn issue_refresh(&self, user_id: &str) -> Result<String, AuthError> {
        let secret = self.refresh_secret()?;
        let now = Utc::now().timestamp();
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.config.refresh_expiry_secs,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .map_err(|e| AuthError::Configuration(format!("jwt encode: {}", e)))
    }

    /// Sign both tokens for a user.
    pub fn issue(&self, user: &User) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue_access(&user.id, &user.email)?,
            refresh_token: self.issue_refresh(&user.id)?,
        })
    }

    /// Verify an access token. Signature mismatch, malformed payload, and
    /// expiry all collapse to `InvalidToken`.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let secret = self.access_secret()?;
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<AccessClaims>(token, &DecodingKey::from_secret(secret), &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                warn!(error = %e, token = %safe_token_log(token), "access token validation failed");
                AuthError::InvalidToken
            })
    }

    /// Verify a refresh token.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        let secret = self.refresh_secret()?;
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<RefreshClaims>(token, &DecodingKey::from_secret(secret), &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                warn!(error = %e, token = %safe_token_log(token), "refresh token validation failed");
                AuthError::InvalidToken
            })
    }

    /// Verify a refresh token and mint a fresh access token for its user.
    ///
    /// Refresh claims carry no email, so the user record is re-fetched from
    /// the store; a since-deleted user fails with `NotFound`.
    pub async fn rotate_access(
        &self,
        refresh_token: &str,
        repo: &dyn AuthRepository,
    ) -> Result<String, AuthError> {
        let claims = self.verify_refresh(refresh_token)?;
        let user = repo
            .get_by_id(&claims.sub)
            .await?
            .ok_or_else(|| AuthError::NotFound("user not found".to_string()))?;
        self.issue_access(&user.id, &user.email)
    }
}
