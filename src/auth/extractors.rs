//! Authentication extractors for axum.
//!
//! Three request-interception variants over the `access_token` cookie:
//! [`AuthedUser`] (strict, claims only), [`CurrentUser`] (strict plus a
//! store fetch), and [`MaybeUser`] (optional, never rejects).

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::request::Parts,
};
use tracing::{debug, warn};

use super::cookies::{get_cookie, ACCESS_COOKIE_NAME};
use super::models::User;
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated user identity decoded from the access token.
///
/// No store lookup: carries exactly what the token claims carry.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<AppState> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let token = match get_cookie(&parts.headers, ACCESS_COOKIE_NAME) {
            Some(t) => t,
            None => {
                warn!("authentication failed: missing access token cookie");
                return Err(ApiError::Unauthorized("no token provided".to_string()));
            }
        };

        let claims = app_state
            .tokens
            .verify_access(token)
            .map_err(|_| ApiError::Unauthorized("invalid token".to_string()))?;

        debug!(
            user_id = %claims.sub,
            email = %safe_email_log(&claims.email),
            "request authenticated from token claims"
        );

        Ok(AuthedUser {
            id: claims.sub,
            email: claims.email,
        })
    }
}

/// Authenticated user hydrated from the credential store.
///
/// Same token checks as [`AuthedUser`], then confirms the id still resolves
/// to a stored record.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<AppState> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let authed = AuthedUser::from_request_parts(parts, state).await?;

        let user = app_state.repo.get_by_id(&authed.id).await?;

        match user {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                warn!(user_id = %authed.id, "authentication failed: user not found in store");
                Err(ApiError::Unauthorized("user not found".to_string()))
            }
        }
    }
}

/// Optional authentication: attaches claims when a valid token is present,
/// proceeds silently otherwise. Never blocks the request.
#[derive(Debug, Clone, Default)]
pub struct MaybeUser(pub Option<AuthedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<AppState> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let identity = get_cookie(&parts.headers, ACCESS_COOKIE_NAME)
            .and_then(|token| app_state.tokens.verify_access(token).ok())
            .map(|claims| AuthedUser {
                id: claims.sub,
                email: claims.email,
            });

        Ok(MaybeUser(identity))
    }
}
