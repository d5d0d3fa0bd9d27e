//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User database model
///
/// The password hash is never serialized, so handlers can return the record
/// directly without leaking the credential.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    pub first: Option<String>,
    pub last: Option<String>,
    pub provider: Option<String>,
    pub provider_id: Option<String>,
    pub avatar: Option<String>,
    pub last_login: Option<String>,
    pub created_at: Option<String>,
}

/// Access token claims: user id and email, short-lived.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AccessClaims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Refresh token claims: user id only, longer-lived.
///
/// Deliberately carries no email; rotation re-fetches it from the store.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// An issued access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// POST /api/auth/login body
#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/auth/register body
#[derive(Deserialize, Debug)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first: Option<String>,
    pub last: Option<String>,
}

/// Query parameters accepted when starting an OAuth flow
#[derive(Deserialize, Debug, Default)]
pub struct OAuthStartQuery {
    #[serde(rename = "returnTo")]
    pub return_to: Option<String>,
}

/// Query parameters delivered by the provider callback
#[derive(Deserialize, Debug, Default)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}
