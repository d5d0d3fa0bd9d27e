//! Auth error taxonomy

use thiserror::Error;

/// Failures produced by the token service, repository contract, and
/// provider bridge.
///
/// `InvalidToken` and `InvalidCredentials` deliberately carry no detail:
/// signature tamper is never distinguished from expiry, and an unknown email
/// is never distinguished from a wrong password (account enumeration).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("auth not configured: {0}")]
    Configuration(String),

    #[error("invalid token")]
    InvalidToken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("store error: {0}")]
    Store(String),
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        AuthError::Store(e.to_string())
    }
}
