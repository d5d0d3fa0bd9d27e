//! # Credential Store contract
//!
//! The [`AuthRepository`] trait is the entire interface the auth surface
//! requires from persistence. Any storage technology implementing it is
//! substitutable; the reference implementation against SQLite lives in
//! [`sqlite`].

pub mod hashing;
pub mod sqlite;


use async_trait::async_trait;
use chrono::Utc;

use crate::auth::error::AuthError;
use crate::auth::models::User;

pub use hashing::{BcryptScheme, LegacySha256Scheme, PasswordScheme};
pub use sqlite::SqliteAuthRepository;

/// Input for creating a user, from local registration or a provider profile.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub password: Option<String>,
    pub first: Option<String>,
    pub last: Option<String>,
    pub provider: Option<String>,
    pub provider_id: Option<String>,
    pub avatar: Option<String>,
}

/// Partial update applied by [`AuthRepository::update`].
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub last_login: Option<String>,
    pub avatar: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.last_login.is_none() && self.avatar.is_none()
    }
}

/// Canonical profile shape produced by the provider bridge.
///
/// Every field the store treats as optional is genuinely optional here;
/// providers that omit a name part or avatar project `None`, never a
/// sentinel.
#[derive(Debug, Clone)]
pub struct OAuthProfile {
    pub provider: String,
    pub id: String,
    pub email: String,
    pub firstname: Option<String>,
    pub surname: Option<String>,
    pub avatar: Option<String>,
}

/// Capability set the routing and middleware layers depend on.
///
/// Implementations own their connection pool and hashing scheme; every
/// method is an independently awaitable unit of work whose failures
/// propagate as [`AuthError::Store`] untouched.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    async fn find_by_oauth(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>, AuthError>;

    /// Create a user. A supplied password is stored only as a one-way hash.
    async fn create(&self, data: NewUser) -> Result<User, AuthError>;

    /// Apply the supplied fields only. Returns `None` without touching the
    /// store when no recognized field is present.
    async fn update(&self, id: &str, updates: UserUpdate) -> Result<Option<User>, AuthError>;

    /// Verify a submitted password against the stored credential.
    ///
    /// Fails with [`AuthError::InvalidCredentials`] when the user does not
    /// exist, has no password (OAuth-only account), or the hash comparison
    /// fails — all three collapse to the same error.
    async fn verify_password(&self, email: &str, password: &str) -> Result<User, AuthError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<User>, AuthError>;

    /// Idempotent upsert keyed by (provider, provider_id): looks up by
    /// external identity, creates from the profile when absent, otherwise
    /// refreshes last_login and returns the existing record.
    ///
    /// This is the sole entry point used by the provider bridge.
    async fn find_or_create(&self, profile: OAuthProfile) -> Result<User, AuthError> {
        if let Some(user) = self.find_by_oauth(&profile.provider, &profile.id).await? {
            let refreshed = self
                .update(
                    &user.id,
                    UserUpdate {
                        last_login: Some(Utc::now().to_rfc3339()),
                        avatar: None,
                    },
                )
                .await?;
            return Ok(refreshed.unwrap_or(user));
        }

        self.create(NewUser {
            email: profile.email,
            password: None,
            first: profile.firstname,
            last: profile.surname,
            provider: Some(profile.provider),
            provider_id: Some(profile.id),
            avatar: profile.avatar,
        })
        .await
    }
}
