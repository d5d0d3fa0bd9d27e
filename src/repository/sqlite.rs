//! Reference SQLite implementation of the credential store.

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{debug, warn};

use super::{AuthRepository, NewUser, PasswordScheme, UserUpdate};
use crate::auth::error::AuthError;
use crate::auth::models::User;
use crate::common::helpers::safe_email_log;
use crate::common::id_generator::generate_user_id;

/// Credential store backed by a SQLite pool, with an injected hashing scheme.
#[derive(Clone)]
pub struct SqliteAuthRepository {
    pool: SqlitePool,
    scheme: Arc<dyn PasswordScheme>,
}

impl SqliteAuthRepository {
    pub fn new(pool: SqlitePool, scheme: Arc<dyn PasswordScheme>) -> Self {
        SqliteAuthRepository { pool, scheme }
    }
}

#[async_trait::async_trait]
impl AuthRepository for SqliteAuthRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_oauth(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE provider = ? AND provider_id = ?",
        )
        .bind(provider)
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, data: NewUser) -> Result<User, AuthError> {
        let id = generate_user_id();

        // Hash the password if provided; OAuth-provisioned users have none
        let password = match &data.password {
            Some(plain) => Some(self.scheme.hash(plain)?),
            None => None,
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password, first, last, provider, provider_id, avatar)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&data.email)
        .bind(password.as_deref())
        .bind(data.first.as_deref())
        .bind(data.last.as_deref())
        .bind(data.provider.as_deref())
        .bind(data.provider_id.as_deref())
        .bind(data.avatar.as_deref())
        .execute(&self.pool)
        .await?;

        debug!(
            user_id = %id,
            email = %safe_email_log(&data.email),
            "created user"
        );

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(&id)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update(&self, id: &str, updates: UserUpdate) -> Result<Option<User>, AuthError> {
        if updates.is_empty() {
            return Ok(None);
        }

        let mut set_clauses = Vec::new();
        if updates.last_login.is_some() {
            set_clauses.push("last_login = ?");
        }
        if updates.avatar.is_some() {
            set_clauses.push("avatar = ?");
        }

        let sql = format!("UPDATE users SET {} WHERE id = ?", set_clauses.join(", "));
        let mut query = sqlx::query(&sql);
        if let Some(last_login) = &updates.last_login {
            query = query.bind(last_login);
        }
        if let Some(avatar) = &updates.avatar {
            query = query.bind(avatar);
        }
        query.bind(id).execute(&self.pool).await?;

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn verify_password(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self.find_by_email(email).await?;

        // Unknown email, OAuth-only account, and wrong password all collapse
        // to the same error so callers can't enumerate accounts
        let Some(user) = user else {
            warn!(email = %safe_email_log(email), "login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        let Some(stored) = &user.password else {
            warn!(user_id = %user.id, "login failed: no password credential");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.scheme.verify(password, stored)? {
            warn!(user_id = %user.id, "login failed: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
