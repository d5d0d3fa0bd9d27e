//! Authentication plugin for axum applications.
//!
//! Email/password and OAuth (Google, Microsoft, LinkedIn) login issuing a
//! short-lived access token and a longer-lived refresh token as HTTP
//! cookies, backed by the pluggable [`repository::AuthRepository`] trait
//! with a reference SQLite implementation.
//!
//! Mount [`auth_routes`] into a host router and inject an
//! [`common::AppState`] built from your repository and an
//! [`common::AuthConfig`]:
//!
//! ```no_run
//! use std::sync::Arc;
//! use auth_plugin::{auth_router, AppState, AuthConfig};
//! use auth_plugin::repository::{BcryptScheme, SqliteAuthRepository};
//!
//! # async fn run(pool: sqlx::SqlitePool) {
//! let repo = Arc::new(SqliteAuthRepository::new(pool, Arc::new(BcryptScheme)));
//! let state = AppState::new(repo, AuthConfig::from_env());
//! let app = auth_router(state);
//! # let _ = app;
//! # }
//! ```

pub mod auth;
pub mod common;
pub mod repository;

use axum::{extract::Extension, Router};

pub use auth::{auth_routes, AuthError, AuthedUser, CurrentUser, MaybeUser, TokenService, User};
pub use common::{AppState, AuthConfig};
pub use repository::AuthRepository;

/// The auth routes with the application state layered in, ready to merge
/// into a host router.
pub fn auth_router(state: AppState) -> Router {
    auth_routes().layer(Extension(state))
}
