//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/login` - Email/password login
/// - `POST /api/auth/register` - Local registration
/// - `POST /api/auth/refresh` - Mint a new access token from the refresh cookie
/// - `GET /api/auth/me` - Current user
/// - `POST /api/auth/logout` - Clear token cookies
/// - `GET /api/auth/:provider` - Begin an OAuth flow (google/microsoft/linkedin)
/// - `GET /api/auth/:provider/callback` - Provider callback
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/refresh", post(handlers::refresh))
        .route("/api/auth/me", get(handlers::me))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/:provider", get(handlers::oauth_start))
        .route("/api/auth/:provider/callback", get(handlers::oauth_callback))
}
