//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Access/refresh token issuance, verification, and rotation
//! - Cookie binding for the token pair
//! - Request extractors for protected routes (strict, hydrating, optional)
//! - OAuth provider bridge (Google, Microsoft, LinkedIn)

pub mod cookies;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod providers;
pub mod routes;
pub mod session;
pub mod tokens;


pub use error::AuthError;
pub use extractors::{AuthedUser, CurrentUser, MaybeUser};
pub use models::{TokenPair, User};
pub use routes::auth_routes;
pub use tokens::TokenService;
