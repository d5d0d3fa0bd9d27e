//! Cookie binding for the token pair.
//!
//! Both slots are http-only, strict same-site, root-scoped, secure in a
//! production posture, with max-age equal to the token's own expiry window.

use axum::http::{header, HeaderMap, HeaderName};

use super::models::TokenPair;
use crate::common::config::AuthConfig;

/// Cookie name for the access token.
pub const ACCESS_COOKIE_NAME: &str = "access_token";

/// Cookie name for the refresh token.
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

fn build_cookie(name: &str, value: &str, max_age_secs: i64, production: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        name, value, max_age_secs
    );
    if production {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Set-Cookie headers binding both tokens to the transport.
pub fn token_cookies(pair: &TokenPair, config: &AuthConfig) -> [(HeaderName, String); 2] {
    [
        (
            header::SET_COOKIE,
            build_cookie(
                ACCESS_COOKIE_NAME,
                &pair.access_token,
                config.access_expiry_secs,
                config.production,
            ),
        ),
        (
            header::SET_COOKIE,
            build_cookie(
                REFRESH_COOKIE_NAME,
                &pair.refresh_token,
                config.refresh_expiry_secs,
                config.production,
            ),
        ),
    ]
}

/// Set-Cookie header rebinding only the access slot (used after refresh).
pub fn access_cookie(token: &str, config: &AuthConfig) -> [(HeaderName, String); 1] {
    [(
        header::SET_COOKIE,
        build_cookie(
            ACCESS_COOKIE_NAME,
            token,
            config.access_expiry_secs,
            config.production,
        ),
    )]
}

/// Set-Cookie headers clearing both slots.
pub fn clear_cookies() -> [(HeaderName, String); 2] {
    [
        (
            header::SET_COOKIE,
            build_cookie(ACCESS_COOKIE_NAME, "", 0, false),
        ),
        (
            header::SET_COOKIE,
            build_cookie(REFRESH_COOKIE_NAME, "", 0, false),
        ),
    ]
}
