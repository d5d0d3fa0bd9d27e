//! Authentication handlers

use axum::{
    extract::{Extension, Json, Path, Query},
    response::{AppendHeaders, IntoResponse, Redirect},
};
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use super::cookies::{access_cookie, clear_cookies, get_cookie, token_cookies, REFRESH_COOKIE_NAME};
use super::models::{LoginRequest, OAuthCallbackQuery, OAuthStartQuery, RegisterRequest};
use super::providers::{self, Provider};
use crate::common::{safe_email_log, ApiError, AppState};
use crate::repository::{NewUser, UserUpdate};

/// Redirect target used after an OAuth callback when no returnTo was stashed.
const FALLBACK_REDIRECT: &str = "/auth/callback";

/// POST /api/auth/login
///
/// Verifies an email/password pair against the credential store and binds a
/// fresh token pair to cookies.
pub async fn login(
    Extension(state): Extension<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    };

    let user = state.repo.verify_password(&email, &password).await?;

    let _ = state
        .repo
        .update(
            &user.id,
            UserUpdate {
                last_login: Some(Utc::now().to_rfc3339()),
                avatar: None,
            },
        )
        .await?;

    let tokens = state.tokens.issue(&user)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "login successful"
    );

    Ok((
        AppendHeaders(token_cookies(&tokens, &state.config)),
        Json(json!({ "success": true, "user": user })),
    ))
}

/// POST /api/auth/register
///
/// Creates a local-credential user. Store failures (duplicate email
/// included) surface as 400, matching the login/registration contract.
pub async fn register(
    Extension(state): Extension<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    };

    let user = state
        .repo
        .create(NewUser {
            email,
            password: Some(password),
            first: body.first,
            last: body.last,
            ..Default::default()
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "registration failed");
            ApiError::BadRequest(e.to_string())
        })?;

    let tokens = state.tokens.issue(&user)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "user registered"
    );

    Ok((
        AppendHeaders(token_cookies(&tokens, &state.config)),
        Json(json!({ "success": true, "user": user })),
    ))
}

/// POST /api/auth/refresh
///
/// Verifies the refresh cookie and rebinds a fresh access cookie. The
/// refresh token itself is never rotated.
pub async fn refresh(
    Extension(state): Extension<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let Some(refresh_token) = get_cookie(&headers, REFRESH_COOKIE_NAME) else {
        return Err(ApiError::Unauthorized(
            "no refresh token provided".to_string(),
        ));
    };

    let access_token = state
        .tokens
        .rotate_access(refresh_token, state.repo.as_ref())
        .await
        .map_err(|e| {
            warn!(error = %e, "refresh failed");
            // A deleted user and a bad token are indistinguishable here
            ApiError::Unauthorized("invalid refresh token".to_string())
        })?;

    Ok((
        AppendHeaders(access_cookie(&access_token, &state.config)),
        Json(json!({ "success": true })),
    ))
}

/// GET /api/auth/me
///
/// Returns the current user. 404 when the id encoded in the token no longer
/// resolves to a stored record.
pub async fn me(
    Extension(state): Extension<AppState>,
    authed: super::extractors::AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.repo.get_by_id(&authed.id).await?;

    match user {
        Some(user) => Ok(Json(json!({ "user": user }))),
        None => Err(ApiError::NotFound("user not found".to_string())),
    }
}

/// POST /api/auth/logout
///
/// Clears both token cookies unconditionally. Tokens are self-contained, so
/// there is nothing to revoke server-side.
pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders(clear_cookies()),
        Json(json!({ "success": true })),
    )
}

/// GET /api/auth/:provider
///
/// Begins the provider redirect, stashing the caller-supplied returnTo in
/// per-handshake state keyed by the OAuth state nonce.
pub async fn oauth_start(
    Extension(state): Extension<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthStartQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let provider: Provider = provider
        .parse()
        .map_err(|_| ApiError::NotFound("unknown provider".to_string()))?;

    let Some(cfg) = provider.config(&state.config) else {
        return Err(ApiError::ServiceUnavailable(format!(
            "{} login is not configured",
            provider
        )));
    };

    let nonce = state.handshakes.begin(query.return_to);
    let url = provider.authorize_url(cfg, &nonce);

    info!(provider = %provider, "starting OAuth flow");

    Ok(Redirect::to(&url))
}

/// GET /api/auth/:provider/callback
///
/// Exchanges the code, projects the provider profile, runs find-or-create,
/// binds tokens, and redirects to the stashed returnTo or the fallback. The
/// stash is consumed before anything can fail, so it is cleared regardless
/// of the outcome.
pub async fn oauth_callback(
    Extension(state): Extension<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let provider: Provider = provider
        .parse()
        .map_err(|_| ApiError::NotFound("unknown provider".to_string()))?;

    let Some(cfg) = provider.config(&state.config) else {
        return Err(ApiError::ServiceUnavailable(format!(
            "{} login is not configured",
            provider
        )));
    };

    // Read-once: consume the handshake before touching the provider
    let pending = query.state.as_deref().and_then(|s| state.handshakes.take(s));

    if let Some(error) = query.error {
        warn!(provider = %provider, error = %error, "provider returned an error");
        return Err(ApiError::Unauthorized(format!(
            "provider error: {}",
            error
        )));
    }

    let Some(code) = query.code else {
        return Err(ApiError::BadRequest(
            "no authorization code provided".to_string(),
        ));
    };

    let Some(pending) = pending else {
        warn!(provider = %provider, "callback with unknown or expired state");
        return Err(ApiError::Unauthorized("invalid state".to_string()));
    };

    let provider_token = providers::exchange_code(&state.http, provider, cfg, &code).await?;
    let profile = providers::fetch_profile(&state.http, provider, &provider_token).await?;

    let user = state.repo.find_or_create(profile).await?;
    let tokens = state.tokens.issue(&user)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        provider = %provider,
        "OAuth login successful"
    );

    let redirect_url = pending
        .return_to
        .unwrap_or_else(|| FALLBACK_REDIRECT.to_string());

    Ok((
        AppendHeaders(token_cookies(&tokens, &state.config)),
        Redirect::to(&redirect_url),
    ))
}
