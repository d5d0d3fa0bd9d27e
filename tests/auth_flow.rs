//! End-to-end tests for the auth routes against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::Extension,
    http::{header, Request, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use auth_plugin::auth::auth_routes;
use auth_plugin::auth::extractors::{CurrentUser, MaybeUser};
use auth_plugin::common::config::OAuthProviderConfig;
use auth_plugin::common::{migrations, AppState, AuthConfig};
use auth_plugin::repository::{BcryptScheme, SqliteAuthRepository};

async fn setup_app(config: AuthConfig) -> (Router, AppState) {
    let pool = SqlitePoolOptions::new()
        .connect("sqlite::memory:")
        .await
        .unwrap();
    migrations::run_migrations(&pool).await.unwrap();

    let repo = Arc::new(SqliteAuthRepository::new(pool, Arc::new(BcryptScheme)));
    let state = AppState::new(repo, config);

    let app = auth_routes()
        .route("/api/optional", get(optional_route))
        .route("/api/hydrated", get(hydrated_route))
        .layer(Extension(state.clone()));

    (app, state)
}

async fn optional_route(MaybeUser(identity): MaybeUser) -> Json<Value> {
    Json(json!({ "authenticated": identity.is_some() }))
}

async fn hydrated_route(CurrentUser(user): CurrentUser) -> Json<Value> {
    Json(json!({ "user": user }))
}

fn test_config() -> AuthConfig {
    AuthConfig::with_secrets("test-access-secret", "test-refresh-secret")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

/// All Set-Cookie header values on a response.
fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// The `name=value` pair at the front of a Set-Cookie line.
fn cookie_pair(set_cookie: &str) -> &str {
    set_cookie.split(';').next().unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_register_me_logout_round_trip() {
    let (app, _) = setup_app(test_config()).await;

    // Register
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({ "email": "a@x.com", "password": "secret123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    let access = cookies
        .iter()
        .find(|c| c.starts_with("access_token="))
        .unwrap()
        .clone();
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=")));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], "a@x.com");
    assert!(
        body["user"].get("password").is_none(),
        "password must be stripped from responses"
    );
    let user_id = body["user"]["id"].as_str().unwrap().to_string();

    // /me with the access cookie
    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/auth/me", cookie_pair(&access)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["id"], user_id.as_str());
    assert_eq!(body["user"]["email"], "a@x.com");

    // Logout clears both slots
    let response = app
        .clone()
        .oneshot(post_json("/api/auth/logout", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = set_cookies(&response);
    assert!(cleared.iter().all(|c| c.contains("Max-Age=0")));

    // /me without a cookie is rejected
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "no token provided");
}

#[tokio::test]
async fn test_login_success_and_enumeration_safety() {
    let (app, _) = setup_app(test_config()).await;

    app.clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({ "email": "a@x.com", "password": "secret123" }),
        ))
        .await
        .unwrap();

    // Correct credentials
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "a@x.com", "password": "secret123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(set_cookies(&response).len(), 2);

    // Wrong password and unknown email produce the same error shape
    let wrong = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "a@x.com", "password": "wrong" }),
        ))
        .await
        .unwrap();
    let unknown = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "ghost@x.com", "password": "wrong" }),
        ))
        .await
        .unwrap();

    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong).await, body_json(unknown).await);
}

#[tokio::test]
async fn test_login_missing_fields_is_400() {
    let (app, _) = setup_app(test_config()).await;

    let response = app
        .clone()
        .oneshot(post_json("/api/auth/login", json!({ "email": "a@x.com" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_registration_is_400() {
    let (app, _) = setup_app(test_config()).await;

    let body = json!({ "email": "a@x.com", "password": "secret123" });
    let first = app
        .clone()
        .oneshot(post_json("/api/auth/register", body.clone()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .clone()
        .oneshot(post_json("/api/auth/register", body))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_mints_working_access_cookie() {
    let (app, _) = setup_app(test_config()).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({ "email": "a@x.com", "password": "secret123" }),
        ))
        .await
        .unwrap();
    let cookies = set_cookies(&response);
    let refresh = cookies
        .iter()
        .find(|c| c.starts_with("refresh_token="))
        .unwrap()
        .clone();

    // Refresh with only the refresh cookie present
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/refresh")
                .header(header::COOKIE, cookie_pair(&refresh))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let refreshed = set_cookies(&response);
    assert_eq!(refreshed.len(), 1, "refresh rebinds only the access slot");
    let access = refreshed[0].clone();
    assert!(access.starts_with("access_token="));

    // The rotated access token authenticates /me
    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/auth/me", cookie_pair(&access)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_without_cookie_is_401() {
    let (app, _) = setup_app(test_config()).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/refresh")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_rejects_access_token_in_refresh_slot() {
    let (app, _) = setup_app(test_config()).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({ "email": "a@x.com", "password": "secret123" }),
        ))
        .await
        .unwrap();
    let access_value = set_cookies(&response)
        .iter()
        .find(|c| c.starts_with("access_token="))
        .map(|c| cookie_pair(c).trim_start_matches("access_token=").to_string())
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/refresh")
                .header(
                    header::COOKIE,
                    format!("refresh_token={}", access_value),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_strict_rejects_fuzzed_tokens() {
    let (app, _) = setup_app(test_config()).await;

    for bad in [
        "access_token=",
        "access_token=garbage",
        "access_token=a.b.c",
        "access_token=eyJhbGciOiJIUzI1NiJ9.e30.invalid",
    ] {
        let response = app
            .clone()
            .oneshot(get_with_cookie("/api/auth/me", bad))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "expected 401 for cookie {:?}",
            bad
        );
        let body = body_json(response).await;
        assert_eq!(body["error"], "invalid token");
    }
}

#[tokio::test]
async fn test_optional_auth_never_rejects() {
    let (app, _) = setup_app(test_config()).await;

    // No cookie
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/optional")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["authenticated"], false);

    // Garbage cookie
    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/optional", "access_token=garbage"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["authenticated"], false);

    // Valid cookie
    let register = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({ "email": "a@x.com", "password": "secret123" }),
        ))
        .await
        .unwrap();
    let access = set_cookies(&register)
        .iter()
        .find(|c| c.starts_with("access_token="))
        .map(|c| cookie_pair(c).to_string())
        .unwrap();

    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/optional", &access))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["authenticated"], true);
}

#[tokio::test]
async fn test_hydrating_extractor_returns_full_record() {
    let (app, _) = setup_app(test_config()).await;

    let register = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({ "email": "a@x.com", "password": "secret123", "first": "Ada" }),
        ))
        .await
        .unwrap();
    let access = set_cookies(&register)
        .iter()
        .find(|c| c.starts_with("access_token="))
        .map(|c| cookie_pair(c).to_string())
        .unwrap();

    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/hydrated", &access))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["first"], "Ada");
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_hydrating_extractor_rejects_vanished_user() {
    // Two apps share signing secrets but not a store: a token minted by the
    // first is cryptographically valid at the second, yet its user id
    // resolves to nothing there
    let (app_a, _) = setup_app(test_config()).await;
    let (app_b, _) = setup_app(test_config()).await;

    let register = app_a
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({ "email": "a@x.com", "password": "secret123" }),
        ))
        .await
        .unwrap();
    let access = set_cookies(&register)
        .iter()
        .find(|c| c.starts_with("access_token="))
        .map(|c| cookie_pair(c).to_string())
        .unwrap();

    let response = app_b
        .clone()
        .oneshot(get_with_cookie("/api/hydrated", &access))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "user not found");

    // The strict /me route reports the same situation as 404 instead
    let response = app_b
        .clone()
        .oneshot(get_with_cookie("/api/auth/me", &access))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_oauth_start_redirects_with_state() {
    let mut config = test_config();
    config.google = Some(OAuthProviderConfig {
        client_id: "client-1".to_string(),
        client_secret: "shh".to_string(),
        callback_url: "http://localhost:8080/api/auth/google/callback".to_string(),
    });
    let (app, _) = setup_app(config).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/google?returnTo=%2Fdashboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
    assert!(location.contains("client_id=client-1"));
    assert!(location.contains("state="));
}

#[tokio::test]
async fn test_oauth_start_unknown_provider_is_404() {
    let (app, _) = setup_app(test_config()).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/github")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_oauth_start_unconfigured_provider_is_503() {
    let (app, _) = setup_app(test_config()).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/google")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_oauth_callback_with_unknown_state_is_401() {
    let mut config = test_config();
    config.google = Some(OAuthProviderConfig {
        client_id: "client-1".to_string(),
        client_secret: "shh".to_string(),
        callback_url: "http://localhost:8080/api/auth/google/callback".to_string(),
    });
    let (app, _) = setup_app(config).await;

    // Never started a handshake: rejected before any provider traffic
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/google/callback?code=abc&state=forged")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "invalid state");
}

#[tokio::test]
async fn test_oauth_callback_provider_error_clears_stash() {
    let mut config = test_config();
    config.google = Some(OAuthProviderConfig {
        client_id: "client-1".to_string(),
        client_secret: "shh".to_string(),
        callback_url: "http://localhost:8080/api/auth/google/callback".to_string(),
    });
    let (app, state) = setup_app(config).await;

    let nonce = state.handshakes.begin(Some("/dashboard".to_string()));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/api/auth/google/callback?error=access_denied&state={}",
                    nonce
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The stash was consumed even though the callback failed
    assert!(state.handshakes.take(&nonce).is_none());
}
