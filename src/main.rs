// src/main.rs
//
// Reference server: wires the auth plugin against the SQLite store with
// env-driven configuration.

use axum::{extract::Extension, routing::get, Json, Router};
use dotenv::dotenv;
use serde_json::json;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{env, net::SocketAddr, str::FromStr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use auth_plugin::auth::auth_routes;
use auth_plugin::auth::extractors::AuthedUser;
use auth_plugin::common::{migrations, AppState, AuthConfig};
use auth_plugin::repository::{BcryptScheme, SqliteAuthRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://auth.db".to_string());
    let config = AuthConfig::from_env();

    if config.access_secret.is_empty() || config.refresh_secret.is_empty() {
        tracing::warn!(
            "JWT_ACCESS_SECRET / JWT_REFRESH_SECRET not set - token operations will fail"
        );
    }

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    let connect_options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    migrations::run_migrations(&pool).await?;

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let repo = Arc::new(SqliteAuthRepository::new(pool, Arc::new(BcryptScheme)));
    let state = AppState::new(repo, config);

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .merge(auth_routes())
        // Example protected route: the strict extractor attaches decoded
        // claims without a store fetch
        .route("/api/profile", get(profile))
        .layer(Extension(state))
        .layer({
            let cors_origins = env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string());

            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn profile(authed: AuthedUser) -> Json<serde_json::Value> {
    Json(json!({
        "message": "Protected route",
        "user": { "id": authed.id, "email": authed.email },
    }))
}
