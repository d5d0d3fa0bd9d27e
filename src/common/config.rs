// Runtime configuration for token signing and OAuth providers

use std::env;

/// Default access token lifetime: 15 minutes.
pub const DEFAULT_ACCESS_EXPIRY_SECS: i64 = 15 * 60;

/// Default refresh token lifetime: 7 days.
pub const DEFAULT_REFRESH_EXPIRY_SECS: i64 = 7 * 24 * 60 * 60;

/// Credentials for one OAuth provider.
#[derive(Debug, Clone)]
pub struct OAuthProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

/// Process-wide auth configuration.
///
/// Built once at startup (explicitly or via [`AuthConfig::from_env`]) and
/// shared as `Arc<AuthConfig>`. There is deliberately no interior mutability:
/// token operations read secrets through this struct, and a late re-write
/// would be a race, so it is made impossible rather than documented away.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_expiry_secs: i64,
    pub refresh_expiry_secs: i64,
    pub production: bool,
    pub google: Option<OAuthProviderConfig>,
    pub microsoft: Option<OAuthProviderConfig>,
    pub linkedin: Option<OAuthProviderConfig>,
}

impl AuthConfig {
    /// Build a configuration from environment variables.
    ///
    /// Callers that want explicit configuration construct the struct directly
    /// (or patch the result of this function); env vars are only consulted
    /// here, so explicit values always win.
    pub fn from_env() -> Self {
        AuthConfig {
            access_secret: env::var("JWT_ACCESS_SECRET").unwrap_or_default(),
            refresh_secret: env::var("JWT_REFRESH_SECRET").unwrap_or_default(),
            access_expiry_secs: env_i64("JWT_ACCESS_EXPIRY_SECS", DEFAULT_ACCESS_EXPIRY_SECS),
            refresh_expiry_secs: env_i64("JWT_REFRESH_EXPIRY_SECS", DEFAULT_REFRESH_EXPIRY_SECS),
            production: env::var("PRODUCTION")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            google: provider_from_env("GOOGLE"),
            microsoft: provider_from_env("MICROSOFT"),
            linkedin: provider_from_env("LINKEDIN"),
        }
    }

    /// Configuration suitable for tests and local development.
    pub fn with_secrets(access_secret: &str, refresh_secret: &str) -> Self {
        AuthConfig {
            access_secret: access_secret.to_string(),
            refresh_secret: refresh_secret.to_string(),
            access_expiry_secs: DEFAULT_ACCESS_EXPIRY_SECS,
            refresh_expiry_secs: DEFAULT_REFRESH_EXPIRY_SECS,
            production: false,
            google: None,
            microsoft: None,
            linkedin: None,
        }
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}

/// Read one provider's credentials from `<PREFIX>_CLIENT_ID` /
/// `<PREFIX>_CLIENT_SECRET` / `<PREFIX>_CALLBACK_URL`. The provider is
/// disabled unless both client id and secret are present.
fn provider_from_env(prefix: &str) -> Option<OAuthProviderConfig> {
    let client_id = env::var(format!("{}_CLIENT_ID", prefix)).ok()?;
    let client_secret = env::var(format!("{}_CLIENT_SECRET", prefix)).ok()?;
    if client_id.is_empty() || client_secret.is_empty() {
        return None;
    }
    let callback_url = env::var(format!("{}_CALLBACK_URL", prefix)).unwrap_or_else(|_| {
        format!("/api/auth/{}/callback", prefix.to_lowercase())
    });
    Some(OAuthProviderConfig {
        client_id,
        client_secret,
        callback_url,
    })
}
