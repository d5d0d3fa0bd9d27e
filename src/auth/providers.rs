//! Identity-provider bridge: Google, Microsoft, and LinkedIn.
//!
//! Each provider contributes its endpoints, scopes, and a projection from
//! its native profile payload into the canonical [`OAuthProfile`] handed to
//! the credential store. Projections treat every optional sub-field as
//! absent-tolerant; only a missing id or email is an error.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error};

use super::error::AuthError;
use crate::common::config::{AuthConfig, OAuthProviderConfig};
use crate::repository::OAuthProfile;

/// Supported external identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    Microsoft,
    LinkedIn,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Microsoft => "microsoft",
            Provider::LinkedIn => "linkedin",
        }
    }

    /// Credentials for this provider, if configured.
    pub fn config<'a>(&self, config: &'a AuthConfig) -> Option<&'a OAuthProviderConfig> {
        match self {
            Provider::Google => config.google.as_ref(),
            Provider::Microsoft => config.microsoft.as_ref(),
            Provider::LinkedIn => config.linkedin.as_ref(),
        }
    }

    fn authorize_endpoint(&self) -> &'static str {
        match self {
            Provider::Google => "https://accounts.google.com/o/oauth2/v2/auth",
            Provider::Microsoft => {
                "https://login.microsoftonline.com/common/oauth2/v2.0/authorize"
            }
            Provider::LinkedIn => "https://www.linkedin.com/oauth/v2/authorization",
        }
    }

    fn token_endpoint(&self) -> &'static str {
        match self {
            Provider::Google => "https://oauth2.googleapis.com/token",
            Provider::Microsoft => "https://login.microsoftonline.com/common/oauth2/v2.0/token",
            Provider::LinkedIn => "https://www.linkedin.com/oauth/v2/accessToken",
        }
    }

    fn userinfo_endpoint(&self) -> &'static str {
        match self {
            Provider::Google => "https://www.googleapis.com/oauth2/v2/userinfo",
            Provider::Microsoft => "https://graph.microsoft.com/v1.0/me",
            Provider::LinkedIn => "https://api.linkedin.com/v2/userinfo",
        }
    }

    fn scopes(&self) -> &'static str {
        match self {
            Provider::Google => "openid email profile",
            Provider::Microsoft => "openid email profile User.Read",
            Provider::LinkedIn => "openid email profile",
        }
    }

    /// Build the provider authorization URL for the consent redirect.
    pub fn authorize_url(&self, cfg: &OAuthProviderConfig, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            self.authorize_endpoint(),
            urlencoding::encode(&cfg.client_id),
            urlencoding::encode(&cfg.callback_url),
            urlencoding::encode(self.scopes()),
            urlencoding::encode(state),
        )
    }

    /// Project a provider-native profile payload into the canonical shape.
    ///
    /// Field locations differ per provider; anything optional that the
    /// provider omitted becomes `None`.
    pub fn project(&self, payload: &Value) -> Result<OAuthProfile, AuthError> {
        let str_field = |keys: &[&str]| -> Option<String> {
            keys.iter()
                .find_map(|k| payload.get(*k).and_then(|v| v.as_str()))
                .map(str::to_string)
        };

        let (id, email, firstname, surname, avatar) = match self {
            Provider::Google => (
                str_field(&["id", "sub"]),
                str_field(&["email"]),
                str_field(&["given_name"]),
                str_field(&["family_name"]),
                str_field(&["picture"]),
            ),
            // Graph /me: service accounts can lack `mail`; fall back to the
            // principal name. No photo in the profile payload.
            Provider::Microsoft => (
                str_field(&["id"]),
                str_field(&["mail", "userPrincipalName"]),
                str_field(&["givenName"]),
                str_field(&["surname"]),
                None,
            ),
            Provider::LinkedIn => (
                str_field(&["sub"]),
                str_field(&["email"]),
                str_field(&["given_name"]),
                str_field(&["family_name"]),
                str_field(&["picture"]),
            ),
        };

        let id = id.ok_or_else(|| {
            AuthError::Provider(format!("{} profile missing provider id", self.as_str()))
        })?;
        let email = email.ok_or_else(|| {
            AuthError::Provider(format!("{} profile missing email", self.as_str()))
        })?;

        Ok(OAuthProfile {
            provider: self.as_str().to_string(),
            id,
            email,
            firstname,
            surname,
            avatar,
        })
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Provider::Google),
            "microsoft" => Ok(Provider::Microsoft),
            "linkedin" => Ok(Provider::LinkedIn),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchange an authorization code for a provider access token.
pub async fn exchange_code(
    http: &Client,
    provider: Provider,
    cfg: &OAuthProviderConfig,
    code: &str,
) -> Result<String, AuthError> {
    let params = [
        ("code", code),
        ("client_id", &cfg.client_id),
        ("client_secret", &cfg.client_secret),
        ("redirect_uri", &cfg.callback_url),
        ("grant_type", "authorization_code"),
    ];

    debug!(provider = %provider, "exchanging authorization code for tokens");

    let response = http
        .post(provider.token_endpoint())
        .form(&params)
        .send()
        .await
        .map_err(|e| AuthError::Provider(format!("token exchange request: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        error!(provider = %provider, status = %status, error = %error_text, "token exchange failed");
        return Err(AuthError::InvalidCredentials);
    }

    let token_response = response
        .json::<TokenResponse>()
        .await
        .map_err(|e| AuthError::Provider(format!("token exchange response: {}", e)))?;

    Ok(token_response.access_token)
}

/// Fetch and project the provider profile for an exchanged access token.
pub async fn fetch_profile(
    http: &Client,
    provider: Provider,
    access_token: &str,
) -> Result<OAuthProfile, AuthError> {
    let response = http
        .get(provider.userinfo_endpoint())
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| AuthError::Provider(format!("userinfo request: {}", e)))?;

    if !response.status().is_success() {
        return Err(AuthError::Provider(format!(
            "{} userinfo returned {}",
            provider,
            response.status()
        )));
    }

    let payload = response
        .json::<Value>()
        .await
        .map_err(|e| AuthError::Provider(format!("userinfo response: {}", e)))?;

    provider.project(&payload)
}
