//! Generic OAuth2 authorization-code client.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::OAuthProviderConfig;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Invalid provider configuration: {0}")]
    Config(String),

    #[error("OAuth provider request failed: {0}")]
    Provider(String),

    #[error("Invalid OAuth profile: {0}")]
    InvalidProfile(String),
}

/// Provider profile normalized onto the fields we keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthProfile {
    pub provider_account_id: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

fn string_field(profile: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match profile.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Maps a userinfo document (`OpenID` or GitHub style) onto an [`OAuthProfile`].
pub fn map_profile(profile: &Value) -> Result<OAuthProfile, OAuthError> {
    let provider_account_id = string_field(profile, &["sub", "id"])
        .ok_or_else(|| OAuthError::InvalidProfile("missing account id".to_string()))?;

    let email = string_field(profile, &["email"])
        .ok_or_else(|| OAuthError::InvalidProfile("missing email".to_string()))?;

    Ok(OAuthProfile {
        provider_account_id,
        email,
        name: string_field(profile, &["name", "login"]),
        image: string_field(profile, &["picture", "avatar_url", "image"]),
    })
}

pub struct OAuthClient {
    client: Client,
}

impl OAuthClient {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn authorize_url(
        provider: &OAuthProviderConfig,
        redirect_uri: &str,
        state: &str,
    ) -> Result<Url, OAuthError> {
        let mut url = Url::parse(&provider.authorize_url)
            .map_err(|e| OAuthError::Config(format!("{}: {e}", provider.name)))?;

        url.query_pairs_mut()
            .append_pair("client_id", &provider.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &provider.scopes.join(" "))
            .append_pair("state", state);

        Ok(url)
    }

    pub async fn exchange_code(
        &self,
        provider: &OAuthProviderConfig,
        code: &str,
        redirect_uri: &str,
    ) -> Result<String, OAuthError> {
        debug!(provider = %provider.name, "Exchanging OAuth authorization code");

        let response = self
            .client
            .post(&provider.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", provider.client_id.as_str()),
                ("client_secret", provider.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| OAuthError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::Provider(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::Provider(format!("invalid token response: {e}")))?;

        Ok(token.access_token)
    }

    pub async fn fetch_profile(
        &self,
        provider: &OAuthProviderConfig,
        access_token: &str,
    ) -> Result<OAuthProfile, OAuthError> {
        let response = self
            .client
            .get(&provider.userinfo_url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| OAuthError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::Provider(format!(
                "userinfo endpoint returned {}",
                response.status()
            )));
        }

        let profile: Value = response
            .json()
            .await
            .map_err(|e| OAuthError::Provider(format!("invalid userinfo response: {e}")))?;

        map_profile(&profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> OAuthProviderConfig {
        OAuthProviderConfig {
            name: "google".to_string(),
            client_id: "client-123".to_string(),
            client_secret: "secret".to_string(),
            authorize_url: "https://accounts.example.com/o/oauth2/auth".to_string(),
            token_url: "https://accounts.example.com/token".to_string(),
            userinfo_url: "https://accounts.example.com/userinfo".to_string(),
            scopes: vec!["openid".to_string(), "email".to_string()],
        }
    }

    #[test]
    fn test_map_openid_profile() {
        let profile = map_profile(&json!({
            "sub": "1098",
            "email": "ada@example.com",
            "name": "Ada",
            "picture": "https://img.example.com/ada.png"
        }))
        .unwrap();

        assert_eq!(profile.provider_account_id, "1098");
        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.name.as_deref(), Some("Ada"));
        assert_eq!(
            profile.image.as_deref(),
            Some("https://img.example.com/ada.png")
        );
    }

    #[test]
    fn test_map_github_style_profile() {
        let profile = map_profile(&json!({
            "id": 583_231,
            "login": "octocat",
            "email": "octo@example.com",
            "avatar_url": "https://avatars.example.com/u/583231"
        }))
        .unwrap();

        assert_eq!(profile.provider_account_id, "583231");
        assert_eq!(profile.name.as_deref(), Some("octocat"));
        assert!(profile.image.is_some());
    }

    #[test]
    fn test_map_profile_requires_email() {
        let err = map_profile(&json!({"sub": "1", "email": null})).unwrap_err();
        assert!(matches!(err, OAuthError::InvalidProfile(_)));

        let err = map_profile(&json!({"email": "a@b.c"})).unwrap_err();
        assert!(matches!(err, OAuthError::InvalidProfile(_)));
    }

    #[test]
    fn test_authorize_url() {
        let url = OAuthClient::authorize_url(
            &provider(),
            "http://localhost:3000/api/auth/oauth/google/callback",
            "state-xyz",
        )
        .unwrap();

        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["client_id"], "client-123");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["scope"], "openid email");
        assert_eq!(pairs["state"], "state-xyz");
        assert_eq!(
            pairs["redirect_uri"],
            "http://localhost:3000/api/auth/oauth/google/callback"
        );
    }

    #[test]
    fn test_authorize_url_rejects_bad_config() {
        let mut bad = provider();
        bad.authorize_url = "not a url".to_string();
        assert!(OAuthClient::authorize_url(&bad, "http://x", "s").is_err());
    }
}
