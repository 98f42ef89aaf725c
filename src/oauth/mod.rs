//! OAuth bridge to GitHub, LinkedIn and Twitter.
//!
//! Exchanges authorization codes with the server-held client credentials and
//! proxies profile lookups. Tokens are handed back to the caller, never stored.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::config::{OAuthConfig, OAuthProviderConfig};

/// GitHub rejects API calls without a user agent.
const USER_AGENT: &str = concat!("basecard-backend/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Github,
    Linkedin,
    Twitter,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Github => "github",
            Provider::Linkedin => "linkedin",
            Provider::Twitter => "twitter",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "github" => Some(Provider::Github),
            "linkedin" => Some(Provider::Linkedin),
            "twitter" => Some(Provider::Twitter),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("Authorization code is required")]
    MissingCode,

    #[error("Code verifier is required")]
    MissingCodeVerifier,

    #[error("{0} OAuth is not configured")]
    NotConfigured(Provider),

    #[error("Provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Provider returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Request body of `POST /api/auth/{provider}/token`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    /// PKCE verifier, required by the Twitter public client flow
    #[serde(default)]
    pub code_verifier: Option<String>,
}

/// Provider status and raw JSON body, forwarded as-is.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

/// HTTP client bound to the configured providers.
#[derive(Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    config: OAuthConfig,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig) -> Result<Self, OAuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http, config })
    }

    fn provider_config(&self, provider: Provider) -> &OAuthProviderConfig {
        match provider {
            Provider::Github => &self.config.github,
            Provider::Linkedin => &self.config.linkedin,
            Provider::Twitter => &self.config.twitter,
        }
    }

    /// Exchange an authorization code for the provider's token response.
    pub async fn exchange_code(
        &self,
        provider: Provider,
        request: &TokenRequest,
    ) -> Result<ProviderResponse, OAuthError> {
        if request.code.trim().is_empty() {
            return Err(OAuthError::MissingCode);
        }

        let cfg = self.provider_config(provider);
        let client_id = cfg
            .client_id
            .as_deref()
            .ok_or(OAuthError::NotConfigured(provider))?;

        let mut form: Vec<(&str, &str)> =
            vec![("client_id", client_id), ("code", request.code.as_str())];
        if let Some(redirect_uri) = request.redirect_uri.as_deref() {
            form.push(("redirect_uri", redirect_uri));
        }

        match provider {
            Provider::Github => {
                let secret = cfg
                    .client_secret
                    .as_deref()
                    .ok_or(OAuthError::NotConfigured(provider))?;
                form.push(("client_secret", secret));
            }
            Provider::Linkedin => {
                let secret = cfg
                    .client_secret
                    .as_deref()
                    .ok_or(OAuthError::NotConfigured(provider))?;
                form.push(("grant_type", "authorization_code"));
                form.push(("client_secret", secret));
            }
            Provider::Twitter => {
                let verifier = request
                    .code_verifier
                    .as_deref()
                    .filter(|v| !v.is_empty())
                    .ok_or(OAuthError::MissingCodeVerifier)?;
                form.push(("grant_type", "authorization_code"));
                form.push(("code_verifier", verifier));
            }
        }

        tracing::debug!(provider = %provider, "Exchanging authorization code");

        let response = self
            .http
            .post(&cfg.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await?;

        into_provider_response(provider, response).await
    }

    /// Fetch the profile of the user `access_token` belongs to.
    pub async fn fetch_profile(
        &self,
        provider: Provider,
        access_token: &str,
    ) -> Result<ProviderResponse, OAuthError> {
        let cfg = self.provider_config(provider);

        let response = self
            .http
            .get(&cfg.profile_url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        into_provider_response(provider, response).await
    }
}

async fn into_provider_response(
    provider: Provider,
    response: reqwest::Response,
) -> Result<ProviderResponse, OAuthError> {
    let status = response.status().as_u16();
    let text = response.text().await?;

    let body = serde_json::from_str(&text).map_err(|e| {
        tracing::warn!(provider = %provider, status, "Non-JSON provider response");
        OAuthError::InvalidResponse(e.to_string())
    })?;

    if status >= 400 {
        tracing::warn!(provider = %provider, status, "Provider rejected request");
    }

    Ok(ProviderResponse { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured() -> OAuthConfig {
        let provider = OAuthProviderConfig {
            client_id: None,
            client_secret: None,
            token_url: "http://127.0.0.1:9/token".into(),
            profile_url: "http://127.0.0.1:9/me".into(),
        };
        OAuthConfig {
            github: provider.clone(),
            linkedin: provider.clone(),
            twitter: provider,
        }
    }

    #[test]
    fn test_provider_path_segment() {
        assert_eq!(Provider::parse("github"), Some(Provider::Github));
        assert_eq!(Provider::parse("GitHub"), None);
        assert_eq!(Provider::Twitter.to_string(), "twitter");
    }

    #[tokio::test]
    async fn test_missing_code_is_rejected_before_any_request() {
        let client = OAuthClient::new(unconfigured()).unwrap();
        let err = client
            .exchange_code(Provider::Github, &TokenRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::MissingCode));
    }

    #[tokio::test]
    async fn test_unconfigured_provider() {
        let client = OAuthClient::new(unconfigured()).unwrap();
        let request = TokenRequest {
            code: "abc".into(),
            ..Default::default()
        };
        let err = client
            .exchange_code(Provider::Linkedin, &request)
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::NotConfigured(Provider::Linkedin)));
    }
}
