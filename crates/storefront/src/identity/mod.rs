//! Member identity provider client.
//!
//! Members sign in with an OAuth 2.0 authorization-code flow against an
//! `OpenID`-style issuer. The storefront never sees passwords; it only keeps
//! the display fields returned by the userinfo endpoint.
//!
//! # OAuth Flow
//!
//! 1. Generate authorization URL with `authorization_url()`
//! 2. Redirect the visitor to the issuer's login page
//! 3. The issuer redirects back with an authorization code
//! 4. Exchange code for tokens with `exchange_code()`
//! 5. Load the profile with `fetch_member()`

mod types;

pub use types::*;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::IdentityConfig;

/// Errors that can occur when talking to the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// OAuth endpoint rejected the request.
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// Issuer URL cannot carry the OAuth paths.
    #[error("invalid issuer URL: {0}")]
    InvalidIssuer(String),
}

/// Client for the member identity provider.
#[derive(Clone)]
pub struct MemberClient {
    inner: Arc<MemberClientInner>,
}

struct MemberClientInner {
    client: reqwest::Client,
    issuer: Url,
    client_id: String,
    client_secret: SecretString,
}

impl MemberClient {
    /// Create a new identity client.
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            inner: Arc::new(MemberClientInner {
                client: reqwest::Client::new(),
                issuer: config.issuer_url.clone(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
            }),
        }
    }

    /// Get the OAuth client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.inner.client_id
    }

    fn endpoint(&self, name: &str) -> Result<Url, IdentityError> {
        let mut url = self.inner.issuer.clone();
        url.path_segments_mut()
            .map_err(|()| IdentityError::InvalidIssuer(self.inner.issuer.to_string()))?
            .pop_if_empty()
            .extend(["oauth", name]);
        Ok(url)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // OAuth Flow
    // ─────────────────────────────────────────────────────────────────────────

    /// Generate the authorization URL for member login.
    ///
    /// # Arguments
    ///
    /// * `redirect_uri` - The callback URL to redirect to after authentication
    /// * `state` - A random string stored in the session to prevent CSRF attacks
    /// * `nonce` - A random string for `OpenID` Connect replay protection
    ///
    /// # Errors
    ///
    /// Returns an error if the issuer URL cannot carry a path.
    pub fn authorization_url(
        &self,
        redirect_uri: &str,
        state: &str,
        nonce: &str,
    ) -> Result<String, IdentityError> {
        let mut url = self.endpoint("authorize")?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.inner.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", "openid profile email")
            .append_pair("state", state)
            .append_pair("nonce", nonce);
        Ok(url.into())
    }

    /// Generate the logout URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the issuer URL cannot carry a path.
    pub fn logout_url(
        &self,
        id_token: &str,
        post_logout_redirect_uri: &str,
    ) -> Result<String, IdentityError> {
        let mut url = self.endpoint("logout")?;
        url.query_pairs_mut()
            .append_pair("id_token_hint", id_token)
            .append_pair("post_logout_redirect_uri", post_logout_redirect_uri);
        Ok(url.into())
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the token exchange fails.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<MemberToken, IdentityError> {
        let url = self.endpoint("token")?;

        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self.inner.client.post(url).form(&params).send().await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IdentityError::OAuth(format!("Token exchange failed: {text}")));
        }

        let token_response: TokenResponse = response.json().await?;

        Ok(MemberToken {
            access_token: token_response.access_token,
            id_token: token_response.id_token,
            expires_in: token_response.expires_in,
            obtained_at: chrono::Utc::now().timestamp(),
        })
    }

    /// Load the signed-in member's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the userinfo request fails or the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn fetch_member(&self, token: &MemberToken) -> Result<Member, IdentityError> {
        let url = self.endpoint("userinfo")?;

        let response = self
            .inner
            .client
            .get(url)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(IdentityError::OAuth(format!(
                "Userinfo request failed ({status}): {text}"
            )));
        }

        Ok(response.json().await?)
    }
}
