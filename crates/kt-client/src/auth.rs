//! Identity resolution and bearer-token injection.
//!
//! Token issuance belongs to an external identity provider. This module only
//! asks it for a token, resolves the user behind that token, and hands the
//! token to an [`ApiClient`].

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::api::{ApiClient, ClientOptions};
use crate::error::{ClientError, ClientResult};

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Subject identifier (`sub` claim).
    pub subject_id: String,
    /// Raw profile claims from the identity provider.
    pub profile: Value,
}

impl CurrentUser {
    /// Builds a user from a claims object; the `sub` claim is required.
    pub fn from_claims(claims: Value) -> ClientResult<Self> {
        let subject_id = claims
            .get("sub")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ClientError::AuthUnavailable("claims carry no subject".to_string()))?
            .to_string();

        Ok(Self {
            subject_id,
            profile: claims,
        })
    }

    /// Display name, if the provider shared one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.profile
            .get("name")
            .or_else(|| self.profile.get("preferred_username"))
            .and_then(Value::as_str)
    }

    /// Email address, if the provider shared one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.profile.get("email").and_then(Value::as_str)
    }
}

/// Token endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token.
    pub access_token: String,
    /// Token type (usually "Bearer").
    #[serde(default)]
    pub token_type: Option<String>,
    /// Access token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Refresh token (if issued).
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// ID token (if `openid` scope requested).
    #[serde(default)]
    pub id_token: Option<String>,
    /// Granted scope.
    #[serde(default)]
    pub scope: Option<String>,
}

/// Source of bearer tokens and user profiles.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Obtains an access token.
    async fn access_token(&self) -> ClientResult<String>;

    /// Resolves the user that owns `token`.
    async fn user_info(&self, token: &str) -> ClientResult<CurrentUser>;
}

/// OAuth 2.0 grant used against the token endpoint.
#[derive(Debug, Clone)]
pub enum Grant {
    /// Resource owner password credentials.
    Password {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
    /// Client credentials (service account).
    ClientCredentials,
}

/// Settings for [`OidcIdentityProvider`].
#[derive(Debug, Clone)]
pub struct OidcSettings {
    /// Token endpoint URL.
    pub token_url: String,
    /// UserInfo endpoint URL.
    pub userinfo_url: Option<String>,
    /// Client ID.
    pub client_id: String,
    /// Client secret (confidential clients).
    pub client_secret: Option<String>,
    /// Requested scope.
    pub scope: Option<String>,
    /// Grant type.
    pub grant: Grant,
}

/// Identity provider speaking OAuth 2.0 / OpenID Connect.
#[derive(Debug, Clone)]
pub struct OidcIdentityProvider {
    http: reqwest::Client,
    settings: OidcSettings,
}

impl OidcIdentityProvider {
    /// Creates a provider.
    pub fn new(settings: OidcSettings, options: &ClientOptions) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()?;
        Ok(Self { http, settings })
    }

    /// Requests a token from the token endpoint.
    pub async fn request_token(&self) -> ClientResult<TokenResponse> {
        let settings = &self.settings;
        let mut form: Vec<(&str, &str)> = Vec::new();
        match &settings.grant {
            Grant::Password { username, password } => {
                form.push(("grant_type", "password"));
                form.push(("username", username.as_str()));
                form.push(("password", password.as_str()));
            }
            Grant::ClientCredentials => form.push(("grant_type", "client_credentials")),
        }
        if let Some(scope) = &settings.scope {
            form.push(("scope", scope.as_str()));
        }

        let mut request = self.http.post(&settings.token_url);
        request = match &settings.client_secret {
            Some(secret) => request.basic_auth(&settings.client_id, Some(secret)),
            None => {
                form.push(("client_id", settings.client_id.as_str()));
                request
            }
        };

        let response = request.form(&form).send().await?;
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(url = %settings.token_url, status = status.as_u16(), "token request completed");

        if !status.is_success() {
            return Err(ClientError::identity(status.as_u16(), &text));
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl IdentityProvider for OidcIdentityProvider {
    async fn access_token(&self) -> ClientResult<String> {
        Ok(self.request_token().await?.access_token)
    }

    async fn user_info(&self, token: &str) -> ClientResult<CurrentUser> {
        match &self.settings.userinfo_url {
            Some(url) => fetch_user_info(&self.http, url, token).await,
            None => CurrentUser::from_claims(decode_claims_unverified(token)?),
        }
    }
}

/// Identity provider backed by a token issued out of band.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    http: reqwest::Client,
    token: String,
    userinfo_url: Option<String>,
}

impl StaticTokenProvider {
    /// Creates a provider for `token`.
    ///
    /// Without a userinfo endpoint the subject is read from the token's own
    /// claims.
    pub fn new(
        token: impl Into<String>,
        userinfo_url: Option<String>,
        options: &ClientOptions,
    ) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()?;
        Ok(Self {
            http,
            token: token.into(),
            userinfo_url,
        })
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenProvider {
    async fn access_token(&self) -> ClientResult<String> {
        Ok(self.token.clone())
    }

    async fn user_info(&self, token: &str) -> ClientResult<CurrentUser> {
        match &self.userinfo_url {
            Some(url) => fetch_user_info(&self.http, url, token).await,
            None => CurrentUser::from_claims(decode_claims_unverified(token)?),
        }
    }
}

async fn fetch_user_info(http: &reqwest::Client, url: &str, token: &str) -> ClientResult<CurrentUser> {
    let response = http.get(url).bearer_auth(token).send().await?;
    let status = response.status();
    let text = response.text().await?;
    tracing::debug!(%url, status = status.as_u16(), "userinfo request completed");

    if !status.is_success() {
        return Err(ClientError::identity(status.as_u16(), &text));
    }
    CurrentUser::from_claims(serde_json::from_str(&text)?)
}

/// Decodes a JWT payload without verifying its signature.
///
/// The server under test is the one that validates tokens; the tester only
/// needs the subject.
pub fn decode_claims_unverified(token: &str) -> ClientResult<Value> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(ClientError::AuthUnavailable(
            "access token is not a JWT and no userinfo endpoint is configured".to_string(),
        ));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| ClientError::AuthUnavailable(format!("invalid token payload: {e}")))?;
    Ok(serde_json::from_slice(&payload)?)
}

struct Session {
    token: String,
    user: CurrentUser,
}

/// Bridges an [`IdentityProvider`] into the HTTP client.
///
/// One session is resolved lazily and reused for the rest of the run.
pub struct AuthBridge {
    provider: Option<Arc<dyn IdentityProvider>>,
    session: OnceCell<Session>,
}

impl AuthBridge {
    /// Creates a bridge over `provider`.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider: Some(provider),
            session: OnceCell::new(),
        }
    }

    /// Creates a bridge with no identity; every lookup fails with
    /// `ClientError::AuthUnavailable`.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self {
            provider: None,
            session: OnceCell::new(),
        }
    }

    /// Returns whether an identity provider is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    async fn session(&self) -> ClientResult<&Session> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            ClientError::AuthUnavailable("no identity provider configured".to_string())
        })?;

        self.session
            .get_or_try_init(|| async {
                let token = provider
                    .access_token()
                    .await
                    .map_err(|e| ClientError::AuthUnavailable(e.to_string()))?;
                let user = provider
                    .user_info(&token)
                    .await
                    .map_err(|e| ClientError::AuthUnavailable(e.to_string()))?;
                tracing::info!(subject = %user.subject_id, "authenticated session established");
                Ok::<_, ClientError>(Session { token, user })
            })
            .await
    }

    /// Resolves the authenticated user.
    ///
    /// ## Errors
    ///
    /// Returns `ClientError::AuthUnavailable` if no session can be established.
    pub async fn current_user(&self) -> ClientResult<CurrentUser> {
        Ok(self.session().await?.user.clone())
    }

    /// Configures `client` to send the session's bearer token.
    pub async fn attach_token(&self, client: &mut ApiClient) -> ClientResult<()> {
        let session = self.session().await?;
        client.set_bearer_token(session.token.clone());
        Ok(())
    }
}

impl std::fmt::Debug for AuthBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthBridge")
            .field("configured", &self.is_configured())
            .field("session", &self.session.initialized())
            .finish()
    }
}
