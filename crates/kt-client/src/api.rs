//! Raw HTTP access to the server under test.

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Connection options for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Accept self-signed certificates (local development servers).
    pub accept_invalid_certs: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
        }
    }
}

/// API client for making requests to the server under test.
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
}

impl ApiClient {
    /// Creates a new API client rooted at `base_url`.
    pub fn new(base_url: impl Into<String>, options: &ClientOptions) -> ClientResult<Self> {
        let base_url = base_url.into();
        let parsed = Url::parse(&base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "{base_url}: expected an http or https URL"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer: None,
        })
    }

    /// Sends `token` as a bearer credential on every subsequent request.
    pub fn set_bearer_token(&mut self, token: impl Into<String>) {
        self.bearer = Some(token.into());
    }

    /// Stops sending a bearer credential.
    pub fn clear_bearer_token(&mut self) {
        self.bearer = None;
    }

    /// Returns whether a bearer credential is attached.
    #[must_use]
    pub fn has_bearer_token(&self) -> bool {
        self.bearer.is_some()
    }

    /// Gets the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolves a path against the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.is_empty() {
            self.base_url.clone()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Makes a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.send(Method::GET, path, None::<&()>).await?;
        handle_response(response).await
    }

    /// Makes a POST request.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::POST, path, Some(body)).await?;
        handle_response(response).await
    }

    /// Makes a PUT request.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::PUT, path, Some(body)).await?;
        handle_response(response).await
    }

    /// Makes a DELETE request.
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        let response = self.send(Method::DELETE, path, None::<&()>).await?;
        handle_empty_response(response).await
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        let mut request = self.client.request(method.clone(), &url);
        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        tracing::debug!(%method, %url, status = response.status().as_u16(), "request completed");
        Ok(response)
    }
}

/// Handles a response with a body.
///
/// An empty success body decodes as JSON `null`.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(ClientError::api(status.as_u16(), &text));
    }

    if text.trim().is_empty() {
        Ok(serde_json::from_value(serde_json::Value::Null)?)
    } else {
        Ok(serde_json::from_str(&text)?)
    }
}

/// Handles a response without a body.
async fn handle_empty_response(response: reqwest::Response) -> ClientResult<()> {
    let status = response.status();

    if status.is_success() {
        Ok(())
    } else {
        let text = response.text().await.unwrap_or_default();
        Err(ClientError::api(status.as_u16(), &text))
    }
}
