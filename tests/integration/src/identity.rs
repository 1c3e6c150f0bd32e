//! Minimal OAuth 2.0 / OpenID Connect provider: a password-grant token
//! endpoint and a userinfo endpoint.

use axum::{
    http::{header::AUTHORIZATION, HeaderMap},
    Form, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{MockError, MockResult};

/// Client ID accepted by the token endpoint.
pub const CLIENT_ID: &str = "keeps-tester";

/// A user known to the mock identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockUser {
    /// Login name.
    pub username: &'static str,
    /// Password.
    pub password: &'static str,
    /// Subject identifier (`sub` claim).
    pub subject: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Email address.
    pub email: &'static str,
}

impl MockUser {
    /// Bearer token the provider issues to this user.
    #[must_use]
    pub fn token(&self) -> String {
        format!("mock-token-{}", self.username)
    }

    /// Userinfo claims for this user.
    #[must_use]
    pub fn claims(&self) -> Value {
        json!({
            "sub": self.subject,
            "name": self.name,
            "email": self.email,
            "picture": "//placehold.it/64x64",
        })
    }
}

/// The user the suite runs as.
pub const ALICE: MockUser = MockUser {
    username: "alice",
    password: "wonderland",
    subject: "auth0|alice",
    name: "Alice",
    email: "alice@example.com",
};

/// Another user, owner of seeded records.
pub const BOB: MockUser = MockUser {
    username: "bob",
    password: "builder",
    subject: "auth0|bob",
    name: "Bob",
    email: "bob@example.com",
};

/// A user whose subject is a plain opaque id.
pub const CAROL: MockUser = MockUser {
    username: "carol",
    password: "singer",
    subject: "abc123",
    name: "Carol",
    email: "carol@example.com",
};

const USERS: &[MockUser] = &[ALICE, BOB, CAROL];

/// Resolves the caller from the `Authorization: Bearer` header.
pub(crate) fn caller(headers: &HeaderMap) -> Option<&'static MockUser> {
    let token = headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;
    USERS.iter().find(|u| u.token() == token)
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenRequest {
    grant_type: String,
    username: Option<String>,
    password: Option<String>,
    client_id: Option<String>,
}

/// POST /oauth/token
pub(crate) async fn token(Form(request): Form<TokenRequest>) -> MockResult<Json<Value>> {
    if request.grant_type != "password" {
        return Err(MockError::UnsupportedGrantType(request.grant_type));
    }
    if request.client_id.as_deref() != Some(CLIENT_ID) {
        return Err(MockError::InvalidClient);
    }

    let user = USERS
        .iter()
        .find(|u| {
            request.username.as_deref() == Some(u.username)
                && request.password.as_deref() == Some(u.password)
        })
        .ok_or(MockError::InvalidGrant)?;

    tracing::debug!(username = user.username, "issued mock token");
    Ok(Json(json!({
        "access_token": user.token(),
        "token_type": "Bearer",
        "expires_in": 3600,
        "scope": "openid profile email",
    })))
}

/// GET /userinfo
pub(crate) async fn userinfo(headers: HeaderMap) -> MockResult<Json<Value>> {
    let user = caller(&headers).ok_or(MockError::Unauthorized)?;
    Ok(Json(user.claims()))
}
