//! Common test utilities and fixtures.

use std::sync::Arc;

use kt_client::{
    ApiClient, AuthBridge, ClientOptions, Grant, OidcIdentityProvider, OidcSettings,
    ResourceClient,
};
use kt_harness::SuiteReport;
use kt_integration_tests::{Behavior, MockServer, MockUser, CLIENT_ID};
use kt_keeps::{keeps_suite, KEEPS_PATH};

/// Test environment wrapping a running mock server.
pub struct TestEnv {
    /// The mock server.
    pub server: MockServer,
}

impl TestEnv {
    /// Starts a compliant server.
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_behavior(Behavior::default()).await
    }

    /// Starts a server with the given contract violations.
    pub async fn with_behavior(behavior: Behavior) -> anyhow::Result<Self> {
        // Initialize tracing for tests
        let _ = tracing_subscriber::fmt()
            .with_env_filter("kt_client=debug,kt_harness=debug,kt_keeps=debug")
            .with_test_writer()
            .try_init();

        Ok(Self {
            server: MockServer::start(behavior).await?,
        })
    }

    /// Creates an API client without credentials.
    pub fn api(&self) -> anyhow::Result<ApiClient> {
        Ok(ApiClient::new(&self.server.base_url, &ClientOptions::default())?)
    }

    /// Creates a keeps resource client without credentials.
    pub fn keeps(&self) -> anyhow::Result<ResourceClient> {
        Ok(ResourceClient::new(self.api()?, KEEPS_PATH))
    }

    /// OIDC settings for a password grant as `user`.
    pub fn oidc_settings(&self, user: &MockUser) -> OidcSettings {
        OidcSettings {
            token_url: self.server.token_url(),
            userinfo_url: Some(self.server.userinfo_url()),
            client_id: CLIENT_ID.to_string(),
            client_secret: None,
            scope: Some("openid profile email".to_string()),
            grant: Grant::Password {
                username: user.username.to_string(),
                password: user.password.to_string(),
            },
        }
    }

    /// Creates an auth bridge logged in as `user`.
    pub fn auth_as(&self, user: &MockUser) -> anyhow::Result<Arc<AuthBridge>> {
        let provider = OidcIdentityProvider::new(self.oidc_settings(user), &ClientOptions::default())?;
        Ok(Arc::new(AuthBridge::new(Arc::new(provider))))
    }

    /// Builds and runs the full keeps suite.
    pub async fn run_suite(&self, auth: Arc<AuthBridge>) -> anyhow::Result<SuiteReport> {
        let suite = keeps_suite(self.api()?, KEEPS_PATH, auth).await;
        Ok(suite.run().await)
    }
}
