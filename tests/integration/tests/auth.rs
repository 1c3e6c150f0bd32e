//! Auth provider bridge against the mock identity provider.

use kt_client::{
    ClientError, ClientOptions, Grant, IdentityProvider, OidcIdentityProvider, ResourceClient,
};
use kt_integration_tests::{ALICE, BOB};
use kt_keeps::{Keep, KEEPS_PATH};

use crate::common::TestEnv;

#[tokio::test]
async fn password_grant_issues_a_token() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let provider = OidcIdentityProvider::new(env.oidc_settings(&ALICE), &ClientOptions::default())?;

    let response = provider.request_token().await?;

    assert_eq!(response.access_token, ALICE.token());
    assert_eq!(response.token_type.as_deref(), Some("Bearer"));
    assert_eq!(response.expires_in, Some(3600));
    Ok(())
}

#[tokio::test]
async fn current_user_comes_from_userinfo() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let auth = env.auth_as(&BOB)?;

    let user = auth.current_user().await?;

    assert_eq!(user.subject_id, BOB.subject);
    assert_eq!(user.name(), Some(BOB.name));
    assert_eq!(user.profile["picture"], "//placehold.it/64x64");
    Ok(())
}

#[tokio::test]
async fn unsupported_grant_is_an_identity_error() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let mut settings = env.oidc_settings(&ALICE);
    settings.grant = Grant::ClientCredentials;
    let provider = OidcIdentityProvider::new(settings, &ClientOptions::default())?;

    let err = provider.access_token().await.unwrap_err();

    match err {
        ClientError::Identity { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body["error"], "unsupported_grant_type");
        }
        other => panic!("expected an identity error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn unknown_client_is_rejected() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let mut settings = env.oidc_settings(&ALICE);
    settings.client_id = "someone-else".to_string();
    let provider = OidcIdentityProvider::new(settings, &ClientOptions::default())?;

    let err = provider.request_token().await.unwrap_err();

    assert!(matches!(err, ClientError::Identity { status: 401, .. }));
    Ok(())
}

/// The attached token is the one the server resolves ownership from.
#[tokio::test]
async fn attached_token_sets_record_owner() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let auth = env.auth_as(&ALICE)?;
    let mut api = env.api()?;
    auth.attach_token(&mut api).await?;
    assert!(api.has_bearer_token());

    let keeps = ResourceClient::new(api, KEEPS_PATH);
    let created: Keep = keeps.create(&Keep::fixture()).await?;
    assert_eq!(created.user_id.as_deref(), Some(ALICE.subject));

    let id = created
        .id
        .clone()
        .ok_or_else(|| anyhow::anyhow!("created keep has no id"))?;
    keeps.delete(&id).await?;
    assert!(env.server.keeps().is_empty());
    Ok(())
}
