//! The Keeps contract suite.
//!
//! Six cases, each validating one contract of `/api/keeps`: ownership is
//! assigned by the server, private keeps do not leak, records can be read,
//! edited and deleted by id, and the privacy flag is honored.

use std::sync::Arc;

use kt_client::{
    ApiClient, AuthBridge, ClientError, ClientResult, CurrentUser, Identified, ResourceClient,
    Scoped,
};
use kt_harness::{
    fail, handle_error, pass, precondition, unexpected, verify_is_same, Suite, TestCase, TestInfo,
    TestOutcome,
};
use serde_json::{json, Value};

use crate::model::{is_private, owner, Keep, UNTRUSTED_USER_ID};

/// Suite name.
pub const SUITE_NAME: &str = "Keeps Testing";

/// Default resource path.
pub const KEEPS_PATH: &str = "/api/keeps";

/// Name written by the edit test.
pub const EDITED_NAME: &str = "edited keep";

/// How many records a passing list test keeps in its payload.
const LIST_PAYLOAD_LIMIT: usize = 3;

/// Context shared by every keeps test.
#[derive(Debug, Clone)]
pub struct KeepsContext {
    /// CRUD client for the keeps resource.
    pub keeps: ResourceClient,
    /// Identity of the caller.
    pub auth: Arc<AuthBridge>,
}

/// Builds the keeps suite.
///
/// The bearer token is attached up front when a session is available.
/// Otherwise the suite is still built and every case that needs an
/// identity retries the session itself, reporting the auth failure as its
/// outcome.
pub async fn keeps_suite(
    mut api: ApiClient,
    base_path: &str,
    auth: Arc<AuthBridge>,
) -> Suite<KeepsContext> {
    if auth.is_configured() {
        if let Err(e) = auth.attach_token(&mut api).await {
            tracing::warn!(error = %e, "could not attach bearer token; identity cases will retry");
        }
    }

    let keeps = ResourceClient::new(api, base_path);
    let collection = keeps.collection_url();
    let item = format!("{collection}/:id");
    let base = keeps.base_path().to_string();

    let mut suite = Suite::new(SUITE_NAME, base, KeepsContext { keeps, auth });
    suite.add_tests([
        TestCase::new(
            TestInfo::new(
                "Can Create a keep",
                collection.clone(),
                "POST request. This should create a new keep in your database. UserId is attached on the server side",
                "Keep",
            )
            .with_payload("Keep object {name, description, img, isPrivate}"),
            can_create_keep,
        ),
        TestCase::new(
            TestInfo::new(
                "Can Get Public Keeps",
                collection.clone(),
                "GET request. This should get a list of public keeps.",
                "Keep[]",
            ),
            can_get_public_keeps,
        ),
        TestCase::new(
            TestInfo::new(
                "Can Get keep by Id",
                item.clone(),
                "GET request. This should get one keep by its id.",
                "Keep",
            ),
            can_get_keep_by_id,
        ),
        TestCase::new(
            TestInfo::new(
                "Can Edit keep by Id",
                item.clone(),
                "PUT request. This should update one keep by its id.",
                "Keep",
            )
            .with_payload("Keep"),
            can_edit_keep,
        ),
        TestCase::new(
            TestInfo::new(
                "Can delete keep by Id",
                item,
                "DELETE request. This should delete one keep by its id.",
                "Keep",
            ),
            can_delete_keep,
        ),
        TestCase::new(
            TestInfo::new(
                "Can create Private keeps",
                collection,
                "POST request. This should create a keep that only its owner can see.",
                "Keep",
            ),
            can_create_private_keep,
        ),
    ]);
    suite
}

fn unexpected_keep(error: &ClientError) -> TestOutcome {
    unexpected(Keep::shape().sample(), handle_error(error))
}

fn to_json(keep: &Keep) -> Value {
    serde_json::to_value(keep).unwrap_or(Value::Null)
}

/// Resolves the caller and a keeps client that carries their token.
async fn session(ctx: &KeepsContext) -> ClientResult<(CurrentUser, ResourceClient)> {
    let user = ctx.auth.current_user().await?;
    let mut keeps = ctx.keeps.clone();
    if !keeps.api().has_bearer_token() {
        ctx.auth.attach_token(keeps.api_mut()).await?;
    }
    Ok((user, keeps))
}

async fn release<T>(record: Scoped<T>) {
    if let Err(e) = record.release().await {
        tracing::warn!(error = %e, "failed to delete test keep");
    }
}

async fn can_create_keep(ctx: KeepsContext) -> ClientResult<TestOutcome> {
    let (user, keeps) = match session(&ctx).await {
        Ok(session) => session,
        Err(e) => return Ok(unexpected_keep(&e)),
    };

    let payload = Keep::fixture().with_user_id(UNTRUSTED_USER_ID);
    let created = match keeps.create_scoped::<_, Value>(&payload).await {
        Ok(created) => created,
        Err(e) => return Ok(unexpected_keep(&e)),
    };

    let record = created.record();
    let owner_id = owner(record);
    let outcome = if !verify_is_same(&Keep::shape(), record) {
        fail("Created keep does not match the given Keep model")
    } else if owner_id == Some(UNTRUSTED_USER_ID) || owner_id != Some(user.subject_id.as_str()) {
        fail("The keep.userId differs from the logged in users id. Users can create a keep with any user id.")
    } else if ["shares", "views", "keeps"]
        .iter()
        .any(|counter| record.get(*counter).and_then(Value::as_u64) != Some(0))
    {
        fail("New keeps must start with shares, views and keeps at 0.")
    } else {
        pass("Successfully created a keep!", record.clone())
    };

    release(created).await;
    Ok(outcome)
}

async fn can_get_public_keeps(ctx: KeepsContext) -> ClientResult<TestOutcome> {
    let expected = json!([Keep::shape().sample()]);
    let (user, client) = match session(&ctx).await {
        Ok(session) => session,
        Err(e) => return Ok(unexpected(expected, handle_error(&e))),
    };

    let keeps: Vec<Value> = match client.get(None).await {
        Ok(keeps) => keeps,
        Err(e) => return Ok(unexpected(expected, handle_error(&e))),
    };

    let Some(first) = keeps.first() else {
        return Ok(precondition("Please add at least one keep to test this route."));
    };
    if !keeps
        .iter()
        .all(|k| !is_private(k) || owner(k) == Some(user.subject_id.as_str()))
    {
        return Ok(fail(
            "Able to retrieve private keeps that do not belong to the user.",
        ));
    }
    if !verify_is_same(&Keep::shape(), first) {
        return Ok(fail(
            "Array does not contain objects that match the given Keep model",
        ));
    }

    let sample: Vec<Value> = keeps.into_iter().take(LIST_PAYLOAD_LIMIT).collect();
    Ok(pass("Able to get keeps", Value::Array(sample)))
}

async fn can_get_keep_by_id(ctx: KeepsContext) -> ClientResult<TestOutcome> {
    let keeps: Vec<Value> = match ctx.keeps.get(None).await {
        Ok(keeps) => keeps,
        Err(e) => return Ok(unexpected_keep(&e)),
    };

    let Some(first) = keeps.first() else {
        return Ok(precondition("Please add at least one keep to test this route."));
    };
    let Some(id) = first.record_id() else {
        return Ok(fail("Listed keeps do not expose an id."));
    };

    let keep: Value = match ctx.keeps.get_by_id(&id).await {
        Ok(keep) => keep,
        Err(e) => return Ok(unexpected_keep(&e)),
    };

    if keep.record_id().as_ref() != Some(&id) {
        return Ok(fail("Could not retrieve the keep by its Id."));
    }
    Ok(pass("Retrieved Keep by Id", keep))
}

async fn can_edit_keep(ctx: KeepsContext) -> ClientResult<TestOutcome> {
    let keeps = match session(&ctx).await {
        Ok((_, keeps)) => keeps,
        Err(e) => return Ok(unexpected_keep(&e)),
    };

    let created = match keeps.create_scoped::<_, Keep>(&Keep::fixture()).await {
        Ok(created) => created,
        Err(e) => return Ok(unexpected_keep(&e)),
    };

    let result: ClientResult<TestOutcome> = async {
        let mut edited = created.record().clone();
        edited.name = EDITED_NAME.to_string();
        let id = edited.record_id().ok_or(ClientError::MissingId)?;

        keeps.update::<_, Value>(&edited).await?;
        let updated: Keep = keeps.get_by_id(&id).await?;

        if updated.name != edited.name {
            return Ok(fail("Could not edit the keep."));
        }
        if !updated.same_content_except_name(&edited) {
            return Ok(fail("Editing the keep name changed its other fields."));
        }
        Ok(pass("Successfully edited the keep!", to_json(&updated)))
    }
    .await;

    release(created).await;
    Ok(result.unwrap_or_else(|e| unexpected_keep(&e)))
}

async fn can_delete_keep(ctx: KeepsContext) -> ClientResult<TestOutcome> {
    let payload = Keep::deletable_fixture();
    let keeps = match session(&ctx).await {
        Ok((_, keeps)) => keeps,
        Err(e) => return Ok(unexpected(to_json(&payload), handle_error(&e))),
    };

    let mut created = match keeps.create_scoped::<_, Keep>(&payload).await {
        Ok(created) => created,
        Err(e) => return Ok(unexpected(to_json(&payload), handle_error(&e))),
    };

    let Some(id) = created.id().cloned() else {
        return Ok(fail("Created keep has no id to delete."));
    };

    if let Err(e) = keeps.delete(&id).await {
        release(created).await;
        return Ok(fail(e.to_string()));
    }
    created.disarm();

    // Deleted records must stay gone on every later read. Any error
    // status counts as gone; transport failures do not.
    for _ in 0..2 {
        match keeps.get_by_id::<Value>(&id).await {
            Ok(_) => return Ok(fail("Unable to delete keep by its Id")),
            Err(ClientError::Api { .. }) => {}
            Err(e) => return Ok(unexpected_keep(&e)),
        }
    }

    Ok(pass(
        "Sucessfully removed keep by it's Id",
        to_json(created.record()),
    ))
}

async fn can_create_private_keep(ctx: KeepsContext) -> ClientResult<TestOutcome> {
    let payload = Keep::private_fixture();
    let keeps = match session(&ctx).await {
        Ok((_, keeps)) => keeps,
        Err(e) => return Ok(unexpected(to_json(&payload), handle_error(&e))),
    };

    let created = match keeps.create_scoped::<_, Value>(&payload).await {
        Ok(created) => created,
        Err(e) => return Ok(unexpected(to_json(&payload), handle_error(&e))),
    };

    let outcome = if created.get("isPrivate") == Some(&Value::Bool(true)) {
        pass("Able to create private keeps", created.record().clone())
    } else {
        fail("Could not make a private keep")
    };

    release(created).await;
    Ok(outcome)
}
