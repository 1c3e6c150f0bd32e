//! The Keeps REST resource.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MockError, MockResult};
use crate::identity::caller;
use crate::MockState;

/// Switchable contract violations.
///
/// The default is a compliant server; each flag breaks one contract the
/// keeps suite checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Behavior {
    /// Store the `userId` sent by the client instead of the caller's.
    pub trust_client_user_id: bool,
    /// List private keeps of every user.
    pub leak_private: bool,
    /// Store every keep as public.
    pub ignore_private_flag: bool,
    /// Accept updates without applying them.
    pub ignore_updates: bool,
    /// Accept deletes without removing anything.
    pub noop_delete: bool,
    /// Answer creates with `img: null` while storing the real record.
    pub null_image_on_create: bool,
    /// Start new keeps with a nonzero view counter.
    pub nonzero_counters: bool,
    /// Apply only the name on update and clear the description.
    pub update_clobbers_fields: bool,
    /// Answer reads of unknown ids with 500 instead of 404.
    pub missing_is_server_error: bool,
}

/// A keep as the server stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredKeep {
    /// Server-assigned identifier.
    pub id: i64,
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Image URL.
    pub img: String,
    /// Visible only to its owner.
    pub is_private: bool,
    /// Owner subject.
    pub user_id: String,
    /// Share counter.
    pub shares: u64,
    /// View counter.
    pub views: u64,
    /// Keep counter.
    pub keeps: u64,
}

/// Client-writable keep fields. Anything else in the body is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeepInput {
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Image URL.
    #[serde(default)]
    pub img: String,
    /// Privacy flag.
    #[serde(default)]
    pub is_private: bool,
    /// Owner claimed by the client.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// In-memory keep storage.
#[derive(Debug, Default)]
pub struct KeepStore {
    next_id: i64,
    keeps: BTreeMap<i64, StoredKeep>,
}

impl KeepStore {
    /// Stores a new keep owned by `owner` with zeroed counters.
    pub fn insert(&mut self, owner: &str, input: KeepInput) -> StoredKeep {
        self.next_id += 1;
        let keep = StoredKeep {
            id: self.next_id,
            name: input.name,
            description: input.description,
            img: input.img,
            is_private: input.is_private,
            user_id: owner.to_string(),
            shares: 0,
            views: 0,
            keeps: 0,
        };
        self.keeps.insert(keep.id, keep.clone());
        keep
    }

    /// Returns every stored keep in id order.
    #[must_use]
    pub fn all(&self) -> Vec<StoredKeep> {
        self.keeps.values().cloned().collect()
    }
}

fn parse_id(raw: &str) -> MockResult<i64> {
    raw.parse()
        .map_err(|_| MockError::BadRequest(format!("Invalid Id: {raw}")))
}

fn visible_to(keep: &StoredKeep, subject: Option<&str>) -> bool {
    !keep.is_private || subject == Some(keep.user_id.as_str())
}

/// GET /api/keeps
pub(crate) async fn list_keeps(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> Json<Vec<StoredKeep>> {
    let subject = caller(&headers).map(|u| u.subject);
    let leak = state.behavior.leak_private;
    let keeps = state
        .store
        .lock()
        .all()
        .into_iter()
        .filter(|k| leak || visible_to(k, subject))
        .collect();
    Json(keeps)
}

/// POST /api/keeps
pub(crate) async fn create_keep(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(mut input): Json<KeepInput>,
) -> MockResult<(StatusCode, Json<Value>)> {
    let user = caller(&headers).ok_or(MockError::Unauthorized)?;
    if input.name.trim().is_empty() {
        return Err(MockError::BadRequest("name is required".to_string()));
    }

    let owner = match (state.behavior.trust_client_user_id, input.user_id.take()) {
        (true, Some(claimed)) => claimed,
        _ => user.subject.to_string(),
    };
    if state.behavior.ignore_private_flag {
        input.is_private = false;
    }

    let keep = {
        let mut store = state.store.lock();
        let mut keep = store.insert(&owner, input);
        if state.behavior.nonzero_counters {
            keep.views = 1;
            store.keeps.insert(keep.id, keep.clone());
        }
        keep
    };
    tracing::debug!(id = keep.id, owner = %keep.user_id, "created keep");

    let mut body = serde_json::to_value(&keep)
        .map_err(|e| MockError::Internal(e.to_string()))?;
    if state.behavior.null_image_on_create {
        body["img"] = Value::Null;
    }
    Ok((StatusCode::CREATED, Json(body)))
}

/// GET /api/keeps/{id}
pub(crate) async fn get_keep(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> MockResult<Json<StoredKeep>> {
    let id = parse_id(&id)?;
    let subject = caller(&headers).map(|u| u.subject);

    let keep = state
        .store
        .lock()
        .keeps
        .get(&id)
        .filter(|k| visible_to(k, subject))
        .cloned();
    match keep {
        Some(keep) => Ok(Json(keep)),
        None if state.behavior.missing_is_server_error => {
            Err(MockError::Internal(format!("no row for keep {id}")))
        }
        None => Err(MockError::NotFound(format!("Keep {id}"))),
    }
}

/// PUT /api/keeps/{id}
pub(crate) async fn update_keep(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<KeepInput>,
) -> MockResult<Json<StoredKeep>> {
    let user = caller(&headers).ok_or(MockError::Unauthorized)?;
    let id = parse_id(&id)?;

    let mut store = state.store.lock();
    let keep = store
        .keeps
        .get_mut(&id)
        .ok_or_else(|| MockError::NotFound(format!("Keep {id}")))?;
    if keep.user_id != user.subject {
        return Err(MockError::Forbidden("not the owner of this keep".to_string()));
    }

    if state.behavior.update_clobbers_fields {
        keep.name = input.name;
        keep.description.clear();
    } else if !state.behavior.ignore_updates {
        keep.name = input.name;
        keep.description = input.description;
        keep.img = input.img;
        keep.is_private = input.is_private && !state.behavior.ignore_private_flag;
    }
    Ok(Json(keep.clone()))
}

/// DELETE /api/keeps/{id}
pub(crate) async fn delete_keep(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> MockResult<StatusCode> {
    let user = caller(&headers).ok_or(MockError::Unauthorized)?;
    let id = parse_id(&id)?;

    let mut store = state.store.lock();
    let keep = store
        .keeps
        .get(&id)
        .ok_or_else(|| MockError::NotFound(format!("Keep {id}")))?;
    if keep.user_id != user.subject {
        return Err(MockError::Forbidden("not the owner of this keep".to_string()));
    }

    if !state.behavior.noop_delete {
        store.keeps.remove(&id);
    }
    Ok(StatusCode::NO_CONTENT)
}
