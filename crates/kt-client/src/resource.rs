//! CRUD helpers for one REST resource.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::scoped::Scoped;

/// Server-assigned record identifier.
///
/// Servers use either integer or string keys; the original JSON form is
/// preserved so that records can be sent back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Integer key.
    Number(i64),
    /// String key (UUIDs, slugs).
    Text(String),
}

impl RecordId {
    /// Reads an identifier from a JSON value.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Number),
            Value::String(s) if !s.is_empty() => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Records that may carry a server-assigned identifier.
pub trait Identified {
    /// Returns the record identifier, if assigned.
    fn record_id(&self) -> Option<RecordId>;
}

impl Identified for Value {
    fn record_id(&self) -> Option<RecordId> {
        self.get("id").and_then(RecordId::from_value)
    }
}

/// CRUD client for the resource rooted at `base_path`.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    api: ApiClient,
    base_path: String,
}

impl ResourceClient {
    /// Creates a resource client.
    pub fn new(api: ApiClient, base_path: impl Into<String>) -> Self {
        let base_path = base_path.into();
        let base_path = format!("/{}", base_path.trim_matches('/'));
        Self { api, base_path }
    }

    /// Gets the resource base path (e.g. `/api/keeps`).
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Gets the absolute collection URL.
    #[must_use]
    pub fn collection_url(&self) -> String {
        self.api.url(&self.base_path)
    }

    /// Gets the underlying API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Gets the underlying API client for token changes.
    pub fn api_mut(&mut self) -> &mut ApiClient {
        &mut self.api
    }

    fn item_path(&self, id: &RecordId) -> String {
        format!("{}/{}", self.base_path, id)
    }

    /// GET the collection, or a sub-path of it.
    pub async fn get<T: DeserializeOwned>(&self, sub_path: Option<&str>) -> ClientResult<T> {
        match sub_path {
            Some(sub) => {
                let path = format!("{}/{}", self.base_path, sub.trim_start_matches('/'));
                self.api.get(&path).await
            }
            None => self.api.get(&self.base_path).await,
        }
    }

    /// GET one record by identifier.
    pub async fn get_by_id<T: DeserializeOwned>(&self, id: &RecordId) -> ClientResult<T> {
        self.api.get(&self.item_path(id)).await
    }

    /// POST a new record.
    pub async fn create<B, T>(&self, payload: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.api.post(&self.base_path, payload).await
    }

    /// PUT a record back to its own identifier.
    ///
    /// ## Errors
    ///
    /// Returns `ClientError::MissingId` if the payload has no identifier.
    pub async fn update<B, T>(&self, payload: &B) -> ClientResult<T>
    where
        B: Serialize + Identified,
        T: DeserializeOwned,
    {
        let id = payload.record_id().ok_or(ClientError::MissingId)?;
        self.api.put(&self.item_path(&id), payload).await
    }

    /// DELETE a record by identifier.
    pub async fn delete(&self, id: &RecordId) -> ClientResult<()> {
        self.api.delete(&self.item_path(id)).await
    }

    /// POST a new record and bind its deletion to the returned guard.
    ///
    /// The guard is armed from the raw response, so a body that does not
    /// decode into `T` is still deleted.
    pub async fn create_scoped<B, T>(&self, payload: &B) -> ClientResult<Scoped<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let raw: Value = self.create(payload).await?;
        Scoped::new(self.clone(), raw).decode().await
    }
}
