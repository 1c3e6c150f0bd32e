//! Scoped ownership of records created during a test.

use std::ops::Deref;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientResult;
use crate::resource::{Identified, RecordId, ResourceClient};

/// A record created on the server that must be deleted again.
///
/// Call [`Scoped::release`] on every normal exit path. If the guard is
/// dropped without being released (a panic, an early return, a cancelled
/// future), the deletion is spawned onto the current Tokio runtime.
#[derive(Debug)]
pub struct Scoped<T> {
    resource: ResourceClient,
    id: Option<RecordId>,
    record: T,
}

impl<T: Identified> Scoped<T> {
    /// Wraps a freshly created record.
    pub fn new(resource: ResourceClient, record: T) -> Self {
        let id = record.record_id();
        if id.is_none() {
            tracing::warn!(
                path = resource.base_path(),
                "created record has no id; it cannot be cleaned up"
            );
        }
        Self {
            resource,
            id,
            record,
        }
    }
}

impl Scoped<Value> {
    /// Decodes the raw record into `U`, keeping the same cleanup.
    ///
    /// The record is deleted before the decode error is returned.
    pub async fn decode<U: DeserializeOwned>(mut self) -> ClientResult<Scoped<U>> {
        match serde_json::from_value::<U>(self.record.clone()) {
            Ok(record) => Ok(Scoped {
                resource: self.resource.clone(),
                id: self.id.take(),
                record,
            }),
            Err(e) => {
                let path = self.resource.base_path().to_string();
                if let Err(cleanup) = self.release().await {
                    tracing::warn!(%path, error = %cleanup, "cleanup after decode failure failed");
                }
                Err(e.into())
            }
        }
    }
}

impl<T> Scoped<T> {
    /// Gets the created record.
    pub fn record(&self) -> &T {
        &self.record
    }

    /// Gets the identifier that will be deleted on release.
    pub fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    /// Marks the record as already deleted so no cleanup is issued.
    pub fn disarm(&mut self) {
        self.id = None;
    }

    /// Deletes the record now.
    pub async fn release(mut self) -> ClientResult<()> {
        match self.id.take() {
            Some(id) => {
                tracing::debug!(path = self.resource.base_path(), %id, "releasing scoped record");
                self.resource.delete(&id).await
            }
            None => Ok(()),
        }
    }
}

impl<T> Deref for Scoped<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.record
    }
}

impl<T> Drop for Scoped<T> {
    fn drop(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let resource = self.resource.clone();
                handle.spawn(async move {
                    if let Err(e) = resource.delete(&id).await {
                        tracing::warn!(path = resource.base_path(), %id, error = %e, "deferred cleanup failed");
                    }
                });
            }
            Err(_) => {
                tracing::warn!(
                    path = self.resource.base_path(),
                    %id,
                    "scoped record dropped outside a runtime; not deleted"
                );
            }
        }
    }
}
