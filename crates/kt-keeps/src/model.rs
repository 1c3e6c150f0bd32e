//! Keep resource model.

use kt_client::{Identified, RecordId};
use kt_harness::{FieldKind, Shape};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder image used by every fixture.
pub const PLACEHOLDER_IMG: &str = "//placehold.it/200x200";

/// Owner id sent by the create test; the server must ignore it.
pub const UNTRUSTED_USER_ID: &str = "dont trust the front end";

/// A saved item: name, description, image, privacy flag, owner, counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keep {
    /// Server-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Image reference.
    pub img: String,
    /// Hidden from users other than the owner.
    #[serde(default)]
    pub is_private: bool,
    /// Owning user; assigned by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Share count.
    #[serde(default)]
    pub shares: u64,
    /// View count.
    #[serde(default)]
    pub views: u64,
    /// Keep count.
    #[serde(default)]
    pub keeps: u64,
}

impl Keep {
    /// Creates an unsaved public keep with zeroed counters.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        img: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            img: img.into(),
            is_private: false,
            user_id: None,
            shares: 0,
            views: 0,
            keeps: 0,
        }
    }

    /// Sets the privacy flag.
    #[must_use]
    pub fn private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }

    /// Sets a client-side owner id.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// The standard test keep.
    #[must_use]
    pub fn fixture() -> Self {
        Self::new("TEST__KEEP", "KEEP__DESCRIPTION", PLACEHOLDER_IMG)
    }

    /// Keep created only to be deleted.
    #[must_use]
    pub fn deletable_fixture() -> Self {
        Self::new(
            "TEST__KEEP__DELETABLE",
            "KEEP__DESCRIPTION_SHOULD_GET_DELETED",
            PLACEHOLDER_IMG,
        )
    }

    /// Keep created with the privacy flag set.
    #[must_use]
    pub fn private_fixture() -> Self {
        Self::new("TEST__KEEP__PRIVATE", "KEEP__SHOULD_BE_PRIVATE", PLACEHOLDER_IMG).private(true)
    }

    /// Expected-fields descriptor for keep records.
    #[must_use]
    pub fn shape() -> Shape {
        Shape::new("Keep")
            .field("name", FieldKind::String)
            .field("description", FieldKind::String)
            .field("img", FieldKind::String)
            .field("isPrivate", FieldKind::Bool)
            .field("shares", FieldKind::Number)
            .field("views", FieldKind::Number)
            .field("keeps", FieldKind::Number)
    }

    /// Returns whether only `name` differs between `self` and `other`,
    /// ignoring server-owned counters.
    #[must_use]
    pub fn same_content_except_name(&self, other: &Self) -> bool {
        self.description == other.description
            && self.img == other.img
            && self.is_private == other.is_private
    }
}

impl Identified for Keep {
    fn record_id(&self) -> Option<RecordId> {
        self.id.clone()
    }
}

/// Reads the privacy flag of a raw keep record; absent means public.
pub(crate) fn is_private(record: &Value) -> bool {
    record
        .get("isPrivate")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Reads the owner of a raw keep record.
pub(crate) fn owner(record: &Value) -> Option<&str> {
    record.get("userId").and_then(Value::as_str)
}
