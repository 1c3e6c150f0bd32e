//! Structural shape checks for response records.
//!
//! A [`Shape`] lists the fields a record must expose and the JSON type each
//! one must have. Checking a record against a shape is a subset test: extra
//! fields are ignored and values are not compared, because servers add
//! fields of their own (ids, owners, counters) that the client never sent.

use std::fmt;

use serde::Serialize;
use serde_json::{json, Map, Value};

/// JSON type expected for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// JSON boolean.
    Bool,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
    /// Any non-null value.
    Any,
}

impl FieldKind {
    /// Infers the kind of a JSON value.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Bool,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
            Value::Null => Self::Any,
        }
    }

    /// Returns whether `value` is compatible with this kind.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Any => !value.is_null(),
            kind => FieldKind::of(value) == kind,
        }
    }

    fn sample(self) -> Value {
        match self {
            Self::String => json!(""),
            Self::Number => json!(0),
            Self::Bool => json!(false),
            Self::Array => json!([]),
            Self::Object | Self::Any => json!({}),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Any => "any",
        };
        f.write_str(name)
    }
}

/// One expected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Field name as it appears in JSON.
    pub name: String,
    /// Expected JSON type.
    pub kind: FieldKind,
    /// Whether `null` is an acceptable value.
    pub nullable: bool,
}

/// Why a record does not match a shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "problem", rename_all = "snake_case")]
pub enum ShapeMismatch {
    /// The record is not a JSON object.
    NotAnObject,
    /// A field is absent.
    Missing {
        /// Field name.
        field: String,
    },
    /// A field is present with the wrong type.
    WrongType {
        /// Field name.
        field: String,
        /// Expected kind.
        expected: FieldKind,
        /// Kind found in the record.
        found: String,
    },
}

impl fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => f.write_str("record is not an object"),
            Self::Missing { field } => write!(f, "missing field '{field}'"),
            Self::WrongType {
                field,
                expected,
                found,
            } => write!(f, "field '{field}' should be {expected}, found {found}"),
        }
    }
}

/// Expected-fields descriptor for one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shape {
    name: String,
    fields: Vec<Field>,
}

impl Shape {
    /// Creates an empty shape.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a required, non-null field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(Field {
            name: name.into(),
            kind,
            nullable: false,
        });
        self
    }

    /// Adds a required field that may be `null`.
    #[must_use]
    pub fn nullable(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(Field {
            name: name.into(),
            kind,
            nullable: true,
        });
        self
    }

    /// Derives a shape from a sample object: every key becomes a required
    /// field of the sample value's type.
    pub fn from_sample(name: impl Into<String>, sample: &Value) -> Self {
        let mut shape = Self::new(name);
        if let Value::Object(map) = sample {
            for (key, value) in map {
                shape = if value.is_null() {
                    shape.nullable(key.clone(), FieldKind::Any)
                } else {
                    shape.field(key.clone(), FieldKind::of(value))
                };
            }
        }
        shape
    }

    /// Shape name (e.g. `Keep`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expected fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Checks `actual` against this shape, collecting every mismatch.
    pub fn check(&self, actual: &Value) -> Result<(), Vec<ShapeMismatch>> {
        let Value::Object(map) = actual else {
            return Err(vec![ShapeMismatch::NotAnObject]);
        };

        let mismatches: Vec<ShapeMismatch> = self
            .fields
            .iter()
            .filter_map(|field| check_field(field, map))
            .collect();

        if mismatches.is_empty() {
            Ok(())
        } else {
            Err(mismatches)
        }
    }

    /// Renders a placeholder object with one entry per field.
    ///
    /// Used as the "expected" side of unexpected-error reports.
    #[must_use]
    pub fn sample(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| {
                let value = if f.nullable { Value::Null } else { f.kind.sample() };
                (f.name.clone(), value)
            })
            .collect();
        Value::Object(map)
    }
}

fn check_field(field: &Field, map: &Map<String, Value>) -> Option<ShapeMismatch> {
    match map.get(&field.name) {
        None => Some(ShapeMismatch::Missing {
            field: field.name.clone(),
        }),
        Some(Value::Null) if field.nullable => None,
        Some(value) if field.kind.accepts(value) => None,
        Some(value) => Some(ShapeMismatch::WrongType {
            field: field.name.clone(),
            expected: field.kind,
            found: if value.is_null() {
                "null".to_string()
            } else {
                FieldKind::of(value).to_string()
            },
        }),
    }
}

/// Returns whether every field of `expected` is present in `actual` with a
/// compatible type.
#[must_use]
pub fn verify_is_same(expected: &Shape, actual: &Value) -> bool {
    match expected.check(actual) {
        Ok(()) => true,
        Err(mismatches) => {
            for mismatch in &mismatches {
                tracing::debug!(shape = expected.name(), %mismatch, "shape mismatch");
            }
            false
        }
    }
}
