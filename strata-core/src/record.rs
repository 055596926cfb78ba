//! Raw store records and typed projections of them

use crate::error::StoreError;
use crate::identity::DocumentId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A document exactly as the persistent store returns it: the assigned
/// identifier plus the remaining fields.
///
/// `fields` never contains the identifier key; the codec re-attaches it
/// under `_id` when serializing for the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: DocumentId,
    pub fields: BTreeMap<String, Value>,
}

impl RawRecord {
    pub fn new(id: DocumentId, fields: BTreeMap<String, Value>) -> Self {
        Self { id, fields }
    }

    /// Names of the fields present on this record.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Account record used by the session manager for credential checks.
///
/// The stored password is a salted digest in `salt$hexdigest` form, never
/// the plaintext password itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub password_digest: String,
    pub privileges: i64,
}

impl UserRecord {
    /// Project a raw store record into a user record.
    ///
    /// The store is a black box, so a record reached via the username index
    /// can still be shaped wrong; that surfaces as `MalformedRecord` rather
    /// than a panic.
    pub fn from_record(record: &RawRecord) -> Result<Self, StoreError> {
        let username = string_field(record, "username")?;
        let password_digest = string_field(record, "password")?;
        let privileges = record
            .fields
            .get("privileges")
            .and_then(Value::as_i64)
            .ok_or_else(|| StoreError::MalformedRecord {
                reason: "missing or non-integer privileges".to_string(),
            })?;

        Ok(Self {
            username,
            password_digest,
            privileges,
        })
    }
}

fn string_field(record: &RawRecord, name: &str) -> Result<String, StoreError> {
    record
        .fields
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::MalformedRecord {
            reason: format!("missing or non-string {name}"),
        })
}
