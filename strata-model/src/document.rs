//! Documents and their pending changes

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use strata_core::{DocumentId, RawRecord, Schema, SchemaError};

/// A schema-validated document instance.
///
/// Invariant: the present attribute keys always satisfy
/// `required ⊆ present ⊆ admissible` against the schema the document was
/// constructed with. Mutation goes through [`Document::update`] only,
/// which also tracks the touched fields for the next partial save.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: DocumentId,
    attributes: BTreeMap<String, Value>,
    dirty: BTreeSet<String>,
}

impl Document {
    /// Construct from caller-supplied attributes. Fails with a
    /// [`SchemaError`] naming the offending keys; the dirty set starts
    /// empty.
    pub fn new(
        schema: &Schema,
        id: DocumentId,
        attributes: BTreeMap<String, Value>,
    ) -> Result<Self, SchemaError> {
        schema.validate_construction(attributes.keys().map(String::as_str))?;
        Ok(Self {
            id,
            attributes,
            dirty: BTreeSet::new(),
        })
    }

    /// Construct from a raw store record or a decoded cache entry.
    /// Validation applies the same as for direct construction.
    pub fn from_record(schema: &Schema, record: RawRecord) -> Result<Self, SchemaError> {
        Self::new(schema, record.id, record.fields)
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Fields mutated since construction or the last successful save.
    pub fn dirty_fields(&self) -> &BTreeSet<String> {
        &self.dirty
    }

    /// Merge a partial attribute set and mark its keys dirty.
    ///
    /// Only admissibility is checked; an update cannot remove fields, so
    /// the required bound cannot be violated here. Marking is idempotent:
    /// updating the same key twice keeps it dirty once.
    pub fn update(
        &mut self,
        schema: &Schema,
        patch: BTreeMap<String, Value>,
    ) -> Result<(), SchemaError> {
        schema.validate_update(patch.keys().map(String::as_str))?;
        for (name, value) in patch {
            self.dirty.insert(name.clone());
            self.attributes.insert(name, value);
        }
        Ok(())
    }

    /// Materialize the pending changes as an explicit [`Changeset`].
    ///
    /// Does not clear the dirty set; a save clears it only after the store
    /// write succeeds, so a failed save leaves the changes pending.
    pub fn changeset(&self) -> Changeset {
        let fields = self
            .dirty
            .iter()
            .filter_map(|name| {
                self.attributes
                    .get(name)
                    .map(|value| (name.clone(), value.clone()))
            })
            .collect();
        Changeset { fields }
    }

    /// Clear the dirty set after a successful save.
    pub fn mark_clean(&mut self) {
        self.dirty.clear();
    }
}

/// The exact field set a save will persist: dirty keys with their current
/// values. Produced by [`Document::changeset`], consumed by
/// `ModelContext::save`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Changeset {
    fields: BTreeMap<String, Value>,
}

impl Changeset {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn into_fields(self) -> BTreeMap<String, Value> {
        self.fields
    }
}
