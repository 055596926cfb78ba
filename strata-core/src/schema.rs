//! Required/admissible field schemas for document types
//!
//! A schema is loaded once from an external definition and validated
//! against a fixed registry of known field names before any document is
//! constructed. All validation happens against these sets; documents
//! never carry a private copy.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Serde mirror of the external schema document.
///
/// ```json
/// { "required_vars": ["name", "city"], "admissible_vars": ["name", "city", "job"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDef {
    pub required_vars: Vec<String>,
    pub admissible_vars: Vec<String>,
}

/// Fixed registry of field names a deployment knows about.
///
/// Schema definitions are data-driven, but they may only refer to names
/// registered here; an unknown name in a definition is a load-time error,
/// not a runtime surprise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRegistry {
    names: BTreeSet<String>,
}

impl FieldRegistry {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// Validated required/admissible field sets for one document type.
///
/// Invariant: `required ⊆ admissible`, and every name is known to the
/// registry the schema was loaded against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    required: BTreeSet<String>,
    admissible: BTreeSet<String>,
}

impl Schema {
    /// Validate a parsed definition against the registry.
    pub fn from_def(def: SchemaDef, registry: &FieldRegistry) -> Result<Self, SchemaError> {
        let required: BTreeSet<String> = def.required_vars.into_iter().collect();
        let admissible: BTreeSet<String> = def.admissible_vars.into_iter().collect();

        for name in required.iter().chain(admissible.iter()) {
            if !registry.contains(name) {
                return Err(SchemaError::UnknownField {
                    field: name.clone(),
                });
            }
        }

        let stray: Vec<String> = required.difference(&admissible).cloned().collect();
        if !stray.is_empty() {
            return Err(SchemaError::RequiredNotAdmissible { fields: stray });
        }

        Ok(Self {
            required,
            admissible,
        })
    }

    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    pub fn admissible(&self) -> &BTreeSet<String> {
        &self.admissible
    }

    /// Check the construction bound: `required ⊆ keys ⊆ admissible`.
    ///
    /// The error names the offending keys; missing required fields are
    /// reported ahead of inadmissible extras.
    pub fn validate_construction<'a, I>(&self, keys: I) -> Result<(), SchemaError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: BTreeSet<&str> = keys.into_iter().collect();

        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|r| !present.contains(r.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingRequired { missing });
        }

        self.check_admissible(&present)
    }

    /// Check the update bound: `keys ⊆ admissible`.
    pub fn validate_update<'a, I>(&self, keys: I) -> Result<(), SchemaError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: BTreeSet<&str> = keys.into_iter().collect();
        self.check_admissible(&present)
    }

    fn check_admissible(&self, present: &BTreeSet<&str>) -> Result<(), SchemaError> {
        let offending: Vec<String> = present
            .iter()
            .filter(|k| !self.admissible.contains(**k))
            .map(|k| k.to_string())
            .collect();
        if !offending.is_empty() {
            return Err(SchemaError::NotAdmissible { offending });
        }
        Ok(())
    }
}
