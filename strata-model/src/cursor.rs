//! Lazy cursor yielding documents from a query result

use crate::document::Document;
use strata_core::{Schema, StoreError, StrataResult};
use strata_store::RecordCursor;

/// Wraps a raw query result handle and yields validated documents one at
/// a time. Finite and not restartable: once exhausted, a new query must
/// be issued to iterate again.
pub struct DocumentCursor {
    schema: Schema,
    inner: Box<dyn RecordCursor>,
}

impl DocumentCursor {
    pub fn new(schema: Schema, inner: Box<dyn RecordCursor>) -> Self {
        Self { schema, inner }
    }

    /// True iff the underlying result handle has more unread records.
    /// Does not advance the cursor.
    pub fn has_next(&self) -> bool {
        self.inner.has_more()
    }

    /// Advance and construct the next document. Schema validation applies
    /// to every record the cursor yields; reading past the end fails with
    /// [`StoreError::CursorExhausted`].
    pub async fn next(&mut self) -> StrataResult<Document> {
        match self.inner.advance().await? {
            Some(record) => Ok(Document::from_record(&self.schema, record)?),
            None => Err(StoreError::CursorExhausted.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::{BTreeMap, VecDeque};
    use strata_core::{DocumentId, FieldRegistry, RawRecord, SchemaDef, StrataError};
    use strata_store::MemoryCursor;

    fn schema() -> Schema {
        let registry = FieldRegistry::new(["name", "city"]);
        Schema::from_def(
            SchemaDef {
                required_vars: vec!["name".to_string()],
                admissible_vars: vec!["name".to_string(), "city".to_string()],
            },
            &registry,
        )
        .unwrap()
    }

    fn record(id: &str, name: &str) -> RawRecord {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), json!(name));
        RawRecord::new(DocumentId::new(id), fields)
    }

    #[tokio::test]
    async fn test_cursor_yields_documents_in_order() {
        let queue: VecDeque<RawRecord> =
            [record("a", "Hugo"), record("b", "Javier")].into_iter().collect();
        let mut cursor = DocumentCursor::new(schema(), Box::new(MemoryCursor::new(queue)));

        assert!(cursor.has_next());
        assert_eq!(cursor.next().await.unwrap().id().as_str(), "a");
        assert!(cursor.has_next());
        assert_eq!(cursor.next().await.unwrap().id().as_str(), "b");
        assert!(!cursor.has_next());
    }

    #[tokio::test]
    async fn test_next_past_end_is_exhausted() {
        let mut cursor =
            DocumentCursor::new(schema(), Box::new(MemoryCursor::new(VecDeque::new())));
        assert!(!cursor.has_next());
        let err = cursor.next().await.unwrap_err();
        assert_eq!(err, StrataError::Store(StoreError::CursorExhausted));
    }

    #[tokio::test]
    async fn test_has_next_does_not_advance() {
        let queue: VecDeque<RawRecord> = [record("a", "Hugo")].into_iter().collect();
        let mut cursor = DocumentCursor::new(schema(), Box::new(MemoryCursor::new(queue)));

        assert!(cursor.has_next());
        assert!(cursor.has_next());
        assert_eq!(cursor.next().await.unwrap().id().as_str(), "a");
    }

    #[tokio::test]
    async fn test_yielded_records_are_validated() {
        // Record missing the required "name" field.
        let bad = RawRecord::new(DocumentId::new("x"), BTreeMap::new());
        let queue: VecDeque<RawRecord> = [bad].into_iter().collect();
        let mut cursor = DocumentCursor::new(schema(), Box::new(MemoryCursor::new(queue)));

        let err = cursor.next().await.unwrap_err();
        assert!(matches!(err, StrataError::Schema(_)));
    }
}
