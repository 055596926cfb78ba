//! Cache text codec
//!
//! Cached documents are stored as JSON text of the full raw record. The
//! store's native identifier notation (`ObjectId('<key>')`) is not valid
//! JSON on its own, so the identifier travels as a tagged *string* under
//! the `_id` key, with `\` and `'` inside the key backslash-escaped. The
//! JSON layer independently handles `"` escaping, so the two quoting
//! schemes never collide.
//!
//! The transform is bidirectional and lossless:
//! `decode_record(&encode_record(r)) == r` for every record, including
//! identifiers containing quotes, backslashes, braces, or unicode.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use strata_core::{CodecError, DocumentId, RawRecord};

/// JSON key the identifier is stored under.
const ID_KEY: &str = "_id";

const TAG_PREFIX: &str = "ObjectId('";
const TAG_SUFFIX: &str = "')";

/// Serialize a raw record to the canonical cache text.
pub fn encode_record(record: &RawRecord) -> String {
    let mut object = Map::with_capacity(record.fields.len() + 1);
    object.insert(ID_KEY.to_string(), Value::String(tag_id(&record.id)));
    for (name, value) in &record.fields {
        object.insert(name.clone(), value.clone());
    }
    Value::Object(object).to_string()
}

/// Parse cache text back into a raw record.
pub fn decode_record(text: &str) -> Result<RawRecord, CodecError> {
    let value: Value = serde_json::from_str(text).map_err(|e| CodecError::Malformed {
        reason: e.to_string(),
    })?;
    let Value::Object(mut object) = value else {
        return Err(CodecError::NotAnObject);
    };

    let id_value = object.remove(ID_KEY).ok_or(CodecError::MissingId)?;
    let id = match &id_value {
        Value::String(tagged) => untag_id(tagged)?,
        other => {
            return Err(CodecError::BadIdTag {
                got: other.to_string(),
            })
        }
    };

    let fields: BTreeMap<String, Value> = object.into_iter().collect();
    Ok(RawRecord::new(id, fields))
}

/// Render an identifier in the store's tagged notation, escaping `\` and
/// `'` so the closing `')` stays unambiguous.
fn tag_id(id: &DocumentId) -> String {
    let key = id.as_str();
    let mut escaped = String::with_capacity(key.len());
    for c in key.chars() {
        if c == '\\' || c == '\'' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("{TAG_PREFIX}{escaped}{TAG_SUFFIX}")
}

/// Strip the tag and undo the escaping. A bare `'` inside the payload can
/// only be a truncated terminator, so it is rejected.
fn untag_id(tagged: &str) -> Result<DocumentId, CodecError> {
    let bad = || CodecError::BadIdTag {
        got: tagged.to_string(),
    };

    let inner = tagged
        .strip_prefix(TAG_PREFIX)
        .and_then(|rest| rest.strip_suffix(TAG_SUFFIX))
        .ok_or_else(bad)?;

    let mut key = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped @ ('\\' | '\'')) => key.push(escaped),
                _ => return Err(bad()),
            },
            '\'' => return Err(bad()),
            _ => key.push(c),
        }
    }
    Ok(DocumentId::new(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn record(id: &str) -> RawRecord {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), json!("Hugo"));
        fields.insert("city".to_string(), json!("Huelva"));
        fields.insert(
            "studies".to_string(),
            json!([{ "university": "UPM", "end": 2017 }]),
        );
        RawRecord::new(DocumentId::new(id), fields)
    }

    #[test]
    fn test_round_trip_plain_hex_id() {
        let original = record("5da1bcbfbdaf2e265d79ea78");
        let decoded = decode_record(&encode_record(&original)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_encoded_id_uses_tagged_notation() {
        let text = encode_record(&record("5da1bcbfbdaf2e265d79ea78"));
        assert!(text.contains(r#""_id":"ObjectId('5da1bcbfbdaf2e265d79ea78')""#));
    }

    #[test]
    fn test_round_trip_hostile_identifiers() {
        // Keys that collide with the tag quoting or the JSON quoting.
        for id in [
            "id'with'quotes",
            r#"id"with"double"quotes"#,
            r"id\with\backslashes",
            "id')breakout",
            r"trailing\",
            "trailing'",
            "{braces}[brackets]",
            " número-añejo-日本",
        ] {
            let original = record(id);
            let text = encode_record(&original);
            let decoded = decode_record(&text).unwrap();
            assert_eq!(decoded, original, "id: {id:?}");
        }
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        let err = decode_record("{not json").unwrap_err();
        assert!(matches!(err, CodecError::Malformed { .. }));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let err = decode_record("[1, 2, 3]").unwrap_err();
        assert_eq!(err, CodecError::NotAnObject);
    }

    #[test]
    fn test_decode_rejects_missing_id() {
        let err = decode_record(r#"{"name": "Hugo"}"#).unwrap_err();
        assert_eq!(err, CodecError::MissingId);
    }

    #[test]
    fn test_decode_rejects_untagged_id() {
        let err = decode_record(r#"{"_id": "5da1bcbf", "name": "Hugo"}"#).unwrap_err();
        assert!(matches!(err, CodecError::BadIdTag { .. }));
    }

    #[test]
    fn test_decode_rejects_non_string_id() {
        let err = decode_record(r#"{"_id": 42}"#).unwrap_err();
        assert!(matches!(err, CodecError::BadIdTag { .. }));
    }

    #[test]
    fn test_decode_rejects_stray_quote_in_tag() {
        let err = decode_record(r#"{"_id": "ObjectId('a'b')"}"#).unwrap_err();
        assert!(matches!(err, CodecError::BadIdTag { .. }));
    }

    #[test]
    fn test_decode_rejects_dangling_escape() {
        // JSON "a\\" decodes to `a` `\`; after the terminator is stripped
        // the payload ends in a dangling escape.
        let err = decode_record(r#"{"_id": "ObjectId('a\\')"}"#).unwrap_err();
        assert!(matches!(err, CodecError::BadIdTag { .. }));
    }

    proptest! {
        /// decode(encode(r)) == r for arbitrary identifiers and fields.
        #[test]
        fn prop_codec_round_trips(
            id in ".*",
            fields in proptest::collection::btree_map(
                "[a-z_]{1,12}",
                prop_oneof![
                    any::<i64>().prop_map(|n| json!(n)),
                    any::<bool>().prop_map(|b| json!(b)),
                    ".*".prop_map(|s| json!(s)),
                ],
                0..6,
            )
        ) {
            // The identifier key is reserved for the codec itself.
            prop_assume!(!fields.contains_key("_id"));
            let original = RawRecord::new(DocumentId::new(id), fields);
            let decoded = decode_record(&encode_record(&original)).unwrap();
            prop_assert_eq!(decoded, original);
        }
    }
}
