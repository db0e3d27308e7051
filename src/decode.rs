//! Document entry points: parse bytes into a source mapping, then bind.

use crate::bind::bind_struct;
use crate::error::{BindError, SourceError};
use crate::hooks::Hooks;
use crate::schema::StructSpec;
use crate::target::Record;
use crate::value::{Map, Value};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use std::sync::Arc;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Parse a JSON document into its root mapping.
///
/// A literal `null` document yields `None`; any other non-object root is an
/// error.
pub fn parse_source(bytes: &[u8]) -> Result<Option<Map>, SourceError> {
    let json: serde_json::Value = serde_json::from_slice(bytes)?;
    match Value::from(json) {
        Value::Map(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        other => Err(SourceError::NotAnObject {
            actual: other.kind(),
        }),
    }
}

/// Decode a JSON document into a new record of `spec`.
///
/// # Example
///
/// ```
/// use docbind::{unmarshal, FieldSpec, Hooks, Shape, StructSpec};
///
/// let spec = StructSpec::builder("Config")
///     .field(FieldSpec::from_tag("Nation", Shape::int(), r#"json:"nation" default:"56""#))
///     .build()
///     .unwrap();
///
/// let record = unmarshal(br#"{"nation": 0}"#, &spec, &Hooks::new()).unwrap();
/// assert_eq!(record.int("Nation"), Some(56));
/// ```
pub fn unmarshal(bytes: &[u8], spec: &Arc<StructSpec>, hooks: &Hooks) -> Result<Record, BindError> {
    let mut record = Record::new(spec);
    bind_into(bytes, &mut record, hooks)?;
    Ok(record)
}

pub fn unmarshal_str(json: &str, spec: &Arc<StructSpec>, hooks: &Hooks) -> Result<Record, BindError> {
    unmarshal(json.as_bytes(), spec, hooks)
}

/// Read and decode a JSON file. A leading UTF-8 byte-order mark is ignored.
pub fn unmarshal_file<P: AsRef<Path>>(
    path: P,
    spec: &Arc<StructSpec>,
    hooks: &Hooks,
) -> Result<Record, BindError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(SourceError::from)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read document");
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);
    unmarshal(bytes, spec, hooks)
}

/// Bind a JSON document into an existing record.
///
/// Fields absent from the document and without a default keep whatever the
/// record already holds, and sequence fields are appended to.
pub fn bind_into(bytes: &[u8], record: &mut Record, hooks: &Hooks) -> Result<(), BindError> {
    let source = parse_source(bytes)?;
    bind_struct(source.as_ref(), record, hooks)
}

/// Decode and convert into a Rust type whose serde field names match the
/// schema's field names.
pub fn unmarshal_into<T: DeserializeOwned>(
    bytes: &[u8],
    spec: &Arc<StructSpec>,
    hooks: &Hooks,
) -> Result<T, BindError> {
    unmarshal(bytes, spec, hooks)?.deserialize_into()
}
