//! Struct binding.
//!
//! [`bind_struct`] walks a record's fields in declaration order, pulls each
//! field's raw value out of the source mapping, runs hooks, checks the
//! required flag and hands the value to [`assign_value`]. Nested structures
//! come back here through the coercer, so the walk is depth-first.
//!
//! Binding stops at the first error. Fields bound before the failure keep
//! their new values; there is no rollback.

mod coerce;

pub use coerce::assign_value;

use crate::cast;
use crate::error::BindError;
use crate::hooks::Hooks;
use crate::target::Record;
use crate::value::{Map, Value};
use std::borrow::Cow;
use std::sync::Arc;

/// Populate `record` from `source`.
///
/// A `None` source still visits every field: defaults are applied and
/// required fields fail.
pub fn bind_struct(
    source: Option<&Map>,
    record: &mut Record,
    hooks: &Hooks,
) -> Result<(), BindError> {
    let spec = Arc::clone(record.spec());
    tracing::debug!(structure = spec.name(), "binding struct");

    for (index, field) in spec.fields().iter().enumerate() {
        if field.is_skipped() {
            continue;
        }
        let key = field.source_key();
        let slot = record.slot_mut(index);

        if field.is_embedded() {
            tracing::trace!(field = field.name(), "binding embedded field");
            coerce::assign_embedded(field.shape(), slot, source, hooks)
                .map_err(|e| e.in_field(field.name(), key))?;
            continue;
        }

        let value = match source.and_then(|m| m.get(key)) {
            Some(raw) if matches!(raw, Value::String(_)) => Cow::Owned(
                hooks
                    .apply(raw.clone())
                    .map_err(|e| BindError::from(e).in_field(field.name(), key))?,
            ),
            Some(raw) => Cow::Borrowed(raw),
            None => Cow::Owned(Value::Null),
        };

        if field.is_required() && is_blank(&value) {
            return Err(BindError::RequiredFieldMissing {
                field: field.name().to_string(),
                key: key.to_string(),
            });
        }

        tracing::trace!(field = field.name(), key, kind = value.kind(), "binding field");
        assign_value(field.shape(), slot, &value, field.default_literal(), hooks)
            .map_err(|e| e.in_field(field.name(), key))?;
    }

    Ok(())
}

fn is_blank(value: &Value) -> bool {
    value.is_null() || cast::to_string(value).is_empty()
}
