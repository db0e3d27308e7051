//! Value coercion into declared shapes.

use super::bind_struct;
use crate::cast;
use crate::error::BindError;
use crate::hooks::Hooks;
use crate::schema::{ScalarKind, Shape, StructSpec};
use crate::target::{Bound, Record};
use crate::value::{Map, Value};
use indexmap::IndexMap;
use std::sync::Arc;

/// Coerce `value` into `shape` and store it in `slot`.
///
/// A null value leaves the slot at its current value unless `default` is set,
/// in which case the default literal is coerced instead. For scalar shapes the
/// default also replaces an empty string (string, bool) or a zero number
/// (int, uint, float); a supplied `0` cannot be told apart from a missing one.
pub fn assign_value(
    shape: &Shape,
    slot: &mut Bound,
    value: &Value,
    default: Option<&str>,
    hooks: &Hooks,
) -> Result<(), BindError> {
    let fallback;
    let value = match (value, default) {
        (Value::Null, None) => return Ok(()),
        (Value::Null, Some(literal)) => {
            fallback = Value::from(literal);
            &fallback
        }
        (value, _) => value,
    };
    assign_present(shape, slot, value, default, hooks)
}

fn assign_present(
    shape: &Shape,
    slot: &mut Bound,
    value: &Value,
    default: Option<&str>,
    hooks: &Hooks,
) -> Result<(), BindError> {
    match shape {
        Shape::Pointer(inner) => {
            let mut cell = Bound::zero(inner);
            assign_present(inner, &mut cell, value, default, hooks)?;
            *slot = cell;
        }
        Shape::Opaque => *slot = Bound::Any(value.clone()),
        Shape::Scalar(kind) => *slot = coerce_scalar(*kind, value, default)?,
        Shape::Structure(spec) => {
            let map = expect_map(value)?;
            *slot = Bound::Record(bind_new(spec, Some(map), hooks)?);
        }
        Shape::Sequence(element) => {
            let items = match value {
                Value::List(items) => items,
                other => return Err(mismatch("sequence", other)),
            };
            let mut bound = Vec::with_capacity(items.len());
            for item in items {
                let mut cell = Bound::zero(element);
                assign_value(element, &mut cell, item, None, hooks)?;
                bound.push(cell);
            }
            match slot {
                Bound::Seq(existing) => existing.extend(bound),
                other => *other = Bound::Seq(bound),
            }
        }
        Shape::Mapping(element) => {
            let map = expect_map(value)?;
            let mut bound = IndexMap::with_capacity(map.len());
            for (key, item) in map {
                let mut cell = Bound::zero(element);
                assign_value(element, &mut cell, item, None, hooks)?;
                bound.insert(key.clone(), cell);
            }
            *slot = Bound::Map(bound);
        }
    }
    Ok(())
}

/// Bind an embedded struct field from the enclosing mapping.
pub(super) fn assign_embedded(
    shape: &Shape,
    slot: &mut Bound,
    source: Option<&Map>,
    hooks: &Hooks,
) -> Result<(), BindError> {
    let Some(map) = source else {
        return Ok(());
    };
    match shape {
        Shape::Structure(spec) => *slot = Bound::Record(bind_new(spec, Some(map), hooks)?),
        Shape::Pointer(inner) => {
            let mut cell = Bound::zero(inner);
            assign_embedded(inner, &mut cell, source, hooks)?;
            *slot = cell;
        }
        _ => {
            return Err(BindError::TypeMismatch {
                expected: "struct",
                actual: "embedded non-struct field",
            })
        }
    }
    Ok(())
}

/// Bind into a fresh record so a failure never leaves a half-built nested
/// value in the slot.
fn bind_new(spec: &Arc<StructSpec>, map: Option<&Map>, hooks: &Hooks) -> Result<Record, BindError> {
    let mut record = Record::new(spec);
    bind_struct(map, &mut record, hooks)?;
    Ok(record)
}

fn coerce_scalar(kind: ScalarKind, value: &Value, default: Option<&str>) -> Result<Bound, BindError> {
    if matches!(value, Value::List(_) | Value::Map(_)) {
        return Err(mismatch(kind.name(), value));
    }
    let default = default.map(Value::from);

    Ok(match kind {
        ScalarKind::String => {
            let text = cast::to_string(value);
            match default {
                Some(Value::String(d)) if text.is_empty() => Bound::Str(d),
                _ => Bound::Str(text),
            }
        }
        ScalarKind::Bool => {
            let value = match &default {
                Some(d) if cast::to_string(value).is_empty() => d,
                _ => value,
            };
            Bound::Bool(cast::to_bool(value)?)
        }
        ScalarKind::Int => {
            let n = cast::to_i64(value)?;
            match &default {
                Some(d) if n == 0 => Bound::Int(cast::to_i64(d)?),
                _ => Bound::Int(n),
            }
        }
        ScalarKind::Uint => {
            let n = cast::to_u64(value)?;
            match &default {
                Some(d) if n == 0 => Bound::Uint(cast::to_u64(d)?),
                _ => Bound::Uint(n),
            }
        }
        ScalarKind::Float => {
            let n = cast::to_f64(value)?;
            match &default {
                Some(d) if n == 0.0 => Bound::Float(cast::to_f64(d)?),
                _ => Bound::Float(n),
            }
        }
    })
}

fn expect_map(value: &Value) -> Result<&Map, BindError> {
    match value {
        Value::Map(map) => Ok(map),
        other => Err(mismatch("mapping", other)),
    }
}

fn mismatch(expected: &'static str, actual: &Value) -> BindError {
    BindError::TypeMismatch {
        expected,
        actual: actual.kind(),
    }
}
