//! Bound object graph.
//!
//! A [`Record`] is an instance of a [`StructSpec`]: one [`Bound`] slot per
//! declared field, created at the zero value of the field's shape and
//! overwritten in place by the binder.

use crate::error::BindError;
use crate::schema::{ScalarKind, Shape, StructSpec};
use crate::value::Value;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// A bound field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    /// Unset pointer or opaque slot
    Null,
    Str(String),
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Record(Record),
    Seq(Vec<Bound>),
    Map(IndexMap<String, Bound>),
    Any(Value),
}

impl Bound {
    /// Zero value for a shape. Pointers and opaque slots start as null,
    /// nested structures start as zeroed records.
    pub fn zero(shape: &Shape) -> Bound {
        match shape {
            Shape::Scalar(ScalarKind::String) => Bound::Str(String::new()),
            Shape::Scalar(ScalarKind::Bool) => Bound::Bool(false),
            Shape::Scalar(ScalarKind::Int) => Bound::Int(0),
            Shape::Scalar(ScalarKind::Uint) => Bound::Uint(0),
            Shape::Scalar(ScalarKind::Float) => Bound::Float(0.0),
            Shape::Structure(spec) => Bound::Record(Record::new(spec)),
            Shape::Sequence(_) => Bound::Seq(Vec::new()),
            Shape::Mapping(_) => Bound::Map(IndexMap::new()),
            Shape::Pointer(_) | Shape::Opaque => Bound::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Bound::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Bound::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Bound::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Bound::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Bound::Uint(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Bound::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Bound::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Bound]> {
        match self {
            Bound::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Bound>> {
        match self {
            Bound::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_any(&self) -> Option<&Value> {
        match self {
            Bound::Any(v) => Some(v),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Bound::Null => serde_json::Value::Null,
            Bound::Str(s) => serde_json::Value::String(s.clone()),
            Bound::Bool(b) => serde_json::Value::Bool(*b),
            Bound::Int(i) => serde_json::Value::from(*i),
            Bound::Uint(u) => serde_json::Value::from(*u),
            Bound::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Bound::Record(r) => r.to_json(),
            Bound::Seq(items) => serde_json::Value::Array(items.iter().map(Bound::to_json).collect()),
            Bound::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Bound::Any(v) => v.to_json(),
        }
    }
}

/// An instance of a [`StructSpec`].
#[derive(Debug, Clone)]
pub struct Record {
    spec: Arc<StructSpec>,
    slots: Vec<Bound>,
}

impl Record {
    /// A record with every field at its zero value.
    pub fn new(spec: &Arc<StructSpec>) -> Self {
        Self {
            spec: Arc::clone(spec),
            slots: spec.fields().iter().map(|f| Bound::zero(f.shape())).collect(),
        }
    }

    pub fn spec(&self) -> &Arc<StructSpec> {
        &self.spec
    }

    pub fn get(&self, field: &str) -> Option<&Bound> {
        self.spec.position(field).map(|i| &self.slots[i])
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut Bound> {
        let index = self.spec.position(field)?;
        Some(&mut self.slots[index])
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut Bound {
        &mut self.slots[index]
    }

    /// Field name and value pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bound)> {
        self.spec.fields().iter().map(|f| f.name()).zip(self.slots.iter())
    }

    pub fn str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Bound::as_str)
    }

    pub fn bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Bound::as_bool)
    }

    pub fn int(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Bound::as_i64)
    }

    pub fn uint(&self, field: &str) -> Option<u64> {
        self.get(field).and_then(Bound::as_u64)
    }

    pub fn float(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Bound::as_f64)
    }

    pub fn record(&self, field: &str) -> Option<&Record> {
        self.get(field).and_then(Bound::as_record)
    }

    pub fn seq(&self, field: &str) -> Option<&[Bound]> {
        self.get(field).and_then(Bound::as_seq)
    }

    pub fn map(&self, field: &str) -> Option<&IndexMap<String, Bound>> {
        self.get(field).and_then(Bound::as_map)
    }

    /// JSON object keyed by field name. Skipped fields keep their zero value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.iter()
                .map(|(name, value)| (name.to_string(), value.to_json()))
                .collect(),
        )
    }

    /// Convert into a Rust type whose serde field names match the record's
    /// field names.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, BindError> {
        serde_json::from_value(self.to_json()).map_err(BindError::Deserialize)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.spec.name() == other.spec.name() && self.slots == other.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;
    use serde::Deserialize;
    use serde_json::json;

    fn spec() -> Arc<StructSpec> {
        let inner = StructSpec::builder("Inner")
            .field(FieldSpec::new("Flag", Shape::bool()))
            .build()
            .unwrap();
        StructSpec::builder("Outer")
            .field(FieldSpec::new("Name", Shape::string()))
            .field(FieldSpec::new("Count", Shape::uint()))
            .field(FieldSpec::new("Ratio", Shape::pointer(Shape::float())))
            .field(FieldSpec::new("Inner", Shape::structure(&inner)))
            .field(FieldSpec::new("Tags", Shape::seq(Shape::string())))
            .field(FieldSpec::new("Extra", Shape::Opaque))
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_record_is_zeroed() {
        let record = Record::new(&spec());
        assert_eq!(record.str("Name"), Some(""));
        assert_eq!(record.uint("Count"), Some(0));
        assert!(record.get("Ratio").unwrap().is_null());
        assert_eq!(record.record("Inner").unwrap().bool("Flag"), Some(false));
        assert_eq!(record.seq("Tags").map(|s| s.len()), Some(0));
        assert!(record.get("Missing").is_none());
    }

    #[test]
    fn test_to_json_uses_field_names() {
        let mut record = Record::new(&spec());
        *record.get_mut("Name").unwrap() = Bound::Str("x".to_string());
        assert_eq!(
            record.to_json(),
            json!({
                "Name": "x",
                "Count": 0,
                "Ratio": null,
                "Inner": {"Flag": false},
                "Tags": [],
                "Extra": null
            })
        );
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "PascalCase")]
    struct Outer {
        name: String,
        count: u8,
        ratio: Option<f64>,
        tags: Vec<String>,
    }

    #[test]
    fn test_deserialize_into_typed_struct() {
        let mut record = Record::new(&spec());
        *record.get_mut("Count").unwrap() = Bound::Uint(7);
        *record.get_mut("Ratio").unwrap() = Bound::Float(0.5);
        let typed: Outer = record.deserialize_into().unwrap();
        assert_eq!(
            typed,
            Outer {
                name: String::new(),
                count: 7,
                ratio: Some(0.5),
                tags: vec![],
            }
        );
    }

    #[test]
    fn test_deserialize_into_reports_range_errors() {
        let mut record = Record::new(&spec());
        *record.get_mut("Count").unwrap() = Bound::Uint(300);
        let err = record.deserialize_into::<Outer>().unwrap_err();
        assert!(matches!(err, BindError::Deserialize(_)));
    }
}
