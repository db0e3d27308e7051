//! Declared field shapes.

use super::StructSpec;
use crate::error::SchemaError;
use std::fmt;
use std::sync::Arc;

/// Primitive kinds a scalar field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Bool,
    /// Signed integer, stored as `i64`
    Int,
    /// Unsigned integer, stored as `u64`
    Uint,
    /// Floating point, stored as `f64`
    Float,
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Uint => "uint",
            ScalarKind::Float => "float",
        }
    }

    fn from_type_name(name: &str) -> Option<Self> {
        Some(match name {
            "string" => ScalarKind::String,
            "bool" => ScalarKind::Bool,
            "int" | "int8" | "int16" | "int32" | "int64" => ScalarKind::Int,
            "uint" | "uint8" | "uint16" | "uint32" | "uint64" => ScalarKind::Uint,
            "float" | "float32" | "float64" => ScalarKind::Float,
            _ => return None,
        })
    }
}

/// The statically declared shape of a field.
#[derive(Debug, Clone)]
pub enum Shape {
    Scalar(ScalarKind),
    /// Optional wrapper: stays null until a value (or default) is assigned.
    Pointer(Box<Shape>),
    Structure(Arc<StructSpec>),
    Sequence(Box<Shape>),
    /// String-keyed mapping to the inner shape.
    Mapping(Box<Shape>),
    /// Accepts any source value verbatim.
    Opaque,
}

impl Shape {
    pub fn string() -> Self {
        Shape::Scalar(ScalarKind::String)
    }

    pub fn bool() -> Self {
        Shape::Scalar(ScalarKind::Bool)
    }

    pub fn int() -> Self {
        Shape::Scalar(ScalarKind::Int)
    }

    pub fn uint() -> Self {
        Shape::Scalar(ScalarKind::Uint)
    }

    pub fn float() -> Self {
        Shape::Scalar(ScalarKind::Float)
    }

    pub fn pointer(inner: Shape) -> Self {
        Shape::Pointer(Box::new(inner))
    }

    pub fn seq(element: Shape) -> Self {
        Shape::Sequence(Box::new(element))
    }

    pub fn map(value: Shape) -> Self {
        Shape::Mapping(Box::new(value))
    }

    pub fn structure(spec: &Arc<StructSpec>) -> Self {
        Shape::Structure(Arc::clone(spec))
    }

    /// The shape with one level of pointer removed.
    pub fn pointee(&self) -> &Shape {
        match self {
            Shape::Pointer(inner) => inner,
            other => other,
        }
    }

    /// Structures, sequences and mappings (directly or behind a pointer).
    pub fn is_composite(&self) -> bool {
        matches!(
            self.pointee(),
            Shape::Structure(_) | Shape::Sequence(_) | Shape::Mapping(_)
        )
    }

    pub fn as_structure(&self) -> Option<&Arc<StructSpec>> {
        match self.pointee() {
            Shape::Structure(spec) => Some(spec),
            _ => None,
        }
    }

    /// Parse a type expression such as `*int`, `[]Province` or
    /// `map[string]Attr`.
    ///
    /// Names that are not primitives are looked up with `resolve`.
    pub fn parse<F>(expr: &str, resolve: &F) -> Result<Shape, SchemaError>
    where
        F: Fn(&str) -> Option<Arc<StructSpec>>,
    {
        let expr = expr.trim();
        if let Some(rest) = expr.strip_prefix('*') {
            return Ok(Shape::pointer(Shape::parse(rest, resolve)?));
        }
        if let Some(rest) = expr.strip_prefix("[]") {
            return Ok(Shape::seq(Shape::parse(rest, resolve)?));
        }
        if let Some(rest) = expr.strip_prefix("map[") {
            let rest = rest
                .strip_prefix("string]")
                .ok_or_else(|| SchemaError::InvalidType(expr.to_string()))?;
            return Ok(Shape::map(Shape::parse(rest, resolve)?));
        }
        if matches!(expr, "any" | "interface{}") {
            return Ok(Shape::Opaque);
        }
        if let Some(kind) = ScalarKind::from_type_name(expr) {
            return Ok(Shape::Scalar(kind));
        }
        if !is_identifier(expr) {
            return Err(SchemaError::InvalidType(expr.to_string()));
        }
        resolve(expr)
            .map(Shape::Structure)
            .ok_or_else(|| SchemaError::UnknownStruct(expr.to_string()))
    }

    /// The struct name a type expression refers to, if any.
    pub fn referenced_struct(expr: &str) -> Result<Option<&str>, SchemaError> {
        let mut base = expr.trim();
        loop {
            if let Some(rest) = base.strip_prefix('*') {
                base = rest;
            } else if let Some(rest) = base.strip_prefix("[]") {
                base = rest;
            } else if let Some(rest) = base.strip_prefix("map[") {
                base = rest
                    .strip_prefix("string]")
                    .ok_or_else(|| SchemaError::InvalidType(expr.to_string()))?;
            } else {
                break;
            }
        }
        let base = base.trim();
        if matches!(base, "any" | "interface{}") || ScalarKind::from_type_name(base).is_some() {
            return Ok(None);
        }
        if !is_identifier(base) {
            return Err(SchemaError::InvalidType(expr.to_string()));
        }
        Ok(Some(base))
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar(kind) => f.write_str(kind.name()),
            Shape::Pointer(inner) => write!(f, "*{}", inner),
            Shape::Structure(spec) => f.write_str(spec.name()),
            Shape::Sequence(inner) => write!(f, "[]{}", inner),
            Shape::Mapping(inner) => write!(f, "map[string]{}", inner),
            Shape::Opaque => f.write_str("any"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;

    fn attr() -> Arc<StructSpec> {
        StructSpec::builder("Attr")
            .field(FieldSpec::new("Attr1", Shape::string()).key("attr1"))
            .build()
            .unwrap()
    }

    fn resolve(name: &str) -> Option<Arc<StructSpec>> {
        (name == "Attr").then(attr)
    }

    #[test]
    fn test_parse_primitives() {
        assert!(matches!(
            Shape::parse("int32", &resolve).unwrap(),
            Shape::Scalar(ScalarKind::Int)
        ));
        assert!(matches!(
            Shape::parse("float64", &resolve).unwrap(),
            Shape::Scalar(ScalarKind::Float)
        ));
        assert!(matches!(Shape::parse("interface{}", &resolve).unwrap(), Shape::Opaque));
    }

    #[test]
    fn test_parse_nested_constructors() {
        let shape = Shape::parse("map[string]*[]Attr", &resolve).unwrap();
        assert_eq!(shape.to_string(), "map[string]*[]Attr");
        assert!(shape.is_composite());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Shape::parse("map[int]string", &resolve).unwrap_err(),
            SchemaError::InvalidType("map[int]string".to_string())
        );
        assert_eq!(
            Shape::parse("Missing", &resolve).unwrap_err(),
            SchemaError::UnknownStruct("Missing".to_string())
        );
        assert!(matches!(
            Shape::parse("[]bad-name", &resolve),
            Err(SchemaError::InvalidType(_))
        ));
    }

    #[test]
    fn test_referenced_struct() {
        assert_eq!(Shape::referenced_struct("[]*Province").unwrap(), Some("Province"));
        assert_eq!(Shape::referenced_struct("map[string]uint8").unwrap(), None);
        assert_eq!(Shape::referenced_struct("any").unwrap(), None);
    }

    #[test]
    fn test_pointer_to_scalar_is_not_composite() {
        assert!(!Shape::pointer(Shape::int()).is_composite());
        assert!(Shape::pointer(Shape::structure(&attr())).is_composite());
    }
}
