//! Declarative target schemas.
//!
//! A [`StructSpec`] is the explicit field table the binder walks: one
//! [`FieldSpec`] per field in declaration order, each carrying its source key,
//! default literal, required flag, embedded flag and [`Shape`].

pub mod field;
pub mod loader;
pub mod shape;

pub use field::{FieldSpec, FieldTags, SKIP_KEY};
pub use loader::SchemaSet;
pub use shape::{ScalarKind, Shape};

use crate::error::SchemaError;
use convert_case::{Case, Casing};
use std::collections::HashSet;
use std::sync::Arc;

/// Field table of one target structure.
#[derive(Debug, Clone)]
pub struct StructSpec {
    name: String,
    fields: Vec<FieldSpec>,
}

impl StructSpec {
    pub fn builder(name: impl Into<String>) -> StructSpecBuilder {
        StructSpecBuilder {
            name: name.into(),
            fields: Vec::new(),
            rename_all: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Builder for [`StructSpec`]; validation happens in [`StructSpecBuilder::build`].
#[derive(Debug)]
pub struct StructSpecBuilder {
    name: String,
    fields: Vec<FieldSpec>,
    rename_all: Option<Case>,
}

impl StructSpecBuilder {
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Derive keys from field names with this case for fields that have no
    /// explicit key.
    pub fn rename_all(mut self, case: Case) -> Self {
        self.rename_all = Some(case);
        self
    }

    /// Validate and freeze the field table.
    ///
    /// # Errors
    ///
    /// * duplicate field names
    /// * a default literal on a structure, sequence or mapping field
    /// * an embedded field whose shape is not a (pointer to a) structure
    pub fn build(self) -> Result<Arc<StructSpec>, SchemaError> {
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(self.fields.len());

        for mut field in self.fields {
            if !seen.insert(field.name.clone()) {
                return Err(SchemaError::DuplicateField {
                    structure: self.name,
                    field: field.name,
                });
            }
            if field.default.is_some() && field.shape.is_composite() {
                return Err(SchemaError::DefaultOnComposite {
                    structure: self.name,
                    field: field.name,
                });
            }
            if field.embedded && field.shape.as_structure().is_none() {
                return Err(SchemaError::EmbeddedNotStruct {
                    structure: self.name,
                    field: field.name,
                });
            }
            if let (None, Some(case)) = (&field.key, self.rename_all) {
                field.key = Some(field.name.to_case(case));
            }
            fields.push(field);
        }

        Ok(Arc::new(StructSpec {
            name: self.name,
            fields,
        }))
    }
}

/// Parse a `rename_all` value such as `snake_case` or `camelCase`.
pub fn parse_case(name: &str) -> Result<Case, SchemaError> {
    Ok(match name {
        "lowercase" => Case::Lower,
        "UPPERCASE" => Case::Upper,
        "snake_case" => Case::Snake,
        "camelCase" => Case::Camel,
        "PascalCase" => Case::Pascal,
        "kebab-case" => Case::Kebab,
        "SCREAMING_SNAKE_CASE" => Case::ScreamingSnake,
        other => return Err(SchemaError::Load(format!("unknown rename_all case '{}'", other))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cities() -> Arc<StructSpec> {
        StructSpec::builder("Cities")
            .field(FieldSpec::new("City", Shape::seq(Shape::string())).key("city"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_keeps_declaration_order() {
        let spec = StructSpec::builder("Config")
            .field(FieldSpec::new("Name", Shape::string()))
            .field(FieldSpec::new("Nation", Shape::int()))
            .build()
            .unwrap();
        let names: Vec<_> = spec.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["Name", "Nation"]);
        assert_eq!(spec.position("Nation"), Some(1));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = StructSpec::builder("S")
            .field(FieldSpec::new("A", Shape::string()))
            .field(FieldSpec::new("A", Shape::int()))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { .. }));
    }

    #[test]
    fn test_default_on_composite_rejected() {
        let err = StructSpec::builder("S")
            .field(FieldSpec::new("C", Shape::structure(&cities())).default_value("x"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DefaultOnComposite { .. }));

        assert!(StructSpec::builder("S")
            .field(FieldSpec::new("P", Shape::pointer(Shape::int())).default_value("1"))
            .build()
            .is_ok());
    }

    #[test]
    fn test_embedded_must_be_struct() {
        let err = StructSpec::builder("S")
            .field(FieldSpec::new("Base", Shape::string()).embedded())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::EmbeddedNotStruct { .. }));

        assert!(StructSpec::builder("S")
            .field(FieldSpec::new("Cities", Shape::pointer(Shape::structure(&cities()))).embedded())
            .build()
            .is_ok());
    }

    #[test]
    fn test_rename_all_only_touches_implicit_keys() {
        let spec = StructSpec::builder("S")
            .rename_all(parse_case("snake_case").unwrap())
            .field(FieldSpec::new("PostalCode", Shape::string()))
            .field(FieldSpec::new("AreaName", Shape::string()).key("area"))
            .build()
            .unwrap();
        assert_eq!(spec.field("PostalCode").unwrap().source_key(), "postal_code");
        assert_eq!(spec.field("AreaName").unwrap().source_key(), "area");
    }
}
