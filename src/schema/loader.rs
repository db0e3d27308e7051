//! Schema loader and struct resolution order.
//!
//! Loads struct declarations from YAML and builds them in dependency order
//! using a topological sort (Kahn's algorithm), so every struct a field
//! refers to is built before the struct that contains it.
//!
//! ```yaml
//! root: Config
//! hooks:
//!   - tag: "GO:"
//!     handler: append
//!     arg: "(script)"
//! structs:
//!   Cities:
//!     fields:
//!       - name: City
//!         type: "[]string"
//!         json: city
//!   Config:
//!     fields:
//!       - name: Name
//!         type: string
//!         tag: 'json:"name" default:"中国"'
//!       - name: Cities
//!         type: Cities
//!         json: cities
//! ```

use super::{parse_case, FieldSpec, FieldTags, Shape, StructSpec};
use crate::cast;
use crate::error::SchemaError;
use crate::hook_registry::HookDecl;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Schema document as written in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDoc {
    /// Struct bound from the document root
    #[serde(default)]
    pub root: Option<String>,

    /// Hooks applied during binding, in order
    #[serde(default)]
    pub hooks: Vec<HookDecl>,

    /// Struct declarations: struct_name -> declaration
    pub structs: IndexMap<String, StructDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructDoc {
    /// Case applied to field names that have no explicit key
    #[serde(default)]
    pub rename_all: Option<String>,

    pub fields: Vec<FieldDoc>,
}

/// Field declaration. Explicit `json`/`default`/`require` entries override
/// the same entries parsed from `tag`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDoc {
    pub name: String,

    /// Type expression (e.g. "string", "*int", "[]Province", "map[string]Attr")
    #[serde(rename = "type")]
    pub type_expr: String,

    /// Go-style tag string, e.g. `json:"name" default:"x" require:"true"`
    #[serde(default)]
    pub tag: Option<String>,

    #[serde(default)]
    pub json: Option<String>,

    #[serde(default)]
    pub default: Option<serde_json::Value>,

    #[serde(default, alias = "required")]
    pub require: Option<serde_json::Value>,

    #[serde(default)]
    pub embedded: bool,
}

impl FieldDoc {
    fn to_field(&self, shape: Shape) -> FieldSpec {
        let mut tags = self.tag.as_deref().map(FieldTags::parse).unwrap_or_default();
        if let Some(key) = &self.json {
            tags.key = Some(key.clone());
        }
        if let Some(default) = &self.default {
            let literal = cast::to_string(&Value::from(default.clone()));
            tags.default = (!literal.is_empty()).then_some(literal);
        }
        if let Some(require) = &self.require {
            tags.required = cast::parse_bool_flag(&cast::to_string(&Value::from(require.clone())));
        }

        let field = tags.apply(FieldSpec::new(self.name.clone(), shape));
        if self.embedded {
            field.embedded()
        } else {
            field
        }
    }
}

/// A set of resolved structs plus the hooks declared alongside them.
#[derive(Debug, Clone)]
pub struct SchemaSet {
    structs: IndexMap<String, Arc<StructSpec>>,
    root: Option<String>,
    hooks: Vec<HookDecl>,
}

impl SchemaSet {
    /// Load a schema from a YAML file.
    ///
    /// # Errors
    /// Returns error if the file can't be read, isn't valid YAML, or declares
    /// invalid structs.
    ///
    /// # Example
    /// ```ignore
    /// use docbind::SchemaSet;
    ///
    /// let schema = SchemaSet::load_from_file("schema.yaml")?;
    /// let root = schema.root()?;
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            SchemaError::Load(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, SchemaError> {
        let doc: SchemaDoc = serde_yaml::from_str(yaml)
            .map_err(|e| SchemaError::Load(format!("invalid YAML: {}", e)))?;
        Self::from_doc(doc)
    }

    /// Build every struct in `doc` in dependency order.
    pub fn from_doc(doc: SchemaDoc) -> Result<Self, SchemaError> {
        let order = compute_resolution_order(&doc.structs)?;
        let mut built: IndexMap<String, Arc<StructSpec>> = IndexMap::new();

        for name in order {
            let decl = &doc.structs[&name];
            let resolve = |n: &str| built.get(n).cloned();

            let mut builder = StructSpec::builder(name.clone());
            if let Some(case) = &decl.rename_all {
                builder = builder.rename_all(parse_case(case)?);
            }
            for field in &decl.fields {
                let shape = Shape::parse(&field.type_expr, &resolve)?;
                builder = builder.field(field.to_field(shape));
            }
            let spec = builder.build()?;
            tracing::debug!(structure = %name, fields = spec.fields().len(), "resolved struct");
            built.insert(name, spec);
        }

        // keep declaration order for listing
        let structs = doc
            .structs
            .keys()
            .filter_map(|name| built.get(name).map(|s| (name.clone(), Arc::clone(s))))
            .collect();

        Ok(Self {
            structs,
            root: doc.root,
            hooks: doc.hooks,
        })
    }

    pub fn get(&self, name: &str) -> Option<&Arc<StructSpec>> {
        self.structs.get(name)
    }

    /// The struct named by `root`, or the last declared struct when no root
    /// is given.
    pub fn root(&self) -> Result<&Arc<StructSpec>, SchemaError> {
        match &self.root {
            Some(name) => self
                .structs
                .get(name)
                .ok_or_else(|| SchemaError::MissingRoot(name.clone())),
            None => self
                .structs
                .values()
                .last()
                .ok_or_else(|| SchemaError::MissingRoot("<none>".to_string())),
        }
    }

    pub fn set_root(&mut self, name: impl Into<String>) {
        self.root = Some(name.into());
    }

    pub fn hook_decls(&self) -> &[HookDecl] {
        &self.hooks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<StructSpec>> {
        self.structs.values()
    }

    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }
}

/// Compute struct build order using topological sort (Kahn's algorithm).
///
/// # Returns
/// * `Ok(order)` - struct names, dependencies first
/// * `Err(..)` - unknown struct reference, bad type expression or a cycle
pub fn compute_resolution_order(
    structs: &IndexMap<String, StructDoc>,
) -> Result<Vec<String>, SchemaError> {
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for name in structs.keys() {
        in_degree.insert(name.as_str(), 0);
        dependents.insert(name.as_str(), Vec::new());
    }

    for (name, decl) in structs {
        let name = name.as_str();
        let mut deps: Vec<&str> = Vec::new();
        for field in &decl.fields {
            if let Some(dep) = Shape::referenced_struct(&field.type_expr)? {
                if !structs.contains_key(dep) {
                    return Err(SchemaError::UnknownStruct(dep.to_string()));
                }
                if !deps.contains(&dep) {
                    deps.push(dep);
                }
            }
        }

        *in_degree.entry(name).or_default() += deps.len();
        for dep in deps {
            dependents.entry(dep).or_default().push(name);
        }
    }

    let mut queue: VecDeque<&str> = structs
        .keys()
        .map(String::as_str)
        .filter(|name| in_degree[name] == 0)
        .collect();

    let mut sorted = Vec::with_capacity(structs.len());
    while let Some(name) = queue.pop_front() {
        sorted.push(name.to_string());
        for &dependent in &dependents[name] {
            let degree = in_degree.entry(dependent).or_default();
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(dependent);
            }
        }
    }

    if sorted.len() != structs.len() {
        let unresolved = structs
            .keys()
            .filter(|name| !sorted.contains(name))
            .cloned()
            .collect();
        return Err(SchemaError::CircularReference(unresolved));
    }

    Ok(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
root: Config
hooks:
  - tag: "GO:"
    handler: append
    arg: "(script)"
structs:
  Config:
    fields:
      - name: Name
        type: string
        tag: 'json:"name" default:"中国"'
      - name: Nation
        type: int
        json: nation
        default: 56
      - name: Provinces
        type: "[]Province"
        json: provinces
  Province:
    fields:
      - name: Name
        type: string
        json: name
        require: true
      - name: Cities
        type: Cities
        json: cities
  Cities:
    fields:
      - name: City
        type: "[]string"
        json: city
"#;

    #[test]
    fn test_load_schema_resolves_forward_references() {
        let schema = SchemaSet::from_yaml_str(SCHEMA).unwrap();
        assert_eq!(schema.len(), 3);

        let root = schema.root().unwrap();
        assert_eq!(root.name(), "Config");
        assert_eq!(root.field("Nation").unwrap().default_literal(), Some("56"));
        assert_eq!(root.field("Name").unwrap().default_literal(), Some("中国"));
        assert_eq!(root.field("Provinces").unwrap().shape().to_string(), "[]Province");

        let province = schema.get("Province").unwrap();
        assert!(province.field("Name").unwrap().is_required());
        assert_eq!(schema.hook_decls().len(), 1);
    }

    #[test]
    fn test_listing_keeps_declaration_order() {
        let schema = SchemaSet::from_yaml_str(SCHEMA).unwrap();
        let names: Vec<_> = schema.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Config", "Province", "Cities"]);
    }

    #[test]
    fn test_resolution_order_dependencies_first() {
        let doc: SchemaDoc = serde_yaml::from_str(SCHEMA).unwrap();
        let order = compute_resolution_order(&doc.structs).unwrap();
        assert_eq!(order, vec!["Cities", "Province", "Config"]);
    }

    #[test]
    fn test_circular_reference_detected() {
        let yaml = r#"
structs:
  A:
    fields:
      - name: B
        type: "*B"
  B:
    fields:
      - name: A
        type: "[]A"
  C:
    fields:
      - name: X
        type: int
"#;
        let err = SchemaSet::from_yaml_str(yaml).unwrap_err();
        assert_eq!(
            err,
            SchemaError::CircularReference(vec!["A".to_string(), "B".to_string()])
        );
    }

    #[test]
    fn test_unknown_struct_reference() {
        let yaml = r#"
structs:
  A:
    fields:
      - name: B
        type: "map[string]Missing"
"#;
        let err = SchemaSet::from_yaml_str(yaml).unwrap_err();
        assert_eq!(err, SchemaError::UnknownStruct("Missing".to_string()));
    }

    #[test]
    fn test_missing_root() {
        let mut schema = SchemaSet::from_yaml_str(SCHEMA).unwrap();
        schema.set_root("Nope");
        assert_eq!(schema.root().unwrap_err(), SchemaError::MissingRoot("Nope".to_string()));
    }

    #[test]
    fn test_rename_all_and_embedded() {
        let yaml = r#"
root: Outer
structs:
  Base:
    rename_all: snake_case
    fields:
      - name: PostalCode
        type: string
  Outer:
    fields:
      - name: Base
        type: Base
        embedded: true
"#;
        let schema = SchemaSet::from_yaml_str(yaml).unwrap();
        let base = schema.get("Base").unwrap();
        assert_eq!(base.field("PostalCode").unwrap().source_key(), "postal_code");
        assert!(schema.root().unwrap().field("Base").unwrap().is_embedded());
    }

    #[test]
    fn test_invalid_yaml_is_load_error() {
        assert!(matches!(
            SchemaSet::from_yaml_str("structs: [unclosed"),
            Err(SchemaError::Load(_))
        ));
    }
}
