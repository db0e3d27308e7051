//! # Docbind: Declarative Document-to-Object Mapping
//!
//! Docbind populates statically declared structures from untyped JSON
//! documents. Each field declares where its value comes from and how to treat
//! it; the binder walks the structure depth-first and coerces every value into
//! the field's declared shape.
//!
//! ## Features
//!
//! - **Field metadata**: source key (or `-` to skip), default literal, required flag, embedded flag
//! - **Shape-driven coercion**: scalars, pointers, nested structs, sequences, string-keyed mappings, opaque values
//! - **Prefix hooks**: `"ENV:HOME"`-style values rewritten by registered handlers before coercion
//! - **YAML schemas**: struct declarations with Go-style tags, resolved in dependency order
//!
//! ## Example: YAML schema
//!
//! ```yaml
//! root: Config
//! structs:
//!   Config:
//!     fields:
//!       - name: Capital
//!         type: string
//!         tag: 'json:"capital" default:"北京"'
//!       - name: Nation
//!         type: int
//!         tag: 'json:"nation" default:"56"'
//! ```
//!
//! ## Example: builder API
//!
//! ```
//! use docbind::{unmarshal_str, FieldSpec, Hook, HookError, Hooks, Shape, StructSpec, Value};
//!
//! let spec = StructSpec::builder("Province")
//!     .field(FieldSpec::from_tag("Name", Shape::string(), r#"json:"name" require:"true""#))
//!     .field(FieldSpec::from_tag("Cities", Shape::seq(Shape::string()), r#"json:"cities""#))
//!     .build()
//!     .unwrap();
//!
//! let hooks = Hooks::new().with(Hook::new("GO:", |rest: &str, _: &Value| -> Result<Value, HookError> {
//!     Ok(Value::String(rest.to_uppercase()))
//! }));
//!
//! let record = unmarshal_str(r#"{"name": "go:xinjiang", "cities": ["Urumqi"]}"#, &spec, &hooks).unwrap();
//! assert_eq!(record.str("Name"), Some("XINJIANG"));
//! assert_eq!(record.seq("Cities").map(|c| c.len()), Some(1));
//! ```

// Core modules
pub mod cast;
pub mod error;
pub mod value;

// Schema declarations and loading
pub mod schema;

// Hook dispatch and named handlers
pub mod hook_registry;
pub mod hooks;

// Binding engine
pub mod bind;
pub mod decode;
pub mod target;

// Re-export key types
pub use bind::{assign_value, bind_struct};
pub use decode::{bind_into, parse_source, unmarshal, unmarshal_file, unmarshal_into, unmarshal_str};
pub use error::{BindError, SchemaError, SourceError};
pub use hook_registry::{HandlerRegistry, HookDecl};
pub use hooks::{Hook, HookError, HookFn, Hooks};
pub use schema::{FieldSpec, FieldTags, ScalarKind, SchemaSet, Shape, StructSpec};
pub use target::{Bound, Record};
pub use value::{Map, Value};
