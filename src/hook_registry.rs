//! Named hook handlers.
//!
//! Schema files and the CLI refer to handlers by name (`env`, `file`, ...).
//! The registry maps those names to implementations so declared hooks can be
//! turned into a [`Hooks`] list.

use crate::cast;
use crate::error::SchemaError;
use crate::hooks::{Hook, HookError, HookFn, Hooks};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

/// A hook declared by name, as found in schema files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookDecl {
    /// Prefix that triggers the hook (e.g. `"ENV:"`)
    pub tag: String,

    /// Registered handler name
    pub handler: String,

    /// Argument passed to the handler unchanged
    #[serde(default)]
    pub arg: serde_json::Value,
}

/// Registry for storing handlers by name
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn HookFn>>,
}

impl HandlerRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registry preloaded with `env`, `file`, `upper`, `lower`, `trim` and
    /// `append`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("env", env_handler);
        registry.register("file", file_handler);
        registry.register("upper", |rest: &str, _: &Value| -> Result<Value, HookError> {
            Ok(Value::String(rest.to_uppercase()))
        });
        registry.register("lower", |rest: &str, _: &Value| -> Result<Value, HookError> {
            Ok(Value::String(rest.to_lowercase()))
        });
        registry.register("trim", |rest: &str, _: &Value| -> Result<Value, HookError> {
            Ok(Value::String(rest.trim().to_string()))
        });
        registry.register("append", |rest: &str, arg: &Value| -> Result<Value, HookError> {
            Ok(Value::String(format!("{}{}", rest, cast::to_string(arg))))
        });
        registry
    }

    /// Register a handler, replacing any handler with the same name
    pub fn register(&mut self, name: impl Into<String>, handler: impl HookFn + 'static) {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn HookFn>> {
        self.handlers.get(name).cloned()
    }

    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered handler names, sorted
    pub fn list_handlers(&self) -> Vec<String> {
        let mut names: Vec<_> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Build a hook from a declaration.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::UnknownHandler` if `decl.handler` is not registered.
    pub fn hook(&self, decl: &HookDecl) -> Result<Hook, SchemaError> {
        let handler = self
            .get(&decl.handler)
            .ok_or_else(|| SchemaError::UnknownHandler(decl.handler.clone()))?;
        Ok(Hook::from_shared(decl.tag.clone(), handler).with_arg(Value::from(decl.arg.clone())))
    }

    /// Resolve declarations into an ordered hook list, keeping their order.
    pub fn resolve<'a, I>(&self, decls: I) -> Result<Hooks, SchemaError>
    where
        I: IntoIterator<Item = &'a HookDecl>,
    {
        decls.into_iter().map(|decl| self.hook(decl)).collect()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Look up an environment variable; `arg` is the fallback when unset.
fn env_handler(name: &str, fallback: &Value) -> Result<Value, HookError> {
    match std::env::var(name) {
        Ok(value) => Ok(Value::String(value)),
        Err(_) if !fallback.is_null() => Ok(fallback.clone()),
        Err(e) => Err(HookError::ExecutionError(format!(
            "environment variable '{}': {}",
            name, e
        ))),
    }
}

/// Read a file's contents, dropping the trailing newline.
fn file_handler(path: &str, _: &Value) -> Result<Value, HookError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(HookError::InvalidArgs("empty file path".to_string()));
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| HookError::ExecutionError(format!("failed to read {}: {}", path, e)))?;
    let contents = contents.strip_suffix('\n').unwrap_or(&contents);
    let contents = contents.strip_suffix('\r').unwrap_or(contents);
    Ok(Value::String(contents.to_string()))
}
