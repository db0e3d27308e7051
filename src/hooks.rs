//! Prefix-triggered string hooks.
//!
//! A hook is a tag such as `"ENV:"` plus a handler. When a field's raw string
//! value starts with the tag (case-insensitively), the handler receives the
//! rest of the string and its value replaces the original before coercion.

use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Error type for hook handlers
#[derive(Debug, Clone, PartialEq)]
pub enum HookError {
    InvalidArgs(String),
    ExecutionError(String),
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookError::InvalidArgs(msg) => write!(f, "Invalid arguments: {}", msg),
            HookError::ExecutionError(msg) => write!(f, "Execution error: {}", msg),
        }
    }
}

impl std::error::Error for HookError {}

/// Trait for hook handlers
///
/// Handlers may return any [`Value`]; the result goes through normal
/// coercion for the field it was produced for.
pub trait HookFn: Send + Sync {
    /// Run the handler on the text following the tag.
    ///
    /// # Arguments
    ///
    /// * `remainder` - The raw value with the tag stripped (never empty)
    /// * `arg` - The opaque argument the hook was registered with
    fn call(&self, remainder: &str, arg: &Value) -> Result<Value, HookError>;
}

/// Simple function-based implementation of HookFn
impl<F> HookFn for F
where
    F: Fn(&str, &Value) -> Result<Value, HookError> + Send + Sync,
{
    fn call(&self, remainder: &str, arg: &Value) -> Result<Value, HookError> {
        self(remainder, arg)
    }
}

/// A registered transformation: tag, handler and pass-through argument.
#[derive(Clone)]
pub struct Hook {
    tag: String,
    handler: Arc<dyn HookFn>,
    arg: Value,
}

impl Hook {
    pub fn new(tag: impl Into<String>, handler: impl HookFn + 'static) -> Self {
        Self::from_shared(tag, Arc::new(handler))
    }

    pub fn from_shared(tag: impl Into<String>, handler: Arc<dyn HookFn>) -> Self {
        Self {
            tag: tag.into(),
            handler,
            arg: Value::Null,
        }
    }

    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.arg = arg.into();
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn arg(&self) -> &Value {
        &self.arg
    }

    /// Returns the text after the tag if `value` triggers this hook.
    ///
    /// The value must be strictly longer than the tag, and the tag length
    /// must fall on a char boundary of the value.
    fn strip<'v>(&self, value: &'v str) -> Option<&'v str> {
        if self.tag.is_empty() || value.len() <= self.tag.len() {
            return None;
        }
        let prefix = value.get(..self.tag.len())?;
        if prefix.to_uppercase() == self.tag.to_uppercase() {
            Some(&value[self.tag.len()..])
        } else {
            None
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("tag", &self.tag)
            .field("arg", &self.arg)
            .finish_non_exhaustive()
    }
}

/// Ordered hook list passed to a bind call.
///
/// Hooks are tried in registration order and the first matching tag wins,
/// even when a later tag would be a longer match.
#[derive(Debug, Clone, Default)]
pub struct Hooks {
    hooks: Vec<Hook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, hook: Hook) {
        self.hooks.push(hook);
    }

    /// Builder-style [`Hooks::push`].
    pub fn with(mut self, hook: Hook) -> Self {
        self.push(hook);
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hook> {
        self.hooks.iter()
    }

    /// Run the first hook whose tag prefixes `value`.
    ///
    /// Non-string values and strings no hook matches are returned unchanged.
    pub fn apply(&self, value: Value) -> Result<Value, HookError> {
        if let Value::String(text) = &value {
            for hook in &self.hooks {
                if let Some(remainder) = hook.strip(text) {
                    tracing::debug!(tag = %hook.tag, "hook matched");
                    return hook.handler.call(remainder, &hook.arg);
                }
            }
        }

        Ok(value)
    }
}

impl FromIterator<Hook> for Hooks {
    fn from_iter<I: IntoIterator<Item = Hook>>(iter: I) -> Self {
        Self {
            hooks: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Hook>> for Hooks {
    fn from(hooks: Vec<Hook>) -> Self {
        Self { hooks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper_with_suffix(rest: &str, arg: &Value) -> Result<Value, HookError> {
        let suffix = arg
            .as_str()
            .ok_or_else(|| HookError::InvalidArgs("suffix must be a string".to_string()))?;
        Ok(Value::String(format!("{}{}", rest.to_uppercase(), suffix)))
    }

    fn label(name: &'static str) -> impl HookFn {
        move |rest: &str, _: &Value| -> Result<Value, HookError> {
            Ok(Value::String(format!("{}:{}", name, rest)))
        }
    }

    #[test]
    fn test_prefix_match_invokes_handler() {
        let hooks = Hooks::new().with(Hook::new("GO:", upper_with_suffix).with_arg("<s>"));
        let out = hooks.apply(Value::from("GO:west")).unwrap();
        assert_eq!(out, Value::from("WEST<s>"));
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let hooks = Hooks::new().with(Hook::new("GO:", upper_with_suffix).with_arg("!"));
        assert_eq!(hooks.apply(Value::from("go:x")).unwrap(), Value::from("X!"));
    }

    #[test]
    fn test_non_matching_prefix_is_unchanged() {
        let hooks = Hooks::new().with(Hook::new("GO:", upper_with_suffix).with_arg("!"));
        assert_eq!(hooks.apply(Value::from("golang")).unwrap(), Value::from("golang"));
    }

    #[test]
    fn test_value_must_be_longer_than_tag() {
        let hooks = Hooks::new().with(Hook::new("GO:", upper_with_suffix).with_arg("!"));
        assert_eq!(hooks.apply(Value::from("GO:")).unwrap(), Value::from("GO:"));
        assert_eq!(hooks.apply(Value::from("GO")).unwrap(), Value::from("GO"));
    }

    #[test]
    fn test_first_registered_wins_over_longer_tag() {
        let hooks = Hooks::new()
            .with(Hook::new("GO:", label("short")))
            .with(Hook::new("GO:EXTRA:", label("long")));
        assert_eq!(
            hooks.apply(Value::from("GO:EXTRA:x")).unwrap(),
            Value::from("short:EXTRA:x")
        );
    }

    #[test]
    fn test_empty_tag_is_skipped() {
        let hooks = Hooks::new()
            .with(Hook::new("", label("empty")))
            .with(Hook::new("A:", label("a")));
        assert_eq!(hooks.apply(Value::from("A:1")).unwrap(), Value::from("a:1"));
        assert_eq!(hooks.apply(Value::from("plain")).unwrap(), Value::from("plain"));
    }

    #[test]
    fn test_non_string_values_pass_through() {
        let hooks = Hooks::new().with(Hook::new("1", label("n")));
        assert_eq!(hooks.apply(Value::Int(12)).unwrap(), Value::Int(12));
        assert_eq!(hooks.apply(Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_tag_splitting_a_char_never_matches() {
        let hooks = Hooks::new().with(Hook::new("ab", label("x")));
        // "中" is three bytes, so byte 2 is inside it
        assert_eq!(hooks.apply(Value::from("中文")).unwrap(), Value::from("中文"));
    }

    #[test]
    fn test_handler_error_propagates() {
        let hooks = Hooks::new().with(Hook::new("GO:", upper_with_suffix));
        let err = hooks.apply(Value::from("GO:x")).unwrap_err();
        assert!(matches!(err, HookError::InvalidArgs(_)));
    }
}
