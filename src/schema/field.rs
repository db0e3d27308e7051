//! Per-field binding metadata.

use super::Shape;
use crate::cast;
use once_cell::sync::Lazy;
use regex::Regex;

/// Key sentinel meaning "never bind this field".
pub const SKIP_KEY: &str = "-";

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\w+):"((?:[^"\\]|\\.)*)""#).unwrap());

/// Declarative metadata for one field of a struct.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) key: Option<String>,
    pub(crate) default: Option<String>,
    pub(crate) required: bool,
    pub(crate) embedded: bool,
    pub(crate) shape: Shape,
}

impl FieldSpec {
    /// A field bound from the source key equal to its own name.
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            key: None,
            default: None,
            required: false,
            embedded: false,
            shape,
        }
    }

    /// Build a field from a Go-style tag string, e.g.
    /// `json:"name" default:"中国" require:"true"`.
    pub fn from_tag(name: impl Into<String>, shape: Shape, tag: &str) -> Self {
        FieldTags::parse(tag).apply(Self::new(name, shape))
    }

    /// Source key to read. `"-"` excludes the field from binding.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.key = (!key.is_empty()).then_some(key);
        self
    }

    pub fn skip(self) -> Self {
        self.key(SKIP_KEY)
    }

    /// Literal used when the source value is missing (or empty/zero for
    /// scalars). An empty literal means no default.
    pub fn default_value(mut self, literal: impl Into<String>) -> Self {
        let literal = literal.into();
        self.default = (!literal.is_empty()).then_some(literal);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Bind this field from the enclosing mapping instead of a sub-key.
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }

    pub fn is_skipped(&self) -> bool {
        self.source_key() == SKIP_KEY
    }

    pub fn default_literal(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }
}

/// The three textual annotations recognised on a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTags {
    pub key: Option<String>,
    pub default: Option<String>,
    pub required: bool,
}

impl FieldTags {
    /// Parse `json`, `default` and `require` out of a tag string.
    ///
    /// Only the part of `json` before the first comma is the key, so
    /// `json:"name,omitempty"` reads `name`. Unknown tags are ignored.
    pub fn parse(tag: &str) -> Self {
        let mut tags = FieldTags::default();
        for cap in TAG_PATTERN.captures_iter(tag) {
            let value = unescape(&cap[2]);
            match &cap[1] {
                "json" => {
                    let key = value.split(',').next().unwrap_or_default();
                    tags.key = (!key.is_empty()).then(|| key.to_string());
                }
                "default" => tags.default = (!value.is_empty()).then_some(value),
                "require" | "required" => tags.required = cast::parse_bool_flag(&value),
                _ => {}
            }
        }
        tags
    }

    pub fn apply(self, mut field: FieldSpec) -> FieldSpec {
        if let Some(key) = self.key {
            field = field.key(key);
        }
        if let Some(default) = self.default {
            field = field.default_value(default);
        }
        field.required(self.required)
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
