//! Error types for schema construction, document decoding and binding.

use crate::hooks::HookError;
use std::fmt;

/// The input bytes could not be turned into a source mapping.
#[derive(Debug)]
pub enum SourceError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// Top-level document was valid JSON but not an object (or null).
    NotAnObject { actual: &'static str },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Io(e) => write!(f, "IO error: {}", e),
            SourceError::Json(e) => write!(f, "JSON error: {}", e),
            SourceError::NotAnObject { actual } => {
                write!(f, "document root must be an object, got {}", actual)
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Io(e) => Some(e),
            SourceError::Json(e) => Some(e),
            SourceError::NotAnObject { .. } => None,
        }
    }
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Io(err)
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Json(err)
    }
}

/// Error returned by a bind call.
///
/// Each struct level a failure passes through wraps it in [`BindError::Field`],
/// so the outermost error carries the whole field path.
#[derive(Debug)]
pub enum BindError {
    Source(SourceError),
    RequiredFieldMissing {
        field: String,
        key: String,
    },
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
    Hook(HookError),
    Field {
        field: String,
        key: String,
        source: Box<BindError>,
    },
    /// The bound record could not be converted into the requested Rust type.
    Deserialize(serde_json::Error),
}

impl BindError {
    pub(crate) fn in_field(self, field: &str, key: &str) -> Self {
        BindError::Field {
            field: field.to_string(),
            key: key.to_string(),
            source: Box::new(self),
        }
    }

    /// Field names from the outermost struct down to the failing field.
    pub fn field_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        loop {
            match current {
                BindError::Field { field, source, .. } => {
                    path.push(field.as_str());
                    current = source;
                }
                BindError::RequiredFieldMissing { field, .. } => {
                    path.push(field.as_str());
                    return path;
                }
                _ => return path,
            }
        }
    }

    /// The innermost error, with all field context stripped.
    pub fn root_cause(&self) -> &BindError {
        match self {
            BindError::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn is_required_missing(&self) -> bool {
        matches!(self.root_cause(), BindError::RequiredFieldMissing { .. })
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::Source(e) => write!(f, "{}", e),
            BindError::RequiredFieldMissing { field, key } => {
                write!(f, "{}({}) is required", field, key)
            }
            BindError::TypeMismatch { expected, actual } => {
                write!(f, "type mismatch: expected {}, got {}", expected, actual)
            }
            BindError::Hook(e) => write!(f, "hook error: {}", e),
            BindError::Field { field, key, source } => {
                write!(f, "{}({}): {}", field, key, source)
            }
            BindError::Deserialize(e) => write!(f, "failed to convert bound record: {}", e),
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BindError::Source(e) => Some(e),
            BindError::Hook(e) => Some(e),
            BindError::Field { source, .. } => Some(source.as_ref()),
            BindError::Deserialize(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SourceError> for BindError {
    fn from(err: SourceError) -> Self {
        BindError::Source(err)
    }
}

impl From<HookError> for BindError {
    fn from(err: HookError) -> Self {
        BindError::Hook(err)
    }
}

/// Invalid struct declaration or schema document.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    DuplicateField { structure: String, field: String },
    DefaultOnComposite { structure: String, field: String },
    EmbeddedNotStruct { structure: String, field: String },
    InvalidType(String),
    UnknownStruct(String),
    CircularReference(Vec<String>),
    MissingRoot(String),
    UnknownHandler(String),
    Load(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::DuplicateField { structure, field } => {
                write!(f, "struct '{}' declares field '{}' twice", structure, field)
            }
            SchemaError::DefaultOnComposite { structure, field } => write!(
                f,
                "field '{}.{}' has a default but its type is not a scalar",
                structure, field
            ),
            SchemaError::EmbeddedNotStruct { structure, field } => write!(
                f,
                "embedded field '{}.{}' must be a struct or pointer to struct",
                structure, field
            ),
            SchemaError::InvalidType(expr) => write!(f, "invalid type expression: '{}'", expr),
            SchemaError::UnknownStruct(name) => write!(f, "unknown struct '{}'", name),
            SchemaError::CircularReference(names) => {
                write!(f, "circular struct reference involving: {:?}", names)
            }
            SchemaError::MissingRoot(name) => write!(f, "root struct '{}' is not defined", name),
            SchemaError::UnknownHandler(name) => write!(f, "unknown hook handler '{}'", name),
            SchemaError::Load(msg) => write!(f, "failed to load schema: {}", msg),
        }
    }
}

impl std::error::Error for SchemaError {}
