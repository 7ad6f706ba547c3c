//! Error types for runtime field parsing and collection.

use std::fmt;

/// Result type for runtime field operations
pub type Result<T> = std::result::Result<T, MappingError>;

/// Error raised while parsing or collecting runtime field definitions.
///
/// Every variant aborts the whole parse. All of them describe bad input except
/// [`MappingError::SubFieldNaming`], which means a field type implementation
/// produced queryable fields outside of its own namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// Field definition without a `type` attribute
    MissingType { field: String },
    /// No parser registered for the declared type
    UnknownType { field: String, type_name: String },
    /// Field definition is neither a map nor null
    InvalidShape { field: String, kind: &'static str },
    /// Null definition where removals are not accepted
    RemovalNotSupported { field: String },
    /// Attribute that the field type does not declare
    UnknownParameter {
        field: String,
        type_name: String,
        parameter: String,
    },
    /// Explicit null for a parameter that does not accept one
    NullNotAllowed {
        field: String,
        type_name: String,
        parameter: String,
    },
    /// Parameter value rejected by its parser or validator
    Validation {
        field: String,
        type_name: String,
        parameter: String,
        reason: String,
    },
    /// Two definitions expose the same queryable field name
    DuplicateFieldName { name: String },
    /// Queryable fields named outside of their parent's namespace
    SubFieldNaming { names: Vec<String> },
}

impl MappingError {
    /// Whether this error points at a defective field type rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, MappingError::SubFieldNaming { .. })
    }

    /// Name of the runtime field the error refers to, if any.
    ///
    /// Collection errors name queryable fields (possibly `parent.sub`), not a
    /// single runtime field, so they return `None`.
    pub fn field(&self) -> Option<&str> {
        match self {
            MappingError::MissingType { field }
            | MappingError::UnknownType { field, .. }
            | MappingError::InvalidShape { field, .. }
            | MappingError::RemovalNotSupported { field }
            | MappingError::UnknownParameter { field, .. }
            | MappingError::NullNotAllowed { field, .. }
            | MappingError::Validation { field, .. } => Some(field),
            MappingError::DuplicateFieldName { .. } | MappingError::SubFieldNaming { .. } => None,
        }
    }
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingError::MissingType { field } => {
                write!(f, "No type specified for runtime field [{}]", field)
            }
            MappingError::UnknownType { field, type_name } => write!(
                f,
                "No handler for type [{}] declared on runtime field [{}]",
                type_name, field
            ),
            MappingError::InvalidShape { field, kind } => write!(
                f,
                "Expected map for runtime field [{}] definition but got a [{}]",
                field, kind
            ),
            MappingError::RemovalNotSupported { field } => write!(
                f,
                "Runtime field [{}] was set to null but its removal is not supported in this context",
                field
            ),
            MappingError::UnknownParameter {
                field,
                type_name,
                parameter,
            } => write!(
                f,
                "unknown parameter [{}] on runtime field [{}] of type [{}]",
                parameter, field, type_name
            ),
            MappingError::NullNotAllowed {
                field,
                type_name,
                parameter,
            } => write!(
                f,
                "[{}] on runtime field [{}] of type [{}] must not have a [null] value",
                parameter, field, type_name
            ),
            MappingError::Validation {
                field,
                type_name,
                parameter,
                reason,
            } => write!(
                f,
                "failed to parse [{}] on runtime field [{}] of type [{}]: {}",
                parameter, field, type_name, reason
            ),
            MappingError::DuplicateFieldName { name } => {
                write!(f, "Found two runtime fields with same name [{}]", name)
            }
            MappingError::SubFieldNaming { names } => write!(
                f,
                "Found sub-fields with name not belonging to the parent field they are part of [{}]",
                names.join(", ")
            ),
        }
    }
}

impl std::error::Error for MappingError {}
