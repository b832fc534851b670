use thiserror::Error;

/// Errors raised by document mutations and property edits.
///
/// Every variant describes a rejected operation. The caller's `Document` is never
/// touched when one of these is returned, so it can keep using the previous value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DesignerError {
    #[error("No {what} named '{name}' exists")]
    NotFound { what: &'static str, name: String },

    #[error("Parent '{parent_id}' is not a valid target: {reason}")]
    InvalidParent { parent_id: String, reason: String },

    #[error("'{child_type}' cannot be placed in slot '{slot}' of '{parent_type}': {reason}")]
    InvalidSlot {
        parent_type: String,
        slot: String,
        child_type: String,
        reason: String,
    },

    #[error("No conversion is declared from '{from}' to '{to}'")]
    NotConvertible { from: String, to: String },

    #[error("Invalid value '{value}' for '{type_tag}.{property}': {reason}")]
    InvalidValue {
        type_tag: String,
        property: String,
        value: String,
        reason: String,
    },

    #[error("Node id '{0}' is already used in this document")]
    DuplicateId(String),

    #[error("Only one '{0}' may exist in a document")]
    DuplicateRoot(String),
}

impl DesignerError {
    pub(crate) fn node_not_found(id: &str) -> Self {
        DesignerError::NotFound {
            what: "node",
            name: id.to_string(),
        }
    }

    pub(crate) fn type_not_found(type_tag: &str) -> Self {
        DesignerError::NotFound {
            what: "type",
            name: type_tag.to_string(),
        }
    }
}

/// Errors that can occur while assembling a `Catalog` from descriptors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Descriptor '{0}' is registered more than once")]
    DuplicateDescriptor(String),

    #[error("DSL name '{dsl_name}' is used by both '{first}' and '{second}'")]
    DuplicateDslName {
        dsl_name: String,
        first: String,
        second: String,
    },

    #[error("'{referenced_by}' refers to unknown type '{type_tag}'")]
    UnknownType {
        referenced_by: String,
        type_tag: String,
    },
}

/// Errors that can occur while loading the component/kamelet reference feed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReferenceDataError {
    #[error("Could not read reference data '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse reference data JSON: {0}")]
    JsonParseError(String),
}

/// Errors that can occur while reading or writing the YAML DSL.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SerializationError {
    #[error("Failed to parse YAML: {0}")]
    YamlParseError(String),

    #[error("Failed to write YAML: {0}")]
    YamlWriteError(String),

    #[error("Unknown element '{name}' at {path}")]
    UnknownType { name: String, path: String },

    #[error("Element '{type_tag}' has no property '{property}' (at {path})")]
    UnknownProperty {
        type_tag: String,
        property: String,
        path: String,
    },

    #[error("Expected {expected} at {path}")]
    InvalidShape { path: String, expected: String },

    #[error("Node id '{0}' appears more than once")]
    DuplicateId(String),

    #[error("Only one '{0}' may exist in a document")]
    DuplicateRoot(String),

    #[error("Failed to parse document JSON: {0}")]
    JsonParseError(String),

    #[error("Document does not fit the catalog: {0}")]
    Rejected(#[from] DesignerError),
}

/// A property placeholder (`{{...}}`) that cannot be resolved as written.
///
/// These surface as validation warnings, never as rejected edits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderError {
    #[error("Placeholder starting at {at} is never closed")]
    Unterminated { at: usize },

    #[error("Empty placeholder at {at}")]
    Empty { at: usize },

    #[error("Malformed placeholder '{placeholder}': {reason}")]
    Malformed { placeholder: String, reason: String },
}
