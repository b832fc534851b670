//! The YAML DSL: a top-level sequence of single-key mappings, one per flow.
//!
//! ```yaml
//! - route:
//!     id: route-1
//!     from:
//!       id: from-1
//!       uri: timer:tick
//!       steps:
//!         - log:
//!             id: log-1
//!             message: tick
//! ```
//!
//! Items of `steps` lists are keyed by their DSL name. Slots that hold a single
//! known type (`from`, `when`, `otherwise`...) are plain mappings. Expressions are
//! written as `{<language>: {expression: <text>}}` and parameters as a flat mapping.
//! Every node writes its `id`, so parsing what was written gives back an equal
//! document.
use crate::catalog::Catalog;
use crate::error::SerializationError;
use crate::model::Document;

mod read;
mod write;

/// Parses YAML DSL text into a document, validating every element against the catalog.
pub fn parse(text: &str, catalog: &Catalog) -> Result<Document, SerializationError> {
    read::Reader::new(catalog).read_document(text)
}

/// Writes a document as YAML DSL text.
pub fn serialize(doc: &Document, catalog: &Catalog) -> Result<String, SerializationError> {
    let value = write::Writer::new(catalog).write_document(doc)?;
    serde_yaml::to_string(&value).map_err(|e| SerializationError::YamlWriteError(e.to_string()))
}

/// Reads a YAML DSL file.
pub fn parse_file(path: &str, catalog: &Catalog) -> Result<Document, SerializationError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| SerializationError::YamlParseError(format!("{}: {}", path, e)))?;
    parse(&text, catalog)
}
