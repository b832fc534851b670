//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types from the sekkei crate.
//! Import it to get the catalog, the document model, the engine and the
//! property layer without naming each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use sekkei::prelude::*;
//!
//! # fn run_example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let reference = ReferenceData::from_file("path/to/components.json")?;
//! let catalog = Catalog::builder().with_reference_data(reference).build()?;
//!
//! let text = std::fs::read_to_string("path/to/routes.yaml")?;
//! let mut session = DesignerSession::with_document(&catalog, serialize::parse(&text, &catalog)?);
//!
//! let fields = session.select(Some("from-1"))?;
//! println!("{:?}", fields);
//! # Ok(())
//! # }
//! ```

// Metadata
pub use crate::catalog::{
    Catalog, CatalogBuilder, Descriptor, NodeRole, PropertyKind, PropertyMeta, ReferenceData,
};

// Document model
pub use crate::model::{Document, ExpressionValue, Node, NodeId, PropertyValue};

// Mutations and queries
pub use crate::engine::{FollowUp, MutationEngine};

// Property editing
pub use crate::properties::{
    EditOutcome, EditableField, EditorHint, FieldEdit, FieldPath, FieldSet, PropertySync,
    ValidationWarning,
};

// Sessions and palette
pub use crate::selector::{Selector, SelectorEntry, UsageStore};
pub use crate::session::{DesignerSession, SelectionState};

// Output
pub use crate::outline::DisplayDocument;
pub use crate::serialize;

// Error types
pub use crate::error::{CatalogError, DesignerError, ReferenceDataError, SerializationError};
