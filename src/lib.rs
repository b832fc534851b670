//! # Sekkei - Document Model and Mutation Engine for Integration Flow Designers
//!
//! **Sekkei** is the logic behind a visual designer for integration flows: the
//! in-memory document a canvas draws, the catalog that says what may go where,
//! the operations that change the document without ever breaking it, and the
//! layer that turns a selected node into an editable form and back.
//!
//! Nothing in here renders anything. A host application (a web canvas, an IDE
//! plugin, the bundled CLI) holds the current `Document`, calls into this crate
//! when the user acts, and redraws from whatever comes back.
//!
//! ## Core Workflow
//!
//! 1.  **Build a Catalog**: `Catalog::builder()` starts from the built-in DSL
//!     descriptors. Add the component/kamelet reference feed with
//!     `with_reference_data` and call `build()`.
//! 2.  **Load a Document**: parse YAML DSL text with `serialize::parse`, or start
//!     from `Document::new()`.
//! 3.  **Mutate**: every `MutationEngine` operation takes the current document and
//!     returns a new one. A failed operation returns an error and leaves the
//!     input untouched, so undo is just keeping the old value.
//! 4.  **Edit Properties**: `PropertySync::fields` lists the editable fields of a
//!     node; `PropertySync::apply` validates an edit and routes it through the
//!     engine.
//! 5.  **Save**: `serialize::serialize` writes the document back as YAML.
//!
//! `DesignerSession` wraps all of this with a selection and an undo/redo history.
//!
//! ## Quick Start
//!
//! ```rust
//! use sekkei::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Catalog::with_defaults();
//!     let engine = MutationEngine::new(&catalog);
//!
//!     // A `From` added at document level gets a route of its own.
//!     let from = catalog.create_node("From", [("uri", "timer:tick")])?;
//!     let from_id = from.id().clone();
//!     let doc = engine.add_step(&Document::new(), from, None, None, None)?;
//!
//!     let log = catalog.create_node("Log", [("message", "tick")])?;
//!     let doc = engine.add_step(&doc, log, Some(from_id.as_str()), None, None)?;
//!
//!     // The form for the `From` node.
//!     let sync = PropertySync::new(&catalog);
//!     let fields = sync.fields(&doc, from_id.as_str())?;
//!     assert!(fields.field("uri").is_some());
//!
//!     println!("{}", serialize::serialize(&doc, &catalog)?);
//!     println!("{}", DisplayDocument::new(&doc, &catalog));
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod engine;
pub mod error;
pub mod model;
pub mod outline;
pub mod prelude;
pub mod properties;
pub mod selector;
pub mod serialize;
pub mod session;
