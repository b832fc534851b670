//! An editing session: the current document, the selection and the undo history.
//!
//! The session is the single writer the rest of the crate assumes. It holds the
//! latest `Document`, replaces it with whatever a successful operation returns and
//! keeps the previous values around for undo.
use crate::catalog::Catalog;
use crate::engine::MutationEngine;
use crate::error::{DesignerError, SerializationError};
use crate::model::{Document, NodeId};
use crate::properties::{EditOutcome, FieldEdit, FieldSet, PropertySync};
use crate::serialize;
use std::collections::VecDeque;
use tracing::{debug, trace};

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// At most one selected node. With nothing selected the host shows document-level
/// properties instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<NodeId>,
}

impl SelectionState {
    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, node_id: &str) -> bool {
        self.selected.as_ref().is_some_and(|id| id.as_str() == node_id)
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    fn select(&mut self, node_id: NodeId) {
        self.selected = Some(node_id);
    }
}

pub struct DesignerSession<'c> {
    catalog: &'c Catalog,
    engine: MutationEngine<'c>,
    sync: PropertySync<'c>,
    document: Document,
    selection: SelectionState,
    undo: VecDeque<Document>,
    redo: Vec<Document>,
    history_limit: usize,
}

impl<'c> DesignerSession<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self::with_document(catalog, Document::new())
    }

    pub fn with_document(catalog: &'c Catalog, document: Document) -> Self {
        Self {
            catalog,
            engine: MutationEngine::new(catalog),
            sync: PropertySync::new(catalog),
            document,
            selection: SelectionState::default(),
            undo: VecDeque::new(),
            redo: Vec::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Keeps at most `limit` previous documents for undo.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self.trim_history();
        self
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    pub fn engine(&self) -> &MutationEngine<'c> {
        &self.engine
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Parses `text` and makes it the current document.
    pub fn load(&mut self, text: &str) -> Result<(), SerializationError> {
        let document = serialize::parse(text, self.catalog)?;
        self.replace_document(document);
        Ok(())
    }

    pub fn save(&self) -> Result<String, SerializationError> {
        serialize::serialize(&self.document, self.catalog)
    }

    /// Swaps in a different document. Selection and history start over.
    pub fn replace_document(&mut self, document: Document) {
        self.document = document;
        self.selection.clear();
        self.undo.clear();
        self.redo.clear();
        debug!(nodes = self.document.node_count(), "document replaced");
    }

    /// Selects a node and returns its fields, or clears the selection with `None`.
    pub fn select(&mut self, node_id: Option<&str>) -> Result<Option<FieldSet>, DesignerError> {
        let Some(node_id) = node_id else {
            self.selection.clear();
            return Ok(None);
        };
        let fields = self.sync.fields(&self.document, node_id)?;
        self.selection.select(fields.node_id.clone());
        Ok(Some(fields))
    }

    /// The fields of the selected node, if any.
    pub fn selected_fields(&self) -> Option<FieldSet> {
        let id = self.selection.selected()?;
        self.sync.fields(&self.document, id.as_str()).ok()
    }

    /// Runs a mutation against the current document and keeps the result.
    pub fn apply<F>(&mut self, mutation: F) -> Result<(), DesignerError>
    where
        F: FnOnce(&MutationEngine<'c>, &Document) -> Result<Document, DesignerError>,
    {
        let next = mutation(&self.engine, &self.document)?;
        self.commit(next);
        Ok(())
    }

    /// Applies a field edit to the selected node.
    pub fn edit(&mut self, edit: FieldEdit) -> Result<EditOutcome, DesignerError> {
        let id = self
            .selection
            .selected()
            .cloned()
            .ok_or(DesignerError::NotFound {
                what: "selection",
                name: String::new(),
            })?;
        let outcome = self.sync.apply(&self.document, id.as_str(), edit)?;
        self.commit(outcome.document.clone());
        Ok(outcome)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Steps back one change. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.document, previous);
        self.redo.push(current);
        self.drop_stale_selection();
        trace!(undo = self.undo.len(), redo = self.redo.len(), "undo");
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.document, next);
        self.undo.push_back(current);
        self.drop_stale_selection();
        trace!(undo = self.undo.len(), redo = self.redo.len(), "redo");
        true
    }

    fn commit(&mut self, next: Document) {
        let previous = std::mem::replace(&mut self.document, next);
        self.undo.push_back(previous);
        self.redo.clear();
        self.trim_history();
        self.drop_stale_selection();
    }

    fn trim_history(&mut self) {
        while self.undo.len() > self.history_limit {
            self.undo.pop_front();
        }
    }

    fn drop_stale_selection(&mut self) {
        let stale = self
            .selection
            .selected()
            .is_some_and(|id| !self.document.contains(id.as_str()));
        if stale {
            self.selection.clear();
        }
    }
}
