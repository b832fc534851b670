//! The mutation engine: pure operations turning one `Document` into the next.
//!
//! Every operation takes the current document by reference and returns a new one.
//! Failures leave the input untouched, so callers simply keep their previous value.
use crate::catalog::Catalog;

pub mod locate;
mod mutation;
mod query;

pub use locate::{Location, SlotIndex, locate, node_at};
pub use query::FollowUp;

pub struct MutationEngine<'c> {
    catalog: &'c Catalog,
}

impl<'c> MutationEngine<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }
}
