use super::{Node, NodeId};
use crate::catalog::{Catalog, NodeRole, tags};
use crate::engine::MutationEngine;
use crate::error::SerializationError;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// The in-memory representation of one integration flow file: an ordered list
/// of root nodes (routes, REST services, the REST configuration, bean registries).
///
/// A `Document` is a plain value. The mutation engine never changes one in place;
/// it clones, applies the change and hands back the new value, so keeping the old
/// reference around is all it takes to undo.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    flows: Vec<Node>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a document exchanged as JSON and checks it the way `serialize::parse`
    /// checks YAML: known types, declared properties, allowed nesting, unique ids
    /// and a single `RestConfiguration` and `Beans`.
    ///
    /// Going through `serde_json` directly skips all of this.
    pub fn from_json(json: &str, catalog: &Catalog) -> Result<Self, SerializationError> {
        let doc: Document = serde_json::from_str(json)
            .map_err(|e| SerializationError::JsonParseError(e.to_string()))?;

        let engine = MutationEngine::new(catalog);
        for (i, root) in doc.flows.iter().enumerate() {
            engine.check_subtree(root)?;
            if catalog.descriptor(root.type_tag())?.role != NodeRole::Root {
                return Err(SerializationError::InvalidShape {
                    path: format!("$[{}]", i),
                    expected: "a route, REST service, REST configuration or beans".to_string(),
                });
            }
        }

        let mut seen: AHashSet<&str> = AHashSet::new();
        let mut duplicate = None;
        doc.walk(&mut |n| {
            if !seen.insert(n.id().as_str()) && duplicate.is_none() {
                duplicate = Some(n.id().to_string());
            }
        });
        if let Some(id) = duplicate {
            return Err(SerializationError::DuplicateId(id));
        }

        for singleton in [tags::REST_CONFIGURATION, tags::BEANS] {
            if doc.flows.iter().filter(|n| n.type_tag() == singleton).count() > 1 {
                return Err(SerializationError::DuplicateRoot(singleton.to_string()));
            }
        }
        Ok(doc)
    }

    /// Wraps already-validated root nodes.
    pub(crate) fn from_flows(flows: Vec<Node>) -> Self {
        Self { flows }
    }

    pub fn flows(&self) -> &[Node] {
        &self.flows
    }

    pub(crate) fn flows_mut(&mut self) -> &mut Vec<Node> {
        &mut self.flows
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Total number of nodes, roots included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }

    pub fn find(&self, id: &str) -> Option<&Node> {
        self.flows.iter().find_map(|root| root.find(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Visits every node of every flow, pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        for root in &self.flows {
            root.walk(visit);
        }
    }

    /// All node ids in document order.
    pub fn all_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.walk(&mut |n| ids.push(n.id().clone()));
        ids
    }

    pub fn routes(&self) -> impl Iterator<Item = &Node> {
        self.flows.iter().filter(|n| n.type_tag() == tags::ROUTE)
    }

    pub fn rests(&self) -> impl Iterator<Item = &Node> {
        self.flows.iter().filter(|n| n.type_tag() == tags::REST)
    }

    pub fn rest_configuration(&self) -> Option<&Node> {
        self.flows
            .iter()
            .find(|n| n.type_tag() == tags::REST_CONFIGURATION)
    }

    pub fn beans(&self) -> Option<&Node> {
        self.flows.iter().find(|n| n.type_tag() == tags::BEANS)
    }
}
