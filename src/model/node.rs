use super::PropertyValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// The stable identity of a node. Assigned once at creation and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a new id of the form `<prefix>-<uuid>`.
    pub fn fresh(prefix: &str) -> Self {
        Self(format!("{}-{}", prefix, Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A single typed element of a flow: a step, a route, a bean, a REST verb...
///
/// `Clone` is the deep copy used for copy-on-write edits: the clone keeps every id
/// in the subtree, so `updateNode` can find the original again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    #[serde(rename = "type")]
    type_tag: String,
    #[serde(default)]
    properties: IndexMap<String, PropertyValue>,
}

impl Node {
    /// Creates an empty node with a freshly generated id.
    ///
    /// This does not check `type_tag` against a catalog; use
    /// [`Catalog::create_node`](crate::catalog::Catalog::create_node) for that.
    pub fn new(type_tag: impl Into<String>) -> Self {
        let type_tag = type_tag.into();
        let id = NodeId::fresh(&id_prefix(&type_tag));
        Self {
            id,
            type_tag,
            properties: IndexMap::new(),
        }
    }

    /// Creates an empty node with an explicit id, e.g. one read from a document.
    pub fn with_id(id: impl Into<NodeId>, type_tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_tag: type_tag.into(),
            properties: IndexMap::new(),
        }
    }

    /// Builder-style `set`.
    pub fn with(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn properties(&self) -> &IndexMap<String, PropertyValue> {
        &self.properties
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropertyValue::as_text)
    }

    /// Sets a property, keeping its position if it already existed.
    pub fn set(&mut self, name: &str, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        self.properties.insert(name.to_string(), value.into())
    }

    /// Removes a property without disturbing the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        self.properties.shift_remove(name)
    }

    /// Iterates over all direct children as `(slot, index, child)`.
    pub fn indexed_children(&self) -> impl Iterator<Item = (&str, usize, &Node)> + '_ {
        self.properties.iter().flat_map(|(slot, value)| {
            let children: Vec<(usize, &Node)> = match value {
                PropertyValue::Node(n) => vec![(0, n.as_ref())],
                PropertyValue::Nodes(list) => list.iter().enumerate().collect(),
                _ => Vec::new(),
            };
            children
                .into_iter()
                .map(move |(index, child)| (slot.as_str(), index, child))
        })
    }

    /// Iterates over all direct children as `(slot, child)`.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> + '_ {
        self.indexed_children().map(|(slot, _, child)| (slot, child))
    }

    /// Direct children of the given type, in slot order.
    pub fn children_of_type<'a>(&'a self, type_tag: &'a str) -> impl Iterator<Item = &'a Node> {
        self.children()
            .map(|(_, child)| child)
            .filter(move |child| child.type_tag == type_tag)
    }

    pub fn child(&self, slot: &str, index: usize) -> Option<&Node> {
        match self.properties.get(slot)? {
            PropertyValue::Node(n) if index == 0 => Some(n),
            PropertyValue::Nodes(list) => list.get(index),
            _ => None,
        }
    }

    pub(crate) fn child_mut(&mut self, slot: &str, index: usize) -> Option<&mut Node> {
        match self.properties.get_mut(slot)? {
            PropertyValue::Node(n) if index == 0 => Some(n),
            PropertyValue::Nodes(list) => list.get_mut(index),
            _ => None,
        }
    }

    /// Inserts `child` into a slot. Single slots are overwritten, list slots are
    /// created on demand and the position is clamped to the list length.
    pub(crate) fn insert_child(
        &mut self,
        slot: &str,
        many: bool,
        position: Option<usize>,
        child: Node,
    ) {
        if !many {
            self.properties
                .insert(slot.to_string(), PropertyValue::Node(Box::new(child)));
            return;
        }
        match self.properties.get_mut(slot) {
            Some(PropertyValue::Nodes(list)) => {
                let at = position.unwrap_or(list.len()).min(list.len());
                list.insert(at, child);
            }
            _ => {
                self.properties
                    .insert(slot.to_string(), PropertyValue::Nodes(vec![child]));
            }
        }
    }

    /// Removes and returns a child. A list slot left empty is removed entirely.
    pub(crate) fn take_child(&mut self, slot: &str, index: usize) -> Option<Node> {
        let is_single = matches!(self.properties.get(slot)?, PropertyValue::Node(_));
        if is_single {
            if index != 0 {
                return None;
            }
            return match self.properties.shift_remove(slot) {
                Some(PropertyValue::Node(n)) => Some(*n),
                _ => None,
            };
        }

        let list = match self.properties.get_mut(slot)? {
            PropertyValue::Nodes(list) => list,
            _ => return None,
        };
        if index >= list.len() {
            return None;
        }
        let taken = list.remove(index);
        if list.is_empty() {
            self.properties.shift_remove(slot);
        }
        Some(taken)
    }

    /// Depth-first, pre-order search of this subtree.
    pub fn find(&self, id: &str) -> Option<&Node> {
        if self.id.as_str() == id {
            return Some(self);
        }
        self.children().find_map(|(_, child)| child.find(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Calls `visit` on this node and every descendant, pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for (_, child) in self.children() {
            child.walk(visit);
        }
    }

    /// All ids of this subtree, pre-order.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.walk(&mut |n| ids.push(n.id.clone()));
        ids
    }
}

/// `RestConfiguration` -> `restConfiguration`, `ToD` -> `toD`.
pub(crate) fn id_prefix(type_tag: &str) -> String {
    let mut chars = type_tag.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => "node".to_string(),
    }
}
