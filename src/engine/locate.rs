use crate::model::{Document, Node};

/// One step down from a parent: the slot name and the index within it.
/// Single-node slots always use index 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotIndex {
    pub slot: String,
    pub index: usize,
}

/// The position of a node: the flow it belongs to and the path down from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub root: usize,
    pub path: Vec<SlotIndex>,
}

impl Location {
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// The parent's location and the step leading from it to this node.
    pub fn parent(&self) -> Option<(Location, SlotIndex)> {
        let mut parent = self.clone();
        let step = parent.path.pop()?;
        Some((parent, step))
    }
}

pub fn locate(doc: &Document, id: &str) -> Option<Location> {
    doc.flows().iter().enumerate().find_map(|(root, node)| {
        let mut path = Vec::new();
        search(node, id, &mut path).then_some(Location { root, path })
    })
}

fn search(node: &Node, id: &str, path: &mut Vec<SlotIndex>) -> bool {
    if node.id().as_str() == id {
        return true;
    }
    for (slot, index, child) in node.indexed_children() {
        path.push(SlotIndex {
            slot: slot.to_string(),
            index,
        });
        if search(child, id, path) {
            return true;
        }
        path.pop();
    }
    false
}

pub fn node_at<'d>(doc: &'d Document, location: &Location) -> Option<&'d Node> {
    let mut node = doc.flows().get(location.root)?;
    for step in &location.path {
        node = node.child(&step.slot, step.index)?;
    }
    Some(node)
}

pub(crate) fn node_at_mut<'d>(doc: &'d mut Document, location: &Location) -> Option<&'d mut Node> {
    let mut node = doc.flows_mut().get_mut(location.root)?;
    for step in &location.path {
        node = node.child_mut(&step.slot, step.index)?;
    }
    Some(node)
}

/// Detaches the node at `location` and returns it.
pub(crate) fn take_at(doc: &mut Document, location: &Location) -> Option<Node> {
    match location.parent() {
        None => {
            let flows = doc.flows_mut();
            (location.root < flows.len()).then(|| flows.remove(location.root))
        }
        Some((parent, step)) => node_at_mut(doc, &parent)?.take_child(&step.slot, step.index),
    }
}
