use super::MutationEngine;
use super::locate::{Location, locate, node_at, node_at_mut, take_at};
use crate::catalog::{NodeRole, tags};
use crate::error::DesignerError;
use crate::model::{Document, Node};
use ahash::AHashSet;
use tracing::{debug, trace};

const DOCUMENT: &str = "Document";
const FLOWS: &str = "flows";

impl MutationEngine<'_> {
    /// Inserts `node` under `parent_id`, or at document level when `parent_id`
    /// is `None` or empty.
    ///
    /// Without an explicit `slot`, the first slot of the parent that accepts the
    /// node's type is used. `position` is clamped to the slot length; `None` appends.
    /// At document level, types with a root wrapper (`From`, REST verbs) are wrapped
    /// in a fresh root and `Bean`s go into the bean registry.
    pub fn add_step(
        &self,
        doc: &Document,
        node: Node,
        parent_id: Option<&str>,
        slot: Option<&str>,
        position: Option<usize>,
    ) -> Result<Document, DesignerError> {
        self.check_subtree(&node)?;
        self.check_ids_free(doc, &node, None)?;

        let id = node.id().clone();
        let mut next = doc.clone();
        match parent_id.filter(|p| !p.is_empty()) {
            None => self.place_root(&mut next, node, position)?,
            Some(parent_id) => {
                if node.type_tag() == tags::BEAN {
                    self.check_bean_name(&next, &node)?;
                }
                self.place_child(&mut next, node, parent_id, slot, position)?;
            }
        }

        debug!(node = %id, parent = parent_id.unwrap_or(DOCUMENT), "step added");
        Ok(next)
    }

    /// Removes a node and its subtree. Unknown ids are ignored.
    ///
    /// Removing the content of a required single slot (the `from` of a route)
    /// removes the parent as well. Other parents stay, even when left empty.
    pub fn delete_step(&self, doc: &Document, node_id: &str) -> Document {
        let Some(location) = locate(doc, node_id) else {
            trace!(node = node_id, "delete of unknown node ignored");
            return doc.clone();
        };
        let mut next = doc.clone();
        self.remove_at(&mut next, location);
        debug!(node = node_id, "step deleted");
        next
    }

    /// Replaces the node carrying the same id as `updated`, in place.
    ///
    /// This is the path every property edit takes: clone the node, change the
    /// clone, hand it back here.
    pub fn update_node(&self, doc: &Document, updated: Node) -> Result<Document, DesignerError> {
        let location = locate(doc, updated.id().as_str())
            .ok_or_else(|| DesignerError::node_not_found(updated.id().as_str()))?;
        let current = node_at(doc, &location)
            .ok_or_else(|| DesignerError::node_not_found(updated.id().as_str()))?;

        self.check_subtree(&updated)?;
        self.check_placement(doc, &location, current, &updated)?;
        self.check_ids_free(doc, &updated, Some(current))?;
        if updated.type_tag() == tags::BEAN {
            self.check_bean_name(doc, &updated)?;
        }

        let id = updated.id().clone();
        let mut next = doc.clone();
        if let Some(target) = node_at_mut(&mut next, &location) {
            *target = updated;
        }
        debug!(node = %id, "node updated");
        Ok(next)
    }

    /// Moves a node, keeping its id, to a new parent (or to document level).
    pub fn move_step(
        &self,
        doc: &Document,
        node_id: &str,
        new_parent_id: Option<&str>,
        slot: Option<&str>,
        position: Option<usize>,
    ) -> Result<Document, DesignerError> {
        let node = doc
            .find(node_id)
            .cloned()
            .ok_or_else(|| DesignerError::node_not_found(node_id))?;

        if let Some(parent_id) = new_parent_id.filter(|p| !p.is_empty()) {
            if node.contains(parent_id) {
                return Err(DesignerError::InvalidParent {
                    parent_id: parent_id.to_string(),
                    reason: "a node cannot be moved into its own subtree".to_string(),
                });
            }
        }

        let detached = self.delete_step(doc, node_id);
        self.add_step(&detached, node, new_parent_id, slot, position)
    }

    /// Converts a node into an equivalent shape of another type, following the
    /// conversion rules declared in the catalog.
    pub fn convert_node(
        &self,
        doc: &Document,
        node_id: &str,
        target_type: &str,
    ) -> Result<Document, DesignerError> {
        let location =
            locate(doc, node_id).ok_or_else(|| DesignerError::node_not_found(node_id))?;
        let current =
            node_at(doc, &location).ok_or_else(|| DesignerError::node_not_found(node_id))?;
        self.catalog.descriptor(target_type)?;

        let replacement = self.catalog.convert(current, target_type).ok_or_else(|| {
            DesignerError::NotConvertible {
                from: current.type_tag().to_string(),
                to: target_type.to_string(),
            }
        })?;

        self.check_subtree(&replacement)?;
        self.check_placement(doc, &location, current, &replacement)?;
        self.check_ids_free(doc, &replacement, Some(current))?;

        let mut next = doc.clone();
        if let Some(target) = node_at_mut(&mut next, &location) {
            *target = replacement;
        }
        debug!(node = node_id, target = target_type, "node converted");
        Ok(next)
    }

    /// Adds a bean to the registry root, creating the root on first use.
    pub fn add_bean(&self, doc: &Document, bean: Node) -> Result<Document, DesignerError> {
        self.check_subtree(&bean)?;
        self.check_ids_free(doc, &bean, None)?;
        let mut next = doc.clone();
        self.place_bean(&mut next, bean)?;
        Ok(next)
    }

    /// Removes a bean from the registry. Ids that are not registry beans are ignored.
    pub fn delete_bean(&self, doc: &Document, bean_id: &str) -> Document {
        let Some(location) = locate(doc, bean_id) else {
            return doc.clone();
        };
        let in_registry = location.path.len() == 1
            && doc
                .flows()
                .get(location.root)
                .is_some_and(|root| root.type_tag() == tags::BEANS);
        if !in_registry {
            trace!(node = bean_id, "not a registry bean, ignored");
            return doc.clone();
        }
        let mut next = doc.clone();
        self.remove_at(&mut next, location);
        debug!(node = bean_id, "bean deleted");
        next
    }

    fn place_root(
        &self,
        doc: &mut Document,
        node: Node,
        position: Option<usize>,
    ) -> Result<(), DesignerError> {
        let descriptor = self.catalog.descriptor(node.type_tag())?;

        if descriptor.role == NodeRole::Root {
            self.check_singleton_root(doc, node.type_tag())?;
            insert_flow(doc, node, position);
            return Ok(());
        }

        if node.type_tag() == tags::BEAN {
            return self.place_bean(doc, node);
        }

        if let Some(w) = self.catalog.root_wrapper(node.type_tag()) {
            let many = self
                .catalog
                .slot(&w.wrapper, &w.slot)
                .is_some_and(|meta| meta.is_many());
            let mut wrapper = Node::new(w.wrapper.clone());
            wrapper.insert_child(&w.slot, many, None, node);
            insert_flow(doc, wrapper, position);
            return Ok(());
        }

        Err(DesignerError::InvalidSlot {
            parent_type: DOCUMENT.to_string(),
            slot: FLOWS.to_string(),
            child_type: node.type_tag().to_string(),
            reason: "only routes, REST services, REST configuration and beans live at document level"
                .to_string(),
        })
    }

    fn place_child(
        &self,
        doc: &mut Document,
        node: Node,
        parent_id: &str,
        slot: Option<&str>,
        position: Option<usize>,
    ) -> Result<(), DesignerError> {
        let invalid_parent = || DesignerError::InvalidParent {
            parent_id: parent_id.to_string(),
            reason: "no node with this id exists".to_string(),
        };
        let location = locate(doc, parent_id).ok_or_else(invalid_parent)?;
        let parent = node_at_mut(doc, &location).ok_or_else(invalid_parent)?;
        let parent_type = parent.type_tag().to_string();

        let slot = match slot {
            Some(slot) => slot.to_string(),
            None => self
                .catalog
                .default_slot(&parent_type, node.type_tag())
                .ok_or_else(|| DesignerError::InvalidSlot {
                    parent_type: parent_type.clone(),
                    slot: "<any>".to_string(),
                    child_type: node.type_tag().to_string(),
                    reason: "no slot of the parent accepts this type".to_string(),
                })?
                .to_string(),
        };

        let invalid_slot = |reason: &str| DesignerError::InvalidSlot {
            parent_type: parent_type.clone(),
            slot: slot.clone(),
            child_type: node.type_tag().to_string(),
            reason: reason.to_string(),
        };
        if !self
            .catalog
            .allows_child(&parent_type, &slot, node.type_tag())
        {
            return Err(invalid_slot("the catalog does not allow this nesting"));
        }
        let many = self
            .catalog
            .slot(&parent_type, &slot)
            .is_some_and(|meta| meta.is_many());
        if !many && parent.get(&slot).is_some() {
            return Err(invalid_slot("the slot is already occupied"));
        }

        parent.insert_child(&slot, many, position, node);
        Ok(())
    }

    fn place_bean(&self, doc: &mut Document, bean: Node) -> Result<(), DesignerError> {
        if bean.type_tag() != tags::BEAN {
            return Err(DesignerError::InvalidSlot {
                parent_type: tags::BEANS.to_string(),
                slot: "beans".to_string(),
                child_type: bean.type_tag().to_string(),
                reason: "only beans belong in the bean registry".to_string(),
            });
        }
        self.check_bean_name(doc, &bean)?;

        let flows = doc.flows_mut();
        match flows.iter_mut().find(|n| n.type_tag() == tags::BEANS) {
            Some(registry) => registry.insert_child("beans", true, None, bean),
            None => {
                let mut registry = Node::new(tags::BEANS);
                registry.insert_child("beans", true, None, bean);
                flows.push(registry);
            }
        }
        Ok(())
    }

    fn remove_at(&self, doc: &mut Document, location: Location) {
        let parent = location.parent();
        take_at(doc, &location);

        let Some((parent_location, step)) = parent else {
            return;
        };
        let Some(parent_node) = node_at(doc, &parent_location) else {
            return;
        };
        let required_slot_emptied = parent_node.get(&step.slot).is_none()
            && self
                .catalog
                .slot(parent_node.type_tag(), &step.slot)
                .is_some_and(|meta| meta.required && !meta.is_many());

        if required_slot_emptied {
            trace!(node = %parent_node.id(), "removing emptied parent");
            self.remove_at(doc, parent_location);
        }
    }

    /// Every node of the subtree has a known type, only declared properties of
    /// the right shape, and children only in slots that accept them.
    pub(crate) fn check_subtree(&self, node: &Node) -> Result<(), DesignerError> {
        let descriptor = self.catalog.descriptor(node.type_tag())?;
        for (name, value) in node.properties() {
            let meta = descriptor
                .property(name)
                .ok_or_else(|| DesignerError::InvalidValue {
                    type_tag: node.type_tag().to_string(),
                    property: name.clone(),
                    value: value.to_string(),
                    reason: "property is not declared for this type".to_string(),
                })?;
            if !meta.accepts(value) {
                return Err(DesignerError::InvalidValue {
                    type_tag: node.type_tag().to_string(),
                    property: name.clone(),
                    value: value.to_string(),
                    reason: format!("expected a {:?} value", meta.kind),
                });
            }
        }
        for (slot, child) in node.children() {
            if !self
                .catalog
                .allows_child(node.type_tag(), slot, child.type_tag())
            {
                return Err(DesignerError::InvalidSlot {
                    parent_type: node.type_tag().to_string(),
                    slot: slot.to_string(),
                    child_type: child.type_tag().to_string(),
                    reason: "the catalog does not allow this nesting".to_string(),
                });
            }
            self.check_subtree(child)?;
        }
        Ok(())
    }

    /// No id of `node`'s subtree may be used elsewhere in `doc`. Ids belonging to
    /// `replacing` (the node being swapped out) are free for reuse.
    fn check_ids_free(
        &self,
        doc: &Document,
        node: &Node,
        replacing: Option<&Node>,
    ) -> Result<(), DesignerError> {
        let released: AHashSet<String> = replacing
            .map(|n| n.ids().into_iter().map(|id| id.as_str().to_string()).collect())
            .unwrap_or_default();
        let mut taken: AHashSet<&str> = AHashSet::new();
        doc.walk(&mut |n| {
            if !released.contains(n.id().as_str()) {
                taken.insert(n.id().as_str());
            }
        });

        let mut seen: AHashSet<String> = AHashSet::new();
        for id in node.ids() {
            if taken.contains(id.as_str()) || !seen.insert(id.as_str().to_string()) {
                return Err(DesignerError::DuplicateId(id.as_str().to_string()));
            }
        }
        Ok(())
    }

    /// A replacement must fit where the current node sits.
    fn check_placement(
        &self,
        doc: &Document,
        location: &Location,
        current: &Node,
        replacement: &Node,
    ) -> Result<(), DesignerError> {
        match location.parent() {
            None => {
                let descriptor = self.catalog.descriptor(replacement.type_tag())?;
                if descriptor.role != NodeRole::Root {
                    return Err(DesignerError::InvalidSlot {
                        parent_type: DOCUMENT.to_string(),
                        slot: FLOWS.to_string(),
                        child_type: replacement.type_tag().to_string(),
                        reason: "only root types live at document level".to_string(),
                    });
                }
                if replacement.type_tag() != current.type_tag() {
                    self.check_singleton_root(doc, replacement.type_tag())?;
                }
                Ok(())
            }
            Some((parent_location, step)) => {
                let parent = node_at(doc, &parent_location)
                    .ok_or_else(|| DesignerError::node_not_found(current.id().as_str()))?;
                if self
                    .catalog
                    .allows_child(parent.type_tag(), &step.slot, replacement.type_tag())
                {
                    Ok(())
                } else {
                    Err(DesignerError::InvalidSlot {
                        parent_type: parent.type_tag().to_string(),
                        slot: step.slot,
                        child_type: replacement.type_tag().to_string(),
                        reason: "the catalog does not allow this nesting".to_string(),
                    })
                }
            }
        }
    }

    fn check_singleton_root(&self, doc: &Document, type_tag: &str) -> Result<(), DesignerError> {
        let exists = match type_tag {
            tags::REST_CONFIGURATION => doc.rest_configuration().is_some(),
            tags::BEANS => doc.beans().is_some(),
            _ => false,
        };
        if exists {
            Err(DesignerError::DuplicateRoot(type_tag.to_string()))
        } else {
            Ok(())
        }
    }

    /// Bean names are unique within the registry.
    fn check_bean_name(&self, doc: &Document, bean: &Node) -> Result<(), DesignerError> {
        let Some(name) = bean.get_text("name") else {
            return Ok(());
        };
        let clash = doc
            .beans()
            .into_iter()
            .flat_map(|registry| registry.children_of_type(tags::BEAN))
            .any(|other| other.id() != bean.id() && other.get_text("name") == Some(name));
        if clash {
            return Err(DesignerError::InvalidValue {
                type_tag: tags::BEAN.to_string(),
                property: "name".to_string(),
                value: name.to_string(),
                reason: "a bean with this name already exists".to_string(),
            });
        }
        Ok(())
    }
}

fn insert_flow(doc: &mut Document, node: Node, position: Option<usize>) {
    let flows = doc.flows_mut();
    let at = position.unwrap_or(flows.len()).min(flows.len());
    flows.insert(at, node);
}
