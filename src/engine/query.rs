use super::MutationEngine;
use super::locate::{SlotIndex, locate, node_at};
use crate::catalog::reference::uri_scheme;
use crate::catalog::{Descriptor, tags};
use crate::error::DesignerError;
use crate::model::{Document, Node, NodeId};
use tracing::debug;

/// Endpoint schemes whose producers need a route consuming from the same uri.
const LINKED_SCHEMES: &[&str] = &["direct", "seda"];

/// Something the host should offer the user after a change, returned as a plain
/// value instead of being triggered directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// No route consumes `uri` yet. `requested_by` is the node sending to it.
    CreateRoute { uri: String, requested_by: NodeId },
}

impl MutationEngine<'_> {
    pub fn find_node<'d>(&self, doc: &'d Document, node_id: &str) -> Option<&'d Node> {
        doc.find(node_id)
    }

    /// The parent of a node and the slot position it sits in. Roots have no parent.
    pub fn find_parent<'d>(
        &self,
        doc: &'d Document,
        node_id: &str,
    ) -> Option<(&'d Node, SlotIndex)> {
        let (parent, step) = locate(doc, node_id)?.parent()?;
        Some((node_at(doc, &parent)?, step))
    }

    /// The root flow (route, REST service...) holding a node.
    pub fn route_for<'d>(&self, doc: &'d Document, node_id: &str) -> Option<&'d Node> {
        let location = locate(doc, node_id)?;
        doc.flows().get(location.root)
    }

    pub fn all_ids(&self, doc: &Document) -> Vec<NodeId> {
        doc.all_ids()
    }

    pub fn children_of_type<'n>(&self, node: &'n Node, type_tag: &'n str) -> Vec<&'n Node> {
        node.children_of_type(type_tag).collect()
    }

    pub fn allowed_child_types(&self, parent_type: &str, slot: &str) -> Vec<&Descriptor> {
        self.catalog.allowed_child_types(parent_type, slot)
    }

    /// The title shown on the canvas. Endpoints use the title of the component
    /// or kamelet they point at.
    pub fn title(&self, node: &Node) -> Result<String, DesignerError> {
        let descriptor = self.catalog.descriptor(node.type_tag())?;
        let reference = self.catalog.reference();

        if let Some(name) = self.kamelet_name(node) {
            if let Some(k) = reference.kamelet(name).filter(|k| !k.title.is_empty()) {
                return Ok(k.title.clone());
            }
        } else if let Some(c) = node
            .get_text("uri")
            .and_then(|uri| reference.component_for_uri(uri))
        {
            if !c.title.is_empty() {
                return Ok(c.title.clone());
            }
        }
        Ok(descriptor.title.clone())
    }

    /// The description shown under the title: the node's own description if set,
    /// else its most telling property, else the descriptor's description.
    pub fn description(&self, node: &Node) -> Result<String, DesignerError> {
        let descriptor = self.catalog.descriptor(node.type_tag())?;
        if let Some(own) = node.get_text("description").filter(|d| !d.is_empty()) {
            return Ok(own.to_string());
        }
        for key in ["uri", "message", "name", "expression", "path", "to"] {
            let shown = node
                .get(key)
                .filter(|v| v.is_scalar() || v.as_expression().is_some());
            if let Some(value) = shown {
                return Ok(value.to_string());
            }
        }
        Ok(descriptor.description.clone())
    }

    /// The icon key: the component name for endpoints, the descriptor's icon otherwise.
    pub fn icon_key(&self, node: &Node) -> Result<String, DesignerError> {
        let descriptor = self.catalog.descriptor(node.type_tag())?;
        if let Some(name) = self.kamelet_name(node) {
            return Ok(format!("kamelet:{}", name));
        }
        if let Some(c) = node
            .get_text("uri")
            .and_then(|uri| self.catalog.reference().component_for_uri(uri))
        {
            return Ok(c.name.clone());
        }
        Ok(descriptor.icon.clone())
    }

    fn kamelet_name<'n>(&self, node: &'n Node) -> Option<&'n str> {
        if node.type_tag() == tags::KAMELET {
            return node.get_text("name");
        }
        let rest = node.get_text("uri")?.strip_prefix("kamelet:")?;
        rest.split(['?', '/']).next()
    }

    /// Checks whether the node sends to an internal endpoint nothing consumes.
    ///
    /// REST verbs are checked through their `to`, other steps through `uri`.
    pub fn suggest_follow_up(&self, doc: &Document, node_id: &str) -> Option<FollowUp> {
        let node = doc.find(node_id)?;
        if node.type_tag() == tags::FROM {
            return None;
        }
        let target = if tags::REST_VERBS.contains(&node.type_tag()) {
            node.get_text("to")?
        } else {
            node.get_text("uri")?
        };
        let scheme = uri_scheme(target)?;
        if !LINKED_SCHEMES.contains(&scheme) {
            return None;
        }
        let endpoint = endpoint_of(target);
        if endpoint.len() <= scheme.len() + 1 {
            return None;
        }

        let consumed = doc.routes().any(|route| {
            route
                .get("from")
                .and_then(|v| v.as_node())
                .and_then(|from| from.get_text("uri"))
                .is_some_and(|uri| endpoint_of(uri) == endpoint)
        });
        (!consumed).then(|| FollowUp::CreateRoute {
            uri: endpoint.to_string(),
            requested_by: node.id().clone(),
        })
    }

    /// Points a REST verb at `uri` and reports the route it still needs, if any.
    pub fn link_rest_verb(
        &self,
        doc: &Document,
        verb_id: &str,
        uri: &str,
    ) -> Result<(Document, Option<FollowUp>), DesignerError> {
        let verb = doc
            .find(verb_id)
            .ok_or_else(|| DesignerError::node_not_found(verb_id))?;
        if !tags::REST_VERBS.contains(&verb.type_tag()) {
            return Err(DesignerError::InvalidValue {
                type_tag: verb.type_tag().to_string(),
                property: "to".to_string(),
                value: uri.to_string(),
                reason: "only REST verbs link to a route".to_string(),
            });
        }
        let updated = verb.clone().with("to", uri);
        let next = self.update_node(doc, updated)?;
        let follow_up = self.suggest_follow_up(&next, verb_id);
        Ok((next, follow_up))
    }

    /// Carries out a follow-up: adds a route consuming from the requested uri.
    pub fn create_linked_route(
        &self,
        doc: &Document,
        follow_up: &FollowUp,
    ) -> Result<Document, DesignerError> {
        match follow_up {
            FollowUp::CreateRoute { uri, requested_by } => {
                let from = self.catalog.create_node(tags::FROM, [("uri", uri.as_str())])?;
                let next = self.add_step(doc, from, None, None, None)?;
                debug!(uri = %uri, requested_by = %requested_by, "linked route created");
                Ok(next)
            }
        }
    }
}

/// `direct:orders?timeout=10` -> `direct:orders`
fn endpoint_of(uri: &str) -> &str {
    uri.split('?').next().unwrap_or(uri)
}
