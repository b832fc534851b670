//! Structural conversions between equivalent node shapes.
//!
//! A conversion is declared once here instead of being implied by whatever the
//! palette happens to offer. Each rule pairs a source and a target match with a
//! pure mapping that builds the replacement node.
use super::Catalog;
use super::descriptor::{Descriptor, NodeRole};
use super::tags;
use crate::model::Node;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeMatch {
    Exact(String),
    /// Any type whose role is `NodeRole::Processor`.
    AnyProcessor,
}

impl TypeMatch {
    fn matches(&self, catalog: &Catalog, type_tag: &str) -> bool {
        match self {
            TypeMatch::Exact(t) => t == type_tag,
            TypeMatch::AnyProcessor => catalog
                .resolve(type_tag)
                .is_some_and(|d| d.role == NodeRole::Processor),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionMapping {
    /// Same id, new type. Properties both types declare with the same shape are
    /// carried over, the rest are dropped.
    Retag,
    /// The node becomes the only child of a new node of the target type.
    Wrap { slot: String },
    /// A node holding exactly one child of the target type is replaced by it.
    Unwrap { slot: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRule {
    pub source: TypeMatch,
    pub target: TypeMatch,
    pub mapping: ConversionMapping,
}

impl ConversionRule {
    pub fn retag(from: &str, to: &str) -> Self {
        Self {
            source: TypeMatch::Exact(from.to_string()),
            target: TypeMatch::Exact(to.to_string()),
            mapping: ConversionMapping::Retag,
        }
    }

    /// Any processor may be wrapped into `target` under `slot`.
    pub fn wrap(target: &str, slot: &str) -> Self {
        Self {
            source: TypeMatch::AnyProcessor,
            target: TypeMatch::Exact(target.to_string()),
            mapping: ConversionMapping::Wrap {
                slot: slot.to_string(),
            },
        }
    }

    /// `source` may be unwrapped into its single child held under `slot`.
    pub fn unwrap(source: &str, slot: &str) -> Self {
        Self {
            source: TypeMatch::Exact(source.to_string()),
            target: TypeMatch::AnyProcessor,
            mapping: ConversionMapping::Unwrap {
                slot: slot.to_string(),
            },
        }
    }

    pub fn matches(&self, catalog: &Catalog, from: &str, to: &str) -> bool {
        self.source.matches(catalog, from) && self.target.matches(catalog, to)
    }

    /// Builds the replacement for `node`, or `None` when the node's content does
    /// not fit this rule (e.g. unwrapping a pipeline with two steps).
    pub fn apply(&self, node: &Node, source: &Descriptor, target: &Descriptor) -> Option<Node> {
        match &self.mapping {
            ConversionMapping::Retag => {
                let mut converted = Node::with_id(node.id().clone(), target.type_tag.clone());
                for (name, value) in node.properties() {
                    let carried = match (source.property(name), target.property(name)) {
                        (Some(from), Some(to)) => {
                            from.kind == to.kind && from.nested == to.nested && to.accepts(value)
                        }
                        _ => false,
                    };
                    if carried {
                        converted.set(name, value.clone());
                    }
                }
                Some(converted)
            }
            ConversionMapping::Wrap { slot } => {
                let meta = target.property(slot)?;
                if !meta.is_steps() {
                    return None;
                }
                let mut wrapper = Node::new(target.type_tag.clone());
                wrapper.insert_child(slot, true, None, node.clone());
                Some(wrapper)
            }
            ConversionMapping::Unwrap { slot } => match node.get(slot)?.as_nodes()? {
                [only] if only.type_tag() == target.type_tag => Some(only.clone()),
                _ => None,
            },
        }
    }
}

/// The built-in conversions. Rules are tried in this order, so retags win over
/// unwraps, and unwraps over wraps.
pub(crate) fn default_conversions() -> Vec<ConversionRule> {
    let mut rules = Vec::new();

    for group in [
        &[tags::TO, tags::TO_D, tags::WIRE_TAP, tags::POLL][..],
        &[tags::SET_BODY, tags::SET_HEADER, tags::SET_PROPERTY][..],
        &[tags::FILTER, tags::PIPELINE][..],
    ] {
        for from in group {
            for to in group.iter().filter(|to| *to != from) {
                rules.push(ConversionRule::retag(from, to));
            }
        }
    }

    rules.push(ConversionRule::unwrap(tags::PIPELINE, "steps"));

    for wrapper in [
        tags::PIPELINE,
        tags::FILTER,
        tags::SPLIT,
        tags::MULTICAST,
        tags::DO_TRY,
    ] {
        rules.push(ConversionRule::wrap(wrapper, "steps"));
    }

    rules
}
