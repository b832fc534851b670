//! The metadata catalog: which types exist, what properties they carry and how
//! they may nest.
//!
//! A `Catalog` is assembled once through a [`CatalogBuilder`] and is read-only
//! afterwards. Everything else in the crate borrows it.
use crate::error::{CatalogError, DesignerError};
use crate::model::{Node, PropertyValue};
use ahash::AHashMap;
use tracing::debug;

pub mod conversion;
mod defaults;
pub mod descriptor;
pub mod reference;
pub mod tags;

pub use conversion::{ConversionMapping, ConversionRule, TypeMatch};
pub use descriptor::{Descriptor, NestedType, NodeRole, PropertyKind, PropertyMeta};
pub use reference::{
    ComponentDescriptor, Direction, KameletDescriptor, KameletKind, ParameterMeta, ReferenceData,
};

/// The root a node is placed into when it is added at document level,
/// e.g. a `From` goes into a new `Route` under `from`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootWrapper {
    pub wrapper: String,
    pub slot: String,
}

/// An entry synthesized from the reference feed, such as "from kafka" or a
/// kamelet sink. It resolves to a real type plus preset properties.
#[derive(Debug, Clone, PartialEq)]
pub struct PseudoType {
    pub tag: String,
    pub base: String,
    pub title: String,
    pub description: String,
    pub labels: Vec<String>,
    pub properties: Vec<(String, PropertyValue)>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    descriptors: AHashMap<String, Descriptor>,
    order: Vec<String>,
    aliases: AHashMap<String, String>,
    conversions: Vec<ConversionRule>,
    wrappers: AHashMap<String, RootWrapper>,
    reference: ReferenceData,
}

pub struct CatalogBuilder {
    descriptors: Vec<Descriptor>,
    aliases: Vec<(String, String)>,
    conversions: Vec<ConversionRule>,
    wrappers: Vec<(String, RootWrapper)>,
    reference: ReferenceData,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogBuilder {
    /// A builder preloaded with the built-in DSL descriptors and conversions.
    pub fn new() -> Self {
        let mut wrappers = vec![(
            tags::FROM.to_string(),
            RootWrapper {
                wrapper: tags::ROUTE.to_string(),
                slot: "from".to_string(),
            },
        )];
        for verb in tags::REST_VERBS {
            wrappers.push((
                verb.to_string(),
                RootWrapper {
                    wrapper: tags::REST.to_string(),
                    slot: defaults::verb_slot(verb),
                },
            ));
        }

        Self {
            descriptors: defaults::default_descriptors(),
            aliases: Vec::new(),
            conversions: conversion::default_conversions(),
            wrappers,
            reference: ReferenceData::default(),
        }
    }

    /// Adds a descriptor, replacing a built-in one with the same type tag.
    pub fn with_descriptor(mut self, descriptor: Descriptor) -> Self {
        self.descriptors.retain(|d| d.type_tag != descriptor.type_tag);
        self.descriptors.push(descriptor);
        self
    }

    /// Lets `alias` resolve to `type_tag`, e.g. `"ToDynamic"` for `"ToD"`.
    pub fn with_type_alias(mut self, alias: &str, type_tag: &str) -> Self {
        self.aliases.push((alias.to_string(), type_tag.to_string()));
        self
    }

    pub fn with_conversion(mut self, rule: ConversionRule) -> Self {
        self.conversions.push(rule);
        self
    }

    pub fn with_root_wrapper(mut self, type_tag: &str, wrapper: &str, slot: &str) -> Self {
        self.wrappers.retain(|(t, _)| t != type_tag);
        self.wrappers.push((
            type_tag.to_string(),
            RootWrapper {
                wrapper: wrapper.to_string(),
                slot: slot.to_string(),
            },
        ));
        self
    }

    pub fn with_reference_data(mut self, reference: ReferenceData) -> Self {
        self.reference = reference;
        self
    }

    /// Builds the catalog, checking that every type referenced by a slot, an
    /// alias or a root wrapper is registered and that DSL names are unique.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let mut seen_tags: AHashMap<&str, ()> = AHashMap::new();
        let mut seen_dsl: AHashMap<&str, &str> = AHashMap::new();
        for d in &self.descriptors {
            if seen_tags.insert(&d.type_tag, ()).is_some() {
                return Err(CatalogError::DuplicateDescriptor(d.type_tag.clone()));
            }
            if let Some(first) = seen_dsl.insert(&d.dsl_name, &d.type_tag) {
                return Err(CatalogError::DuplicateDslName {
                    dsl_name: d.dsl_name.clone(),
                    first: first.to_string(),
                    second: d.type_tag.clone(),
                });
            }
        }

        let unknown = |referenced_by: &str, type_tag: &str| CatalogError::UnknownType {
            referenced_by: referenced_by.to_string(),
            type_tag: type_tag.to_string(),
        };
        for d in &self.descriptors {
            for slot in d.slots() {
                if let Some(NestedType::Fixed(t)) = &slot.nested {
                    if !seen_tags.contains_key(t.as_str()) {
                        return Err(unknown(&format!("{}.{}", d.type_tag, slot.name), t));
                    }
                }
            }
        }
        for (alias, target) in &self.aliases {
            if !seen_tags.contains_key(target.as_str()) {
                return Err(unknown(alias, target));
            }
        }
        for (type_tag, w) in &self.wrappers {
            for t in [type_tag, &w.wrapper] {
                if !seen_tags.contains_key(t.as_str()) {
                    return Err(unknown("root wrapper", t));
                }
            }
        }

        Ok(self.assemble())
    }

    fn assemble(self) -> Catalog {
        let order = self.descriptors.iter().map(|d| d.type_tag.clone()).collect();
        let mut aliases: AHashMap<String, String> = self
            .descriptors
            .iter()
            .map(|d| (d.dsl_name.clone(), d.type_tag.clone()))
            .collect();
        aliases.extend(self.aliases);
        let descriptors = self
            .descriptors
            .into_iter()
            .map(|d| (d.type_tag.clone(), d))
            .collect();

        debug!(
            components = self.reference.components.len(),
            kamelets = self.reference.kamelets.len(),
            "catalog assembled"
        );

        Catalog {
            descriptors,
            order,
            aliases,
            conversions: self.conversions,
            wrappers: self.wrappers.into_iter().collect(),
            reference: self.reference,
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// The built-in descriptors with no reference data.
    pub fn with_defaults() -> Self {
        CatalogBuilder::new().assemble()
    }

    /// Looks up a descriptor by exact type tag.
    pub fn descriptor(&self, type_tag: &str) -> Result<&Descriptor, DesignerError> {
        self.descriptors
            .get(type_tag)
            .ok_or_else(|| DesignerError::type_not_found(type_tag))
    }

    /// Looks up a descriptor by type tag, DSL name or alias.
    pub fn resolve(&self, name: &str) -> Option<&Descriptor> {
        self.descriptors.get(name).or_else(|| {
            self.aliases
                .get(name)
                .and_then(|tag| self.descriptors.get(tag))
        })
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.descriptors.contains_key(type_tag)
    }

    /// All descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> {
        self.order.iter().filter_map(|t| self.descriptors.get(t))
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn root_wrapper(&self, type_tag: &str) -> Option<&RootWrapper> {
        self.wrappers.get(type_tag)
    }

    pub fn conversions(&self) -> &[ConversionRule] {
        &self.conversions
    }

    /// The slot metadata of `parent_type.slot`, if that property is a slot.
    pub fn slot(&self, parent_type: &str, slot: &str) -> Option<&PropertyMeta> {
        self.descriptors
            .get(parent_type)?
            .property(slot)
            .filter(|p| p.is_slot())
    }

    /// Can a `child_type` node sit in `parent_type.slot`?
    pub fn allows_child(&self, parent_type: &str, slot: &str, child_type: &str) -> bool {
        let Some(meta) = self.slot(parent_type, slot) else {
            return false;
        };
        match &meta.nested {
            Some(NestedType::Fixed(t)) => t == child_type,
            Some(NestedType::Processors) => self
                .descriptors
                .get(child_type)
                .is_some_and(|d| d.role == NodeRole::Processor),
            None => false,
        }
    }

    /// The first slot of `parent_type` that accepts `child_type`.
    pub fn default_slot(&self, parent_type: &str, child_type: &str) -> Option<&str> {
        self.descriptors
            .get(parent_type)?
            .slots()
            .find(|s| self.allows_child(parent_type, &s.name, child_type))
            .map(|s| s.name.as_str())
    }

    pub fn has_steps(&self, type_tag: &str) -> bool {
        self.descriptors.get(type_tag).is_some_and(Descriptor::has_steps)
    }

    /// Descriptors that may be placed in `parent_type.slot`, in catalog order.
    pub fn allowed_child_types(&self, parent_type: &str, slot: &str) -> Vec<&Descriptor> {
        self.descriptors()
            .filter(|d| self.allows_child(parent_type, slot, &d.type_tag))
            .collect()
    }

    pub fn title(&self, type_tag: &str) -> Result<&str, DesignerError> {
        self.descriptor(type_tag).map(|d| d.title.as_str())
    }

    pub fn description(&self, type_tag: &str) -> Result<&str, DesignerError> {
        self.descriptor(type_tag).map(|d| d.description.as_str())
    }

    pub fn icon_key(&self, type_tag: &str) -> Result<&str, DesignerError> {
        self.descriptor(type_tag).map(|d| d.icon.as_str())
    }

    /// Builds the replacement for converting `node` into `target`, trying the
    /// declared rules in order.
    pub fn convert(&self, node: &Node, target: &str) -> Option<Node> {
        let source = self.descriptors.get(node.type_tag())?;
        let target = self.descriptors.get(target)?;
        if source.type_tag == target.type_tag {
            return None;
        }
        self.conversions
            .iter()
            .filter(|rule| rule.matches(self, &source.type_tag, &target.type_tag))
            .find_map(|rule| rule.apply(node, source, target))
    }

    /// The types `node` can currently be converted into.
    pub fn convertible_targets(&self, node: &Node) -> Vec<&str> {
        self.descriptors()
            .filter(|d| self.convert(node, &d.type_tag).is_some())
            .map(|d| d.type_tag.as_str())
            .collect()
    }

    /// Creates a node of `type_tag` with a fresh id, rejecting unknown types,
    /// undeclared properties and values of the wrong shape.
    pub fn create_node<K, V>(
        &self,
        type_tag: &str,
        properties: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Node, DesignerError>
    where
        K: AsRef<str>,
        V: Into<PropertyValue>,
    {
        let descriptor = self.descriptor(type_tag)?;
        let mut node = Node::new(type_tag);
        for (name, value) in properties {
            let name = name.as_ref();
            let value = value.into();
            let meta = descriptor
                .property(name)
                .ok_or_else(|| DesignerError::InvalidValue {
                    type_tag: type_tag.to_string(),
                    property: name.to_string(),
                    value: value.to_string(),
                    reason: "property is not declared for this type".to_string(),
                })?;
            if !meta.accepts(&value) {
                return Err(DesignerError::InvalidValue {
                    type_tag: type_tag.to_string(),
                    property: name.to_string(),
                    value: value.to_string(),
                    reason: format!("expected a {:?} value", meta.kind),
                });
            }
            if matches!(&value, PropertyValue::Nodes(list) if list.is_empty()) {
                continue;
            }
            node.set(name, value);
        }
        Ok(node)
    }

    /// Entries synthesized from the reference feed.
    pub fn pseudo_types(&self) -> Vec<PseudoType> {
        let mut entries = Vec::new();
        for c in &self.reference.components {
            let title = if c.title.is_empty() { &c.name } else { &c.title };
            let uri = PropertyValue::Text(format!("{}:", c.name));
            if c.supports(Direction::Consumer) {
                entries.push(PseudoType {
                    tag: format!("component:{}:from", c.name),
                    base: tags::FROM.to_string(),
                    title: title.clone(),
                    description: c.description.clone(),
                    labels: c.labels.clone(),
                    properties: vec![("uri".to_string(), uri.clone())],
                });
            }
            if c.supports(Direction::Producer) {
                entries.push(PseudoType {
                    tag: format!("component:{}:to", c.name),
                    base: tags::TO.to_string(),
                    title: title.clone(),
                    description: c.description.clone(),
                    labels: c.labels.clone(),
                    properties: vec![("uri".to_string(), uri)],
                });
            }
        }
        for k in &self.reference.kamelets {
            let (base, properties) = match k.kind {
                KameletKind::Source => (
                    tags::FROM,
                    vec![(
                        "uri".to_string(),
                        PropertyValue::Text(format!("kamelet:{}", k.name)),
                    )],
                ),
                KameletKind::Sink | KameletKind::Action => (
                    tags::KAMELET,
                    vec![("name".to_string(), PropertyValue::Text(k.name.clone()))],
                ),
            };
            entries.push(PseudoType {
                tag: format!("kamelet:{}", k.name),
                base: base.to_string(),
                title: if k.title.is_empty() {
                    k.name.clone()
                } else {
                    k.title.clone()
                },
                description: k.description.clone(),
                labels: vec![format!("{:?}", k.kind).to_lowercase()],
                properties,
            });
        }
        entries
    }

    pub fn resolve_pseudo(&self, tag: &str) -> Result<PseudoType, DesignerError> {
        self.pseudo_types()
            .into_iter()
            .find(|p| p.tag == tag)
            .ok_or_else(|| DesignerError::type_not_found(tag))
    }

    /// Creates a node for a palette entry: either a real type tag or a pseudo-type.
    pub fn instantiate(&self, tag: &str) -> Result<Node, DesignerError> {
        if self.contains(tag) {
            return self.create_node(tag, Vec::<(String, PropertyValue)>::new());
        }
        let pseudo = self.resolve_pseudo(tag)?;
        self.create_node(&pseudo.base, pseudo.properties)
    }
}
