use crate::model::PropertyValue;
use crate::model::node::id_prefix;
use crate::properties::placeholder;
use serde::{Deserialize, Serialize};

/// The declared shape of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    String,
    Number,
    Boolean,
    Enum,
    Expression,
    /// A single nested node (a slot).
    Object,
    /// An ordered list of nested nodes (a slot).
    ObjectArray,
    /// Component or kamelet parameters: a map of scalars.
    Parameters,
}

/// What a slot property may hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NestedType {
    /// Exactly this type tag.
    Fixed(String),
    /// Any free-standing processor, i.e. a `steps` pipeline.
    Processors,
}

/// How a type may appear in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// A top-level flow.
    Root,
    /// A step that can go into any `steps` slot.
    Processor,
    /// A canvas element that only lives in slots that name it explicitly
    /// (`When`, `DoCatch`, REST verbs, ...).
    Bound,
    /// A plain structured value edited inside a form, e.g. a key/value pair.
    Item,
}

/// Static metadata about a single property of a type.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMeta {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub kind: PropertyKind,
    pub required: bool,
    pub default: Option<PropertyValue>,
    pub enum_values: Vec<String>,
    pub secret: bool,
    pub labels: Vec<String>,
    pub nested: Option<NestedType>,
}

impl PropertyMeta {
    pub fn new(name: &str, kind: PropertyKind) -> Self {
        Self {
            name: name.to_string(),
            display_name: humanize(name),
            description: String::new(),
            kind,
            required: false,
            default: None,
            enum_values: Vec::new(),
            secret: false,
            labels: Vec::new(),
            nested: None,
        }
    }

    /// A single-node slot holding exactly `type_tag`.
    pub fn object(name: &str, type_tag: &str) -> Self {
        let mut meta = Self::new(name, PropertyKind::Object);
        meta.nested = Some(NestedType::Fixed(type_tag.to_string()));
        meta
    }

    /// A list slot holding nodes of exactly `type_tag`.
    pub fn list(name: &str, type_tag: &str) -> Self {
        let mut meta = Self::new(name, PropertyKind::ObjectArray);
        meta.nested = Some(NestedType::Fixed(type_tag.to_string()));
        meta
    }

    /// A `steps` pipeline slot.
    pub fn steps() -> Self {
        let mut meta = Self::new("steps", PropertyKind::ObjectArray);
        meta.nested = Some(NestedType::Processors);
        meta
    }

    pub fn display(mut self, display_name: &str) -> Self {
        self.display_name = display_name.to_string();
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn advanced(mut self) -> Self {
        self.labels.push("advanced".to_string());
        self
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self.labels.push("security".to_string());
        self
    }

    pub fn values(mut self, values: &[&str]) -> Self {
        self.enum_values = values.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn default_value(mut self, value: impl Into<PropertyValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn is_advanced(&self) -> bool {
        self.labels.iter().any(|l| l == "advanced")
    }

    /// True for properties that hold nested nodes.
    pub fn is_slot(&self) -> bool {
        matches!(self.kind, PropertyKind::Object | PropertyKind::ObjectArray)
    }

    pub fn is_many(&self) -> bool {
        self.kind == PropertyKind::ObjectArray
    }

    pub fn is_steps(&self) -> bool {
        self.nested == Some(NestedType::Processors)
    }

    /// Checks that a value has the shape this property declares.
    ///
    /// Numbers and booleans also accept text that is exactly one property
    /// placeholder (`{{timer.period}}`), which is resolved at runtime.
    pub fn accepts(&self, value: &PropertyValue) -> bool {
        match (self.kind, value) {
            (PropertyKind::String | PropertyKind::Enum, PropertyValue::Text(_)) => true,
            (PropertyKind::Number, PropertyValue::Number(_)) => true,
            (PropertyKind::Boolean, PropertyValue::Bool(_)) => true,
            (PropertyKind::Number | PropertyKind::Boolean, PropertyValue::Text(t)) => {
                placeholder::is_placeholder(t)
            }
            (PropertyKind::Expression, PropertyValue::Expression(_)) => true,
            (PropertyKind::Object, PropertyValue::Node(_)) => true,
            (PropertyKind::ObjectArray, PropertyValue::Nodes(_)) => true,
            (PropertyKind::Parameters, PropertyValue::Parameters(p)) => {
                p.values().all(PropertyValue::is_scalar)
            }
            _ => false,
        }
    }
}

/// Static metadata about a type tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    pub type_tag: String,
    /// The key used for this type in the YAML DSL.
    pub dsl_name: String,
    pub title: String,
    pub description: String,
    pub labels: Vec<String>,
    pub role: NodeRole,
    /// Property filled when the DSL gives a plain string instead of a mapping,
    /// as in `- to: direct:start`.
    pub shorthand: Option<String>,
    pub icon: String,
    pub properties: Vec<PropertyMeta>,
}

impl Descriptor {
    pub fn new(type_tag: &str, role: NodeRole) -> Self {
        let dsl_name = id_prefix(type_tag);
        Self {
            type_tag: type_tag.to_string(),
            icon: dsl_name.clone(),
            dsl_name,
            title: humanize(type_tag),
            description: String::new(),
            labels: Vec::new(),
            role,
            shorthand: None,
            properties: Vec::new(),
        }
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn labelled(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn shorthand(mut self, property: &str) -> Self {
        self.shorthand = Some(property.to_string());
        self
    }

    pub fn with_property(mut self, meta: PropertyMeta) -> Self {
        self.properties.push(meta);
        self
    }

    pub fn with_properties(mut self, metas: impl IntoIterator<Item = PropertyMeta>) -> Self {
        self.properties.extend(metas);
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertyMeta> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// The properties that hold nested nodes, in declaration order.
    pub fn slots(&self) -> impl Iterator<Item = &PropertyMeta> {
        self.properties.iter().filter(|p| p.is_slot())
    }

    pub fn has_steps(&self) -> bool {
        self.slots().any(PropertyMeta::is_steps)
    }

    /// A form item made of exactly a `key` and a `value`.
    pub fn is_key_value(&self) -> bool {
        self.properties.len() == 2
            && self.property("key").is_some()
            && self.property("value").is_some()
    }
}

/// `loggingLevel` -> `Logging Level`
pub(crate) fn humanize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for (i, c) in name.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() && prev_lower {
            out.push(' ');
            out.push(c);
        } else {
            out.push(c);
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
    }
    out
}
