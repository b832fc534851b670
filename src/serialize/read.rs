use crate::catalog::{Catalog, Descriptor, NestedType, NodeRole, PropertyKind, PropertyMeta, tags};
use crate::error::SerializationError;
use crate::model::{Document, ExpressionValue, Node, PropertyValue};
use crate::properties::{DEFAULT_LANGUAGE, placeholder};
use ahash::AHashSet;
use indexmap::IndexMap;
use serde_yaml::Value;
use tracing::{debug, trace};

pub(super) struct Reader<'c> {
    catalog: &'c Catalog,
    seen: AHashSet<String>,
}

impl<'c> Reader<'c> {
    pub(super) fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            seen: AHashSet::new(),
        }
    }

    pub(super) fn read_document(mut self, text: &str) -> Result<Document, SerializationError> {
        let value: Value = serde_yaml::from_str(text)
            .map_err(|e| SerializationError::YamlParseError(e.to_string()))?;
        let items = match value {
            Value::Null => Vec::new(),
            Value::Sequence(items) => items,
            _ => return Err(shape("$", "a sequence of flows")),
        };

        let mut flows = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let path = format!("$[{}]", i);
            let (descriptor, body, path) = self.read_tag(item, &path)?;
            let node = self.read_node(body, descriptor, &path)?;
            flows.push(self.as_flow(node, descriptor, &path)?);
        }

        for singleton in [tags::REST_CONFIGURATION, tags::BEANS] {
            if flows.iter().filter(|n| n.type_tag() == singleton).count() > 1 {
                return Err(SerializationError::DuplicateRoot(singleton.to_string()));
            }
        }

        debug!(flows = flows.len(), nodes = self.seen.len(), "document parsed");
        Ok(Document::from_flows(flows))
    }

    /// Root types stay as they are. `- from:` and REST verbs are wrapped the same
    /// way the engine wraps them when added at document level.
    fn as_flow(
        &self,
        node: Node,
        descriptor: &Descriptor,
        path: &str,
    ) -> Result<Node, SerializationError> {
        if descriptor.role == NodeRole::Root {
            return Ok(node);
        }
        let Some(w) = self.catalog.root_wrapper(&descriptor.type_tag) else {
            return Err(shape(path, "a route, REST service, REST configuration or beans"));
        };
        let many = self
            .catalog
            .slot(&w.wrapper, &w.slot)
            .is_some_and(|meta| meta.is_many());
        let mut wrapper = Node::new(w.wrapper.clone());
        wrapper.insert_child(&w.slot, many, None, node);
        trace!(path, wrapper = %w.wrapper, "wrapped top-level element");
        Ok(wrapper)
    }

    /// Splits `{<dslName>: body}` into the descriptor and the body.
    fn read_tag<'v>(
        &self,
        value: &'v Value,
        path: &str,
    ) -> Result<(&'c Descriptor, &'v Value, String), SerializationError> {
        let map = match value {
            Value::Mapping(map) if map.len() == 1 => map,
            _ => return Err(shape(path, "a mapping with a single element name")),
        };
        let Some((key, body)) = map.iter().next() else {
            return Err(shape(path, "a mapping with a single element name"));
        };
        let name = key
            .as_str()
            .ok_or_else(|| shape(path, "an element name"))?;
        let descriptor =
            self.catalog
                .resolve(name)
                .ok_or_else(|| SerializationError::UnknownType {
                    name: name.to_string(),
                    path: path.to_string(),
                })?;
        Ok((descriptor, body, format!("{}.{}", path, name)))
    }

    fn read_node(
        &mut self,
        value: &Value,
        descriptor: &Descriptor,
        path: &str,
    ) -> Result<Node, SerializationError> {
        let map = match value {
            Value::Null => None,
            Value::Mapping(map) => Some(map),
            scalar => {
                let Some(shorthand) = &descriptor.shorthand else {
                    return Err(shape(path, "a mapping"));
                };
                let text = scalar_text(scalar).ok_or_else(|| shape(path, "a mapping"))?;
                let node = Node::new(descriptor.type_tag.clone()).with(shorthand, text);
                self.remember(&node)?;
                return Ok(node);
            }
        };

        let id = map
            .and_then(|m| m.get("id"))
            .map(|v| scalar_text(v).ok_or_else(|| shape(&format!("{}.id", path), "a string id")))
            .transpose()?;
        let mut node = match id {
            Some(id) => Node::with_id(id, descriptor.type_tag.clone()),
            None => Node::new(descriptor.type_tag.clone()),
        };
        self.remember(&node)?;

        for (key, value) in map.into_iter().flat_map(|m| m.iter()) {
            let name = key
                .as_str()
                .ok_or_else(|| shape(path, "string property names"))?;
            if name == "id" {
                continue;
            }
            let meta = descriptor
                .property(name)
                .ok_or_else(|| SerializationError::UnknownProperty {
                    type_tag: descriptor.type_tag.clone(),
                    property: name.to_string(),
                    path: path.to_string(),
                })?;
            let property_path = format!("{}.{}", path, name);
            if let Some(value) = self.read_value(value, meta, &property_path)? {
                node.set(name, value);
            }
        }
        Ok(node)
    }

    fn read_value(
        &mut self,
        value: &Value,
        meta: &PropertyMeta,
        path: &str,
    ) -> Result<Option<PropertyValue>, SerializationError> {
        let read = match meta.kind {
            PropertyKind::String | PropertyKind::Enum => PropertyValue::Text(
                scalar_text(value).ok_or_else(|| shape(path, "a text value"))?,
            ),
            PropertyKind::Number => read_number(value).ok_or_else(|| shape(path, "a number"))?,
            PropertyKind::Boolean => read_bool(value).ok_or_else(|| shape(path, "a boolean"))?,
            PropertyKind::Expression => PropertyValue::Expression(read_expression(value, path)?),
            PropertyKind::Parameters => PropertyValue::Parameters(read_parameters(value, path)?),
            PropertyKind::Object => {
                let descriptor = self.nested(meta, path)?;
                PropertyValue::Node(Box::new(self.read_node(value, descriptor, path)?))
            }
            PropertyKind::ObjectArray => {
                let items = match value {
                    Value::Null => return Ok(None),
                    Value::Sequence(items) => items,
                    _ => return Err(shape(path, "a list")),
                };
                let mut nodes = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, i);
                    let node = if meta.is_steps() {
                        let (descriptor, body, tagged_path) = self.read_tag(item, &item_path)?;
                        if descriptor.role != NodeRole::Processor {
                            return Err(shape(&item_path, "a processor step"));
                        }
                        self.read_node(body, descriptor, &tagged_path)?
                    } else {
                        let descriptor = self.nested(meta, path)?;
                        self.read_node(item, descriptor, &item_path)?
                    };
                    nodes.push(node);
                }
                if nodes.is_empty() {
                    return Ok(None);
                }
                PropertyValue::Nodes(nodes)
            }
        };
        Ok(Some(read))
    }

    fn nested(&self, meta: &PropertyMeta, path: &str) -> Result<&'c Descriptor, SerializationError> {
        match &meta.nested {
            Some(NestedType::Fixed(t)) => {
                self.catalog
                    .descriptor(t)
                    .map_err(|_| SerializationError::UnknownType {
                        name: t.clone(),
                        path: path.to_string(),
                    })
            }
            _ => Err(shape(path, "a single known element type")),
        }
    }

    fn remember(&mut self, node: &Node) -> Result<(), SerializationError> {
        if !self.seen.insert(node.id().to_string()) {
            return Err(SerializationError::DuplicateId(node.id().to_string()));
        }
        Ok(())
    }
}

fn shape(path: &str, expected: &str) -> SerializationError {
    SerializationError::InvalidShape {
        path: path.to_string(),
        expected: expected.to_string(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn read_number(value: &Value) -> Option<PropertyValue> {
    match value {
        Value::Number(n) => n.as_f64().map(PropertyValue::Number),
        Value::String(s) if placeholder::is_placeholder(s) => Some(PropertyValue::Text(s.clone())),
        Value::String(s) => s.trim().parse().ok().map(PropertyValue::Number),
        _ => None,
    }
}

fn read_bool(value: &Value) -> Option<PropertyValue> {
    match value {
        Value::Bool(b) => Some(PropertyValue::Bool(*b)),
        Value::String(s) if placeholder::is_placeholder(s) => Some(PropertyValue::Text(s.clone())),
        Value::String(s) => s.trim().parse().ok().map(PropertyValue::Bool),
        _ => None,
    }
}

/// Accepts `{simple: {expression: x}}`, `{simple: x}` and a bare `x` (simple).
fn read_expression(value: &Value, path: &str) -> Result<ExpressionValue, SerializationError> {
    if let Some(text) = scalar_text(value) {
        return Ok(ExpressionValue::new(DEFAULT_LANGUAGE, text));
    }
    let map = match value {
        Value::Mapping(map) if map.len() == 1 => map,
        _ => return Err(shape(path, "an expression")),
    };
    let Some((language, body)) = map.iter().next() else {
        return Err(shape(path, "an expression"));
    };
    let language = language
        .as_str()
        .ok_or_else(|| shape(path, "an expression language"))?;
    let text = match body {
        Value::Mapping(inner) => inner.get("expression").and_then(scalar_text),
        Value::Null => Some(String::new()),
        other => scalar_text(other),
    }
    .ok_or_else(|| shape(path, "an expression text"))?;
    Ok(ExpressionValue::new(language, text))
}

fn read_parameters(
    value: &Value,
    path: &str,
) -> Result<IndexMap<String, PropertyValue>, SerializationError> {
    let map = match value {
        Value::Null => return Ok(IndexMap::new()),
        Value::Mapping(map) => map,
        _ => return Err(shape(path, "a mapping of parameters")),
    };
    let mut parameters = IndexMap::with_capacity(map.len());
    for (key, value) in map {
        let name = key
            .as_str()
            .ok_or_else(|| shape(path, "string parameter names"))?;
        let parsed = match value {
            Value::String(s) => PropertyValue::Text(s.clone()),
            Value::Bool(b) => PropertyValue::Bool(*b),
            Value::Number(n) => match n.as_f64() {
                Some(f) => PropertyValue::Number(f),
                None => PropertyValue::Text(n.to_string()),
            },
            _ => return Err(shape(&format!("{}.{}", path, name), "a scalar parameter")),
        };
        parameters.insert(name.to_string(), parsed);
    }
    Ok(parameters)
}
