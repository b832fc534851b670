use crate::catalog::{Catalog, Descriptor};
use crate::error::SerializationError;
use crate::model::{Document, Node, PropertyValue};
use serde_yaml::{Mapping, Value};

pub(super) struct Writer<'c> {
    catalog: &'c Catalog,
}

impl<'c> Writer<'c> {
    pub(super) fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    pub(super) fn write_document(&self, doc: &Document) -> Result<Value, SerializationError> {
        let flows = doc
            .flows()
            .iter()
            .map(|root| self.write_tagged(root))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Sequence(flows))
    }

    /// `{<dslName>: {...}}`
    fn write_tagged(&self, node: &Node) -> Result<Value, SerializationError> {
        let descriptor = self.descriptor(node)?;
        let mut tagged = Mapping::new();
        tagged.insert(
            Value::String(descriptor.dsl_name.clone()),
            self.write_node(node, descriptor)?,
        );
        Ok(Value::Mapping(tagged))
    }

    fn write_untagged(&self, node: &Node) -> Result<Value, SerializationError> {
        let descriptor = self.descriptor(node)?;
        self.write_node(node, descriptor)
    }

    fn write_node(&self, node: &Node, descriptor: &Descriptor) -> Result<Value, SerializationError> {
        let mut map = Mapping::new();
        map.insert(
            Value::String("id".to_string()),
            Value::String(node.id().to_string()),
        );
        for (name, value) in node.properties() {
            let steps = descriptor
                .property(name)
                .is_some_and(|meta| meta.is_steps());
            let written = match value {
                PropertyValue::Node(child) => self.write_untagged(child)?,
                PropertyValue::Nodes(children) => Value::Sequence(
                    children
                        .iter()
                        .map(|child| {
                            if steps {
                                self.write_tagged(child)
                            } else {
                                self.write_untagged(child)
                            }
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                ),
                other => write_value(other),
            };
            map.insert(Value::String(name.clone()), written);
        }
        Ok(Value::Mapping(map))
    }

    fn descriptor(&self, node: &Node) -> Result<&'c Descriptor, SerializationError> {
        self.catalog
            .descriptor(node.type_tag())
            .map_err(|_| SerializationError::UnknownType {
                name: node.type_tag().to_string(),
                path: node.id().to_string(),
            })
    }
}

fn write_value(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Text(s) => Value::String(s.clone()),
        PropertyValue::Number(n) => write_number(*n),
        PropertyValue::Bool(b) => Value::Bool(*b),
        PropertyValue::Expression(e) => {
            let mut body = Mapping::new();
            body.insert(
                Value::String("expression".to_string()),
                Value::String(e.value.clone()),
            );
            let mut language = Mapping::new();
            language.insert(Value::String(e.language.clone()), Value::Mapping(body));
            Value::Mapping(language)
        }
        PropertyValue::Parameters(parameters) => Value::Mapping(
            parameters
                .iter()
                .map(|(k, v)| (Value::String(k.clone()), write_value(v)))
                .collect(),
        ),
        // Slots are written by the caller.
        PropertyValue::Node(_) | PropertyValue::Nodes(_) => Value::Null,
    }
}

fn write_number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        Value::Number((n as i64).into())
    } else {
        Value::Number(n.into())
    }
}
