use super::Node;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An expression attached to a node, e.g. `simple: ${body} contains 'foo'`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpressionValue {
    pub language: String,
    pub value: String,
}

impl ExpressionValue {
    pub fn new(language: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for ExpressionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.language, self.value)
    }
}

/// The value stored under a property name on a `Node`.
///
/// `Node` and `Nodes` are the slots of a node: everything the designer draws as a
/// nested element lives under one of them. `Parameters` carries component or
/// kamelet parameters and only ever holds scalar entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum PropertyValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Expression(ExpressionValue),
    Node(Box<Node>),
    Nodes(Vec<Node>),
    Parameters(IndexMap<String, PropertyValue>),
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_expression(&self) -> Option<&ExpressionValue> {
        match self {
            PropertyValue::Expression(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            PropertyValue::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_nodes(&self) -> Option<&[Node]> {
        match self {
            PropertyValue::Nodes(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_parameters(&self) -> Option<&IndexMap<String, PropertyValue>> {
        match self {
            PropertyValue::Parameters(p) => Some(p),
            _ => None,
        }
    }

    /// True for text, number and boolean values.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            PropertyValue::Text(_) | PropertyValue::Number(_) | PropertyValue::Bool(_)
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            PropertyValue::Text(_) => "text",
            PropertyValue::Number(_) => "number",
            PropertyValue::Bool(_) => "boolean",
            PropertyValue::Expression(_) => "expression",
            PropertyValue::Node(_) => "node",
            PropertyValue::Nodes(_) => "node list",
            PropertyValue::Parameters(_) => "parameters",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Text(s) => write!(f, "{}", s),
            PropertyValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Expression(e) => write!(f, "{}", e),
            PropertyValue::Node(n) => write!(f, "<{} #{}>", n.type_tag(), n.id()),
            PropertyValue::Nodes(n) => write!(f, "[{} items]", n.len()),
            PropertyValue::Parameters(p) => {
                write!(f, "{{")?;
                for (i, (k, v)) in p.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<ExpressionValue> for PropertyValue {
    fn from(value: ExpressionValue) -> Self {
        PropertyValue::Expression(value)
    }
}

impl From<Node> for PropertyValue {
    fn from(value: Node) -> Self {
        PropertyValue::Node(Box::new(value))
    }
}

impl From<Vec<Node>> for PropertyValue {
    fn from(value: Vec<Node>) -> Self {
        PropertyValue::Nodes(value)
    }
}
