//! The read-only component/kamelet reference feed.
//!
//! The host loads this once (usually from JSON generated off the component
//! catalog) and hands it to the `CatalogBuilder`. It is never modified afterwards.
use super::descriptor::PropertyKind;
use crate::error::ReferenceDataError;
use crate::model::PropertyValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;

/// The set of components and kamelets available to the designer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub components: Vec<ComponentDescriptor>,
    #[serde(default)]
    pub kamelets: Vec<KameletDescriptor>,
}

impl ReferenceData {
    pub fn from_json(json: &str) -> Result<Self, ReferenceDataError> {
        serde_json::from_str(json).map_err(|e| ReferenceDataError::JsonParseError(e.to_string()))
    }

    /// Load reference data from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, ReferenceDataError> {
        let content = fs::read_to_string(path).map_err(|e| ReferenceDataError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    pub fn component(&self, name: &str) -> Option<&ComponentDescriptor> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn kamelet(&self, name: &str) -> Option<&KameletDescriptor> {
        self.kamelets.iter().find(|k| k.name == name)
    }

    /// Finds the component serving `uri`, by its scheme.
    pub fn component_for_uri(&self, uri: &str) -> Option<&ComponentDescriptor> {
        self.component(uri_scheme(uri)?)
    }

    /// Finds the kamelet referenced by a `kamelet:<name>` uri.
    pub fn kamelet_for_uri(&self, uri: &str) -> Option<&KameletDescriptor> {
        let rest = uri.strip_prefix("kamelet:")?;
        let name = rest.split(['?', '/']).next()?;
        self.kamelet(name)
    }
}

/// `kafka:orders?brokers=x` -> `kafka`
pub fn uri_scheme(uri: &str) -> Option<&str> {
    let (scheme, _) = uri.split_once(':')?;
    if scheme.is_empty() { None } else { Some(scheme) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptor {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub labels: Vec<String>,
    /// URI syntax, e.g. `timer:timerName` or `aws2-s3://bucketNameOrArn`.
    #[serde(default)]
    pub syntax: String,
    #[serde(default)]
    pub consumer_only: bool,
    #[serde(default)]
    pub producer_only: bool,
    #[serde(default)]
    pub parameters: Vec<ParameterMeta>,
}

/// Which side of an exchange an endpoint sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Consumer,
    Producer,
}

impl ComponentDescriptor {
    pub fn supports(&self, direction: Direction) -> bool {
        match direction {
            Direction::Consumer => !self.producer_only,
            Direction::Producer => !self.consumer_only,
        }
    }

    /// The parameters shown for an endpoint used in `direction`, path parameters first.
    pub fn parameters_for(&self, direction: Direction) -> Vec<&ParameterMeta> {
        let (mut path, query): (Vec<_>, Vec<_>) = self
            .parameters
            .iter()
            .filter(|p| p.applies_to(direction))
            .partition(|p| p.path);
        let names = self.path_parameter_names();
        path.sort_by_key(|p| names.iter().position(|n| *n == p.name).unwrap_or(usize::MAX));
        path.extend(query);
        path
    }

    /// Path parameter names in syntax order: `jms:destinationType:destinationName`
    /// gives `[destinationType, destinationName]`.
    pub fn path_parameter_names(&self) -> Vec<String> {
        self.syntax_tokens()
            .into_iter()
            .map(|(_, name)| name.to_string())
            .collect()
    }

    /// Splits the syntax into `(delimiter before, name)` pairs.
    fn syntax_tokens(&self) -> Vec<(Option<char>, &str)> {
        let Some((_, rest)) = self.syntax.split_once(':') else {
            return Vec::new();
        };
        let rest = rest.trim_start_matches('/');
        let mut tokens = Vec::new();
        let mut start = 0;
        let mut delimiter = None;
        for (i, c) in rest.char_indices() {
            if c == ':' || c == '/' {
                if i > start {
                    tokens.push((delimiter, &rest[start..i]));
                }
                delimiter = Some(c);
                start = i + c.len_utf8();
            }
        }
        if start < rest.len() {
            tokens.push((delimiter, &rest[start..]));
        }
        tokens
    }

    fn uses_double_slash(&self) -> bool {
        self.syntax
            .split_once(':')
            .is_some_and(|(_, rest)| rest.starts_with("//"))
    }

    /// Reads path parameter values out of an endpoint uri.
    ///
    /// The last path parameter takes everything up to the query string, so
    /// `file:/tmp/in` with syntax `file:directoryName` yields `directoryName=/tmp/in`.
    pub fn parse_path(&self, uri: &str) -> IndexMap<String, String> {
        let mut values = IndexMap::new();
        let Some(rest) = uri.strip_prefix(&format!("{}:", self.name)) else {
            return values;
        };
        let rest = rest.split('?').next().unwrap_or_default();
        let mut rest = if self.uses_double_slash() {
            rest.trim_start_matches("//")
        } else {
            rest
        };

        let tokens = self.syntax_tokens();
        for (i, (_, name)) in tokens.iter().enumerate() {
            let next_delimiter = tokens.get(i + 1).and_then(|(d, _)| *d);
            let (value, remainder) = match next_delimiter {
                Some(d) => match rest.split_once(d) {
                    Some((v, r)) => (v, r),
                    None => (rest, ""),
                },
                None => (rest, ""),
            };
            if !value.is_empty() {
                values.insert(name.to_string(), value.to_string());
            }
            rest = remainder;
        }
        values
    }

    /// Rebuilds an endpoint uri from path parameter values, keeping any query
    /// string found on `previous`. Stops at the first missing path parameter.
    pub fn build_uri(&self, path: &IndexMap<String, String>, previous: &str) -> String {
        let mut uri = format!("{}:", self.name);
        if self.uses_double_slash() {
            uri.push_str("//");
        }
        for (i, (delimiter, name)) in self.syntax_tokens().into_iter().enumerate() {
            let Some(value) = path.get(name) else {
                break;
            };
            if i > 0 {
                if let Some(d) = delimiter {
                    uri.push(d);
                }
            }
            uri.push_str(value);
        }
        if let Some((_, query)) = previous.split_once('?') {
            uri.push('?');
            uri.push_str(query);
        }
        uri
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KameletKind {
    Source,
    Sink,
    Action,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KameletDescriptor {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub kind: KameletKind,
    #[serde(default)]
    pub properties: Vec<ParameterMeta>,
}

/// One parameter of a component endpoint or kamelet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterMeta {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_parameter_kind")]
    pub kind: PropertyKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub enum_values: Vec<String>,
    #[serde(default)]
    pub secret: bool,
    /// Comma separated, e.g. `consumer,advanced`.
    #[serde(default)]
    pub label: String,
    /// True for parameters that are part of the uri path.
    #[serde(default)]
    pub path: bool,
}

fn default_parameter_kind() -> PropertyKind {
    PropertyKind::String
}

impl ParameterMeta {
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.label
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }

    pub fn is_advanced(&self) -> bool {
        self.labels().any(|l| l == "advanced")
    }

    pub fn applies_to(&self, direction: Direction) -> bool {
        let mut labels = self.labels();
        match direction {
            Direction::Consumer => !labels.any(|l| l == "producer"),
            Direction::Producer => !labels.any(|l| l == "consumer"),
        }
    }

    pub fn display_name(&self) -> String {
        if self.display_name.is_empty() {
            super::descriptor::humanize(&self.name)
        } else {
            self.display_name.clone()
        }
    }

    pub fn default_value(&self) -> Option<PropertyValue> {
        self.default.as_ref().and_then(scalar_from_json)
    }
}

/// Converts a JSON scalar into a `PropertyValue`. Arrays, objects and null give `None`.
pub fn scalar_from_json(value: &serde_json::Value) -> Option<PropertyValue> {
    match value {
        serde_json::Value::String(s) => Some(PropertyValue::Text(s.clone())),
        serde_json::Value::Number(n) => n.as_f64().map(PropertyValue::Number),
        serde_json::Value::Bool(b) => Some(PropertyValue::Bool(*b)),
        _ => None,
    }
}
