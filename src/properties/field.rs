use crate::catalog::PropertyKind;
use crate::engine::FollowUp;
use crate::model::{Document, NodeId, PropertyValue};
use serde::Serialize;

/// Where an editable value lives on the node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "source", content = "name", rename_all = "camelCase")]
pub enum FieldPath {
    /// A property declared by the type's descriptor.
    Property(String),
    /// An entry of the `parameters` map, declared by a component or kamelet.
    Parameter(String),
    /// A component path parameter, stored inside the `uri`.
    PathParameter(String),
}

impl FieldPath {
    pub fn name(&self) -> &str {
        match self {
            FieldPath::Property(n) | FieldPath::Parameter(n) | FieldPath::PathParameter(n) => n,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldGroup {
    Main,
    Advanced,
}

/// Which editor the host should render for a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "editor", rename_all = "camelCase")]
pub enum EditorHint {
    Text,
    Number,
    Toggle,
    Select { values: Vec<String> },
    Expression,
    /// A flat two-column editor for key/value items or parameter maps.
    KeyValueTable,
    /// A list of nested forms, one per item.
    ObjectList { item_type: String },
    /// Free text, displayed masked.
    Secret,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableField {
    pub path: FieldPath,
    pub display_name: String,
    pub description: String,
    pub kind: PropertyKind,
    pub required: bool,
    pub group: FieldGroup,
    pub hint: EditorHint,
    pub value: Option<PropertyValue>,
    pub default: Option<PropertyValue>,
}

impl EditableField {
    pub fn name(&self) -> &str {
        self.path.name()
    }

    /// The current value, falling back to the declared default.
    pub fn effective_value(&self) -> Option<&PropertyValue> {
        self.value.as_ref().or(self.default.as_ref())
    }
}

/// The editable fields of one node, split the way the form shows them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSet {
    pub node_id: NodeId,
    pub type_tag: String,
    pub main: Vec<EditableField>,
    pub advanced: Vec<EditableField>,
}

impl FieldSet {
    pub fn is_empty(&self) -> bool {
        self.main.is_empty() && self.advanced.is_empty()
    }

    pub fn len(&self) -> usize {
        self.main.len() + self.advanced.len()
    }

    /// Finds a field by name, main group first.
    pub fn field(&self, name: &str) -> Option<&EditableField> {
        self.iter().find(|f| f.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EditableField> {
        self.main.iter().chain(self.advanced.iter())
    }
}

/// One user edit of a field of the selected node.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Set {
        path: FieldPath,
        value: PropertyValue,
    },
    Unset {
        path: FieldPath,
    },
    /// Changes the language of an expression property.
    SetExpressionLanguage {
        property: String,
        language: String,
    },
    /// Changes the text of an expression property, keeping its language.
    SetExpressionValue {
        property: String,
        value: String,
    },
    /// Appends an item to a list-of-objects property.
    AddItem {
        property: String,
        values: Vec<(String, PropertyValue)>,
    },
    RemoveItem {
        property: String,
        index: usize,
    },
    /// Sets one field of an item in a list-of-objects property.
    SetItemField {
        property: String,
        index: usize,
        field: String,
        value: PropertyValue,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WarningKind {
    MissingRequired,
    MalformedPlaceholder,
}

/// A problem worth showing next to a field that does not block the edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationWarning {
    pub node_id: NodeId,
    pub field: String,
    pub kind: WarningKind,
    pub message: String,
}

/// The result of a successful edit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    pub document: Document,
    pub warnings: Vec<ValidationWarning>,
    pub follow_ups: Vec<FollowUp>,
}
