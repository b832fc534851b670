//! The property synchronization layer.
//!
//! Turns the selected node into an ordered list of editable fields, and turns a
//! field edit back into a new `Document`. Every edit works on a clone of the
//! node and goes through [`MutationEngine::update_node`], so the document the
//! caller holds is never touched.
//!
//! Nodes backed by a component or kamelet (endpoints with a known uri scheme,
//! kamelet steps) take their parameter fields from the reference feed instead of
//! the static DSL descriptor.
use crate::catalog::{
    Catalog, ComponentDescriptor, Descriptor, Direction, KameletDescriptor, NestedType, NodeRole,
    ParameterMeta, PropertyKind, PropertyMeta, tags,
};
use crate::engine::MutationEngine;
use crate::error::DesignerError;
use crate::model::{Document, ExpressionValue, Node, PropertyValue};
use indexmap::IndexMap;
use itertools::Itertools;
use tracing::debug;

pub mod expression;
pub mod field;
pub mod placeholder;

pub use expression::{DEFAULT_LANGUAGE, LanguageFamily, language_family, switch_language};
pub use field::{
    EditOutcome, EditableField, EditorHint, FieldEdit, FieldGroup, FieldPath, FieldSet,
    ValidationWarning, WarningKind,
};
pub use placeholder::{Placeholder, parse_placeholders};

const PARAMETERS: &str = "parameters";

/// The external schema behind a node's `parameters`.
#[derive(Clone, Copy)]
enum Schema<'r> {
    Component(&'r ComponentDescriptor, Direction),
    Kamelet(&'r KameletDescriptor),
}

impl<'r> Schema<'r> {
    fn parameter(&self, name: &str) -> Option<&'r ParameterMeta> {
        match self {
            Schema::Component(c, direction) => c
                .parameters
                .iter()
                .find(|p| p.name == name && !p.path && p.applies_to(*direction)),
            Schema::Kamelet(k) => k.properties.iter().find(|p| p.name == name),
        }
    }
}

pub struct PropertySync<'c> {
    catalog: &'c Catalog,
    engine: MutationEngine<'c>,
}

impl<'c> PropertySync<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            engine: MutationEngine::new(catalog),
        }
    }

    /// The editable fields of the node `node_id`, in descriptor order.
    pub fn fields(&self, doc: &Document, node_id: &str) -> Result<FieldSet, DesignerError> {
        let node = doc
            .find(node_id)
            .ok_or_else(|| DesignerError::node_not_found(node_id))?;
        self.fields_for(node)
    }

    pub fn fields_for(&self, node: &Node) -> Result<FieldSet, DesignerError> {
        let descriptor = self.catalog.descriptor(node.type_tag())?;
        let schema = self.schema(node, descriptor);
        let mut fields = Vec::new();

        for meta in &descriptor.properties {
            if meta.kind == PropertyKind::Parameters {
                if let Some(schema) = schema {
                    fields.extend(self.schema_fields(node, schema));
                    continue;
                }
            }
            if meta.is_slot() && self.item_type(meta).is_none() {
                continue;
            }
            fields.push(self.property_field(node, meta));
        }

        let (main, advanced): (Vec<_>, Vec<_>) = fields
            .into_iter()
            .partition(|f| f.group == FieldGroup::Main);
        Ok(FieldSet {
            node_id: node.id().clone(),
            type_tag: node.type_tag().to_string(),
            main,
            advanced,
        })
    }

    /// Applies one edit to the node `node_id` and returns the new document along
    /// with the warnings the edited node now carries.
    pub fn apply(
        &self,
        doc: &Document,
        node_id: &str,
        edit: FieldEdit,
    ) -> Result<EditOutcome, DesignerError> {
        let node = doc
            .find(node_id)
            .ok_or_else(|| DesignerError::node_not_found(node_id))?;
        let updated = self.edit_node(node, &edit)?;
        let document = self.engine.update_node(doc, updated)?;

        let warnings = self.validate_node(&document, node_id)?;
        let follow_ups = self
            .engine
            .suggest_follow_up(&document, node_id)
            .into_iter()
            .collect();
        debug!(node = node_id, warnings = warnings.len(), "field edit applied");

        Ok(EditOutcome {
            document,
            warnings,
            follow_ups,
        })
    }

    /// Returns a copy of `node` with `edit` applied, or the reason it was rejected.
    pub fn edit_node(&self, node: &Node, edit: &FieldEdit) -> Result<Node, DesignerError> {
        let descriptor = self.catalog.descriptor(node.type_tag())?;
        let mut updated = node.clone();

        match edit {
            FieldEdit::Set {
                path: FieldPath::Property(name),
                value,
            } => {
                let meta = self.form_property(descriptor, name, value)?;
                let value = coerce(meta.kind, value.clone());
                check_value(descriptor, meta, &value)?;
                if let Some(item_type) = self.item_type(meta) {
                    check_items(descriptor, meta, item_type, &value)?;
                }
                updated.set(name, value);
            }
            FieldEdit::Set {
                path: FieldPath::Parameter(name),
                value,
            } => {
                let value = self.parameter_value(node, descriptor, name, value)?;
                let mut parameters = parameters_of(node);
                parameters.insert(name.clone(), value);
                updated.set(PARAMETERS, PropertyValue::Parameters(parameters));
            }
            FieldEdit::Set {
                path: FieldPath::PathParameter(name),
                value,
            } => {
                let component = self.path_component(node, descriptor, name)?;
                let text = value.to_string();
                let uri = node.get_text("uri").unwrap_or_default();
                let mut path = component.parse_path(uri);
                path.insert(name.clone(), text.clone());
                let rebuilt = component.build_uri(&path, uri);
                if component.parse_path(&rebuilt).get(name) != Some(&text) {
                    return Err(DesignerError::InvalidValue {
                        type_tag: node.type_tag().to_string(),
                        property: name.clone(),
                        value: text,
                        reason: "the path parameters before this one must be set first".to_string(),
                    });
                }
                updated.set("uri", rebuilt);
            }
            FieldEdit::Unset {
                path: FieldPath::Property(name),
            } => {
                let meta = declared(descriptor, name)?;
                if meta.is_slot() && self.item_type(meta).is_none() {
                    return Err(canvas_only(descriptor, name));
                }
                updated.remove(name);
            }
            FieldEdit::Unset {
                path: FieldPath::Parameter(name),
            } => {
                let mut parameters = parameters_of(node);
                parameters.shift_remove(name);
                if parameters.is_empty() {
                    updated.remove(PARAMETERS);
                } else {
                    updated.set(PARAMETERS, PropertyValue::Parameters(parameters));
                }
            }
            FieldEdit::Unset {
                path: FieldPath::PathParameter(name),
            } => {
                let component = self.path_component(node, descriptor, name)?;
                let uri = node.get_text("uri").unwrap_or_default();
                let mut path = component.parse_path(uri);
                path.shift_remove(name);
                updated.set("uri", component.build_uri(&path, uri));
            }
            FieldEdit::SetExpressionLanguage { property, language } => {
                expression_property(descriptor, property)?;
                let current = current_expression(node, property);
                updated.set(property, switch_language(&current, language)?);
            }
            FieldEdit::SetExpressionValue { property, value } => {
                expression_property(descriptor, property)?;
                let current = current_expression(node, property);
                updated.set(property, ExpressionValue::new(current.language, value.as_str()));
            }
            FieldEdit::AddItem { property, values } => {
                let meta = declared(descriptor, property)?;
                let item_type = self
                    .item_type(meta)
                    .filter(|_| meta.is_many())
                    .ok_or_else(|| not_a_list(descriptor, property))?;
                let item = self.catalog.create_node(item_type, values.iter().cloned())?;
                updated.insert_child(property, true, None, item);
            }
            FieldEdit::RemoveItem { property, index } => {
                let meta = declared(descriptor, property)?;
                if self.item_type(meta).is_none() || !meta.is_many() {
                    return Err(not_a_list(descriptor, property));
                }
                updated
                    .take_child(property, *index)
                    .ok_or_else(|| missing_item(descriptor, property, *index))?;
            }
            FieldEdit::SetItemField {
                property,
                index,
                field,
                value,
            } => {
                let meta = declared(descriptor, property)?;
                let item_type = self
                    .item_type(meta)
                    .filter(|_| meta.is_many())
                    .ok_or_else(|| not_a_list(descriptor, property))?;
                let item_descriptor = self.catalog.descriptor(item_type)?;
                let item_meta = declared(item_descriptor, field)?;
                let value = coerce(item_meta.kind, value.clone());
                check_value(item_descriptor, item_meta, &value)?;
                updated
                    .child_mut(property, *index)
                    .ok_or_else(|| missing_item(descriptor, property, *index))?
                    .set(field, value);
            }
        }

        Ok(updated)
    }

    /// Reports missing required fields and malformed placeholders of one node.
    pub fn validate_node(
        &self,
        doc: &Document,
        node_id: &str,
    ) -> Result<Vec<ValidationWarning>, DesignerError> {
        let node = doc
            .find(node_id)
            .ok_or_else(|| DesignerError::node_not_found(node_id))?;
        self.warnings_for(node)
    }

    pub fn warnings_for(&self, node: &Node) -> Result<Vec<ValidationWarning>, DesignerError> {
        let descriptor = self.catalog.descriptor(node.type_tag())?;
        let mut warnings = Vec::new();
        let mut warn = |field: &str, kind: WarningKind, message: String| {
            warnings.push(ValidationWarning {
                node_id: node.id().clone(),
                field: field.to_string(),
                kind,
                message,
            })
        };

        for meta in descriptor.properties.iter().filter(|m| m.required) {
            if node.get(&meta.name).is_none() {
                warn(
                    &meta.name,
                    WarningKind::MissingRequired,
                    format!("{} is required", meta.display_name),
                );
            }
        }

        if let Some(schema) = self.schema(node, descriptor) {
            let parameters = parameters_of(node);
            let required: Vec<(&ParameterMeta, bool)> = match schema {
                Schema::Component(c, direction) => {
                    let path = node
                        .get_text("uri")
                        .map(|uri| c.parse_path(uri))
                        .unwrap_or_default();
                    c.parameters_for(direction)
                        .into_iter()
                        .filter(|p| p.required)
                        .map(|p| {
                            let present = if p.path {
                                path.contains_key(&p.name)
                            } else {
                                parameters.contains_key(&p.name) || p.default.is_some()
                            };
                            (p, present)
                        })
                        .collect()
                }
                Schema::Kamelet(k) => k
                    .properties
                    .iter()
                    .filter(|p| p.required)
                    .map(|p| (p, parameters.contains_key(&p.name) || p.default.is_some()))
                    .collect(),
            };
            for (param, _) in required.into_iter().filter(|(_, present)| !present) {
                warn(
                    &param.name,
                    WarningKind::MissingRequired,
                    format!("{} is required", param.display_name()),
                );
            }
        }

        for (name, value) in node.properties() {
            let texts: Vec<(&str, &str)> = match value {
                PropertyValue::Text(t) => vec![(name.as_str(), t.as_str())],
                PropertyValue::Expression(e) => vec![(name.as_str(), e.value.as_str())],
                PropertyValue::Parameters(p) => p
                    .iter()
                    .filter_map(|(k, v)| v.as_text().map(|t| (k.as_str(), t)))
                    .collect(),
                _ => Vec::new(),
            };
            for (field, text) in texts {
                if let Err(e) = parse_placeholders(text) {
                    warn(field, WarningKind::MalformedPlaceholder, e.to_string());
                }
            }
        }

        Ok(warnings)
    }

    fn schema(&self, node: &Node, descriptor: &Descriptor) -> Option<Schema<'c>> {
        descriptor
            .property(PARAMETERS)
            .filter(|m| m.kind == PropertyKind::Parameters)?;
        let reference = self.catalog.reference();

        if node.type_tag() == tags::KAMELET {
            return reference.kamelet(node.get_text("name")?).map(Schema::Kamelet);
        }
        let uri = node.get_text("uri")?;
        if let Some(k) = reference.kamelet_for_uri(uri) {
            return Some(Schema::Kamelet(k));
        }
        let direction = if node.type_tag() == tags::FROM {
            Direction::Consumer
        } else {
            Direction::Producer
        };
        reference
            .component_for_uri(uri)
            .map(|c| Schema::Component(c, direction))
    }

    fn schema_fields(&self, node: &Node, schema: Schema<'_>) -> Vec<EditableField> {
        let parameters = parameters_of(node);
        match schema {
            Schema::Component(c, direction) => {
                let path = node
                    .get_text("uri")
                    .map(|uri| c.parse_path(uri))
                    .unwrap_or_default();
                c.parameters_for(direction)
                    .into_iter()
                    .map(|p| {
                        if p.path {
                            let value = path.get(&p.name).cloned().map(PropertyValue::Text);
                            parameter_field(p, FieldPath::PathParameter(p.name.clone()), value)
                        } else {
                            let value = parameters.get(&p.name).cloned();
                            parameter_field(p, FieldPath::Parameter(p.name.clone()), value)
                        }
                    })
                    .collect()
            }
            Schema::Kamelet(k) => k
                .properties
                .iter()
                .map(|p| {
                    let value = parameters.get(&p.name).cloned();
                    parameter_field(p, FieldPath::Parameter(p.name.clone()), value)
                })
                .collect(),
        }
    }

    fn property_field(&self, node: &Node, meta: &PropertyMeta) -> EditableField {
        let hint = match self.item_type(meta) {
            Some(item_type) => {
                let key_value = self
                    .catalog
                    .descriptor(item_type)
                    .is_ok_and(Descriptor::is_key_value);
                if key_value {
                    EditorHint::KeyValueTable
                } else {
                    EditorHint::ObjectList {
                        item_type: item_type.to_string(),
                    }
                }
            }
            None => hint_for(meta.kind, &meta.enum_values, meta.secret),
        };
        EditableField {
            path: FieldPath::Property(meta.name.clone()),
            display_name: meta.display_name.clone(),
            description: meta.description.clone(),
            kind: meta.kind,
            required: meta.required,
            group: if meta.is_advanced() {
                FieldGroup::Advanced
            } else {
                FieldGroup::Main
            },
            hint,
            value: node.get(&meta.name).cloned(),
            default: meta.default.clone(),
        }
    }

    /// The item type of a slot edited inside the form rather than on the canvas.
    fn item_type<'m>(&self, meta: &'m PropertyMeta) -> Option<&'m str> {
        match &meta.nested {
            Some(NestedType::Fixed(t))
                if self
                    .catalog
                    .descriptor(t)
                    .is_ok_and(|d| d.role == NodeRole::Item) =>
            {
                Some(t.as_str())
            }
            _ => None,
        }
    }

    fn form_property<'d>(
        &self,
        descriptor: &'d Descriptor,
        name: &str,
        value: &PropertyValue,
    ) -> Result<&'d PropertyMeta, DesignerError> {
        let meta = declared(descriptor, name)?;
        if meta.is_slot() && self.item_type(meta).is_none() {
            return Err(DesignerError::InvalidValue {
                type_tag: descriptor.type_tag.clone(),
                property: name.to_string(),
                value: value.to_string(),
                reason: "nested steps are edited on the canvas".to_string(),
            });
        }
        Ok(meta)
    }

    fn parameter_value(
        &self,
        node: &Node,
        descriptor: &Descriptor,
        name: &str,
        value: &PropertyValue,
    ) -> Result<PropertyValue, DesignerError> {
        let invalid = |reason: String| DesignerError::InvalidValue {
            type_tag: descriptor.type_tag.clone(),
            property: name.to_string(),
            value: value.to_string(),
            reason,
        };
        if descriptor.property(PARAMETERS).is_none() {
            return Err(invalid("this type takes no parameters".to_string()));
        }
        if !value.is_scalar() {
            return Err(invalid("parameters hold text, numbers or booleans".to_string()));
        }
        let Some(schema) = self.schema(node, descriptor) else {
            return Ok(value.clone());
        };
        let param = schema
            .parameter(name)
            .ok_or_else(|| invalid("not a parameter of this endpoint".to_string()))?;
        let value = coerce(param.kind, value.clone());
        if let PropertyValue::Text(t) = &value {
            if matches!(param.kind, PropertyKind::Number | PropertyKind::Boolean)
                && !placeholder::is_placeholder(t)
            {
                return Err(invalid(format!("expected a {:?} value", param.kind)));
            }
            if !param.enum_values.is_empty()
                && !placeholder::is_placeholder(t)
                && !param.enum_values.contains(t)
            {
                return Err(invalid(format!(
                    "expected one of {}",
                    param.enum_values.iter().join(", ")
                )));
            }
        }
        Ok(value)
    }

    fn path_component(
        &self,
        node: &Node,
        descriptor: &Descriptor,
        name: &str,
    ) -> Result<&'c ComponentDescriptor, DesignerError> {
        match self.schema(node, descriptor) {
            Some(Schema::Component(c, _)) if c.path_parameter_names().iter().any(|n| n == name) => {
                Ok(c)
            }
            _ => Err(DesignerError::InvalidValue {
                type_tag: descriptor.type_tag.clone(),
                property: name.to_string(),
                value: String::new(),
                reason: "not a path parameter of this endpoint".to_string(),
            }),
        }
    }
}

fn parameter_field(
    param: &ParameterMeta,
    path: FieldPath,
    value: Option<PropertyValue>,
) -> EditableField {
    let kind = if param.enum_values.is_empty() {
        param.kind
    } else {
        PropertyKind::Enum
    };
    EditableField {
        path,
        display_name: param.display_name(),
        description: param.description.clone(),
        kind,
        required: param.required,
        group: if param.is_advanced() {
            FieldGroup::Advanced
        } else {
            FieldGroup::Main
        },
        hint: hint_for(kind, &param.enum_values, param.secret),
        value,
        default: param.default_value(),
    }
}

fn hint_for(kind: PropertyKind, values: &[String], secret: bool) -> EditorHint {
    match kind {
        _ if secret => EditorHint::Secret,
        PropertyKind::Number => EditorHint::Number,
        PropertyKind::Boolean => EditorHint::Toggle,
        PropertyKind::Enum => EditorHint::Select {
            values: values.to_vec(),
        },
        PropertyKind::Expression => EditorHint::Expression,
        PropertyKind::Parameters => EditorHint::KeyValueTable,
        PropertyKind::Object | PropertyKind::ObjectArray | PropertyKind::String => EditorHint::Text,
    }
}

/// Form inputs arrive as text; numbers and booleans are stored typed.
fn coerce(kind: PropertyKind, value: PropertyValue) -> PropertyValue {
    match (kind, &value) {
        (PropertyKind::Number, PropertyValue::Text(t)) => t
            .trim()
            .parse::<f64>()
            .map(PropertyValue::Number)
            .unwrap_or(value),
        (PropertyKind::Boolean, PropertyValue::Text(t)) => match t.trim() {
            "true" => PropertyValue::Bool(true),
            "false" => PropertyValue::Bool(false),
            _ => value,
        },
        _ => value,
    }
}

fn check_value(
    descriptor: &Descriptor,
    meta: &PropertyMeta,
    value: &PropertyValue,
) -> Result<(), DesignerError> {
    let invalid = |reason: String| DesignerError::InvalidValue {
        type_tag: descriptor.type_tag.clone(),
        property: meta.name.clone(),
        value: value.to_string(),
        reason,
    };
    if meta.kind == PropertyKind::Enum {
        if let PropertyValue::Text(t) = value {
            if !placeholder::is_placeholder(t) && !meta.enum_values.contains(t) {
                return Err(invalid(format!(
                    "expected one of {}",
                    meta.enum_values.iter().join(", ")
                )));
            }
        }
    }
    if !meta.accepts(value) {
        return Err(invalid(format!(
            "expected a {:?} value, got {}",
            meta.kind,
            value.kind_name()
        )));
    }
    Ok(())
}

fn check_items(
    descriptor: &Descriptor,
    meta: &PropertyMeta,
    item_type: &str,
    value: &PropertyValue,
) -> Result<(), DesignerError> {
    let items: Vec<&Node> = match value {
        PropertyValue::Node(n) => vec![n.as_ref()],
        PropertyValue::Nodes(list) => list.iter().collect(),
        _ => Vec::new(),
    };
    match items.iter().find(|n| n.type_tag() != item_type) {
        Some(wrong) => Err(DesignerError::InvalidValue {
            type_tag: descriptor.type_tag.clone(),
            property: meta.name.clone(),
            value: wrong.type_tag().to_string(),
            reason: format!("items must be of type {}", item_type),
        }),
        None => Ok(()),
    }
}

fn declared<'d>(descriptor: &'d Descriptor, name: &str) -> Result<&'d PropertyMeta, DesignerError> {
    descriptor
        .property(name)
        .ok_or_else(|| DesignerError::InvalidValue {
            type_tag: descriptor.type_tag.clone(),
            property: name.to_string(),
            value: String::new(),
            reason: "property is not declared for this type".to_string(),
        })
}

fn expression_property<'d>(
    descriptor: &'d Descriptor,
    name: &str,
) -> Result<&'d PropertyMeta, DesignerError> {
    let meta = declared(descriptor, name)?;
    if meta.kind != PropertyKind::Expression {
        return Err(DesignerError::InvalidValue {
            type_tag: descriptor.type_tag.clone(),
            property: name.to_string(),
            value: String::new(),
            reason: "not an expression property".to_string(),
        });
    }
    Ok(meta)
}

fn current_expression(node: &Node, property: &str) -> ExpressionValue {
    node.get(property)
        .and_then(PropertyValue::as_expression)
        .cloned()
        .unwrap_or_else(|| ExpressionValue::new(DEFAULT_LANGUAGE, ""))
}

fn parameters_of(node: &Node) -> IndexMap<String, PropertyValue> {
    node.get(PARAMETERS)
        .and_then(PropertyValue::as_parameters)
        .cloned()
        .unwrap_or_default()
}

fn canvas_only(descriptor: &Descriptor, name: &str) -> DesignerError {
    DesignerError::InvalidValue {
        type_tag: descriptor.type_tag.clone(),
        property: name.to_string(),
        value: String::new(),
        reason: "nested steps are edited on the canvas".to_string(),
    }
}

fn not_a_list(descriptor: &Descriptor, name: &str) -> DesignerError {
    DesignerError::InvalidValue {
        type_tag: descriptor.type_tag.clone(),
        property: name.to_string(),
        value: String::new(),
        reason: "not a list of items".to_string(),
    }
}

fn missing_item(descriptor: &Descriptor, name: &str, index: usize) -> DesignerError {
    DesignerError::InvalidValue {
        type_tag: descriptor.type_tag.clone(),
        property: name.to_string(),
        value: index.to_string(),
        reason: "no item at this index".to_string(),
    }
}
