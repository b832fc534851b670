//! Tests for the property layer: field sets, edits, expressions, items,
//! warnings and placeholders.
mod common;
use sekkei::catalog::PropertyKind;
use sekkei::error::{DesignerError, PlaceholderError};
use sekkei::prelude::*;
use sekkei::properties::{
    FieldGroup, LanguageFamily, Placeholder, WarningKind, language_family, parse_placeholders,
    switch_language,
};

fn names(fields: &[EditableField]) -> Vec<&str> {
    fields.iter().map(EditableField::name).collect()
}

fn set(path: FieldPath, value: impl Into<PropertyValue>) -> FieldEdit {
    FieldEdit::Set {
        path,
        value: value.into(),
    }
}

#[test]
fn test_component_fields_for_consumer() {
    let catalog = common::catalog();
    let doc = common::sample_document(&catalog);
    let sync = PropertySync::new(&catalog);

    let fields = sync.fields(&doc, "from-main").unwrap();
    assert_eq!(fields.type_tag, "From");
    assert_eq!(
        names(&fields.main),
        vec!["uri", "timerName", "period", "repeatCount", "description"]
    );
    assert_eq!(names(&fields.advanced), vec!["delay", "variableReceive"]);

    let timer_name = fields.field("timerName").unwrap();
    assert_eq!(timer_name.path, FieldPath::PathParameter("timerName".to_string()));
    assert!(timer_name.required);
    assert_eq!(timer_name.value, Some(PropertyValue::Text("tick".to_string())));

    let period = fields.field("period").unwrap();
    assert_eq!(period.path, FieldPath::Parameter("period".to_string()));
    assert_eq!(period.hint, EditorHint::Number);
    assert_eq!(period.value, Some(PropertyValue::Number(5000.0)));
    assert_eq!(period.default, Some(PropertyValue::Number(1000.0)));

    let repeat = fields.field("repeatCount").unwrap();
    assert_eq!(repeat.value, None);
    assert!(repeat.effective_value().is_none());
}

#[test]
fn test_component_fields_for_producer() {
    let catalog = common::catalog();
    let doc = common::sample_document(&catalog);
    let sync = PropertySync::new(&catalog);

    let fields = sync.fields(&doc, "to-kafka").unwrap();
    assert!(fields.field("groupId").is_none());

    let acks = fields.field("acks").unwrap();
    assert_eq!(acks.kind, PropertyKind::Enum);
    assert_eq!(
        acks.hint,
        EditorHint::Select {
            values: vec!["0".to_string(), "1".to_string(), "all".to_string()]
        }
    );
    assert_eq!(acks.value, Some(PropertyValue::Text("all".to_string())));

    let sasl = fields.field("saslJaasConfig").unwrap();
    assert_eq!(sasl.hint, EditorHint::Secret);
    assert_eq!(sasl.group, FieldGroup::Advanced);
}

#[test]
fn test_descriptor_fields_skip_canvas_slots() {
    let catalog = common::catalog();
    let doc = common::sample_document(&catalog);
    let sync = PropertySync::new(&catalog);

    let fields = sync.fields(&doc, "choice-1").unwrap();
    assert!(fields.field("when").is_none());
    assert!(fields.field("otherwise").is_none());
    assert!(fields.field("precondition").is_some());

    let log = sync.fields(&doc, "log-1").unwrap();
    let level = log.field("loggingLevel").unwrap();
    assert_eq!(level.effective_value(), Some(&PropertyValue::Text("INFO".to_string())));

    assert!(matches!(
        sync.fields(&doc, "ghost"),
        Err(DesignerError::NotFound { .. })
    ));
}

#[test]
fn test_enum_violation_leaves_document_unchanged() {
    let catalog = common::catalog();
    let doc = common::sample_document(&catalog);
    let sync = PropertySync::new(&catalog);

    let edit = set(FieldPath::Property("loggingLevel".to_string()), "LOUD");
    let err = sync.apply(&doc, "log-1", edit).unwrap_err();
    assert!(matches!(err, DesignerError::InvalidValue { .. }));
    assert_eq!(doc, common::sample_document(&catalog));

    let edit = set(FieldPath::Property("loggingLevel".to_string()), "WARN");
    let outcome = sync.apply(&doc, "log-1", edit).unwrap();
    assert_eq!(
        outcome.document.find("log-1").unwrap().get_text("loggingLevel"),
        Some("WARN")
    );
}

#[test]
fn test_enum_rejects_text_around_placeholder() {
    let catalog = common::catalog();
    let doc = common::sample_document(&catalog);
    let sync = PropertySync::new(&catalog);
    let level = || FieldPath::Property("loggingLevel".to_string());

    for bad in ["garbage {{x}}", "LOUD{{", "{{", "{{a}}{{b}}", "{{env:}}"] {
        let err = sync.apply(&doc, "log-1", set(level(), bad)).unwrap_err();
        assert!(matches!(err, DesignerError::InvalidValue { .. }), "{} was accepted", bad);
    }

    let outcome = sync.apply(&doc, "log-1", set(level(), " {{log.level}} ")).unwrap();
    assert!(outcome.warnings.is_empty());

    let order = || FieldPath::Property("startupOrder".to_string());
    assert!(matches!(
        sync.apply(&doc, "route-main", set(order(), "abc{{")),
        Err(DesignerError::InvalidValue { .. })
    ));
    assert!(sync.apply(&doc, "route-main", set(order(), "{{route.order}}")).is_ok());

    let period = || FieldPath::Parameter("period".to_string());
    assert!(matches!(
        sync.apply(&doc, "from-main", set(period(), "soon")),
        Err(DesignerError::InvalidValue { .. })
    ));
    assert!(sync.apply(&doc, "from-main", set(period(), "{{timer.period}}")).is_ok());
}

#[test]
fn test_parameter_enum_and_placeholders() {
    let catalog = common::catalog();
    let doc = common::sample_document(&catalog);
    let sync = PropertySync::new(&catalog);
    let acks = || FieldPath::Parameter("acks".to_string());

    assert!(matches!(
        sync.apply(&doc, "to-kafka", set(acks(), "2")),
        Err(DesignerError::InvalidValue { .. })
    ));

    let outcome = sync.apply(&doc, "to-kafka", set(acks(), "{{kafka.acks}}")).unwrap();
    let fields = sync.fields(&outcome.document, "to-kafka").unwrap();
    assert_eq!(
        fields.field("acks").unwrap().value,
        Some(PropertyValue::Text("{{kafka.acks}}".to_string()))
    );

    // Consumer-only parameters do not exist on a producer.
    let group = set(FieldPath::Parameter("groupId".to_string()), "g1");
    assert!(matches!(
        sync.apply(&doc, "to-kafka", group),
        Err(DesignerError::InvalidValue { .. })
    ));
}

#[test]
fn test_text_input_is_coerced() {
    let catalog = common::catalog();
    let doc = common::sample_document(&catalog);
    let sync = PropertySync::new(&catalog);

    let period = set(FieldPath::Parameter("period".to_string()), "250");
    let outcome = sync.apply(&doc, "from-main", period).unwrap();
    let parameters = outcome
        .document
        .find("from-main")
        .unwrap()
        .get("parameters")
        .and_then(PropertyValue::as_parameters)
        .unwrap()
        .clone();
    assert_eq!(parameters.get("period"), Some(&PropertyValue::Number(250.0)));

    let port = set(FieldPath::Property("port".to_string()), "9090");
    let outcome = sync.apply(&doc, "rest-config", port).unwrap();
    assert_eq!(
        outcome.document.find("rest-config").unwrap().get("port"),
        Some(&PropertyValue::Number(9090.0))
    );

    let bad = set(FieldPath::Property("port".to_string()), "many");
    assert!(sync.apply(&doc, "rest-config", bad).is_err());
}

#[test]
fn test_unset_last_parameter_drops_map() {
    let catalog = common::catalog();
    let doc = common::sample_document(&catalog);
    let sync = PropertySync::new(&catalog);

    let edit = FieldEdit::Unset {
        path: FieldPath::Parameter("period".to_string()),
    };
    let outcome = sync.apply(&doc, "from-main", edit).unwrap();
    assert!(outcome.document.find("from-main").unwrap().get("parameters").is_none());
}

#[test]
fn test_path_parameter_rewrites_uri() {
    let catalog = common::catalog();
    let doc = common::sample_document(&catalog);
    let sync = PropertySync::new(&catalog);

    let topic = set(FieldPath::PathParameter("topic".to_string()), "orders");
    let outcome = sync.apply(&doc, "to-kafka", topic).unwrap();
    assert_eq!(
        outcome.document.find("to-kafka").unwrap().get_text("uri"),
        Some("kafka:orders")
    );

    let wrong = set(FieldPath::PathParameter("brokers".to_string()), "x");
    assert!(matches!(
        sync.apply(&doc, "to-kafka", wrong),
        Err(DesignerError::InvalidValue { .. })
    ));
}

#[test]
fn test_parameters_on_types_without_them() {
    let catalog = common::catalog();
    let doc = common::sample_document(&catalog);
    let sync = PropertySync::new(&catalog);

    let edit = set(FieldPath::Parameter("x".to_string()), "y");
    assert!(matches!(
        sync.apply(&doc, "log-1", edit),
        Err(DesignerError::InvalidValue { .. })
    ));
}

#[test]
fn test_canvas_slots_are_not_form_fields() {
    let catalog = common::catalog();
    let doc = common::sample_document(&catalog);
    let sync = PropertySync::new(&catalog);

    let steps = set(
        FieldPath::Property("steps".to_string()),
        PropertyValue::Nodes(Vec::new()),
    );
    assert!(sync.apply(&doc, "from-main", steps).is_err());

    let unset = FieldEdit::Unset {
        path: FieldPath::Property("steps".to_string()),
    };
    assert!(sync.apply(&doc, "from-main", unset).is_err());
}

#[test]
fn test_expression_language_switch() {
    let catalog = common::catalog();
    let doc = common::sample_document(&catalog);
    let sync = PropertySync::new(&catalog);
    let switch = |language: &str| FieldEdit::SetExpressionLanguage {
        property: "expression".to_string(),
        language: language.to_string(),
    };

    let outcome = sync.apply(&doc, "set-body-1", switch("constant")).unwrap();
    let expression = outcome
        .document
        .find("set-body-1")
        .unwrap()
        .get("expression")
        .and_then(PropertyValue::as_expression)
        .unwrap()
        .clone();
    assert_eq!(expression, ExpressionValue::new("constant", "${date:now}"));

    let outcome = sync.apply(&doc, "set-body-1", switch("jq")).unwrap();
    let expression = outcome
        .document
        .find("set-body-1")
        .unwrap()
        .get("expression")
        .and_then(PropertyValue::as_expression)
        .unwrap()
        .clone();
    assert_eq!(expression, ExpressionValue::new("jq", ""));
    // An emptied expression still counts as set.
    assert!(outcome.warnings.is_empty());

    assert!(sync.apply(&doc, "set-body-1", switch("cobol")).is_err());
}

#[test]
fn test_expression_value_edit() {
    let catalog = common::catalog();
    let doc = common::sample_document(&catalog);
    let sync = PropertySync::new(&catalog);

    let edit = FieldEdit::SetExpressionValue {
        property: "expression".to_string(),
        value: "${header.foo}".to_string(),
    };
    let outcome = sync.apply(&doc, "set-body-1", edit).unwrap();
    assert_eq!(
        outcome
            .document
            .find("set-body-1")
            .unwrap()
            .get("expression")
            .and_then(PropertyValue::as_expression),
        Some(&ExpressionValue::new("simple", "${header.foo}"))
    );

    let not_expression = FieldEdit::SetExpressionValue {
        property: "message".to_string(),
        value: "x".to_string(),
    };
    assert!(sync.apply(&doc, "log-1", not_expression).is_err());
}

#[test]
fn test_language_families() {
    assert_eq!(language_family("simple"), Some(LanguageFamily::Template));
    assert_eq!(language_family("jsonpath"), Some(LanguageFamily::Path));
    assert_eq!(language_family("nope"), None);

    let header = ExpressionValue::new("header", "foo");
    let moved = switch_language(&header, "variable").unwrap();
    assert_eq!(moved, ExpressionValue::new("variable", "foo"));
}

#[test]
fn test_bean_property_items() {
    let catalog = common::catalog();
    let doc = common::sample_document(&catalog);
    let sync = PropertySync::new(&catalog);

    let fields = sync.fields(&doc, "bean-ds").unwrap();
    assert_eq!(fields.field("properties").unwrap().hint, EditorHint::KeyValueTable);

    let add = FieldEdit::AddItem {
        property: "properties".to_string(),
        values: vec![
            ("key".to_string(), PropertyValue::from("user")),
            ("value".to_string(), PropertyValue::from("sa")),
        ],
    };
    let outcome = sync.apply(&doc, "bean-ds", add).unwrap();
    let bean = outcome.document.find("bean-ds").unwrap();
    assert_eq!(bean.get("properties").and_then(PropertyValue::as_nodes).unwrap().len(), 2);
    assert_eq!(bean.child("properties", 1).unwrap().get_text("key"), Some("user"));

    let rename = FieldEdit::SetItemField {
        property: "properties".to_string(),
        index: 0,
        field: "value".to_string(),
        value: PropertyValue::from("jdbc:h2:mem:other"),
    };
    let outcome = sync.apply(&outcome.document, "bean-ds", rename).unwrap();
    let item = outcome.document.find("prop-url").unwrap();
    assert_eq!(item.get_text("value"), Some("jdbc:h2:mem:other"));

    let remove = FieldEdit::RemoveItem {
        property: "properties".to_string(),
        index: 0,
    };
    let outcome = sync.apply(&outcome.document, "bean-ds", remove).unwrap();
    assert!(!outcome.document.contains("prop-url"));

    let out_of_range = FieldEdit::RemoveItem {
        property: "properties".to_string(),
        index: 5,
    };
    assert!(sync.apply(&doc, "bean-ds", out_of_range).is_err());

    let bad_field = FieldEdit::AddItem {
        property: "properties".to_string(),
        values: vec![("colour".to_string(), PropertyValue::from("red"))],
    };
    assert!(sync.apply(&doc, "bean-ds", bad_field).is_err());
}

#[test]
fn test_missing_required_warnings() {
    let catalog = common::catalog();
    let doc = common::sample_document(&catalog);
    let sync = PropertySync::new(&catalog);

    assert!(sync.validate_node(&doc, "log-1").unwrap().is_empty());
    assert!(sync.validate_node(&doc, "from-main").unwrap().is_empty());

    let unset = FieldEdit::Unset {
        path: FieldPath::Property("message".to_string()),
    };
    let outcome = sync.apply(&doc, "log-1", unset).unwrap();
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].field, "message");
    assert_eq!(outcome.warnings[0].kind, WarningKind::MissingRequired);

    let from = Node::new("From").with("uri", "timer:");
    let warnings = sync.warnings_for(&from).unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field, "timerName");
}

#[test]
fn test_kamelet_fields_and_warnings() {
    let catalog = common::catalog();
    let sync = PropertySync::new(&catalog);

    let sink = catalog.instantiate("kamelet:slack-sink").unwrap();
    let fields = sync.fields_for(&sink).unwrap();
    assert!(fields.field("channel").unwrap().required);
    assert_eq!(fields.field("webhookUrl").unwrap().hint, EditorHint::Secret);

    let missing: Vec<String> = sync
        .warnings_for(&sink)
        .unwrap()
        .into_iter()
        .map(|w| w.field)
        .collect();
    assert_eq!(missing, vec!["channel", "webhookUrl"]);

    // Only `message` is required.
    let source = catalog.instantiate("kamelet:timer-source").unwrap();
    let missing: Vec<String> = sync
        .warnings_for(&source)
        .unwrap()
        .into_iter()
        .map(|w| w.field)
        .collect();
    assert_eq!(missing, vec!["message"]);
}

#[test]
fn test_malformed_placeholder_warning() {
    let catalog = common::catalog();
    let doc = common::sample_document(&catalog);
    let sync = PropertySync::new(&catalog);

    let edit = set(FieldPath::Property("message".to_string()), "tick {{app.name");
    let outcome = sync.apply(&doc, "log-1", edit).unwrap();
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].kind, WarningKind::MalformedPlaceholder);
    assert_eq!(outcome.warnings[0].node_id.as_str(), "log-1");
}

#[test]
fn test_edit_reports_follow_up() {
    let catalog = common::catalog();
    let doc = common::simple_route(&catalog);
    let sync = PropertySync::new(&catalog);

    let edit = set(FieldPath::Property("uri".to_string()), "direct:billing");
    let outcome = sync.apply(&doc, "to-1", edit).unwrap();
    assert_eq!(
        outcome.follow_ups,
        vec![FollowUp::CreateRoute {
            uri: "direct:billing".to_string(),
            requested_by: NodeId::new("to-1")
        }]
    );
}

#[test]
fn test_parse_placeholders() {
    let found =
        parse_placeholders("{{name:def}} and {{?opt}} {{env:HOME}} {{secret:db/password}}")
            .unwrap();
    assert_eq!(
        found,
        vec![
            Placeholder::Property {
                name: "name".to_string(),
                default: Some("def".to_string()),
                optional: false
            },
            Placeholder::Property {
                name: "opt".to_string(),
                default: None,
                optional: true
            },
            Placeholder::Env("HOME".to_string()),
            Placeholder::Secret {
                name: "db".to_string(),
                key: "password".to_string()
            },
        ]
    );

    assert!(parse_placeholders("plain text").unwrap().is_empty());
}

#[test]
fn test_placeholder_errors() {
    assert_eq!(
        parse_placeholders("timer:{{period").unwrap_err(),
        PlaceholderError::Unterminated { at: 6 }
    );
    assert_eq!(
        parse_placeholders("{{ }}").unwrap_err(),
        PlaceholderError::Empty { at: 0 }
    );
    assert!(matches!(
        parse_placeholders("{{secret:onlyname}}").unwrap_err(),
        PlaceholderError::Malformed { .. }
    ));
    assert!(matches!(
        parse_placeholders("{{env:not valid}}").unwrap_err(),
        PlaceholderError::Malformed { .. }
    ));
}
