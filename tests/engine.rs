//! Tests for the mutation engine: placement, deletion, moves, conversions,
//! beans and follow-ups.
mod common;
use sekkei::engine::SlotIndex;
use sekkei::error::DesignerError;
use sekkei::prelude::*;

#[test]
fn test_add_keeps_every_existing_id() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::sample_document(&catalog);
    let before = common::sorted_ids(&doc);

    let log = Node::with_id("log-new", "Log").with("message", "added");
    let next = engine
        .add_step(&doc, log, Some("when-1"), None, None)
        .unwrap();

    let after = common::sorted_ids(&next);
    assert_eq!(after.len(), before.len() + 1);
    assert!(before.iter().all(|id| after.contains(id)));
    // The input document is untouched.
    assert!(!doc.contains("log-new"));
}

#[test]
fn test_add_then_delete_restores_document() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::sample_document(&catalog);

    let stop = Node::with_id("stop-new", "Stop");
    let added = engine
        .add_step(&doc, stop, Some("from-main"), None, Some(1))
        .unwrap();
    assert_eq!(added.find("from-main").unwrap().child("steps", 1).unwrap().id().as_str(), "stop-new");

    let removed = engine.delete_step(&added, "stop-new");
    assert_eq!(removed, doc);
}

#[test]
fn test_delete_is_idempotent() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::sample_document(&catalog);

    assert_eq!(engine.delete_step(&doc, "no-such-node"), doc);

    let once = engine.delete_step(&doc, "log-1");
    let twice = engine.delete_step(&once, "log-1");
    assert_eq!(once, twice);
    assert!(!once.contains("log-1"));
}

#[test]
fn test_delete_removes_subtree() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::sample_document(&catalog);

    let next = engine.delete_step(&doc, "choice-1");
    for id in ["choice-1", "when-1", "to-audit", "otherwise-1", "stop-1"] {
        assert!(!next.contains(id), "{} should be gone", id);
    }
    assert!(next.contains("set-body-1"));
}

#[test]
fn test_deleting_from_removes_its_route() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::sample_document(&catalog);

    let next = engine.delete_step(&doc, "from-main");
    assert!(!next.contains("route-main"));
    assert_eq!(next.flows().len(), 4);
    assert!(next.contains("route-audit"));
}

#[test]
fn test_deleting_last_bean_keeps_registry() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::sample_document(&catalog);

    let next = engine.delete_step(&doc, "prop-url");
    assert!(next.contains("bean-ds"));
    assert!(next.find("bean-ds").unwrap().get("properties").is_none());

    let next = engine.delete_step(&next, "bean-ds");
    let registry = next.beans().unwrap();
    assert_eq!(registry.id().as_str(), "beans-1");
    assert!(registry.get("beans").is_none());
    assert_eq!(next.flows().len(), doc.flows().len());
}

#[test]
fn test_add_then_delete_under_explicit_roots() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);

    let rest = Node::with_id("rest-x", "Rest");
    let doc = engine.add_step(&Document::new(), rest, None, None, None).unwrap();
    let get = Node::with_id("get-x", "Get").with("path", "/x");
    let added = engine.add_step(&doc, get, Some("rest-x"), None, None).unwrap();
    assert!(added.contains("get-x"));
    assert_eq!(engine.delete_step(&added, "get-x"), doc);

    let beans = Node::with_id("beans-x", "Beans");
    let doc = engine.add_step(&Document::new(), beans, None, None, None).unwrap();
    let bean = Node::with_id("bean-x", "Bean")
        .with("name", "client")
        .with("type", "org.example.Client");
    let added = engine.add_step(&doc, bean, Some("beans-x"), None, None).unwrap();
    assert_eq!(engine.delete_step(&added, "bean-x"), doc);
    assert_eq!(engine.delete_bean(&added, "bean-x"), doc);
}

#[test]
fn test_nesting_violations_are_rejected() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::sample_document(&catalog);

    let when = Node::with_id("when-2", "When")
        .with("expression", ExpressionValue::new("simple", "${body}"));
    let err = engine
        .add_step(&doc, when, Some("from-main"), Some("steps"), None)
        .unwrap_err();
    assert!(matches!(err, DesignerError::InvalidSlot { .. }));

    let log = Node::with_id("log-x", "Log").with("message", "x");
    let err = engine
        .add_step(&doc, log.clone(), Some("choice-1"), None, None)
        .unwrap_err();
    assert!(matches!(err, DesignerError::InvalidSlot { .. }));

    let err = engine
        .add_step(&doc, log, Some("ghost"), None, None)
        .unwrap_err();
    assert!(matches!(err, DesignerError::InvalidParent { .. }));
}

#[test]
fn test_occupied_single_slot_is_rejected() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::sample_document(&catalog);

    let otherwise = Node::with_id("otherwise-2", "Otherwise");
    let err = engine
        .add_step(&doc, otherwise, Some("choice-1"), Some("otherwise"), None)
        .unwrap_err();
    assert!(matches!(err, DesignerError::InvalidSlot { .. }));
}

#[test]
fn test_ids_stay_unique() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::sample_document(&catalog);

    let copy = Node::with_id("log-1", "Log").with("message", "again");
    let err = engine
        .add_step(&doc, copy, Some("from-main"), None, None)
        .unwrap_err();
    assert_eq!(err, DesignerError::DuplicateId("log-1".to_string()));

    // Duplicates inside the inserted subtree count too.
    let pipeline = Node::with_id("pipe-1", "Pipeline").with(
        "steps",
        vec![Node::with_id("dup", "Stop"), Node::with_id("dup", "Stop")],
    );
    let err = engine
        .add_step(&doc, pipeline, Some("from-main"), None, None)
        .unwrap_err();
    assert_eq!(err, DesignerError::DuplicateId("dup".to_string()));
}

#[test]
fn test_singleton_roots() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::sample_document(&catalog);

    let config = Node::new("RestConfiguration").with("port", 9090.0);
    let err = engine.add_step(&doc, config, None, None, None).unwrap_err();
    assert_eq!(err, DesignerError::DuplicateRoot("RestConfiguration".to_string()));

    let err = engine
        .add_step(&doc, Node::new("Beans"), None, None, None)
        .unwrap_err();
    assert_eq!(err, DesignerError::DuplicateRoot("Beans".to_string()));
}

#[test]
fn test_document_level_wrapping() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);

    let from = Node::with_id("from-x", "From").with("uri", "timer:x");
    let doc = engine
        .add_step(&Document::new(), from, None, None, None)
        .unwrap();
    let route = &doc.flows()[0];
    assert_eq!(route.type_tag(), "Route");
    assert_eq!(route.get("from").and_then(|v| v.as_node()).unwrap().id().as_str(), "from-x");

    let get = Node::with_id("get-x", "Get").with("path", "/x");
    let doc = engine.add_step(&doc, get, None, None, Some(0)).unwrap();
    assert_eq!(doc.flows()[0].type_tag(), "Rest");
    assert_eq!(doc.flows()[0].child("get", 0).unwrap().id().as_str(), "get-x");

    let log = Node::new("Log").with("message", "x");
    let err = engine.add_step(&doc, log, None, None, None).unwrap_err();
    assert!(matches!(err, DesignerError::InvalidSlot { .. }));
}

#[test]
fn test_position_is_clamped() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::simple_route(&catalog);

    let first = Node::with_id("first", "Stop");
    let doc = engine
        .add_step(&doc, first, Some("from-1"), None, Some(0))
        .unwrap();
    let last = Node::with_id("last", "Stop");
    let doc = engine
        .add_step(&doc, last, Some("from-1"), None, Some(99))
        .unwrap();

    let steps: Vec<&str> = doc
        .find("from-1")
        .unwrap()
        .children()
        .map(|(_, c)| c.id().as_str())
        .collect();
    assert_eq!(steps, vec!["first", "log-1", "to-1", "last"]);
}

#[test]
fn test_update_node_in_place() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::sample_document(&catalog);

    let mut log = doc.find("log-1").unwrap().clone();
    log.set("message", "changed");
    let next = engine.update_node(&doc, log).unwrap();
    assert_eq!(next.find("log-1").unwrap().get_text("message"), Some("changed"));
    assert_eq!(common::sorted_ids(&next), common::sorted_ids(&doc));

    let ghost = Node::with_id("ghost", "Log");
    assert!(matches!(
        engine.update_node(&doc, ghost),
        Err(DesignerError::NotFound { what: "node", .. })
    ));

    let bad = doc.find("log-1").unwrap().clone().with("colour", "red");
    assert!(matches!(
        engine.update_node(&doc, bad),
        Err(DesignerError::InvalidValue { .. })
    ));
}

#[test]
fn test_move_keeps_identity() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::sample_document(&catalog);

    let next = engine
        .move_step(&doc, "to-audit", Some("from-main"), None, Some(0))
        .unwrap();
    assert_eq!(common::sorted_ids(&next), common::sorted_ids(&doc));
    let (parent, at) = engine.find_parent(&next, "to-audit").unwrap();
    assert_eq!(parent.id().as_str(), "from-main");
    assert_eq!(
        at,
        SlotIndex {
            slot: "steps".to_string(),
            index: 0
        }
    );
    // `when-1` lost its only step but stays in place.
    assert!(next.contains("when-1"));
}

#[test]
fn test_move_into_own_subtree_is_rejected() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::sample_document(&catalog);

    let err = engine
        .move_step(&doc, "choice-1", Some("when-1"), None, None)
        .unwrap_err();
    assert!(matches!(err, DesignerError::InvalidParent { .. }));

    let err = engine
        .move_step(&doc, "ghost", Some("from-main"), None, None)
        .unwrap_err();
    assert!(matches!(err, DesignerError::NotFound { .. }));
}

#[test]
fn test_move_from_to_document_level() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::sample_document(&catalog);

    let next = engine
        .move_step(&doc, "from-audit", None, None, None)
        .unwrap();
    assert!(!next.contains("route-audit"));
    assert_eq!(next.flows().len(), 5);
    let route = engine.route_for(&next, "to-kafka").unwrap();
    assert_eq!(route.type_tag(), "Route");
    assert_eq!(route.get("from").and_then(|v| v.as_node()).unwrap().id().as_str(), "from-audit");
}

#[test]
fn test_convert_wraps_and_keeps_content() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::simple_route(&catalog);

    let next = engine.convert_node(&doc, "to-1", "Pipeline").unwrap();
    let (parent, _) = engine.find_parent(&next, "to-1").unwrap();
    assert_eq!(parent.type_tag(), "Pipeline");
    assert_eq!(next.find("to-1").unwrap().get_text("uri"), Some("direct:a"));
    assert_eq!(next.node_count(), doc.node_count() + 1);

    let unwrapped = engine
        .convert_node(&next, parent.id().as_str(), "To")
        .unwrap();
    assert_eq!(unwrapped, doc);
}

#[test]
fn test_convert_retag_keeps_id() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::simple_route(&catalog);

    let next = engine.convert_node(&doc, "to-1", "ToD").unwrap();
    let converted = next.find("to-1").unwrap();
    assert_eq!(converted.type_tag(), "ToD");
    assert_eq!(converted.get_text("uri"), Some("direct:a"));
}

#[test]
fn test_convert_errors() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::simple_route(&catalog);

    assert_eq!(
        engine.convert_node(&doc, "log-1", "Choice").unwrap_err(),
        DesignerError::NotConvertible {
            from: "Log".to_string(),
            to: "Choice".to_string()
        }
    );
    assert!(matches!(
        engine.convert_node(&doc, "ghost", "ToD"),
        Err(DesignerError::NotFound { what: "node", .. })
    ));
    assert!(matches!(
        engine.convert_node(&doc, "to-1", "Teleport"),
        Err(DesignerError::NotFound { what: "type", .. })
    ));
}

#[test]
fn test_bean_registry() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::simple_route(&catalog);

    let bean = Node::with_id("bean-a", "Bean")
        .with("name", "client")
        .with("type", "org.example.Client");
    let doc = engine.add_bean(&doc, bean).unwrap();
    assert_eq!(doc.beans().unwrap().child("beans", 0).unwrap().id().as_str(), "bean-a");

    let clash = Node::with_id("bean-b", "Bean")
        .with("name", "client")
        .with("type", "org.example.Other");
    assert!(matches!(
        engine.add_bean(&doc, clash),
        Err(DesignerError::InvalidValue { .. })
    ));

    let not_a_bean = Node::new("Log").with("message", "x");
    assert!(matches!(
        engine.add_bean(&doc, not_a_bean),
        Err(DesignerError::InvalidSlot { .. })
    ));

    // Only registry beans are removed.
    assert_eq!(engine.delete_bean(&doc, "log-1"), doc);
    let emptied = engine.delete_bean(&doc, "bean-a");
    assert!(!emptied.contains("bean-a"));
    assert!(emptied.beans().unwrap().get("beans").is_none());
}

#[test]
fn test_parent_and_route_queries() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::sample_document(&catalog);

    let (parent, at) = engine.find_parent(&doc, "when-1").unwrap();
    assert_eq!(parent.id().as_str(), "choice-1");
    assert_eq!(at.slot, "when");
    assert!(engine.find_parent(&doc, "route-main").is_none());

    assert_eq!(engine.route_for(&doc, "stop-1").unwrap().id().as_str(), "route-main");
    assert_eq!(engine.route_for(&doc, "get-orders").unwrap().id().as_str(), "rest-1");
    assert!(engine.route_for(&doc, "ghost").is_none());

    let choice = engine.find_node(&doc, "choice-1").unwrap();
    assert_eq!(engine.children_of_type(choice, "When").len(), 1);
    assert_eq!(engine.all_ids(&doc).len(), doc.node_count());
}

#[test]
fn test_display_queries() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::sample_document(&catalog);

    let from = doc.find("from-main").unwrap();
    assert_eq!(engine.title(from).unwrap(), "Timer");
    assert_eq!(engine.icon_key(from).unwrap(), "timer");
    assert_eq!(engine.description(from).unwrap(), "timer:tick");

    let log = doc.find("log-1").unwrap();
    assert_eq!(engine.title(log).unwrap(), "Log");
    assert_eq!(engine.icon_key(log).unwrap(), "log");
    assert_eq!(engine.description(log).unwrap(), "tick {{app.name}}");

    let body = doc.find("set-body-1").unwrap();
    assert_eq!(engine.description(body).unwrap(), "simple: ${date:now}");

    let sink = catalog.instantiate("kamelet:slack-sink").unwrap();
    assert_eq!(engine.title(&sink).unwrap(), "Slack Sink");
    assert_eq!(engine.icon_key(&sink).unwrap(), "kamelet:slack-sink");

    assert!(engine.title(&Node::new("Unknown")).is_err());
}

#[test]
fn test_follow_up_for_unconsumed_endpoint() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::sample_document(&catalog);

    // direct:audit is consumed by route-audit.
    assert_eq!(engine.suggest_follow_up(&doc, "to-audit"), None);
    // kafka is not an internal endpoint.
    assert_eq!(engine.suggest_follow_up(&doc, "to-kafka"), None);
    assert_eq!(engine.suggest_follow_up(&doc, "from-audit"), None);

    let follow_up = engine.suggest_follow_up(&doc, "get-orders").unwrap();
    assert_eq!(
        follow_up,
        FollowUp::CreateRoute {
            uri: "direct:orders".to_string(),
            requested_by: NodeId::new("get-orders")
        }
    );

    let next = engine.create_linked_route(&doc, &follow_up).unwrap();
    assert_eq!(next.routes().count(), 3);
    assert_eq!(engine.suggest_follow_up(&next, "get-orders"), None);
}

#[test]
fn test_link_rest_verb() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);
    let doc = common::sample_document(&catalog);

    let (next, follow_up) = engine
        .link_rest_verb(&doc, "get-orders", "direct:audit")
        .unwrap();
    assert_eq!(next.find("get-orders").unwrap().get_text("to"), Some("direct:audit"));
    assert!(follow_up.is_none());

    let (_, follow_up) = engine
        .link_rest_verb(&doc, "get-orders", "direct:new?timeout=5")
        .unwrap();
    assert!(matches!(
        follow_up,
        Some(FollowUp::CreateRoute { ref uri, .. }) if uri == "direct:new"
    ));

    assert!(matches!(
        engine.link_rest_verb(&doc, "log-1", "direct:x"),
        Err(DesignerError::InvalidValue { .. })
    ));
}

#[test]
fn test_allowed_child_types_through_engine() {
    let catalog = common::catalog();
    let engine = MutationEngine::new(&catalog);

    let tags: Vec<&str> = engine
        .allowed_child_types("DoTry", "doFinally")
        .iter()
        .map(|d| d.type_tag.as_str())
        .collect();
    assert_eq!(tags, vec!["DoFinally"]);
    assert!(engine.allowed_child_types("Log", "steps").is_empty());
}
