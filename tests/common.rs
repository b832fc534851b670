//! Common test utilities: a catalog with reference data and sample documents.
use sekkei::prelude::*;

/// Components and kamelets used across the tests.
///
/// - `timer`: consumer only, path `timerName`
/// - `kafka`: path `topic`, consumer/producer specific parameters, an enum and a secret
/// - `direct`: path `name`
#[allow(dead_code)]
pub const REFERENCE_JSON: &str = r#"{
  "components": [
    {
      "name": "timer",
      "title": "Timer",
      "description": "Generates messages at a fixed interval",
      "labels": ["core", "scheduling"],
      "syntax": "timer:timerName",
      "consumerOnly": true,
      "parameters": [
        { "name": "timerName", "kind": "string", "required": true, "path": true },
        { "name": "period", "kind": "number", "default": 1000, "label": "consumer" },
        { "name": "repeatCount", "kind": "number", "label": "consumer" },
        { "name": "delay", "kind": "number", "label": "consumer,advanced" }
      ]
    },
    {
      "name": "kafka",
      "title": "Kafka",
      "description": "Sends and receives messages to and from Apache Kafka",
      "labels": ["messaging"],
      "syntax": "kafka:topic",
      "parameters": [
        { "name": "topic", "kind": "string", "required": true, "path": true },
        { "name": "brokers", "kind": "string", "description": "Bootstrap servers" },
        { "name": "groupId", "kind": "string", "label": "consumer" },
        { "name": "acks", "kind": "string", "enumValues": ["0", "1", "all"], "label": "producer" },
        { "name": "saslJaasConfig", "kind": "string", "secret": true, "label": "security,advanced" }
      ]
    },
    {
      "name": "direct",
      "title": "Direct",
      "description": "Calls another route in the same context",
      "labels": ["core"],
      "syntax": "direct:name",
      "parameters": [
        { "name": "name", "kind": "string", "required": true, "path": true },
        { "name": "timeout", "kind": "number", "label": "producer,advanced" }
      ]
    }
  ],
  "kamelets": [
    {
      "name": "slack-sink",
      "title": "Slack Sink",
      "description": "Sends messages to a Slack channel",
      "kind": "sink",
      "properties": [
        { "name": "channel", "kind": "string", "required": true },
        { "name": "webhookUrl", "kind": "string", "required": true, "secret": true }
      ]
    },
    {
      "name": "timer-source",
      "title": "Timer Source",
      "kind": "source",
      "properties": [
        { "name": "message", "kind": "string", "required": true },
        { "name": "period", "kind": "number", "default": 1000 }
      ]
    },
    {
      "name": "log-action",
      "title": "Log Action",
      "kind": "action",
      "properties": []
    }
  ]
}"#;

/// A document exercising every kind of root and most slot shapes.
#[allow(dead_code)]
pub const SAMPLE_YAML: &str = r#"
- route:
    id: route-main
    group: demo
    from:
      id: from-main
      uri: timer:tick
      parameters:
        period: 5000
      steps:
        - log:
            id: log-1
            message: "tick {{app.name}}"
        - setBody:
            id: set-body-1
            expression:
              simple:
                expression: "${date:now}"
        - choice:
            id: choice-1
            when:
              - id: when-1
                expression:
                  simple:
                    expression: "${body} contains 'a'"
                steps:
                  - to:
                      id: to-audit
                      uri: direct:audit
            otherwise:
              id: otherwise-1
              steps:
                - stop:
                    id: stop-1
- route:
    id: route-audit
    from:
      id: from-audit
      uri: direct:audit
      steps:
        - to:
            id: to-kafka
            uri: kafka:audit
            parameters:
              acks: all
- rest:
    id: rest-1
    path: /api
    get:
      - id: get-orders
        path: /orders
        to: direct:orders
- restConfiguration:
    id: rest-config
    component: platform-http
    port: 8080
- beans:
    id: beans-1
    beans:
      - id: bean-ds
        name: dataSource
        type: org.example.DataSource
        properties:
          - id: prop-url
            key: url
            value: "jdbc:h2:mem:test"
"#;

/// The built-in catalog plus the reference data above.
#[allow(dead_code)]
pub fn catalog() -> Catalog {
    let reference = ReferenceData::from_json(REFERENCE_JSON).unwrap();
    Catalog::builder()
        .with_reference_data(reference)
        .build()
        .unwrap()
}

#[allow(dead_code)]
pub fn sample_document(catalog: &Catalog) -> Document {
    serialize::parse(SAMPLE_YAML, catalog).unwrap()
}

/// A single route `timer:foo -> log -> to direct:a` with fixed ids.
///
/// Ids: `route-1`, `from-1`, `log-1`, `to-1`.
#[allow(dead_code)]
pub fn simple_route(catalog: &Catalog) -> Document {
    let engine = MutationEngine::new(catalog);
    let from = Node::with_id("from-1", "From").with("uri", "timer:foo");
    let route = Node::with_id("route-1", "Route");
    let doc = engine
        .add_step(&Document::new(), route.with("from", from), None, None, None)
        .unwrap();
    let log = Node::with_id("log-1", "Log").with("message", "hello");
    let doc = engine
        .add_step(&doc, log, Some("from-1"), None, None)
        .unwrap();
    let to = Node::with_id("to-1", "To").with("uri", "direct:a");
    engine.add_step(&doc, to, Some("from-1"), None, None).unwrap()
}

/// Ids of every node, sorted, for identity comparisons.
#[allow(dead_code)]
pub fn sorted_ids(doc: &Document) -> Vec<String> {
    let mut ids: Vec<String> = doc.all_ids().iter().map(|id| id.to_string()).collect();
    ids.sort();
    ids
}
