//! Built-in descriptors for the integration DSL.
use super::descriptor::{Descriptor, NodeRole, PropertyKind, PropertyMeta};
use super::tags;

const BINDING_MODES: &[&str] = &["off", "auto", "json", "xml", "json_xml"];
const EXCHANGE_PATTERNS: &[&str] = &["InOnly", "InOut"];
const LOGGING_LEVELS: &[&str] = &["TRACE", "DEBUG", "INFO", "WARN", "ERROR", "OFF"];

fn text(name: &str) -> PropertyMeta {
    PropertyMeta::new(name, PropertyKind::String)
}

fn number(name: &str) -> PropertyMeta {
    PropertyMeta::new(name, PropertyKind::Number)
}

fn flag(name: &str) -> PropertyMeta {
    PropertyMeta::new(name, PropertyKind::Boolean)
}

fn choice(name: &str, values: &[&str]) -> PropertyMeta {
    PropertyMeta::new(name, PropertyKind::Enum).values(values)
}

fn expression(name: &str) -> PropertyMeta {
    PropertyMeta::new(name, PropertyKind::Expression)
}

fn parameters() -> PropertyMeta {
    PropertyMeta::new("parameters", PropertyKind::Parameters)
        .describe("Endpoint parameters, as declared by the component")
}

/// Properties every processor carries, appended after its own.
fn finish(descriptor: Descriptor) -> Descriptor {
    descriptor
        .with_property(text("description").describe("Sets the description of this node"))
        .with_property(
            flag("disabled")
                .advanced()
                .describe("Disables this step, e.g. while debugging a route"),
        )
}

fn endpoint(type_tag: &str, title: &str, description: &str) -> Descriptor {
    Descriptor::new(type_tag, NodeRole::Processor)
        .titled(title)
        .describe(description)
        .labelled(&["eip", "routing", "endpoint"])
        .shorthand("uri")
        .with_property(text("uri").required().describe("The endpoint URI to send to"))
        .with_property(parameters())
}

fn roots() -> Vec<Descriptor> {
    vec![
        Descriptor::new(tags::ROUTE, NodeRole::Root)
            .titled("Route")
            .describe("A route consuming from one endpoint and processing each message")
            .labelled(&["configuration", "routing"])
            .with_property(PropertyMeta::object("from", tags::FROM).required())
            .with_property(text("group").describe("The group this route belongs to"))
            .with_property(text("description"))
            .with_property(flag("autoStartup").advanced().default_value(true))
            .with_property(number("startupOrder").advanced())
            .with_property(text("routePolicy").advanced())
            .with_property(flag("streamCache").advanced())
            .with_property(flag("messageHistory").advanced())
            .with_property(flag("logMask").advanced())
            .with_property(text("nodePrefixId").advanced()),
        Descriptor::new(tags::REST, NodeRole::Root)
            .titled("REST")
            .describe("A REST service exposing HTTP verbs")
            .labelled(&["rest"])
            .with_property(text("path").describe("Base path of this REST service"))
            .with_property(text("description"))
            .with_property(text("consumes").advanced())
            .with_property(text("produces").advanced())
            .with_property(choice("bindingMode", BINDING_MODES).advanced())
            .with_property(text("tag").advanced())
            .with_property(flag("apiDocs").advanced().default_value(true))
            .with_properties(
                tags::REST_VERBS
                    .iter()
                    .map(|verb| PropertyMeta::list(&verb_slot(verb), verb)),
            ),
        Descriptor::new(tags::REST_CONFIGURATION, NodeRole::Root)
            .titled("REST Configuration")
            .describe("Global settings for every REST service in the document")
            .labelled(&["rest", "configuration"])
            .with_property(text("component").describe("The HTTP component serving requests"))
            .with_property(text("host"))
            .with_property(number("port"))
            .with_property(text("contextPath"))
            .with_property(text("apiContextPath"))
            .with_property(choice("bindingMode", BINDING_MODES).default_value("off"))
            .with_property(text("scheme").advanced())
            .with_property(flag("enableCORS").advanced())
            .with_property(
                choice(
                    "hostNameResolver",
                    &["allLocalIp", "localHostName", "localIp", "none"],
                )
                .advanced(),
            ),
        Descriptor::new(tags::BEANS, NodeRole::Root)
            .titled("Beans")
            .describe("The registry of named beans available to routes")
            .labelled(&["configuration"])
            .with_property(PropertyMeta::list("beans", tags::BEAN)),
    ]
}

fn registry() -> Vec<Descriptor> {
    vec![
        Descriptor::new(tags::BEAN, NodeRole::Bound)
            .titled("Bean")
            .describe("A named bean registered in the registry")
            .labelled(&["configuration"])
            .with_property(text("name").required())
            .with_property(text("type").required().describe("Fully qualified class name"))
            .with_property(text("initMethod").advanced())
            .with_property(text("destroyMethod").advanced())
            .with_property(text("factoryMethod").advanced())
            .with_property(PropertyMeta::list("properties", tags::PROPERTY)),
        Descriptor::new(tags::PROPERTY, NodeRole::Item)
            .titled("Property")
            .with_property(text("key").required())
            .with_property(text("value").required()),
    ]
}

fn rest_verbs() -> Vec<Descriptor> {
    tags::REST_VERBS
        .iter()
        .map(|verb| {
            Descriptor::new(verb, NodeRole::Bound)
                .titled(&verb.to_uppercase())
                .describe("An HTTP operation of a REST service")
                .labelled(&["rest"])
                .with_property(text("path"))
                .with_property(text("to").describe("The route endpoint handling this call"))
                .with_property(text("description"))
                .with_property(text("consumes").advanced())
                .with_property(text("produces").advanced())
                .with_property(choice("bindingMode", BINDING_MODES).advanced())
                .with_property(text("routeId").advanced())
                .with_property(flag("deprecated").advanced())
        })
        .collect()
}

fn endpoints() -> Vec<Descriptor> {
    vec![
        Descriptor::new(tags::FROM, NodeRole::Bound)
            .titled("From")
            .describe("The endpoint a route consumes from")
            .labelled(&["routing", "endpoint"])
            .with_property(text("uri").required().describe("The endpoint URI to consume from"))
            .with_property(parameters())
            .with_property(text("description"))
            .with_property(text("variableReceive").advanced())
            .with_property(PropertyMeta::steps()),
        finish(
            endpoint(tags::TO, "To", "Sends the message to an endpoint")
                .with_property(choice("pattern", EXCHANGE_PATTERNS).advanced())
                .with_property(text("variableSend").advanced())
                .with_property(text("variableReceive").advanced()),
        ),
        finish(
            endpoint(
                tags::TO_D,
                "To Dynamic",
                "Sends the message to an endpoint computed from the exchange",
            )
            .with_property(choice("pattern", EXCHANGE_PATTERNS).advanced())
            .with_property(number("cacheSize").advanced())
            .with_property(flag("ignoreInvalidEndpoint").advanced())
            .with_property(flag("allowOptimisedComponents").advanced().default_value(true)),
        ),
        finish(
            endpoint(
                tags::WIRE_TAP,
                "Wire Tap",
                "Sends a copy of the message to an endpoint without waiting",
            )
            .with_property(flag("copy").advanced().default_value(true))
            .with_property(flag("dynamicUri").advanced().default_value(true)),
        ),
        finish(
            endpoint(tags::POLL, "Poll", "Polls a message from an endpoint")
                .with_property(number("timeout").advanced()),
        ),
        finish(
            Descriptor::new(tags::KAMELET, NodeRole::Processor)
                .titled("Kamelet")
                .describe("Calls a kamelet as a step of this route")
                .labelled(&["eip", "routing", "endpoint"])
                .shorthand("name")
                .with_property(text("name").required().describe("Name of the kamelet"))
                .with_property(parameters()),
        ),
    ]
}

fn processors() -> Vec<Descriptor> {
    vec![
        finish(
            Descriptor::new(tags::LOG, NodeRole::Processor)
                .titled("Log")
                .describe("Logs a message")
                .labelled(&["eip", "routing"])
                .shorthand("message")
                .with_property(text("message").required())
                .with_property(choice("loggingLevel", LOGGING_LEVELS).default_value("INFO"))
                .with_property(text("logName").advanced())
                .with_property(text("marker").advanced())
                .with_property(text("logger").advanced()),
        ),
        finish(
            Descriptor::new(tags::SET_BODY, NodeRole::Processor)
                .titled("Set Body")
                .describe("Sets the message body")
                .labelled(&["eip", "transformation"])
                .with_property(expression("expression").required()),
        ),
        finish(
            Descriptor::new(tags::SET_HEADER, NodeRole::Processor)
                .titled("Set Header")
                .describe("Sets the value of a message header")
                .labelled(&["eip", "transformation"])
                .with_property(text("name").required())
                .with_property(expression("expression").required()),
        ),
        finish(
            Descriptor::new(tags::SET_PROPERTY, NodeRole::Processor)
                .titled("Set Property")
                .describe("Sets the value of an exchange property")
                .labelled(&["eip", "transformation"])
                .with_property(text("name").required())
                .with_property(expression("expression").required()),
        ),
        finish(
            Descriptor::new(tags::REMOVE_HEADER, NodeRole::Processor)
                .titled("Remove Header")
                .describe("Removes a message header")
                .labelled(&["eip", "transformation"])
                .shorthand("name")
                .with_property(text("name").required()),
        ),
        finish(
            Descriptor::new(tags::CONVERT_BODY_TO, NodeRole::Processor)
                .titled("Convert Body To")
                .describe("Converts the message body to another type")
                .labelled(&["eip", "transformation"])
                .shorthand("type")
                .with_property(text("type").required())
                .with_property(flag("mandatory").advanced().default_value(true))
                .with_property(text("charset").advanced()),
        ),
        finish(
            Descriptor::new(tags::DELAY, NodeRole::Processor)
                .titled("Delay")
                .describe("Delays processing for a computed number of milliseconds")
                .labelled(&["eip", "routing"])
                .with_property(expression("expression").required())
                .with_property(flag("asyncDelayed").advanced().default_value(true))
                .with_property(flag("callerRunsWhenRejected").advanced()),
        ),
        finish(
            Descriptor::new(tags::FILTER, NodeRole::Processor)
                .titled("Filter")
                .describe("Only lets matching messages through to its steps")
                .labelled(&["eip", "routing"])
                .with_property(expression("expression").required())
                .with_property(text("statusPropertyName").advanced())
                .with_property(PropertyMeta::steps()),
        ),
        finish(
            Descriptor::new(tags::CHOICE, NodeRole::Processor)
                .titled("Choice")
                .describe("Routes messages to the first matching branch")
                .labelled(&["eip", "routing"])
                .with_property(PropertyMeta::list("when", tags::WHEN))
                .with_property(PropertyMeta::object("otherwise", tags::OTHERWISE))
                .with_property(flag("precondition").advanced()),
        ),
        finish(
            Descriptor::new(tags::WHEN, NodeRole::Bound)
                .titled("When")
                .describe("A branch of a choice taken when its predicate matches")
                .labelled(&["eip", "routing"])
                .with_property(expression("expression").required())
                .with_property(PropertyMeta::steps()),
        ),
        finish(
            Descriptor::new(tags::OTHERWISE, NodeRole::Bound)
                .titled("Otherwise")
                .describe("The branch of a choice taken when nothing else matches")
                .labelled(&["eip", "routing"])
                .with_property(PropertyMeta::steps()),
        ),
        finish(
            Descriptor::new(tags::SPLIT, NodeRole::Processor)
                .titled("Split")
                .describe("Splits a message into pieces processed one by one")
                .labelled(&["eip", "routing"])
                .with_property(expression("expression").required())
                .with_property(text("delimiter").advanced().default_value(","))
                .with_property(text("aggregationStrategy").advanced())
                .with_property(flag("parallelProcessing").advanced())
                .with_property(flag("streaming").advanced())
                .with_property(flag("stopOnException").advanced())
                .with_property(number("timeout").advanced())
                .with_property(PropertyMeta::steps()),
        ),
        finish(
            Descriptor::new(tags::MULTICAST, NodeRole::Processor)
                .titled("Multicast")
                .describe("Sends the same message to each of its steps")
                .labelled(&["eip", "routing"])
                .with_property(text("aggregationStrategy").advanced())
                .with_property(flag("parallelProcessing").advanced())
                .with_property(flag("stopOnException").advanced())
                .with_property(number("timeout").advanced())
                .with_property(PropertyMeta::steps()),
        ),
        finish(
            Descriptor::new(tags::PIPELINE, NodeRole::Processor)
                .titled("Pipeline")
                .describe("Groups steps that run one after another")
                .labelled(&["eip", "routing"])
                .with_property(PropertyMeta::steps()),
        ),
        finish(
            Descriptor::new(tags::DO_TRY, NodeRole::Processor)
                .titled("Do Try")
                .describe("Runs its steps and handles errors with catch and finally blocks")
                .labelled(&["eip", "error"])
                .with_property(PropertyMeta::steps())
                .with_property(PropertyMeta::list("doCatch", tags::DO_CATCH))
                .with_property(PropertyMeta::object("doFinally", tags::DO_FINALLY)),
        ),
        finish(
            Descriptor::new(tags::DO_CATCH, NodeRole::Bound)
                .titled("Do Catch")
                .describe("Handles the listed exceptions")
                .labelled(&["eip", "error"])
                .with_property(text("exception").required().describe("Comma separated exception types"))
                .with_property(expression("onWhen").advanced())
                .with_property(PropertyMeta::steps()),
        ),
        finish(
            Descriptor::new(tags::DO_FINALLY, NodeRole::Bound)
                .titled("Do Finally")
                .describe("Steps that always run after a try block")
                .labelled(&["eip", "error"])
                .with_property(PropertyMeta::steps()),
        ),
        finish(
            Descriptor::new(tags::AGGREGATE, NodeRole::Processor)
                .titled("Aggregate")
                .describe("Combines correlated messages into one")
                .labelled(&["eip", "routing"])
                .with_property(expression("correlationExpression").required())
                .with_property(text("aggregationStrategy").required())
                .with_property(number("completionSize"))
                .with_property(number("completionTimeout").advanced())
                .with_property(number("completionInterval").advanced())
                .with_property(flag("eagerCheckCompletion").advanced())
                .with_property(PropertyMeta::steps()),
        ),
        finish(
            Descriptor::new(tags::PROCESS, NodeRole::Processor)
                .titled("Process")
                .describe("Calls a processor bean from the registry")
                .labelled(&["eip", "transformation"])
                .with_property(text("ref").required()),
        ),
        finish(
            Descriptor::new(tags::STOP, NodeRole::Processor)
                .titled("Stop")
                .describe("Stops routing the current message")
                .labelled(&["eip", "routing"]),
        ),
    ]
}

/// `Get` -> `get`
pub(crate) fn verb_slot(verb: &str) -> String {
    verb.to_lowercase()
}

/// Every built-in descriptor, in palette order.
pub(crate) fn default_descriptors() -> Vec<Descriptor> {
    let mut all = roots();
    all.extend(registry());
    all.extend(rest_verbs());
    all.extend(endpoints());
    all.extend(processors());
    all
}
