//! Type tags of the built-in descriptors.

pub const ROUTE: &str = "Route";
pub const REST: &str = "Rest";
pub const REST_CONFIGURATION: &str = "RestConfiguration";
pub const BEANS: &str = "Beans";
pub const BEAN: &str = "Bean";
pub const PROPERTY: &str = "Property";

pub const GET: &str = "Get";
pub const POST: &str = "Post";
pub const PUT: &str = "Put";
pub const DELETE: &str = "Delete";
pub const PATCH: &str = "Patch";
pub const HEAD: &str = "Head";
pub const REST_VERBS: &[&str] = &[GET, POST, PUT, DELETE, PATCH, HEAD];

pub const FROM: &str = "From";
pub const TO: &str = "To";
pub const TO_D: &str = "ToD";
pub const WIRE_TAP: &str = "WireTap";
pub const POLL: &str = "Poll";
pub const KAMELET: &str = "Kamelet";

pub const LOG: &str = "Log";
pub const SET_BODY: &str = "SetBody";
pub const SET_HEADER: &str = "SetHeader";
pub const SET_PROPERTY: &str = "SetProperty";
pub const REMOVE_HEADER: &str = "RemoveHeader";
pub const CONVERT_BODY_TO: &str = "ConvertBodyTo";
pub const DELAY: &str = "Delay";
pub const FILTER: &str = "Filter";
pub const CHOICE: &str = "Choice";
pub const WHEN: &str = "When";
pub const OTHERWISE: &str = "Otherwise";
pub const SPLIT: &str = "Split";
pub const MULTICAST: &str = "Multicast";
pub const PIPELINE: &str = "Pipeline";
pub const DO_TRY: &str = "DoTry";
pub const DO_CATCH: &str = "DoCatch";
pub const DO_FINALLY: &str = "DoFinally";
pub const AGGREGATE: &str = "Aggregate";
pub const PROCESS: &str = "Process";
pub const STOP: &str = "Stop";
