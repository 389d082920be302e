//! Builders for management operation requests.
//!
//! Management operations are JSON objects with an `operation` name, an
//! `address` path into the server's resource tree, and operation specific
//! attributes. The builders here produce the handful of shapes the library
//! submits; nothing in this module talks to a server.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};

/// Attribute holding the lifecycle state of a standalone server.
pub const SERVER_STATE: &str = "server-state";

/// Operation name for a graceful server shutdown.
pub const SHUTDOWN: &str = "shutdown";

/// Operation name for a server reload, applying pending configuration.
pub const RELOAD: &str = "reload";

/// Child type under which deployments live in the resource tree.
pub const DEPLOYMENT: &str = "deployment";

/// Builds a root operation without attributes, e.g. `shutdown`.
pub fn operation(name: &str) -> Value {
    json!({
        "operation": name,
        "address": []
    })
}

/// Builds a `read-attribute` of the server root.
pub fn read_attribute(name: &str) -> Value {
    json!({
        "operation": "read-attribute",
        "name": name,
        "address": []
    })
}

/// Builds a `read-children-names` listing of the server root.
pub fn read_children_names(child_type: &str) -> Value {
    json!({
        "operation": "read-children-names",
        "child-type": child_type,
        "address": []
    })
}

/// Builds a `composite` operation over the given steps.
///
/// The server executes the steps as one atomic unit and reports a
/// `step-N` node for each.
pub fn composite(steps: Vec<Value>) -> Value {
    json!({
        "operation": "composite",
        "address": [],
        "steps": steps
    })
}

/// Builds an `add` registering deployment content under `name`.
///
/// The content bytes travel inline, base64 encoded.
pub fn add_deployment(name: &str, content: &[u8]) -> Value {
    json!({
        "operation": "add",
        "address": [{"deployment": name}],
        "content": [{"bytes": BASE64.encode(content)}]
    })
}

/// Builds a `full-replace-deployment` swapping the content under `name`.
pub fn full_replace_deployment(name: &str, content: &[u8]) -> Value {
    json!({
        "operation": "full-replace-deployment",
        "address": [],
        "name": name,
        "content": [{"bytes": BASE64.encode(content)}]
    })
}

/// Builds a `deploy` starting the named deployment.
pub fn deploy(name: &str) -> Value {
    deployment_operation("deploy", name)
}

/// Builds a `redeploy` restarting the named deployment.
pub fn redeploy(name: &str) -> Value {
    deployment_operation("redeploy", name)
}

/// Builds an `undeploy` stopping the named deployment.
pub fn undeploy(name: &str) -> Value {
    deployment_operation("undeploy", name)
}

/// Builds a `remove` dropping the named deployment's content.
pub fn remove_deployment(name: &str) -> Value {
    deployment_operation("remove", name)
}

fn deployment_operation(operation: &str, name: &str) -> Value {
    json!({
        "operation": operation,
        "address": [{"deployment": name}]
    })
}
