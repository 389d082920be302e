use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use jboss_runner::error::Result;
use jboss_runner::management::{HttpManagementClient, Outcome, operations};
use jboss_runner::server::ConnectionInfo;
use serde_json::json;

#[test]
fn test_root_operations() {
    let op = operations::operation(operations::SHUTDOWN);
    assert_eq!(op, json!({"operation": "shutdown", "address": []}));

    let op = operations::operation(operations::RELOAD);
    assert_eq!(op, json!({"operation": "reload", "address": []}));

    let op = operations::read_attribute(operations::SERVER_STATE);
    assert_eq!(
        op,
        json!({"operation": "read-attribute", "name": "server-state", "address": []})
    );

    let op = operations::read_children_names(operations::DEPLOYMENT);
    assert_eq!(
        op,
        json!({"operation": "read-children-names", "child-type": "deployment", "address": []})
    );
}

#[test]
fn test_deployment_operations() {
    let op = operations::add_deployment("app.war", b"content");
    assert_eq!(op["operation"], "add");
    assert_eq!(op["address"], json!([{"deployment": "app.war"}]));
    assert_eq!(op["content"][0]["bytes"], BASE64.encode(b"content"));

    // A full replace addresses the root and names the deployment instead
    let op = operations::full_replace_deployment("app.war", b"content");
    assert_eq!(op["operation"], "full-replace-deployment");
    assert_eq!(op["address"], json!([]));
    assert_eq!(op["name"], "app.war");
    assert_eq!(op["content"][0]["bytes"], BASE64.encode(b"content"));

    let op = operations::deploy("app.war");
    assert_eq!(
        op,
        json!({"operation": "deploy", "address": [{"deployment": "app.war"}]})
    );

    let op = operations::redeploy("app.war");
    assert_eq!(op["operation"], "redeploy");

    let op = operations::undeploy("app.war");
    assert_eq!(
        op,
        json!({"operation": "undeploy", "address": [{"deployment": "app.war"}]})
    );

    let op = operations::remove_deployment("app.war");
    assert_eq!(op["operation"], "remove");
    assert_eq!(op["address"], json!([{"deployment": "app.war"}]));
}

#[test]
fn test_composite_operation() {
    let steps = vec![
        operations::add_deployment("app.war", b"bytes"),
        operations::deploy("app.war"),
    ];

    let op = operations::composite(steps);

    assert_eq!(op["operation"], "composite");
    assert_eq!(op["address"], json!([]));
    assert_eq!(op["steps"].as_array().map(Vec::len), Some(2));
    assert_eq!(op["steps"][0]["operation"], "add");
    assert_eq!(op["steps"][1]["operation"], "deploy");
}

#[test]
fn test_outcome_success() {
    let outcome: Outcome =
        serde_json::from_str(r#"{"outcome": "success", "result": "running"}"#).unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.result_as_str(), Some("running"));
    assert_eq!(outcome.process_state(), None);
    assert_eq!(outcome.rolled_back, None);
}

#[test]
fn test_outcome_failure() {
    let outcome: Outcome = serde_json::from_str(
        r#"{"outcome": "failed", "failure-description": "JBAS014792: Unknown attribute", "rolled-back": true}"#,
    )
    .unwrap();

    assert!(!outcome.is_success());
    assert_eq!(outcome.failure_message(), "JBAS014792: Unknown attribute");
    assert_eq!(outcome.rolled_back, Some(true));

    // The server may answer without a description
    let outcome: Outcome = serde_json::from_str(r#"{"outcome": "failed"}"#).unwrap();
    assert_eq!(outcome.failure_message(), "unknown failure");
}

#[test]
fn test_outcome_name_listing() {
    let outcome: Outcome =
        serde_json::from_str(r#"{"outcome": "success", "result": ["app.war", "other.ear"]}"#)
            .unwrap();
    assert_eq!(outcome.result_strings(), vec!["app.war", "other.ear"]);

    let outcome: Outcome = serde_json::from_str(r#"{"outcome": "success"}"#).unwrap();
    assert!(outcome.result_strings().is_empty());
}

#[test]
fn test_outcome_process_state() {
    let outcome: Outcome = serde_json::from_str(
        r#"{"outcome": "success", "response-headers": {"process-state": "reload-required"}}"#,
    )
    .unwrap();

    assert_eq!(outcome.process_state(), Some("reload-required"));
}

#[tokio::test]
async fn test_client_endpoint() -> Result<()> {
    let client = HttpManagementClient::new(&ConnectionInfo::new("localhost", 9990))?;
    assert_eq!(client.endpoint(), "http://localhost:9990/management");

    let client = HttpManagementClient::new(&ConnectionInfo::new("192.168.1.10", 9999))?;
    assert_eq!(client.endpoint(), "http://192.168.1.10:9999/management");

    Ok(())
}
