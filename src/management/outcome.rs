use serde::Deserialize;
use serde_json::Value;

/// Parsed result of a management operation.
///
/// The management interface answers every operation with a JSON object
/// carrying an `outcome` marker plus optional payload:
///
/// ```json
/// {"outcome": "success", "result": "running"}
/// ```
///
/// ```json
/// {"outcome": "failed", "failure-description": "JBAS014792: Unknown attribute", "rolled-back": true}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Outcome {
    /// `"success"` or `"failed"`.
    pub outcome: String,

    /// Operation payload, shape depends on the operation.
    #[serde(default)]
    pub result: Option<Value>,

    /// Explanation the server gives for a failed operation.
    #[serde(rename = "failure-description", default)]
    pub failure_description: Option<Value>,

    /// Out of band headers, e.g. the `process-state` marker.
    #[serde(rename = "response-headers", default)]
    pub response_headers: Option<Value>,

    /// Whether the server rolled the operation back.
    #[serde(rename = "rolled-back", default)]
    pub rolled_back: Option<bool>,
}

impl Outcome {
    /// Builds a successful outcome carrying `result`.
    pub fn success(result: Value) -> Self {
        Self {
            outcome: "success".to_string(),
            result: Some(result),
            failure_description: None,
            response_headers: None,
            rolled_back: None,
        }
    }

    /// Builds a failed outcome carrying a failure description.
    pub fn failed(description: impl Into<String>) -> Self {
        Self {
            outcome: "failed".to_string(),
            result: None,
            failure_description: Some(Value::String(description.into())),
            response_headers: None,
            rolled_back: None,
        }
    }

    /// Whether the server reported success.
    pub fn is_success(&self) -> bool {
        self.outcome == "success"
    }

    /// The result as a string, for attribute reads.
    pub fn result_as_str(&self) -> Option<&str> {
        self.result.as_ref().and_then(Value::as_str)
    }

    /// The result as a list of strings, for name listings.
    ///
    /// Non-string entries are skipped; a missing or non-array result yields
    /// an empty list.
    pub fn result_strings(&self) -> Vec<String> {
        match self.result.as_ref().and_then(Value::as_array) {
            Some(entries) => entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Human readable failure description.
    pub fn failure_message(&self) -> String {
        match &self.failure_description {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => "unknown failure".to_string(),
        }
    }

    /// The `process-state` response header, when the server sent one.
    ///
    /// A server that needs a reload or restart to finish applying an
    /// operation reports `"reload-required"` or `"restart-required"` here.
    pub fn process_state(&self) -> Option<&str> {
        self.response_headers
            .as_ref()
            .and_then(|headers| headers.get("process-state"))
            .and_then(Value::as_str)
    }
}
