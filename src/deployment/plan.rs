use crate::management::{Outcome, operations};
use serde_json::Value;
use uuid::Uuid;

/// One step of a deployment plan.
///
/// Each step maps to exactly one management operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentStep {
    /// Register new content under a name.
    Add { name: String, content: Vec<u8> },
    /// Swap the content registered under a name.
    FullReplace { name: String, content: Vec<u8> },
    /// Start the named deployment.
    Deploy { name: String },
    /// Restart the named deployment.
    Redeploy { name: String },
    /// Stop the named deployment.
    Undeploy { name: String },
    /// Drop the named deployment's content.
    Remove { name: String },
}

impl DeploymentStep {
    /// The deployment name the step addresses.
    pub fn name(&self) -> &str {
        match self {
            DeploymentStep::Add { name, .. }
            | DeploymentStep::FullReplace { name, .. }
            | DeploymentStep::Deploy { name }
            | DeploymentStep::Redeploy { name }
            | DeploymentStep::Undeploy { name }
            | DeploymentStep::Remove { name } => name,
        }
    }

    /// Short human readable form, e.g. `add app.war`.
    pub fn describe(&self) -> String {
        let verb = match self {
            DeploymentStep::Add { .. } => "add",
            DeploymentStep::FullReplace { .. } => "full-replace",
            DeploymentStep::Deploy { .. } => "deploy",
            DeploymentStep::Redeploy { .. } => "redeploy",
            DeploymentStep::Undeploy { .. } => "undeploy",
            DeploymentStep::Remove { .. } => "remove",
        };
        format!("{} {}", verb, self.name())
    }

    /// The management operation this step submits.
    pub(crate) fn to_operation(&self) -> Value {
        match self {
            DeploymentStep::Add { name, content } => operations::add_deployment(name, content),
            DeploymentStep::FullReplace { name, content } => {
                operations::full_replace_deployment(name, content)
            }
            DeploymentStep::Deploy { name } => operations::deploy(name),
            DeploymentStep::Redeploy { name } => operations::redeploy(name),
            DeploymentStep::Undeploy { name } => operations::undeploy(name),
            DeploymentStep::Remove { name } => operations::remove_deployment(name),
        }
    }
}

/// An ordered series of deployment steps submitted as one composite unit.
///
/// The server executes the steps atomically; either all of them apply or
/// the whole plan is rolled back.
#[derive(Debug, Clone)]
pub struct DeploymentPlan {
    id: Uuid,
    steps: Vec<DeploymentStep>,
}

impl DeploymentPlan {
    pub(crate) fn new(steps: Vec<DeploymentStep>) -> Self {
        Self {
            id: Uuid::new_v4(),
            steps,
        }
    }

    /// Unique identifier of the plan, for correlation in logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The steps in submission order.
    pub fn steps(&self) -> &[DeploymentStep] {
        &self.steps
    }

    /// Whether the plan contains no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The composite operation submitting all steps at once.
    pub(crate) fn to_operation(&self) -> Value {
        operations::composite(self.steps.iter().map(DeploymentStep::to_operation).collect())
    }
}

/// What happened to one step of an executed plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    /// The step was applied.
    Executed,
    /// The step was applied but needs a reload or restart to take effect.
    RequiresRestart,
    /// The step failed, with the server's failure description.
    Failed(String),
    /// The step never ran because an earlier step failed.
    NotExecuted,
    /// The step ran and was reverted when the plan failed.
    RolledBack,
}

/// Interprets the `step-N` nodes of a composite outcome.
///
/// Missing step nodes inherit the overall outcome: everything executed when
/// the composite succeeded, nothing executed when it failed.
pub(crate) fn action_results(outcome: &Outcome, steps: usize) -> Vec<ActionResult> {
    (1..=steps)
        .map(|index| {
            let node = outcome
                .result
                .as_ref()
                .and_then(|result| result.get(format!("step-{}", index)));
            match node {
                Some(node) => step_result(node, outcome.is_success()),
                None => {
                    if outcome.is_success() {
                        ActionResult::Executed
                    } else {
                        ActionResult::NotExecuted
                    }
                }
            }
        })
        .collect()
}

fn step_result(node: &Value, composite_succeeded: bool) -> ActionResult {
    if let Some(description) = node.get("failure-description") {
        let message = match description {
            Value::String(message) => message.clone(),
            other => other.to_string(),
        };
        return ActionResult::Failed(message);
    }
    if node
        .get("rolled-back")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        return ActionResult::RolledBack;
    }

    match node.get("outcome").and_then(Value::as_str) {
        Some("success") => {
            let process_state = node
                .get("response-headers")
                .and_then(|headers| headers.get("process-state"))
                .and_then(Value::as_str);
            match process_state {
                Some("reload-required") | Some("restart-required") => ActionResult::RequiresRestart,
                _ => ActionResult::Executed,
            }
        }
        Some(_) => ActionResult::NotExecuted,
        None => {
            if composite_succeeded {
                ActionResult::Executed
            } else {
                ActionResult::NotExecuted
            }
        }
    }
}
