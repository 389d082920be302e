use crate::deployment::plan::{ActionResult, DeploymentPlan, DeploymentStep, action_results};
use crate::deployment::{DeploymentKind, DeploymentOutcome, DeploymentRequest, MatchPolicy};
use crate::error::{Error, Result};
use crate::management::{ManagementClient, Outcome, operations};
use regex::Regex;
use std::sync::Arc;

/// Builds and executes deployment plans against one management client.
///
/// The planner works in two phases. [`plan`](Self::plan) queries the
/// deployments currently on the server and translates a
/// [`DeploymentRequest`] into the exact steps to submit;
/// [`execute`](Self::execute) runs the plan as one composite operation and
/// interprets the per step results. The phases are public separately so
/// callers can inspect a plan without running it.
pub struct DeploymentPlanner {
    client: Arc<dyn ManagementClient>,
}

impl DeploymentPlanner {
    /// Creates a planner submitting through the given client.
    pub fn new(client: Arc<dyn ManagementClient>) -> Self {
        Self { client }
    }

    /// Plans and executes a deployment request.
    ///
    /// An empty plan (an undeploy with nothing matched) is reported as
    /// success without touching the server.
    #[tracing::instrument(skip(self, request), fields(kind = %request.kind, name = %request.deployment_name()))]
    pub async fn execute(&self, request: &DeploymentRequest) -> Result<DeploymentOutcome> {
        let plan = self.plan(request).await?;
        if plan.is_empty() {
            tracing::debug!("Nothing to do, empty plan");
            return Ok(DeploymentOutcome::Success);
        }

        tracing::debug!(plan_id = %plan.id(), steps = plan.steps().len(), "Executing deployment plan");
        let outcome = self
            .client
            .execute(plan.to_operation())
            .await
            .map_err(|e| Error::DeploymentExecutionFailed(format!("Error executing {}: {}", request.kind, e)))?;

        evaluate(&plan, &outcome)
    }

    /// Translates a request into a deployment plan without executing it.
    pub async fn plan(&self, request: &DeploymentRequest) -> Result<DeploymentPlan> {
        if !request.content.exists() {
            return Err(Error::DeploymentFailed(format!(
                "Unable to {}: content '{}' does not exist",
                request.kind,
                request.content.display()
            )));
        }

        let name = request.deployment_name();
        let existing = self
            .existing_deployments(&name, request.match_pattern.as_deref())
            .await?;
        tracing::debug!(existing = ?existing, "Queried existing deployments");

        let read_content = || -> Result<Vec<u8>> {
            std::fs::read(&request.content).map_err(|e| {
                Error::DeploymentFailed(format!(
                    "Failed to read content '{}': {}",
                    request.content.display(),
                    e
                ))
            })
        };

        let steps = match request.kind {
            DeploymentKind::Deploy => vec![
                DeploymentStep::Add {
                    name: name.clone(),
                    content: read_content()?,
                },
                DeploymentStep::Deploy { name },
            ],
            DeploymentKind::Redeploy => vec![
                DeploymentStep::FullReplace {
                    name: name.clone(),
                    content: read_content()?,
                },
                DeploymentStep::Redeploy { name },
            ],
            DeploymentKind::ForceDeploy => {
                if existing.contains(&name) {
                    vec![
                        DeploymentStep::FullReplace {
                            name: name.clone(),
                            content: read_content()?,
                        },
                        DeploymentStep::Redeploy { name },
                    ]
                } else {
                    vec![
                        DeploymentStep::Add {
                            name: name.clone(),
                            content: read_content()?,
                        },
                        DeploymentStep::Deploy { name },
                    ]
                }
            }
            DeploymentKind::Undeploy | DeploymentKind::UndeployIgnoreMissing => {
                validate_matches(request, &existing)?;
                undeploy_and_remove(&existing, request.match_policy)
            }
        };

        Ok(DeploymentPlan::new(steps))
    }

    /// Names of deployments on the server matching the request.
    ///
    /// With a pattern, a deployment matches when the pattern covers its
    /// whole name; without one, only the exact name matches. The result is
    /// sorted for deterministic plans.
    async fn existing_deployments(
        &self,
        exact_name: &str,
        pattern: Option<&str>,
    ) -> Result<Vec<String>> {
        let outcome = self
            .client
            .execute(operations::read_children_names(operations::DEPLOYMENT))
            .await?;
        if !outcome.is_success() {
            return Err(Error::OperationFailed(outcome.failure_message()));
        }

        let names = outcome.result_strings();
        let mut matched = match pattern {
            Some(pattern) => {
                let regex = Regex::new(&format!("\\A(?:{})\\z", pattern))
                    .map_err(|e| Error::InvalidPattern(e.to_string()))?;
                names
                    .into_iter()
                    .filter(|name| regex.is_match(name))
                    .collect::<Vec<_>>()
            }
            None => names
                .into_iter()
                .filter(|name| name == exact_name)
                .collect(),
        };
        matched.sort();
        Ok(matched)
    }
}

/// Applies the match policy to the set of matched deployments.
///
/// Only meaningful when a pattern is set; exact name requests select at
/// most one deployment anyway.
fn validate_matches(request: &DeploymentRequest, existing: &[String]) -> Result<()> {
    let Some(pattern) = &request.match_pattern else {
        return Ok(());
    };
    if request.match_policy == MatchPolicy::Fail && existing.len() > 1 {
        return Err(Error::DeploymentFailed(format!(
            "Found {} deployed artifacts for pattern '{}' ({})",
            existing.len(),
            pattern,
            existing.join(", ")
        )));
    }
    Ok(())
}

/// One undeploy+remove pair per matched name, truncated under `First`.
fn undeploy_and_remove(existing: &[String], policy: MatchPolicy) -> Vec<DeploymentStep> {
    let mut steps = Vec::new();
    for name in existing {
        steps.push(DeploymentStep::Undeploy { name: name.clone() });
        steps.push(DeploymentStep::Remove { name: name.clone() });
        if policy == MatchPolicy::First {
            break;
        }
    }
    steps
}

/// Interprets an executed plan's outcome.
///
/// Any step that failed, was rolled back or never ran aborts the call with
/// the server reported cause. A step needing a reload or restart downgrades
/// the overall outcome without failing it.
fn evaluate(plan: &DeploymentPlan, outcome: &Outcome) -> Result<DeploymentOutcome> {
    let results = action_results(outcome, plan.steps().len());
    let mut requires_restart = matches!(
        outcome.process_state(),
        Some("reload-required") | Some("restart-required")
    );

    for (step, result) in plan.steps().iter().zip(&results) {
        match result {
            ActionResult::Executed => {}
            ActionResult::RequiresRestart => requires_restart = true,
            ActionResult::Failed(cause) => {
                return Err(Error::DeploymentExecutionFailed(format!(
                    "Step '{}' failed: {}",
                    step.describe(),
                    cause
                )));
            }
            ActionResult::NotExecuted => {
                return Err(Error::DeploymentExecutionFailed(with_cause(
                    format!("Step '{}' was not executed", step.describe()),
                    outcome,
                )));
            }
            ActionResult::RolledBack => {
                return Err(Error::DeploymentExecutionFailed(with_cause(
                    format!("Step '{}' was rolled back", step.describe()),
                    outcome,
                )));
            }
        }
    }

    if !outcome.is_success() {
        return Err(Error::DeploymentExecutionFailed(outcome.failure_message()));
    }

    Ok(if requires_restart {
        DeploymentOutcome::RequiresRestart
    } else {
        DeploymentOutcome::Success
    })
}

fn with_cause(message: String, outcome: &Outcome) -> String {
    if outcome.is_success() {
        message
    } else {
        format!("{}: {}", message, outcome.failure_message())
    }
}
