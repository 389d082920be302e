//! Deployment planning and execution.
//!
//! A [`DeploymentRequest`] describes what should happen to one artifact:
//! deploy it, replace it, or take it off the server. The
//! [`DeploymentPlanner`] turns a request into a [`DeploymentPlan`] of
//! management operations, submits the plan as one composite unit and
//! interprets the per step results.
//!
//! Undeploy requests can address deployments by a regular expression
//! instead of an exact name; the [`MatchPolicy`] decides what happens when
//! the pattern matches more than one deployment.
//!
//! # Examples
//!
//! ```no_run
//! use jboss_runner::deployment::{DeploymentKind, DeploymentPlanner, DeploymentRequest};
//! use jboss_runner::management::{HttpManagementClient, ManagementClient};
//! use jboss_runner::server::ConnectionInfo;
//! use std::sync::Arc;
//!
//! # async fn example() -> jboss_runner::error::Result<()> {
//! let client: Arc<dyn ManagementClient> =
//!     Arc::new(HttpManagementClient::new(&ConnectionInfo::new("localhost", 9990))?);
//!
//! let planner = DeploymentPlanner::new(client);
//! let request = DeploymentRequest::new("target/app.war", DeploymentKind::ForceDeploy);
//! planner.execute(&request).await?;
//! # Ok(())
//! # }
//! ```

mod plan;
mod planner;

pub use plan::{ActionResult, DeploymentPlan, DeploymentStep};
pub use planner::DeploymentPlanner;

use std::fmt;
use std::path::PathBuf;

/// What should happen to a deployment artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentKind {
    /// Register and start new content. Fails when the name is taken.
    Deploy,
    /// Deploy, replacing existing content of the same name if present.
    ForceDeploy,
    /// Replace existing content of the same name.
    Redeploy,
    /// Stop and remove a deployment. Fails when nothing matches.
    Undeploy,
    /// Stop and remove a deployment, succeeding quietly when nothing
    /// matches.
    UndeployIgnoreMissing,
}

impl fmt::Display for DeploymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeploymentKind::Deploy => "deploy",
            DeploymentKind::ForceDeploy => "force deploy",
            DeploymentKind::Redeploy => "redeploy",
            DeploymentKind::Undeploy => "undeploy",
            DeploymentKind::UndeployIgnoreMissing => "undeploy ignore missing",
        };
        f.write_str(name)
    }
}

/// What to do when an undeploy pattern matches several deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Undeploy only the first match, in lexical order.
    First,
    /// Undeploy every match.
    All,
    /// Refuse to build a plan.
    #[default]
    Fail,
}

/// Result of a successfully executed deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentOutcome {
    /// The server applied everything.
    Success,
    /// The server applied everything but needs a reload or restart before
    /// the change is fully effective.
    RequiresRestart,
}

/// One deployment request.
///
/// # Examples
///
/// ```
/// use jboss_runner::deployment::{DeploymentKind, DeploymentRequest, MatchPolicy};
///
/// // Undeploy every artifact matching a pattern
/// let request = DeploymentRequest::new("target/app.war", DeploymentKind::Undeploy)
///     .with_match_pattern("app-.*\\.war")
///     .with_match_policy(MatchPolicy::All);
///
/// assert_eq!(request.deployment_name(), "app.war");
/// ```
#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    /// Path to the deployment content on disk.
    pub content: PathBuf,
    /// Runtime name of the deployment. The content file name when unset.
    pub name: Option<String>,
    /// The action to perform.
    pub kind: DeploymentKind,
    /// Regular expression selecting existing deployments by full name.
    /// Only consulted by the undeploy kinds.
    pub match_pattern: Option<String>,
    /// Policy applied when the pattern matches several deployments.
    pub match_policy: MatchPolicy,
}

impl DeploymentRequest {
    /// Creates a request with default name and match settings.
    pub fn new(content: impl Into<PathBuf>, kind: DeploymentKind) -> Self {
        Self {
            content: content.into(),
            name: None,
            kind,
            match_pattern: None,
            match_policy: MatchPolicy::default(),
        }
    }

    /// Overrides the runtime name of the deployment.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Selects existing deployments by pattern instead of exact name.
    pub fn with_match_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.match_pattern = Some(pattern.into());
        self
    }

    /// Sets the policy for multiple pattern matches.
    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }

    /// The runtime name: the explicit name, or the content file name.
    pub fn deployment_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self
                .content
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}
