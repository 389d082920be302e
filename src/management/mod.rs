//! Management interface access.
//!
//! This module implements the client side of the server's management
//! protocol: typed operation builders, the [`Outcome`] answer shape, and an
//! HTTP client submitting operations to a running server.
//!
//! The [`ManagementClient`] trait is the seam the rest of the library works
//! against. Production code uses [`HttpManagementClient`]; tests substitute
//! a mock to script server answers.
//!
//! # Examples
//!
//! ```no_run
//! use jboss_runner::management::{HttpManagementClient, ManagementClient, operations};
//! use jboss_runner::server::ConnectionInfo;
//!
//! # async fn example() -> jboss_runner::error::Result<()> {
//! let client = HttpManagementClient::new(&ConnectionInfo::new("localhost", 9990))?;
//! let outcome = client.execute(operations::operation(operations::SHUTDOWN)).await?;
//! assert!(outcome.is_success());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod operations;
mod outcome;

pub use client::HttpManagementClient;
pub use outcome::Outcome;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Executes management operations against one server.
///
/// Implementations must be shareable across tasks; the supervisor, the
/// reaper and the deployment planner all hold the same client.
#[async_trait]
pub trait ManagementClient: Send + Sync {
    /// Executes a single operation and returns the parsed outcome.
    ///
    /// An `Err` means the operation never produced an outcome (unreachable
    /// endpoint, malformed answer). An operation the server rejected comes
    /// back as `Ok` with a failed [`Outcome`].
    async fn execute(&self, operation: Value) -> Result<Outcome>;
}
