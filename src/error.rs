/// Error handling module for jboss-runner.
///
/// This module defines the error types used throughout the library.
/// It provides a comprehensive set of errors that can occur when
/// installing, supervising and deploying to application servers, along
/// with helpful context for debugging.
///
/// # Example
///
/// ```
/// use jboss_runner::error::{Error, Result};
///
/// fn handle_error(result: Result<()>) {
///     match result {
///         Ok(_) => println!("Operation succeeded"),
///         Err(Error::NotRunning) => println!("Server is not running"),
///         Err(Error::StartupTimeout(secs)) => println!("Server missed the {}s startup deadline", secs),
///         Err(e) => println!("Other error: {}", e),
///     }
/// }
/// ```
use thiserror::Error;

/// Errors that can occur in the jboss-runner library.
///
/// This enum represents all possible error types that can be returned from
/// operations in the library. Each variant includes context information to
/// help diagnose and handle the error appropriately.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur when parsing configuration files.
    ///
    /// This error occurs when:
    /// - The configuration file contains invalid JSON
    /// - The configuration file cannot be read
    /// - The configuration structure doesn't match the expected schema
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Represents errors related to invalid configuration values.
    ///
    /// This error occurs when:
    /// - A server entry declares a zero port or zero startup timeout
    /// - A hostname or version is present but blank
    /// - A JVM argument is present but blank
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Represents a server home directory that does not exist.
    ///
    /// This error occurs when:
    /// - A server is started before its distribution was installed
    /// - The configured path points at a file instead of a directory
    #[error("Server home '{}' is not a valid directory", .0.display())]
    HomeDirNotFound(std::path::PathBuf),

    /// Represents a missing `jboss-modules.jar` in the server home.
    ///
    /// This error occurs when:
    /// - The installed distribution is incomplete or damaged
    /// - The configured path points at a directory that is not a server home
    #[error("Cannot find: {}", .0.display())]
    ModulesJarNotFound(std::path::PathBuf),

    /// Represents an attempt to start a server that is already running.
    #[error("Server is already running")]
    AlreadyRunning,

    /// Represents an operation that needs a running server.
    ///
    /// This error occurs when:
    /// - A deployment is submitted while the server is stopped
    /// - A shutdown is requested with no server and no client attached
    #[error("Server is not running")]
    NotRunning,

    /// Represents a conflicting registration on the server controller.
    ///
    /// This error occurs when:
    /// - A second server is registered while one is already held
    /// - A client is attached while a server or client is already held
    #[error("Already connected: {0}")]
    AlreadyConnected(String),

    /// Represents a server process that died during startup.
    #[error("Server process exited during startup: {0}")]
    ProcessExited(String),

    /// Represents a server that did not become available in time.
    #[error("Managed server was not started within [{0}] s")]
    StartupTimeout(u64),

    /// Represents errors related to spawning or killing server processes.
    ///
    /// This error occurs when:
    /// - The java executable cannot be launched
    /// - The process output handles cannot be acquired
    #[error("Server process error: {0}")]
    Process(String),

    /// Represents transport errors talking to the management interface.
    ///
    /// This error occurs when:
    /// - The management endpoint cannot be reached
    /// - The response body is not a management outcome
    #[error("Management request error: {0}")]
    Management(String),

    /// Represents a management operation the server reported as failed.
    #[error("Management operation failed: {0}")]
    OperationFailed(String),

    /// Represents a deployment request that could not be turned into a plan.
    ///
    /// This error occurs when:
    /// - The deployment content does not exist on disk
    /// - A match pattern resolves to several deployments under the `Fail` policy
    #[error("Deployment failed: {0}")]
    DeploymentFailed(String),

    /// Represents a deployment plan that was executed but did not succeed.
    ///
    /// This error occurs when:
    /// - A plan step failed on the server
    /// - A plan step was rolled back or never executed
    #[error("Deployment execution failed: {0}")]
    DeploymentExecutionFailed(String),

    /// Represents an invalid deployment match pattern.
    #[error("Invalid match pattern: {0}")]
    InvalidPattern(String),

    /// Represents errors during distribution install.
    ///
    /// This error occurs when:
    /// - The resolved archive does not exist
    /// - The target directory cannot be prepared or populated
    #[error("Server installation failed: {0}")]
    Install(String),

    /// Represents any other error not covered by the specific variants.
    #[error("Other error: {0}")]
    Other(String),
}

/// Convenient Result type alias for jboss-runner operations.
///
/// This type alias simplifies function signatures throughout the library
/// by defaulting the error type to [`Error`].
///
/// # Example
///
/// ```
/// use jboss_runner::error::Result;
///
/// fn operation_that_may_fail() -> Result<String> {
///     Ok("Success".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;
