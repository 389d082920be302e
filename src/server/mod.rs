/// Server supervision module for jboss-runner.
///
/// This module handles the lifecycle, console output and process management
/// of standalone application servers. It provides functionality to launch a
/// server, wait for it to become available, watch it while it runs and shut
/// it down again. All public components are instrumented with `tracing`
/// spans.
///
/// # Components
///
/// * `info` - Launch information value objects
/// * `process` - Process spawning and the launch command
/// * `console` - Console output drain and shutdown sentinel latch
/// * `supervisor` - The server lifecycle state machine
/// * `controller` - Single slot ownership of the current connection
///
/// # Examples
///
/// Supervising a server:
///
/// ```no_run
/// use jboss_runner::dialect::ServerDialect;
/// use jboss_runner::management::HttpManagementClient;
/// use jboss_runner::server::{ConnectionInfo, ServerInfo, ServerSupervisor};
/// use std::sync::Arc;
///
/// # async fn example() -> jboss_runner::error::Result<()> {
/// let connection = ConnectionInfo::new("localhost", 9990);
/// let client = Arc::new(HttpManagementClient::new(&connection)?);
///
/// let mut info = ServerInfo::new(connection, "target/wildfly-dist");
/// info.jvm_args = vec!["-Xmx512m".to_string()];
///
/// let server = ServerSupervisor::new(info, ServerDialect::wildfly8(), client);
/// server.start().await?;
/// server.stop().await?;
/// # Ok(())
/// # }
/// ```
///
/// Holding the connection in a controller:
///
/// ```no_run
/// use jboss_runner::management::{HttpManagementClient, ManagementClient};
/// use jboss_runner::server::{ConnectionInfo, ServerController};
/// use std::sync::Arc;
///
/// # async fn example() -> jboss_runner::error::Result<()> {
/// let controller = ServerController::new();
///
/// // Attach a client for a server somebody else runs
/// let client: Arc<dyn ManagementClient> =
///     Arc::new(HttpManagementClient::new(&ConnectionInfo::new("localhost", 9990))?);
/// controller.set_client(client).await?;
///
/// // And release it again
/// controller.close().await?;
/// # Ok(())
/// # }
/// ```
mod console;
mod controller;
mod info;
mod process;
mod supervisor;

pub use controller::ServerController;
pub use info::{ConnectionInfo, Credentials, OutputSink, ServerInfo};
pub use process::ServerStatus;
pub use supervisor::ServerSupervisor;
