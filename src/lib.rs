/*!
 # JBoss Runner

 A Rust library for installing, running and deploying to local JBoss AS7
 and WildFly application servers.

 ## Overview

 JBoss Runner provides functionality to:
 - Install a server distribution into a target directory
 - Start a standalone server process and wait until it is available
 - Watch a running server and reconcile state when it dies
 - Deploy, redeploy and undeploy applications, with pattern matching
   across multiple deployed artifacts
 - Shut a server down gracefully through its management interface

 ## Basic Usage

 ```no_run
 use jboss_runner::{ApplicationServerProvider, ServerDialect, Result};

 #[tokio::main]
 async fn main() -> Result<()> {
     // Create a provider from a config file
     let provider =
         ApplicationServerProvider::from_config_file("config.json", ServerDialect::wildfly8())?;

     // Start the server and wait for it to become available
     provider.start().await?;

     // Deploy an application
     provider.deploy("target/app.war").await?;

     // Shut the server down again
     provider.shutdown().await?;

     Ok(())
 }
 ```

 ## Features

 - **Server Supervision**: Launch, poll, watch and stop standalone servers
 - **Management Interface**: Typed operations over the HTTP management API
 - **Deployment Plans**: Atomic composite deployment operations with
   match patterns and policies
 - **Configuration**: Configure servers through JSON config files
 - **Error Handling**: Comprehensive error handling
 - **Async Support**: Full async/await support

 ## License

 Licensed under the MIT license.
*/

pub mod config;
pub mod deployment;
pub mod dialect;
pub mod error;
pub mod install;
pub mod management;
pub mod server;

pub use config::{Config, JBossConfiguration};
pub use deployment::{DeploymentKind, DeploymentOutcome, DeploymentRequest, MatchPolicy};
pub use dialect::ServerDialect;
pub use error::{Error, Result};
pub use management::{HttpManagementClient, ManagementClient};
pub use server::{
    ConnectionInfo, OutputSink, ServerController, ServerInfo, ServerStatus, ServerSupervisor,
};

use deployment::DeploymentPlanner;
use install::{ArchiveExtractor, DistributionResolver};
use management::operations;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configure, run and deploy to one application server
///
/// This struct is the main entry point of the library. It binds a
/// [`ServerDialect`] to a configuration entry and mediates all server
/// interaction through a [`ServerController`], so at most one server or
/// external connection is active per provider.
/// All public methods are instrumented with `tracing` spans.
pub struct ApplicationServerProvider {
    /// Server generation this provider drives
    dialect: ServerDialect,
    /// Configuration entry for this server
    configuration: JBossConfiguration,
    /// Single slot ownership of the running server or external client
    controller: ServerController,
    /// Destination for server console output
    output: OutputSink,
}

impl ApplicationServerProvider {
    /// Create a provider from a configuration file path
    ///
    /// The configuration entry is looked up under the dialect name
    /// (`"as7"`, `"wf8"`); a missing entry means all defaults.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(path, dialect), fields(config_path = ?path.as_ref(), dialect = %dialect.name()))]
    pub fn from_config_file(path: impl AsRef<Path>, dialect: ServerDialect) -> Result<Self> {
        tracing::info!("Loading configuration from file");
        let config = Config::from_file(path)?;
        Self::from_config(&config, dialect)
    }

    /// Create a provider from a configuration string
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(config, dialect), fields(dialect = %dialect.name()))]
    pub fn from_config_str(config: &str, dialect: ServerDialect) -> Result<Self> {
        tracing::info!("Loading configuration from string");
        let config = Config::parse_from_str(config)?;
        Self::from_config(&config, dialect)
    }

    /// Create a provider from a parsed configuration
    pub fn from_config(config: &Config, dialect: ServerDialect) -> Result<Self> {
        let configuration = config.server(dialect.name()).cloned().unwrap_or_default();
        Self::new(dialect, configuration)
    }

    /// Create a provider from a single configuration entry
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(configuration, dialect), fields(dialect = %dialect.name()))]
    pub fn new(dialect: ServerDialect, configuration: JBossConfiguration) -> Result<Self> {
        config::validator::validate_server_config(dialect.name(), &configuration)?;
        Ok(Self {
            dialect,
            configuration,
            controller: ServerController::new(),
            output: OutputSink::default(),
        })
    }

    /// Short name of the server generation, e.g. `"wf8"`
    pub fn name(&self) -> &str {
        self.dialect.name()
    }

    /// Human readable description of the server generation
    pub fn description(&self) -> &str {
        self.dialect.description()
    }

    /// The dialect this provider drives
    pub fn dialect(&self) -> &ServerDialect {
        &self.dialect
    }

    /// The configuration entry this provider was created with
    pub fn configuration(&self) -> &JBossConfiguration {
        &self.configuration
    }

    /// The controller holding the current server or client
    pub fn controller(&self) -> &ServerController {
        &self.controller
    }

    /// Redirect server console output, e.g. into a buffer
    pub fn set_output(&mut self, output: OutputSink) {
        self.output = output;
    }

    /// Whether a server distribution is present at the configured path
    pub fn is_installed(&self) -> bool {
        self.configuration.path(&self.dialect).exists()
    }

    /// Install the configured server distribution
    ///
    /// Resolves the distribution coordinate of the configuration through
    /// `resolver` and unpacks it into the configured path, replacing a
    /// previous install. Returns the server home directory.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self, resolver, extractor), fields(dialect = %self.dialect.name()))]
    pub async fn install(
        &self,
        resolver: &dyn DistributionResolver,
        extractor: &dyn ArchiveExtractor,
    ) -> Result<PathBuf> {
        let coordinate = self.configuration.distribution(&self.dialect);
        let target = self.configuration.path(&self.dialect);
        install::install_server(resolver, extractor, &coordinate, &target).await
    }

    /// Start the configured server and wait until it is available
    ///
    /// Fails with [`Error::AlreadyRunning`] when this provider already has
    /// a running server, and with [`Error::HomeDirNotFound`] when nothing
    /// is installed at the configured path.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(dialect = %self.dialect.name()))]
    pub async fn start(&self) -> Result<()> {
        if let Some(server) = self.controller.server().await {
            if server.is_running().await {
                return Err(Error::AlreadyRunning);
            }
            // Stale handle of a server that died or was stopped externally
            tracing::debug!("Discarding stale server registration");
            self.controller.shutdown_server().await?;
        }

        let home = self.configuration.path(&self.dialect);
        if !home.is_dir() {
            return Err(Error::HomeDirNotFound(home));
        }

        let info = self.server_info(home);
        let client = Arc::new(HttpManagementClient::new(&info.connection)?);
        let server = ServerSupervisor::new(info, self.dialect.clone(), client);

        server.start().await?;

        if let Err(e) = self.controller.set_server(server.clone()).await {
            // Lost a race against a concurrent start, do not orphan the process
            let _ = server.stop().await;
            return Err(e);
        }

        tracing::info!("Server started");
        Ok(())
    }

    /// Current lifecycle status of the owned server
    pub async fn status(&self) -> ServerStatus {
        match self.controller.server().await {
            Some(server) => server.status().await,
            None => ServerStatus::NotStarted,
        }
    }

    /// Whether the provider's server is currently available
    pub async fn is_running(&self) -> bool {
        match self.controller.server().await {
            Some(server) => server.is_running().await,
            None => false,
        }
    }

    /// Shut the server down
    ///
    /// Stops the owned server when this provider started one. Otherwise,
    /// with an external client attached, submits the shutdown operation
    /// through it and detaches it. Fails with [`Error::NotRunning`] when
    /// there is nothing to shut down.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(dialect = %self.dialect.name()))]
    pub async fn shutdown(&self) -> Result<()> {
        if self.controller.has_server().await {
            tracing::info!("Stopping the owned server");
            return self.controller.shutdown_server().await;
        }

        if let Some(client) = self.controller.client().await {
            tracing::info!("Shutting down the externally managed server");
            let result = client
                .execute(operations::operation(operations::SHUTDOWN))
                .await;
            self.controller.close_client().await;
            let outcome = result?;
            return if outcome.is_success() {
                Ok(())
            } else {
                Err(Error::OperationFailed(outcome.failure_message()))
            };
        }

        Err(Error::NotRunning)
    }

    /// Deploy an artifact, failing when its name is already taken
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self, content))]
    pub async fn deploy(&self, content: impl AsRef<Path>) -> Result<DeploymentOutcome> {
        self.process_deployment(&DeploymentRequest::new(
            content.as_ref(),
            DeploymentKind::Deploy,
        ))
        .await
    }

    /// Undeploy an artifact by its content file name
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self, content))]
    pub async fn undeploy(&self, content: impl AsRef<Path>) -> Result<DeploymentOutcome> {
        self.process_deployment(&DeploymentRequest::new(
            content.as_ref(),
            DeploymentKind::Undeploy,
        ))
        .await
    }

    /// Execute an arbitrary deployment request
    ///
    /// Requires a running server owned by this provider, or an attached
    /// external client.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self, request), fields(kind = %request.kind, name = %request.deployment_name()))]
    pub async fn process_deployment(
        &self,
        request: &DeploymentRequest,
    ) -> Result<DeploymentOutcome> {
        let client = match self.controller.server().await {
            Some(server) => {
                if !server.is_running().await {
                    return Err(Error::NotRunning);
                }
                server.client().await
            }
            None => self.controller.client().await,
        };
        let Some(client) = client else {
            return Err(Error::NotRunning);
        };

        let planner = DeploymentPlanner::new(client);
        planner.execute(request).await
    }

    /// Release everything the provider holds
    ///
    /// Stops an owned server first, then drops any external client, in
    /// that order.
    ///
    /// This method is instrumented with `tracing`.
    #[tracing::instrument(skip(self), fields(dialect = %self.dialect.name()))]
    pub async fn close(&self) -> Result<()> {
        self.controller.close().await
    }

    fn server_info(&self, home: PathBuf) -> ServerInfo {
        let configuration = &self.configuration;
        let mut connection = ConnectionInfo::new(
            configuration.hostname(),
            configuration.port(&self.dialect),
        );
        if let (Some(username), Some(password)) =
            (&configuration.username, &configuration.password)
        {
            connection = connection.with_credentials(username, password);
        }

        let mut info = ServerInfo::new(connection, home);
        info.java_home = configuration
            .java_home
            .clone()
            .or_else(|| std::env::var_os("JAVA_HOME").map(PathBuf::from));
        info.jvm_args = configuration.jvm_args.clone();
        info.server_config_file = configuration.server_config_file.clone();
        info.properties_file = configuration.properties_file.clone();
        info.startup_timeout = configuration.startup_timeout();
        info.output = self.output.clone();
        info
    }
}

impl std::fmt::Debug for ApplicationServerProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationServerProvider")
            .field("dialect", &self.dialect)
            .field("configuration", &self.configuration)
            .finish()
    }
}
