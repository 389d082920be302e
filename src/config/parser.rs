use crate::dialect::ServerDialect;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a single application server instance.
///
/// Every field is optional. Anything left out falls back to the default of
/// the [`ServerDialect`] the entry is used with, so an empty object is a
/// valid configuration.
///
/// # Examples
///
/// Basic server configuration:
///
/// ```
/// use jboss_runner::config::JBossConfiguration;
///
/// let server_config = JBossConfiguration {
///     port: Some(10090),
///     jvm_args: vec!["-Xmx512m".to_string()],
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JBossConfiguration {
    /// Server version to install and run, e.g. `"8.1.0.Final"`.
    pub version: Option<String>,

    /// Management port the server listens on.
    pub port: Option<u16>,

    /// Hostname of the management interface.
    pub hostname: Option<String>,

    /// Seconds the server may take to become available after launch.
    pub startup_timeout: Option<u64>,

    /// Directory the server distribution is installed into.
    pub path: Option<PathBuf>,

    /// Distribution coordinate, e.g. `"org.wildfly:wildfly-dist:zip:8.1.0.Final"`.
    /// Derived from the dialect and version when left out.
    pub distribution: Option<String>,

    /// Java installation used to launch the server.
    /// Falls back to the `JAVA_HOME` environment variable, then to `java`
    /// on the `PATH`.
    pub java_home: Option<PathBuf>,

    /// JVM arguments placed in front of the server arguments.
    pub jvm_args: Vec<String>,

    /// Server configuration file passed via `-server-config`.
    pub server_config_file: Option<String>,

    /// Properties file passed via `-P`.
    pub properties_file: Option<PathBuf>,

    /// Management user name, for servers with a secured interface.
    pub username: Option<String>,

    /// Management password.
    pub password: Option<String>,
}

impl JBossConfiguration {
    /// Hostname used when none is configured.
    pub const DEFAULT_HOSTNAME: &'static str = "localhost";

    /// Startup timeout in seconds used when none is configured.
    pub const DEFAULT_STARTUP_TIMEOUT: u64 = 90;

    /// The configured version, or the dialect default.
    pub fn version(&self, dialect: &ServerDialect) -> String {
        self.version
            .clone()
            .unwrap_or_else(|| dialect.default_version().to_string())
    }

    /// The configured management port, or the dialect default.
    pub fn port(&self, dialect: &ServerDialect) -> u16 {
        self.port.unwrap_or_else(|| dialect.default_port())
    }

    /// The configured hostname, or [`Self::DEFAULT_HOSTNAME`].
    pub fn hostname(&self) -> &str {
        self.hostname.as_deref().unwrap_or(Self::DEFAULT_HOSTNAME)
    }

    /// The configured startup timeout, or [`Self::DEFAULT_STARTUP_TIMEOUT`].
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout.unwrap_or(Self::DEFAULT_STARTUP_TIMEOUT))
    }

    /// The configured install directory, or the dialect default.
    pub fn path(&self, dialect: &ServerDialect) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(dialect.default_path()))
    }

    /// The configured distribution coordinate, or the one derived from the
    /// dialect and the resolved version.
    pub fn distribution(&self, dialect: &ServerDialect) -> String {
        self.distribution
            .clone()
            .unwrap_or_else(|| dialect.distribution(&self.version(dialect)))
    }
}

/// Main configuration for the runner.
///
/// This structure holds configurations for multiple application servers.
/// Each server has a unique name and its own configuration; by convention
/// the name is the dialect name (`"as7"`, `"wf8"`), but any key works.
///
/// # JSON Schema
///
/// The configuration follows this JSON schema:
///
/// ```json
/// {
///   "servers": {
///     "wf8": {
///       "version": "8.1.0.Final",
///       "port": 10090,
///       "jvmArgs": ["-Xmx512m"]
///     },
///     "as7": {
///       "path": "target/as7-dist",
///       "startupTimeout": 120
///     }
///   }
/// }
/// ```
///
/// # Examples
///
/// Loading a configuration from a file:
///
/// ```no_run
/// use jboss_runner::config::Config;
///
/// let config = Config::from_file("config.json").unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Map of server names to their configurations.
    /// The key is a unique identifier for each server.
    #[serde(rename = "servers")]
    pub servers: HashMap<String, JBossConfiguration>,
}

impl Config {
    /// Loads a configuration from a file path.
    ///
    /// This method reads the file at the specified path and parses its contents
    /// as a JSON configuration.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the configuration file
    ///
    /// # Returns
    ///
    /// A `Result<Config>` that contains the parsed configuration or an error
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The file cannot be read
    /// * The file contents are not valid JSON
    /// * The JSON does not conform to the expected schema
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigParse(format!("Failed to read config file: {}", e)))?;

        Self::parse_from_str(&content)
    }

    /// Parses a configuration from a JSON string.
    ///
    /// # Arguments
    ///
    /// * `content` - A string containing JSON configuration
    ///
    /// # Returns
    ///
    /// A `Result<Config>` that contains the parsed configuration or an error
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The string is not valid JSON
    /// * The JSON does not conform to the expected schema
    pub fn parse_from_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::ConfigParse(format!("Failed to parse JSON config: {}", e)))
    }

    /// Returns the configuration entry with the given name, if present.
    pub fn server(&self, name: &str) -> Option<&JBossConfiguration> {
        self.servers.get(name)
    }
}
