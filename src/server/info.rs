use crate::config::JBossConfiguration;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Credentials for a secured management interface.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Management user name.
    pub username: String,
    /// Management password.
    pub password: String,
}

/// Address of a server's management interface.
///
/// # Examples
///
/// ```
/// use jboss_runner::server::ConnectionInfo;
///
/// let connection = ConnectionInfo::new("localhost", 9990)
///     .with_credentials("admin", "secret");
/// assert_eq!(connection.port, 9990);
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Hostname the management interface is bound to.
    pub host: String,
    /// Management port.
    pub port: u16,
    /// Credentials, for servers with a secured interface.
    pub credentials: Option<Credentials>,
}

impl ConnectionInfo {
    /// Creates a connection address without credentials.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            credentials: None,
        }
    }

    /// Attaches credentials to the connection address.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }
}

/// Destination for console output of a supervised server.
///
/// The sink is a cheap clone over a shared writer, so the console drain task
/// and the owner of the sink write to the same destination. Write failures
/// are swallowed; losing a console line must never take the supervisor down.
///
/// # Examples
///
/// ```
/// use jboss_runner::server::OutputSink;
///
/// // Forward console output to standard out
/// let sink = OutputSink::stdout();
///
/// // Or capture it in a buffer
/// let sink = OutputSink::from_writer(Vec::new());
/// ```
#[derive(Clone)]
pub struct OutputSink {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl OutputSink {
    /// Creates a sink that forwards to standard out.
    pub fn stdout() -> Self {
        Self::from_writer(std::io::stdout())
    }

    /// Creates a sink over an arbitrary writer.
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Writes one console line, best effort.
    pub(crate) fn write_line(&self, line: &str) {
        if let Ok(mut writer) = self.inner.lock() {
            let _ = writeln!(writer, "{}", line);
        }
    }

    /// Flushes the underlying writer, best effort.
    pub(crate) fn flush(&self) {
        if let Ok(mut writer) = self.inner.lock() {
            let _ = writer.flush();
        }
    }
}

impl Default for OutputSink {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OutputSink")
    }
}

/// Everything needed to launch and supervise one standalone server.
///
/// Collects the launch inputs (home directory, JVM settings, configuration
/// files) together with the management [`ConnectionInfo`] and the console
/// [`OutputSink`]. Values are plain fields; [`ServerInfo::new`] fills in the
/// defaults.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    /// Address of the management interface.
    pub connection: ConnectionInfo,
    /// Server home directory (the unpacked distribution).
    pub home_dir: PathBuf,
    /// Module repository, `<home>/modules` when unset.
    pub modules_dir: Option<PathBuf>,
    /// Java installation used to launch the server, `java` on the `PATH`
    /// when unset.
    pub java_home: Option<PathBuf>,
    /// JVM arguments placed in front of the server arguments.
    pub jvm_args: Vec<String>,
    /// Server configuration file passed via `-server-config`.
    pub server_config_file: Option<String>,
    /// Properties file passed via `-P`.
    pub properties_file: Option<PathBuf>,
    /// How long the server may take to become available after launch.
    pub startup_timeout: Duration,
    /// Destination for console output.
    pub output: OutputSink,
}

impl ServerInfo {
    /// Creates launch information with default settings.
    pub fn new(connection: ConnectionInfo, home_dir: impl Into<PathBuf>) -> Self {
        Self {
            connection,
            home_dir: home_dir.into(),
            modules_dir: None,
            java_home: None,
            jvm_args: Vec::new(),
            server_config_file: None,
            properties_file: None,
            startup_timeout: Duration::from_secs(JBossConfiguration::DEFAULT_STARTUP_TIMEOUT),
            output: OutputSink::default(),
        }
    }

    /// The module repository directory, defaulting to `<home>/modules`.
    pub fn modules_dir(&self) -> PathBuf {
        self.modules_dir
            .clone()
            .unwrap_or_else(|| self.home_dir.join("modules"))
    }

    /// The `jboss-modules.jar` inside the server home.
    pub fn modules_jar(&self) -> PathBuf {
        self.home_dir.join("jboss-modules.jar")
    }
}
