// src/server/process.rs
use crate::dialect::ServerDialect;
use crate::error::{Error, Result};
use crate::server::info::ServerInfo;
use async_process::{Child, ChildStderr, ChildStdout, Command, Stdio};

/// Status of a supervised server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    /// Server has never been started
    NotStarted,
    /// Server process is launched and not yet available
    Starting,
    /// Server answered a state probe and is available
    Running,
    /// Server is shutting down
    Stopping,
    /// Server has stopped
    Stopped,
}

impl ServerStatus {
    /// Whether moving from `self` to `next` is an expected lifecycle step.
    pub(crate) fn can_transition(self, next: ServerStatus) -> bool {
        use ServerStatus::*;
        matches!(
            (self, next),
            (NotStarted, Starting)
                | (NotStarted, Stopped)
                | (Starting, Running)
                | (Starting, Stopping)
                | (Starting, Stopped)
                | (Running, Stopping)
                | (Stopping, Stopped)
                | (Stopped, Starting)
        )
    }
}

/// A spawned standalone server process.
///
/// Owns the child process handle. Output pipes are taken once by the console
/// drain; the supervisor keeps the process itself for exit checks and the
/// final kill. Dropping the handle kills a process that is still attached.
pub struct ServerProcess {
    /// Child process
    child: Option<Child>,
}

impl ServerProcess {
    /// Builds the launch command and spawns the server process.
    ///
    /// Fails without spawning when `jboss-modules.jar` is missing from the
    /// server home.
    pub(crate) fn spawn(info: &ServerInfo, dialect: &ServerDialect) -> Result<Self> {
        let command_line = launch_command(info, dialect)?;
        tracing::debug!(command = ?command_line, "Launching server process");

        let mut command = Command::new(&command_line[0]);
        command.args(&command_line[1..]);

        // Configure stdio
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Start the process
        let child = command
            .spawn()
            .map_err(|e| Error::Process(format!("Failed to start process: {}", e)))?;

        Ok(Self { child: Some(child) })
    }

    /// Take both output pipes from the process
    pub(crate) fn take_output(&mut self) -> Result<(ChildStdout, ChildStderr)> {
        let child = self
            .child
            .as_mut()
            .ok_or_else(|| Error::Process("Server process is gone".to_string()))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            Error::Process("Failed to get stdout pipe from child process".to_string())
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            Error::Process("Failed to get stderr pipe from child process".to_string())
        })?;

        Ok((stdout, stderr))
    }

    /// Exit status of the process, if it has already terminated
    pub(crate) fn exit_status(&mut self) -> Option<std::process::ExitStatus> {
        match &mut self.child {
            Some(child) => child.try_status().ok().flatten(),
            None => None,
        }
    }

    /// Kill the process and wait for it to be reaped, best effort
    pub(crate) async fn kill_and_wait(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                // Killing an already dead process reports an error, nothing to do
                tracing::debug!(error = %e, "Kill reported an error");
            }
            let _ = child.status().await;
        }
    }
}

impl Drop for ServerProcess {
    fn drop(&mut self) {
        if let Some(child) = &mut self.child {
            let _ = child.kill();
        }
    }
}

/// Builds the full launch command for a standalone server.
///
/// The order is fixed: java executable, JVM arguments, boot log and logging
/// configuration flags, `-jar <modules-jar> -mp <modules-dir>` with the
/// standalone main module, the home directory flag, then the optional
/// management bind address, server configuration file and properties file,
/// and finally any dialect specific arguments.
pub(crate) fn launch_command(info: &ServerInfo, dialect: &ServerDialect) -> Result<Vec<String>> {
    let modules_jar = info.modules_jar();
    if !modules_jar.is_file() {
        return Err(Error::ModulesJarNotFound(modules_jar));
    }

    let java = match &info.java_home {
        Some(java_home) => {
            let path = java_home.join("bin").join("java").display().to_string();
            // Paths with spaces keep their historical literal quoting
            if path.contains(' ') {
                format!("\"{}\"", path)
            } else {
                path
            }
        }
        None => "java".to_string(),
    };

    let home = &info.home_dir;
    let mut command = vec![java];
    command.extend(info.jvm_args.iter().cloned());
    command.push(format!(
        "-Dorg.jboss.boot.log.file={}/standalone/log/server.log",
        home.display()
    ));
    command.push(format!(
        "-Dlogging.configuration=file:{}/standalone/configuration/logging.properties",
        home.display()
    ));
    command.push("-jar".to_string());
    command.push(modules_jar.display().to_string());
    command.push("-mp".to_string());
    command.push(info.modules_dir().display().to_string());
    command.push("org.jboss.as.standalone".to_string());
    command.push(format!("-Djboss.home.dir={}", home.display()));

    if !info.connection.host.is_empty() {
        command.push(format!(
            "-Djboss.bind.address.management={}",
            info.connection.host
        ));
    }
    if let Some(config_file) = &info.server_config_file {
        command.push("-server-config".to_string());
        command.push(config_file.clone());
    }
    if let Some(properties_file) = &info.properties_file {
        command.push("-P".to_string());
        command.push(properties_file.display().to_string());
    }

    command.extend(dialect.extra_launch_args(info.connection.port));

    Ok(command)
}
