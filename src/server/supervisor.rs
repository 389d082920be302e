use crate::dialect::ServerDialect;
use crate::error::{Error, Result};
use crate::management::{ManagementClient, operations};
use crate::server::console::{self, ShutdownLatch};
use crate::server::info::ServerInfo;
use crate::server::process::{ServerProcess, ServerStatus};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep, timeout};

/// Delay before the reaper's first liveness check.
const REAPER_INITIAL_DELAY: Duration = Duration::from_secs(20);
/// Delay between reaper liveness checks.
const REAPER_INTERVAL: Duration = Duration::from_secs(10);
/// First readiness poll interval during startup.
const INITIAL_POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Readiness poll interval floor after the first check.
const POLL_INTERVAL_FLOOR: Duration = Duration::from_millis(100);
/// How long a graceful stop waits for the shutdown sentinel.
const SENTINEL_WAIT: Duration = Duration::from_secs(5);
/// How long teardown waits for the console drain to finish.
const CONSOLE_JOIN_WAIT: Duration = Duration::from_secs(1);

/// `server-state` value while the server is still booting.
const STATE_STARTING: &str = "starting";
/// `server-state` value while the server is going down.
const STATE_STOPPING: &str = "stopping";

struct Inner {
    status: ServerStatus,
    process: Option<ServerProcess>,
    client: Option<Arc<dyn ManagementClient>>,
    latch: Option<Arc<ShutdownLatch>>,
    console_task: Option<JoinHandle<()>>,
    reaper_task: Option<JoinHandle<()>>,
}

/// Supervises one standalone server process.
///
/// The supervisor owns the whole lifecycle of a server: it spawns the
/// process, drains its console output, polls the management interface until
/// the server is available, watches it with a background reaper while it
/// runs, and tears everything down again on [`stop`](Self::stop).
///
/// The supervisor is a cheap clone; all clones share the same server. Both
/// [`start`](Self::start) and [`stop`](Self::stop) are safe to call from
/// concurrent tasks, and `stop` is idempotent.
///
/// # Examples
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
/// let info = ServerInfo::new(connection, "target/wildfly-dist");
///
/// let server = ServerSupervisor::new(info, ServerDialect::wildfly8(), client);
/// server.start().await?;
/// assert!(server.is_running().await);
/// server.stop().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ServerSupervisor {
    info: ServerInfo,
    dialect: ServerDialect,
    client: Arc<dyn ManagementClient>,
    inner: Arc<Mutex<Inner>>,
    running: Arc<AtomicBool>,
}

impl ServerSupervisor {
    /// Creates a supervisor for the given launch information.
    ///
    /// The client is used for readiness probes, liveness checks and the
    /// graceful shutdown operation. Nothing is spawned until
    /// [`start`](Self::start) is called.
    pub fn new(
        info: ServerInfo,
        dialect: ServerDialect,
        client: Arc<dyn ManagementClient>,
    ) -> Self {
        Self {
            info,
            dialect,
            client,
            inner: Arc::new(Mutex::new(Inner {
                status: ServerStatus::NotStarted,
                process: None,
                client: None,
                latch: None,
                console_task: None,
                reaper_task: None,
            })),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The launch information this supervisor was created with.
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Current lifecycle status.
    pub async fn status(&self) -> ServerStatus {
        self.inner.lock().await.status
    }

    /// The management client of the server, present between start and stop.
    pub async fn client(&self) -> Option<Arc<dyn ManagementClient>> {
        self.inner.lock().await.client.clone()
    }

    /// Cached running flag, set by a completed start and cleared on stop.
    pub(crate) fn running_flag(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Starts the server and waits until it is available.
    ///
    /// Spawns the process, wires up the console drain and polls the
    /// management interface until the server reports a stable state. The
    /// poll gives up when the process dies or when the startup timeout of
    /// the launch information expires; in both cases the process is torn
    /// down before the error is returned.
    #[tracing::instrument(skip(self), fields(host = %self.info.connection.host, port = self.info.connection.port))]
    pub async fn start(&self) -> Result<()> {
        {
            let mut inner = self.inner.lock().await;
            if inner.process.is_some()
                || matches!(inner.status, ServerStatus::Starting | ServerStatus::Running)
            {
                return Err(Error::AlreadyRunning);
            }

            let mut process = ServerProcess::spawn(&self.info, &self.dialect)?;
            let (stdout, stderr) = match process.take_output() {
                Ok(pipes) => pipes,
                Err(e) => {
                    process.kill_and_wait().await;
                    return Err(e);
                }
            };

            self.set_status(&mut inner, ServerStatus::Starting);
            let sentinel = self.dialect.shutdown_sentinel().map(str::to_string);
            let latch = Arc::new(ShutdownLatch::new(sentinel.is_some()));
            inner.console_task = Some(console::spawn_drain(
                stdout,
                stderr,
                self.info.output.clone(),
                sentinel,
                Arc::clone(&latch),
                self.clone(),
            ));
            inner.latch = Some(latch);
            inner.client = Some(Arc::clone(&self.client));
            inner.process = Some(process);
            tracing::info!("Server process launched");
        }

        // Poll without holding the lock so a concurrent stop can interleave
        let deadline = Instant::now() + self.info.startup_timeout;
        let mut poll_interval = INITIAL_POLL_INTERVAL;
        let mut available = false;
        while !available && Instant::now() < deadline {
            available = Self::check_server_state(self.client.as_ref()).await;
            if available {
                break;
            }

            let died = {
                let mut inner = self.inner.lock().await;
                match inner.process.as_mut() {
                    Some(process) => process.exit_status().map(|status| status.to_string()),
                    None => Some("the server was stopped before startup completed".to_string()),
                }
            };
            if let Some(reason) = died {
                tracing::error!(reason = %reason, "Server process died during startup");
                self.abort_startup().await;
                return Err(Error::ProcessExited(reason));
            }

            sleep(poll_interval).await;
            poll_interval = (poll_interval / 2).max(POLL_INTERVAL_FLOOR);
        }

        if !available {
            let timeout_secs = self.info.startup_timeout.as_secs();
            tracing::error!(timeout_secs, "Server did not become available in time");
            self.abort_startup().await;
            return Err(Error::StartupTimeout(timeout_secs));
        }

        {
            let mut inner = self.inner.lock().await;
            if inner.process.is_none() {
                return Err(Error::ProcessExited(
                    "the server was stopped before startup completed".to_string(),
                ));
            }
            self.set_status(&mut inner, ServerStatus::Running);
            self.running.store(true, Ordering::SeqCst);
            inner.reaper_task = Some(self.spawn_reaper());
        }

        tracing::info!("Server is available");
        Ok(())
    }

    /// Stops the server.
    ///
    /// Attempts a graceful shutdown through the management interface first,
    /// gives the console a moment to capture the shutdown log output, then
    /// kills whatever is left of the process and clears all supervision
    /// state. Calling `stop` on a server that never started, or twice, is
    /// not an error.
    #[tracing::instrument(skip(self), fields(host = %self.info.connection.host, port = self.info.connection.port))]
    pub async fn stop(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if matches!(inner.status, ServerStatus::Stopped) {
            return Ok(());
        }
        if inner.process.is_none() && inner.client.is_none() {
            self.running.store(false, Ordering::SeqCst);
            self.set_status(&mut inner, ServerStatus::Stopped);
            return Ok(());
        }

        self.set_status(&mut inner, ServerStatus::Stopping);
        self.running.store(false, Ordering::SeqCst);

        if let Some(client) = inner.client.take() {
            match client
                .execute(operations::operation(operations::SHUTDOWN))
                .await
            {
                Ok(outcome) if outcome.is_success() => {
                    tracing::debug!("Shutdown operation accepted");
                }
                Ok(outcome) => {
                    tracing::warn!(failure = %outcome.failure_message(), "Server rejected the shutdown operation");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to submit the shutdown operation");
                }
            }

            // Give the console a moment to capture the shutdown log output
            if let Some(latch) = inner.latch.clone() {
                if !latch.await_shutdown(SENTINEL_WAIT).await {
                    tracing::debug!("Shutdown sentinel did not appear in time");
                }
            }
        }

        if let Some(mut process) = inner.process.take() {
            process.kill_and_wait().await;
        }
        if let Some(task) = inner.console_task.take() {
            if timeout(CONSOLE_JOIN_WAIT, task).await.is_err() {
                tracing::debug!("Console drain did not finish in time");
            }
        }
        if let Some(task) = inner.reaper_task.take() {
            task.abort();
        }
        inner.latch = None;
        self.set_status(&mut inner, ServerStatus::Stopped);
        tracing::info!("Server stopped");
        Ok(())
    }

    /// Whether the server is currently available.
    ///
    /// Fast path: a server that completed [`start`](Self::start) and has not
    /// been stopped counts as running without a network round trip. A
    /// supervisor in any other state probes the management interface; an
    /// unreachable or still transitioning server counts as not running.
    pub async fn is_running(&self) -> bool {
        if self.running.load(Ordering::SeqCst) {
            return true;
        }
        let client = { self.inner.lock().await.client.clone() };
        match client {
            Some(client) => Self::check_server_state(client.as_ref()).await,
            None => false,
        }
    }

    /// Probes the `server-state` attribute.
    ///
    /// Available means the operation succeeded and the state is neither
    /// `starting` nor `stopping`. Any transport error counts as unavailable.
    async fn check_server_state(client: &dyn ManagementClient) -> bool {
        match client
            .execute(operations::read_attribute(operations::SERVER_STATE))
            .await
        {
            Ok(outcome) if outcome.is_success() => match outcome.result_as_str() {
                Some(state) => {
                    !state.eq_ignore_ascii_case(STATE_STARTING)
                        && !state.eq_ignore_ascii_case(STATE_STOPPING)
                }
                None => false,
            },
            Ok(_) => false,
            Err(_) => false,
        }
    }

    /// Kills the process and clears supervision state after a failed start.
    async fn abort_startup(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(mut process) = inner.process.take() {
            process.kill_and_wait().await;
        }
        inner.client = None;
        inner.latch = None;
        if let Some(task) = inner.console_task.take() {
            if timeout(CONSOLE_JOIN_WAIT, task).await.is_err() {
                tracing::debug!("Console drain did not finish in time");
            }
        }
        if !matches!(inner.status, ServerStatus::Stopped) {
            self.set_status(&mut inner, ServerStatus::Stopped);
        }
    }

    /// Watches a running server and reconciles state when it disappears.
    fn spawn_reaper(&self) -> JoinHandle<()> {
        let supervisor = self.clone();
        tokio::spawn(async move {
            sleep(REAPER_INITIAL_DELAY).await;
            loop {
                if !supervisor.running_flag() {
                    break;
                }
                let client = { supervisor.inner.lock().await.client.clone() };
                let Some(client) = client else { break };
                if !Self::check_server_state(client.as_ref()).await {
                    tracing::warn!("Server is no longer reachable, reconciling supervisor state");
                    if let Err(e) = supervisor.stop().await {
                        tracing::warn!(error = %e, "Reconciling stop failed");
                    }
                    break;
                }
                sleep(REAPER_INTERVAL).await;
            }
        })
    }

    fn set_status(&self, inner: &mut Inner, next: ServerStatus) {
        if inner.status.can_transition(next) {
            tracing::debug!(from = ?inner.status, to = ?next, "Server status change");
        } else {
            tracing::warn!(from = ?inner.status, to = ?next, "Unexpected status transition");
        }
        inner.status = next;
    }
}

impl std::fmt::Debug for ServerSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSupervisor")
            .field("host", &self.info.connection.host)
            .field("port", &self.info.connection.port)
            .field("home_dir", &self.info.home_dir)
            .finish()
    }
}
