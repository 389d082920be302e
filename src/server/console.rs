use crate::server::info::OutputSink;
use crate::server::supervisor::ServerSupervisor;
use async_process::{ChildStderr, ChildStdout};
use futures_lite::io::{AsyncBufReadExt, BufReader};
use futures_lite::stream::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Duration, timeout};

/// Latch flipped when the shutdown sentinel shows up in console output.
///
/// A graceful stop sends the shutdown operation and then waits briefly on
/// this latch so the final log lines make it to the sink before the process
/// is killed. An unarmed latch (dialect without a sentinel) releases waiters
/// immediately.
pub(crate) struct ShutdownLatch {
    armed: bool,
    seen: AtomicBool,
    notify: Notify,
}

impl ShutdownLatch {
    pub(crate) fn new(armed: bool) -> Self {
        Self {
            armed,
            seen: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Marks the sentinel as seen and releases all waiters.
    pub(crate) fn signal(&self) {
        self.seen.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Waits up to `wait` for the sentinel. Returns `false` on expiry.
    pub(crate) async fn await_shutdown(&self, wait: Duration) -> bool {
        if !self.armed {
            return true;
        }

        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before the flag check so a concurrent signal cannot slip
        // between check and await
        notified.as_mut().enable();
        if self.seen.load(Ordering::SeqCst) {
            return true;
        }

        timeout(wait, notified).await.is_ok()
    }
}

/// Spawns the console drain for a server's output pipes.
///
/// Both pipes are forwarded line by line to the sink. When a line contains
/// the shutdown sentinel the latch is signalled and, if the server is still
/// marked running, a stop is initiated to reconcile the supervisor with the
/// server shutting down on its own.
pub(crate) fn spawn_drain(
    stdout: ChildStdout,
    stderr: ChildStderr,
    sink: OutputSink,
    sentinel: Option<String>,
    latch: Arc<ShutdownLatch>,
    supervisor: ServerSupervisor,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let out = tokio::spawn(drain_stream(
            stdout,
            sink.clone(),
            sentinel.clone(),
            Arc::clone(&latch),
            supervisor.clone(),
        ));
        let err = tokio::spawn(drain_stream(stderr, sink.clone(), sentinel, latch, supervisor));

        let _ = out.await;
        let _ = err.await;
        sink.flush();
    })
}

async fn drain_stream<R>(
    stream: R,
    sink: OutputSink,
    sentinel: Option<String>,
    latch: Arc<ShutdownLatch>,
    supervisor: ServerSupervisor,
) where
    R: futures_lite::AsyncRead + Send + Unpin + 'static,
{
    let mut lines = BufReader::new(stream).lines();
    while let Some(line) = lines.next().await {
        let Ok(line) = line else { break };
        sink.write_line(&line);

        if let Some(sentinel) = &sentinel {
            if line.contains(sentinel.as_str()) {
                tracing::debug!("Shutdown sentinel seen in console output");
                latch.signal();
                if supervisor.running_flag() {
                    if let Err(e) = supervisor.stop().await {
                        tracing::warn!(error = %e, "Stop after shutdown sentinel failed");
                    }
                }
            }
        }
    }
}
