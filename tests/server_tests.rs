#![cfg(unix)]

use async_trait::async_trait;
use jboss_runner::error::{Error, Result};
use jboss_runner::management::{ManagementClient, Outcome};
use jboss_runner::server::{ConnectionInfo, OutputSink, ServerInfo, ServerStatus};
use jboss_runner::{ServerDialect, ServerSupervisor};
use mockall::mock;
use serde_json::{Value, json};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::time::sleep;

// Define a mock for the ManagementClient trait
mock! {
    pub ClientMock {}

    #[async_trait]
    impl ManagementClient for ClientMock {
        async fn execute(&self, operation: Value) -> Result<Outcome>;
    }
}

// Helper installing a shell script that stands in for the java executable
fn fake_java(dir: &tempfile::TempDir, script_body: &str) -> PathBuf {
    let java_home = dir.path().join("jdk");
    std::fs::create_dir_all(java_home.join("bin")).unwrap();

    let java = java_home.join("bin").join("java");
    std::fs::write(&java, format!("#!/bin/sh\n{}\n", script_body)).unwrap();
    let mut permissions = std::fs::metadata(&java).unwrap().permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&java, permissions).unwrap();

    java_home
}

// Helper building launch information around a scripted server process
fn server_info(dir: &tempfile::TempDir, script_body: &str) -> ServerInfo {
    let home = dir.path().join("wildfly");
    std::fs::create_dir_all(&home).unwrap();
    std::fs::write(home.join("jboss-modules.jar"), b"jar").unwrap();

    let mut info = ServerInfo::new(ConnectionInfo::new("localhost", 9990), home);
    info.java_home = Some(fake_java(dir, script_body));
    info
}

// Script that runs until the shutdown flag file appears, then logs the
// shutdown sentinel and exits like a real server would
fn managed_script(flag: &Path, body: &str) -> String {
    format!(
        "{}\nwhile [ ! -e {} ]; do sleep 0.05; done\n\
         echo '13:05:11,042 INFO  [org.jboss.as] (MSC service thread 1-2) JBAS015950: WildFly 8.1.0.Final \"Kenny\" stopped in 21ms'\n\
         exit 0",
        body,
        flag.display()
    )
}

// Mock client answering state probes with `starting` for the first
// `starting_polls` calls and `running` afterwards
fn probing_client(starting_polls: usize) -> MockClientMock {
    let mut client = MockClientMock::new();
    let calls = AtomicUsize::new(0);
    client
        .expect_execute()
        .withf(|op| op["operation"] == "read-attribute" && op["name"] == "server-state")
        .returning(move |_| {
            if calls.fetch_add(1, Ordering::SeqCst) < starting_polls {
                Ok(Outcome::success(json!("starting")))
            } else {
                Ok(Outcome::success(json!("running")))
            }
        });
    client
}

// Expect one graceful shutdown operation; accepting it raises the flag
// file the scripted server is waiting for
fn expect_shutdown(client: &mut MockClientMock, flag: &Path, times: usize) {
    let flag = flag.to_path_buf();
    client
        .expect_execute()
        .withf(|op| op["operation"] == "shutdown")
        .times(times)
        .returning(move |_| {
            std::fs::write(&flag, b"now").unwrap();
            Ok(Outcome::success(json!(null)))
        });
}

#[tokio::test]
async fn test_start_and_stop() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let flag = dir.path().join("shutdown-requested");
    let info = server_info(&dir, &managed_script(&flag, ":"));

    let mut client = probing_client(2);
    expect_shutdown(&mut client, &flag, 1);

    let server = ServerSupervisor::new(info, ServerDialect::wildfly8(), Arc::new(client));
    assert_eq!(server.status().await, ServerStatus::NotStarted);
    assert!(!server.is_running().await);

    server.start().await?;
    assert_eq!(server.status().await, ServerStatus::Running);
    assert!(server.is_running().await);
    assert!(server.client().await.is_some());

    // A second start is rejected while the server is up
    let err = server.start().await.unwrap_err();
    assert!(matches!(err, Error::AlreadyRunning));

    server.stop().await?;
    assert_eq!(server.status().await, ServerStatus::Stopped);
    assert!(!server.is_running().await);
    assert!(server.client().await.is_none());

    // Stopping again is a no-op
    server.stop().await?;
    assert_eq!(server.status().await, ServerStatus::Stopped);

    Ok(())
}

#[tokio::test]
async fn test_startup_timeout_kills_the_process() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let mut info = server_info(&dir, "sleep 30");
    info.startup_timeout = Duration::from_secs(1);

    // The management interface never comes up
    let mut client = MockClientMock::new();
    client
        .expect_execute()
        .returning(|_| Err(Error::Management("connection refused".to_string())));

    let server = ServerSupervisor::new(info, ServerDialect::wildfly8(), Arc::new(client));

    let started = Instant::now();
    let err = server.start().await.unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(err.to_string(), "Managed server was not started within [1] s");
    assert!(matches!(err, Error::StartupTimeout(1)));
    assert!(elapsed < Duration::from_secs(10), "gave up after {:?}", elapsed);
    assert_eq!(server.status().await, ServerStatus::Stopped);
    assert!(!server.is_running().await);

    Ok(())
}

#[tokio::test]
async fn test_dead_process_aborts_startup_early() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let info = server_info(&dir, "echo boom\nexit 7");

    let mut client = MockClientMock::new();
    client
        .expect_execute()
        .returning(|_| Err(Error::Management("connection refused".to_string())));

    let server = ServerSupervisor::new(info, ServerDialect::wildfly8(), Arc::new(client));

    // The default startup timeout is 90s; a dead process must not make
    // the caller sit through it
    let started = Instant::now();
    let err = server.start().await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, Error::ProcessExited(_)));
    assert!(err.to_string().contains("7"), "error: {err}");
    assert!(elapsed < Duration::from_secs(10), "gave up after {:?}", elapsed);
    assert_eq!(server.status().await, ServerStatus::Stopped);

    Ok(())
}

#[tokio::test]
async fn test_external_shutdown_is_reconciled() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let info = server_info(
        &dir,
        "sleep 0.5\necho 'JBAS015950: WildFly 8.1.0.Final stopped in 21ms'\nsleep 30",
    );

    // The console drain initiates the stop; by then the server is gone,
    // so the graceful shutdown operation fails
    let mut client = probing_client(0);
    client
        .expect_execute()
        .withf(|op| op["operation"] == "shutdown")
        .times(1)
        .returning(|_| Err(Error::Management("connection refused".to_string())));

    let server = ServerSupervisor::new(info, ServerDialect::wildfly8(), Arc::new(client));
    server.start().await?;
    assert!(server.is_running().await);

    // The sentinel in the console output reconciles the supervisor
    let deadline = Instant::now() + Duration::from_secs(10);
    while server.status().await != ServerStatus::Stopped && Instant::now() < deadline {
        sleep(Duration::from_millis(100)).await;
    }

    assert_eq!(server.status().await, ServerStatus::Stopped);
    assert!(!server.is_running().await);

    Ok(())
}

// Shared buffer sink for capturing console output
#[derive(Clone, Default)]
struct SharedBuf {
    bytes: Arc<std::sync::Mutex<Vec<u8>>>,
}

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock().unwrap()).to_string()
    }
}

impl std::io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.bytes.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_console_output_is_captured() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let flag = dir.path().join("shutdown-requested");
    let mut info = server_info(
        &dir,
        &managed_script(&flag, "echo 'Listening on 127.0.0.1:9990'"),
    );

    let buffer = SharedBuf::default();
    info.output = OutputSink::from_writer(buffer.clone());

    let mut client = probing_client(0);
    expect_shutdown(&mut client, &flag, 1);

    let server = ServerSupervisor::new(info, ServerDialect::wildfly8(), Arc::new(client));
    server.start().await?;

    let deadline = Instant::now() + Duration::from_secs(10);
    while !buffer.contents().contains("Listening on 127.0.0.1:9990")
        && Instant::now() < deadline
    {
        sleep(Duration::from_millis(50)).await;
    }
    assert!(buffer.contents().contains("Listening on 127.0.0.1:9990"));

    server.stop().await?;

    // The shutdown log output made it into the buffer before the kill
    assert!(buffer.contents().contains("JBAS015950"));

    Ok(())
}

#[tokio::test]
async fn test_stop_without_start() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let info = server_info(&dir, ":");

    let server = ServerSupervisor::new(
        info,
        ServerDialect::wildfly8(),
        Arc::new(MockClientMock::new()),
    );

    server.stop().await?;
    assert_eq!(server.status().await, ServerStatus::Stopped);
    assert!(!server.is_running().await);

    Ok(())
}

#[tokio::test]
async fn test_restart_after_stop() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let flag = dir.path().join("shutdown-requested");
    let info = server_info(&dir, &managed_script(&flag, ":"));

    let mut client = probing_client(0);
    expect_shutdown(&mut client, &flag, 2);

    let server = ServerSupervisor::new(info, ServerDialect::wildfly8(), Arc::new(client));

    server.start().await?;
    server.stop().await?;
    assert_eq!(server.status().await, ServerStatus::Stopped);

    // Arm the scripted server for another cycle
    std::fs::remove_file(&flag).unwrap();

    server.start().await?;
    assert_eq!(server.status().await, ServerStatus::Running);
    assert!(server.is_running().await);

    server.stop().await?;
    assert_eq!(server.status().await, ServerStatus::Stopped);

    Ok(())
}
