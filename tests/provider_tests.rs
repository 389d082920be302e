use async_trait::async_trait;
use jboss_runner::error::{Error, Result};
use jboss_runner::install::{ArchiveExtractor, DistributionResolver};
use jboss_runner::management::{ManagementClient, Outcome};
use jboss_runner::{
    ApplicationServerProvider, DeploymentKind, DeploymentOutcome, DeploymentRequest,
    JBossConfiguration, ServerDialect, ServerStatus,
};
use mockall::mock;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// Define a mock for the ManagementClient trait
mock! {
    pub ClientMock {}

    #[async_trait]
    impl ManagementClient for ClientMock {
        async fn execute(&self, operation: Value) -> Result<Outcome>;
    }
}

// Define mocks for the install collaborators
mock! {
    pub ResolverMock {}

    #[async_trait]
    impl DistributionResolver for ResolverMock {
        async fn resolve(&self, coordinate: &str) -> Result<PathBuf>;
    }
}

mock! {
    pub ExtractorMock {}

    #[async_trait]
    impl ArchiveExtractor for ExtractorMock {
        async fn extract(&self, archive: &Path, target: &Path) -> Result<()>;
    }
}

#[test]
fn test_from_config_str() -> Result<()> {
    let config_str = r#"{
        "servers": {
            "wf8": {
                "port": 10090,
                "hostname": "127.0.0.1"
            }
        }
    }"#;

    let provider =
        ApplicationServerProvider::from_config_str(config_str, ServerDialect::wildfly8())?;

    assert_eq!(provider.name(), "wf8");
    assert_eq!(provider.description(), "WildFly 8");
    assert_eq!(provider.configuration().port, Some(10090));
    assert_eq!(provider.configuration().hostname(), "127.0.0.1");

    Ok(())
}

#[test]
fn test_missing_entry_falls_back_to_defaults() -> Result<()> {
    let provider =
        ApplicationServerProvider::from_config_str(r#"{"servers": {}}"#, ServerDialect::as7())?;

    assert_eq!(provider.name(), "as7");
    assert_eq!(provider.configuration().port, None);
    assert_eq!(
        provider.configuration().port(provider.dialect()),
        9999
    );

    Ok(())
}

#[test]
fn test_invalid_entry_is_rejected() {
    let config_str = r#"{"servers": {"wf8": {"port": 0}}}"#;

    let err = ApplicationServerProvider::from_config_str(config_str, ServerDialect::wildfly8())
        .unwrap_err();
    assert!(matches!(err, Error::ConfigInvalid(_)));
}

#[test]
fn test_from_config_file() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"servers": {"as7": {"startupTimeout": 120}}}"#).unwrap();

    let provider = ApplicationServerProvider::from_config_file(&path, ServerDialect::as7())?;
    assert_eq!(provider.configuration().startup_timeout, Some(120));

    // An unreadable file is a parse error
    let err = ApplicationServerProvider::from_config_file(
        dir.path().join("missing.json"),
        ServerDialect::as7(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::ConfigParse(_)));

    Ok(())
}

#[test]
fn test_is_installed_checks_the_configured_path() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("wildfly");

    let configuration = JBossConfiguration {
        path: Some(target.clone()),
        ..Default::default()
    };
    let provider = ApplicationServerProvider::new(ServerDialect::wildfly8(), configuration)?;

    assert!(!provider.is_installed());
    std::fs::create_dir_all(&target).unwrap();
    assert!(provider.is_installed());

    Ok(())
}

#[tokio::test]
async fn test_install_resolves_and_extracts() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("wildfly-dist.zip");
    std::fs::write(&archive, b"zip").unwrap();
    let target = dir.path().join("server");

    // The coordinate is derived from the dialect and version
    let mut resolver = MockResolverMock::new();
    let resolved = archive.clone();
    resolver
        .expect_resolve()
        .withf(|coordinate: &str| coordinate == "org.wildfly:wildfly-dist:zip:8.1.0.Final")
        .times(1)
        .returning(move |_| Ok(resolved.clone()));

    let mut extractor = MockExtractorMock::new();
    let expected_archive = archive.clone();
    let expected_target = target.clone();
    extractor
        .expect_extract()
        .withf(move |archive: &Path, target: &Path| {
            archive == expected_archive && target == expected_target
        })
        .times(1)
        .returning(|_, target| {
            std::fs::create_dir_all(target).unwrap();
            std::fs::write(target.join("jboss-modules.jar"), b"jar").unwrap();
            Ok(())
        });

    let configuration = JBossConfiguration {
        path: Some(target.clone()),
        ..Default::default()
    };
    let provider = ApplicationServerProvider::new(ServerDialect::wildfly8(), configuration)?;

    let home = provider.install(&resolver, &extractor).await?;
    assert_eq!(home, target);
    assert!(provider.is_installed());

    Ok(())
}

#[tokio::test]
async fn test_install_replaces_a_previous_install() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("wildfly-dist.zip");
    std::fs::write(&archive, b"zip").unwrap();
    let target = dir.path().join("server");

    // Leftovers from an earlier install
    std::fs::create_dir_all(&target).unwrap();
    std::fs::write(target.join("stale.txt"), b"old").unwrap();

    let mut resolver = MockResolverMock::new();
    let resolved = archive.clone();
    resolver
        .expect_resolve()
        .times(1)
        .returning(move |_| Ok(resolved.clone()));

    let mut extractor = MockExtractorMock::new();
    extractor
        .expect_extract()
        .times(1)
        .returning(|_, target| {
            std::fs::create_dir_all(target).unwrap();
            std::fs::write(target.join("jboss-modules.jar"), b"jar").unwrap();
            Ok(())
        });

    let configuration = JBossConfiguration {
        path: Some(target.clone()),
        ..Default::default()
    };
    let provider = ApplicationServerProvider::new(ServerDialect::wildfly8(), configuration)?;

    provider.install(&resolver, &extractor).await?;

    assert!(!target.join("stale.txt").exists());
    assert!(target.join("jboss-modules.jar").exists());

    Ok(())
}

#[tokio::test]
async fn test_start_requires_an_installed_server() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();

    let configuration = JBossConfiguration {
        path: Some(dir.path().join("missing")),
        ..Default::default()
    };
    let provider = ApplicationServerProvider::new(ServerDialect::wildfly8(), configuration)?;

    let err = provider.start().await.unwrap_err();
    assert!(matches!(err, Error::HomeDirNotFound(_)));
    assert_eq!(provider.status().await, ServerStatus::NotStarted);

    Ok(())
}

#[tokio::test]
async fn test_shutdown_without_a_connection() -> Result<()> {
    let provider =
        ApplicationServerProvider::new(ServerDialect::wildfly8(), JBossConfiguration::default())?;

    let err = provider.shutdown().await.unwrap_err();
    assert!(matches!(err, Error::NotRunning));

    Ok(())
}

#[tokio::test]
async fn test_shutdown_through_an_external_client() -> Result<()> {
    let provider =
        ApplicationServerProvider::new(ServerDialect::wildfly8(), JBossConfiguration::default())?;

    let mut client = MockClientMock::new();
    client
        .expect_execute()
        .withf(|op| op["operation"] == "shutdown")
        .times(1)
        .returning(|_| Ok(Outcome::success(json!(null))));

    provider.controller().set_client(Arc::new(client)).await?;
    provider.shutdown().await?;

    // The client is detached once the server is gone
    assert!(!provider.controller().has_client().await);

    Ok(())
}

#[tokio::test]
async fn test_failed_external_shutdown_still_detaches() -> Result<()> {
    let provider =
        ApplicationServerProvider::new(ServerDialect::wildfly8(), JBossConfiguration::default())?;

    let mut client = MockClientMock::new();
    client
        .expect_execute()
        .withf(|op| op["operation"] == "shutdown")
        .times(1)
        .returning(|_| Ok(Outcome::failed("JBAS013456: not authorized")));

    provider.controller().set_client(Arc::new(client)).await?;

    let err = provider.shutdown().await.unwrap_err();
    match err {
        Error::OperationFailed(message) => assert_eq!(message, "JBAS013456: not authorized"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!provider.controller().has_client().await);

    Ok(())
}

#[tokio::test]
async fn test_deploy_through_an_external_client() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let content = dir.path().join("app.war");
    std::fs::write(&content, b"archive-bytes").unwrap();

    let mut client = MockClientMock::new();
    client
        .expect_execute()
        .withf(|op| op["operation"] == "read-children-names")
        .times(1)
        .returning(|_| Ok(Outcome::success(json!([]))));
    client
        .expect_execute()
        .withf(|op| {
            op["operation"] == "composite"
                && op["steps"][0]["operation"] == "add"
                && op["steps"][1]["operation"] == "deploy"
        })
        .times(1)
        .returning(|_| {
            Ok(Outcome::success(json!({
                "step-1": {"outcome": "success"},
                "step-2": {"outcome": "success"}
            })))
        });

    let provider =
        ApplicationServerProvider::new(ServerDialect::wildfly8(), JBossConfiguration::default())?;
    provider.controller().set_client(Arc::new(client)).await?;

    let outcome = provider.deploy(&content).await?;
    assert_eq!(outcome, DeploymentOutcome::Success);

    Ok(())
}

#[tokio::test]
async fn test_deployment_requires_a_connection() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let content = dir.path().join("app.war");
    std::fs::write(&content, b"archive-bytes").unwrap();

    let provider =
        ApplicationServerProvider::new(ServerDialect::wildfly8(), JBossConfiguration::default())?;

    let err = provider.deploy(&content).await.unwrap_err();
    assert!(matches!(err, Error::NotRunning));

    let request = DeploymentRequest::new(&content, DeploymentKind::ForceDeploy);
    let err = provider.process_deployment(&request).await.unwrap_err();
    assert!(matches!(err, Error::NotRunning));

    Ok(())
}

#[tokio::test]
async fn test_status_without_a_server() -> Result<()> {
    let provider =
        ApplicationServerProvider::new(ServerDialect::wildfly8(), JBossConfiguration::default())?;

    assert_eq!(provider.status().await, ServerStatus::NotStarted);
    assert!(!provider.is_running().await);

    Ok(())
}
