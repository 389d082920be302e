use jboss_runner::error::Result;
use jboss_runner::{ApplicationServerProvider, ServerDialect};
use tracing_subscriber::{EnvFilter, fmt}; // Import tracing subscriber components

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    // `with_env_filter` reads the RUST_LOG environment variable to set the log level.
    // `with_target(true)` includes the module path in the log output.
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true) // Show module targets
        .init();

    tracing::info!("Starting run_server demo");

    // Create a provider for a WildFly 8 server installed under the default path
    let config = r#"{
        "servers": {
            "wf8": {
                "path": "target/wildfly-dist"
            }
        }
    }"#;
    let provider = ApplicationServerProvider::from_config_str(config, ServerDialect::wildfly8())?;

    println!("Provider: {} ({})", provider.name(), provider.description());

    if !provider.is_installed() {
        println!(
            "No server found under {}; unpack a WildFly distribution there first",
            provider.configuration().path(provider.dialect()).display()
        );
        return Ok(());
    }

    // Start the server and wait for the management interface to come up
    println!("Starting the server...");
    provider.start().await?;
    println!("Server status: {:?}", provider.status().await);

    // Deploy and undeploy an artifact when one is given on the command line
    if let Some(war) = std::env::args().nth(1) {
        println!("Deploying {}...", war);
        let outcome = provider.deploy(&war).await?;
        println!("Deployment outcome: {:?}", outcome);

        println!("Undeploying {}...", war);
        let outcome = provider.undeploy(&war).await?;
        println!("Undeployment outcome: {:?}", outcome);
    }

    // Shut the server down again
    println!("Stopping the server...");
    if let Err(e) = provider.shutdown().await {
        println!("Warning: Failed to stop the server: {}", e);
    }

    tracing::info!("run_server demo finished");
    Ok(())
}
