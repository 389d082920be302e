use crate::error::{Error, Result};
use crate::management::{ManagementClient, Outcome};
use crate::server::{ConnectionInfo, Credentials};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// How long to wait for a TCP connection to the management interface.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Management client speaking the HTTP JSON protocol.
///
/// Operations are POSTed to the `/management` endpoint of the server and
/// answered with an [`Outcome`] JSON body. Failed operations still arrive as
/// a well formed body, so the client parses the body regardless of the HTTP
/// status code.
///
/// # Examples
///
/// ```no_run
/// use jboss_runner::management::{HttpManagementClient, ManagementClient, operations};
/// use jboss_runner::server::ConnectionInfo;
///
/// # async fn example() -> jboss_runner::error::Result<()> {
/// let connection = ConnectionInfo::new("localhost", 9990);
/// let client = HttpManagementClient::new(&connection)?;
///
/// let outcome = client
///     .execute(operations::read_attribute(operations::SERVER_STATE))
///     .await?;
/// println!("server-state: {:?}", outcome.result_as_str());
/// # Ok(())
/// # }
/// ```
pub struct HttpManagementClient {
    endpoint: String,
    credentials: Option<Credentials>,
    http: reqwest::Client,
}

impl HttpManagementClient {
    /// Creates a client for the given management address.
    pub fn new(connection: &ConnectionInfo) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::Management(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: format!("http://{}:{}/management", connection.host, connection.port),
            credentials: connection.credentials.clone(),
            http,
        })
    }

    /// The management endpoint URL this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for HttpManagementClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpManagementClient")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[async_trait]
impl ManagementClient for HttpManagementClient {
    #[tracing::instrument(skip(self, operation), fields(endpoint = %self.endpoint))]
    async fn execute(&self, operation: Value) -> Result<Outcome> {
        tracing::trace!(operation = %operation, "Submitting management operation");

        let mut request = self.http.post(&self.endpoint).json(&operation);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = request.send().await.map_err(|e| {
            Error::Management(format!("Request to {} failed: {}", self.endpoint, e))
        })?;

        let status = response.status();
        let outcome: Outcome = response.json().await.map_err(|e| {
            Error::Management(format!(
                "Invalid management response (HTTP {}): {}",
                status, e
            ))
        })?;

        tracing::trace!(outcome = %outcome.outcome, "Management operation answered");
        Ok(outcome)
    }
}
