use crate::error::{Error, Result};
use crate::management::ManagementClient;
use crate::server::supervisor::ServerSupervisor;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct ControllerState {
    server: Option<ServerSupervisor>,
    client: Option<Arc<dyn ManagementClient>>,
}

/// Single slot ownership of the current server connection.
///
/// A controller holds at most one of two things: a supervised server the
/// library started itself, or a management client for a server somebody else
/// runs. The registration rules keep the two from shadowing each other:
///
/// - a second server is rejected while one is held
/// - a client is rejected while a server or client is held
/// - registering a server drops a previously attached external client
///
/// [`client`](Self::client) always answers with the client of the owned
/// server when one is registered, falling back to the external client.
pub struct ServerController {
    state: Mutex<ControllerState>,
}

impl ServerController {
    /// Creates an empty controller.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ControllerState::default()),
        }
    }

    /// Whether a supervised server is registered.
    pub async fn has_server(&self) -> bool {
        self.state.lock().await.server.is_some()
    }

    /// Whether any connection is registered, server or external client.
    pub async fn has_client(&self) -> bool {
        let state = self.state.lock().await;
        state.server.is_some() || state.client.is_some()
    }

    /// Registers a supervised server.
    ///
    /// Fails when a server is already held. An external client attached
    /// earlier is dropped, the owned server takes precedence.
    pub async fn set_server(&self, server: ServerSupervisor) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.server.is_some() {
            return Err(Error::AlreadyConnected(
                "a server is already registered".to_string(),
            ));
        }
        if state.client.take().is_some() {
            tracing::debug!("Dropped external client in favour of the owned server");
        }
        state.server = Some(server);
        Ok(())
    }

    /// Attaches a management client for an externally managed server.
    ///
    /// Fails when anything is registered already.
    pub async fn set_client(&self, client: Arc<dyn ManagementClient>) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.server.is_some() || state.client.is_some() {
            return Err(Error::AlreadyConnected(
                "a client or server is already registered".to_string(),
            ));
        }
        state.client = Some(client);
        Ok(())
    }

    /// A handle to the registered server, if any.
    pub async fn server(&self) -> Option<ServerSupervisor> {
        self.state.lock().await.server.clone()
    }

    /// The active management client.
    ///
    /// With a registered server this is the server's own client, which only
    /// exists while the server is up. Otherwise the external client, if one
    /// is attached.
    pub async fn client(&self) -> Option<Arc<dyn ManagementClient>> {
        let state = self.state.lock().await;
        if let Some(server) = &state.server {
            return server.client().await;
        }
        state.client.clone()
    }

    /// Stops and releases the registered server.
    ///
    /// The slot is cleared even when the stop fails. Without a registered
    /// server this is a no-op.
    pub async fn shutdown_server(&self) -> Result<()> {
        let server = { self.state.lock().await.server.take() };
        match server {
            Some(server) => server.stop().await,
            None => Ok(()),
        }
    }

    /// Drops the external client, if one is attached.
    pub async fn close_client(&self) {
        self.state.lock().await.client.take();
    }

    /// Releases everything: stops an owned server first, then drops any
    /// external client.
    pub async fn close(&self) -> Result<()> {
        let result = self.shutdown_server().await;
        self.close_client().await;
        result
    }
}

impl Default for ServerController {
    fn default() -> Self {
        Self::new()
    }
}
