use std::sync::Arc;

use tokio::net::TcpListener;
use vitalchain_ledger::Ledger;
use vitalchain_types::Payload;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// Ledger node: one ledger, served over HTTP.
pub struct VitalChainServer {
    config: ServerConfig,
    ledger: Arc<Ledger>,
}

impl VitalChainServer {
    /// Create the node and its ledger. The genesis block records
    /// `config.genesis_note` when set.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let ledger = match &config.genesis_note {
            Some(note) => Ledger::with_genesis(Payload::genesis_with_note(note.clone()))?,
            None => Ledger::new(),
        };
        Ok(Self::with_ledger(config, Arc::new(ledger)))
    }

    /// Serve an existing ledger.
    pub fn with_ledger(config: ServerConfig, ledger: Arc<Ledger>) -> Self {
        Self { config, ledger }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(Arc::clone(&self.ledger)), &self.config)
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("VitalChain node listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
