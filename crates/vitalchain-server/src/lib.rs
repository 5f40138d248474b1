//! HTTP node for the VitalChain ledger.
//!
//! The request-handling layer in front of one in-memory [`Ledger`]: it turns
//! diagnostic submissions into appended blocks, returns receipts, and exposes
//! the chain and its integrity audit for display.
//!
//! [`Ledger`]: vitalchain_ledger::Ledger

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{AppState, ChainResponse, HealthResponse, RecordRequest, RecordResponse};
pub use server::VitalChainServer;
