use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use vitalchain_ledger::{
    Block, IntegrityFault, Ledger, LedgerReader, LedgerWriter, Validator, Verdict,
};
use vitalchain_types::{DiagnosticRecord, Payload};

use crate::error::{ServerError, ServerResult};

/// Shared handler state: the one ledger this node writes to.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
}

impl AppState {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }
}

/// Body of `POST /api/record`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRequest {
    #[serde(default, alias = "subject", alias = "subjectId")]
    pub patient_id: Option<String>,
    #[serde(default, alias = "label")]
    pub disease: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl RecordRequest {
    pub fn into_payload(self) -> ServerResult<Payload> {
        let subject = required(self.patient_id, "patientId")?;
        let label = required(self.disease, "disease")?;
        let confidence = self
            .confidence
            .ok_or_else(|| ServerError::BadRequest("missing confidence".into()))?;

        let mut record = DiagnosticRecord::new(subject, label, confidence);
        record.metadata = self.metadata;
        Ok(Payload::Diagnostic(record))
    }
}

fn required(value: Option<String>, field: &str) -> ServerResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ServerError::BadRequest(format!("missing {field}"))),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordResponse {
    pub message: String,
    pub block: Block,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    pub length: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
        }
    }
}

/// `POST /api/record`
pub async fn record_handler(
    State(state): State<AppState>,
    request: Result<Json<RecordRequest>, JsonRejection>,
) -> ServerResult<Json<RecordResponse>> {
    let Json(request) = request?;
    let payload = request.into_payload()?;
    let block = state.ledger.append(payload)?;
    info!(
        position = block.position(),
        digest = %block.digest(),
        "block added"
    );
    Ok(Json(RecordResponse {
        message: "Block added successfully".into(),
        block,
    }))
}

/// `GET /api/chain`
pub async fn chain_handler(State(state): State<AppState>) -> Json<ChainResponse> {
    let chain = state.ledger.all();
    let length = chain.len() as u64;
    Json(ChainResponse { chain, length })
}

/// `GET /api/chain/:position`
pub async fn block_handler(
    State(state): State<AppState>,
    Path(position): Path<u64>,
) -> ServerResult<Json<Block>> {
    Ok(Json(state.ledger.block_at(position)?))
}

/// `GET /api/verify`
///
/// A failed audit is a data-integrity incident: it is logged at error level
/// and answered with 500 so monitoring treats it as an outage.
pub async fn verify_handler(State(state): State<AppState>) -> Response {
    let blocks = state.ledger.all();
    let length = blocks.len() as u64;
    match Validator::verify_blocks(&blocks) {
        Verdict::Valid => Json(json!({ "valid": true, "length": length })).into_response(),
        Verdict::Invalid { position, fault } => {
            error!(position, %fault, "ledger integrity violation");
            invalid_response(position, fault, length)
        }
    }
}

fn invalid_response(position: u64, fault: IntegrityFault, length: u64) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "valid": false,
            "position": position,
            "fault": fault,
            "length": length,
        })),
    )
        .into_response()
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Info handler.
pub async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "name": "vitalchain-server",
        "version": env!("CARGO_PKG_VERSION"),
        "length": state.ledger.len(),
    }))
}
