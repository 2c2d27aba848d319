//! HTTP handlers for ID and business number generation.
//!
//! ## Routes
//!
//! - `GET /id`: next fixed-layout ID.
//! - `GET /id/{id}`: decode a fixed-layout ID issued by this node's layout.
//! - `GET /sequence`: next compact, digit-reversed sequence.
//! - `GET /order-no`, `GET /refund-no`, `GET /trade-no`: business numbers,
//!   with an optional `?shard=` table tag appended.
//! - `POST /bench`: generate in a tight loop for the configured window and
//!   report how many IDs were produced.

use crate::server::service::{
    error::{ApiError, Result},
    state::AppState,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use flakeid::{BusinessKind, SnowflakeParts};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Longest shard tag accepted on business number routes.
pub const MAX_SHARD_TAG_LEN: usize = 16;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/id", get(next_id))
        .route("/id/{id}", get(decode_id))
        .route("/sequence", get(next_sequence))
        .route("/order-no", get(order_no))
        .route("/refund-no", get(refund_no))
        .route("/trade-no", get(trade_no))
        .route("/bench", post(bench))
        .with_state(state)
}

#[derive(Serialize, Deserialize, Debug)]
pub struct IdResponse {
    pub id: u64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SequenceResponse {
    pub sequence: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct NumberResponse {
    pub kind: BusinessKind,
    pub number: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct ShardQuery {
    pub shard: Option<String>,
}

/// Which generator `POST /bench` drives.
#[derive(Deserialize, Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BenchTarget {
    Fixed,
    #[default]
    Compact,
    Plain,
}

#[derive(Deserialize, Debug, Default)]
pub struct BenchQuery {
    #[serde(default)]
    pub target: BenchTarget,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BenchReport {
    pub target: BenchTarget,
    pub iterations: u64,
    pub elapsed_ms: u64,
    pub last_id: String,
    pub id_length: usize,
}

async fn next_id(State(state): State<AppState>) -> Result<Json<IdResponse>> {
    let id = state.ids().next_id()?;
    Ok(Json(IdResponse { id }))
}

async fn decode_id(State(state): State<AppState>, Path(id): Path<u64>) -> Json<SnowflakeParts> {
    Json(state.ids().decode(id))
}

async fn next_sequence(State(state): State<AppState>) -> Result<Json<SequenceResponse>> {
    let sequence = state.sequences().next_sequence()?;
    Ok(Json(SequenceResponse { sequence }))
}

async fn order_no(
    State(state): State<AppState>,
    Query(query): Query<ShardQuery>,
) -> Result<Json<NumberResponse>> {
    create_number(&state, BusinessKind::Order, query)
}

async fn refund_no(
    State(state): State<AppState>,
    Query(query): Query<ShardQuery>,
) -> Result<Json<NumberResponse>> {
    create_number(&state, BusinessKind::Refund, query)
}

async fn trade_no(
    State(state): State<AppState>,
    Query(query): Query<ShardQuery>,
) -> Result<Json<NumberResponse>> {
    create_number(&state, BusinessKind::Trade, query)
}

fn create_number(
    state: &AppState,
    kind: BusinessKind,
    query: ShardQuery,
) -> Result<Json<NumberResponse>> {
    let shard = query.shard.unwrap_or_default();
    validate_shard_tag(&shard)?;
    let number = state.numbers().create(kind, &shard)?;
    Ok(Json(NumberResponse { kind, number }))
}

fn validate_shard_tag(shard: &str) -> Result<()> {
    if shard.len() > MAX_SHARD_TAG_LEN {
        return Err(ApiError::InvalidRequest {
            reason: format!("shard tag longer than {MAX_SHARD_TAG_LEN} characters"),
        });
    }
    if !shard.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ApiError::InvalidRequest {
            reason: format!("shard tag `{shard}` must be ASCII alphanumeric"),
        });
    }
    Ok(())
}

async fn bench(
    State(state): State<AppState>,
    Query(query): Query<BenchQuery>,
) -> Result<Json<BenchReport>> {
    let window = state.bench_window();
    let report = tokio::task::spawn_blocking(move || run_bench(&state, query.target, window))
        .await
        .map_err(|e| ApiError::TaskFailed {
            context: e.to_string(),
        })??;

    tracing::info!(
        bench_target = ?report.target,
        iterations = report.iterations,
        elapsed_ms = report.elapsed_ms,
        "bench finished"
    );
    Ok(Json(report))
}

/// Generates IDs back to back until `window` has elapsed.
///
/// Runs on a blocking thread: the loop never yields.
pub fn run_bench(
    state: &AppState,
    target: BenchTarget,
    window: Duration,
) -> core::result::Result<BenchReport, flakeid::Error> {
    let start = Instant::now();
    let mut iterations = 0u64;

    let last_id = loop {
        let id = match target {
            BenchTarget::Fixed => state.ids().next_id()?.to_string(),
            BenchTarget::Compact => state.sequences().next_sequence()?,
            BenchTarget::Plain => state.sequences().next_id()?.to_string(),
        };
        iterations += 1;
        if start.elapsed() >= window {
            break id;
        }
    };

    Ok(BenchReport {
        target,
        iterations,
        elapsed_ms: start.elapsed().as_millis() as u64,
        id_length: last_id.len(),
        last_id,
    })
}
