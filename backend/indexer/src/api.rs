//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::error;

use crate::db;
use crate::errors::IndexerError;
use crate::events::{EventRecord, Holder};

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
    pub contract_ids: Vec<String>,
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RoundEventsResponse {
    pub contract_id: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct HoldersResponse {
    pub contract_id: String,
    pub count: usize,
    pub holders: Vec<Holder>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub contracts: Vec<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn internal_error(e: IndexerError) -> Response {
    error!("API query failed: {e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        contracts: state.contract_ids.clone(),
    })
}

/// `GET /events`
///
/// Returns every indexed event across all watched contracts.
pub async fn get_all_events(State(state): State<Arc<ApiState>>) -> Response {
    match db::get_all_events(&state.pool).await {
        Ok(events) => {
            let count = events.len();
            (StatusCode::OK, Json(AllEventsResponse { count, events })).into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// `GET /rounds/:contract_id/events`
pub async fn get_round_events(
    State(state): State<Arc<ApiState>>,
    Path(contract_id): Path<String>,
) -> Response {
    match db::get_events_for_contract(&state.pool, &contract_id).await {
        Ok(events) => {
            let count = events.len();
            (
                StatusCode::OK,
                Json(RoundEventsResponse {
                    contract_id,
                    count,
                    events,
                }),
            )
                .into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// `GET /rounds/:contract_id/holders`
///
/// Current token balances of a round, the input for building a
/// distribution.
pub async fn get_round_holders(
    State(state): State<Arc<ApiState>>,
    Path(contract_id): Path<String>,
) -> Response {
    match db::get_holders(&state.pool, &contract_id).await {
        Ok(holders) => {
            let count = holders.len();
            (
                StatusCode::OK,
                Json(HoldersResponse {
                    contract_id,
                    count,
                    holders,
                }),
            )
                .into_response()
        }
        Err(e) => internal_error(e),
    }
}
