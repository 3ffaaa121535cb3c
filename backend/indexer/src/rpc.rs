//! Soroban RPC client: polls `getEvents` and decodes round and treasury events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.
//!
//! ## Value shapes
//!
//! Event values arrive as JSON renderings of `ScVal`s. Depending on the RPC
//! version a scalar may be bare (`"5000"`, `42`), tagged
//! (`{"type":"i128","value":"5000"}`, `{"u32":3}`), or split into
//! `{"hi":..,"lo":..}` halves for 128-bit integers. [`as_text`] flattens all
//! of them.

use std::time::Duration;

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, RecoupmentEvent};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    pub topic: Vec<String>,
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events for every watched contract.
///
/// * `start_ledger`: the ledger sequence to scan from (inclusive).
/// * `cursor`: optional opaque pagination cursor from a previous response.
/// * `limit`: maximum number of events to return.
///
/// Returns `(events, next_cursor, latest_ledger)`.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_ids: &[String],
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<(Vec<RawEvent>, Option<String>, Option<u64>)> {
    let mut backoff = INITIAL_BACKOFF_SECS;
    let params = build_params(contract_ids, start_ledger, cursor, limit);

    loop {
        let response = client
            .post(rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getEvents",
                "params": params,
            }))
            .send()
            .await;

        match response {
            Err(e) => {
                warn!("RPC request failed (will retry in {backoff}s): {e}");
                tokio::time::sleep(Duration::from_secs(backoff)).await;
                backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                continue;
            }
            Ok(resp) => {
                if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    warn!("Rate-limited by RPC (will retry in {backoff}s)");
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }

                let body: RpcResponse = resp.json().await?;

                if let Some(err) = body.error {
                    // Malformed request / unknown method will never succeed on retry.
                    if err.code == -32600 || err.code == -32601 {
                        return Err(IndexerError::Rpc {
                            code: err.code,
                            message: err.message,
                        });
                    }
                    warn!(
                        "RPC soft error (will retry in {backoff}s): {} {}",
                        err.code, err.message
                    );
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }

                let result = body.result.ok_or_else(|| {
                    IndexerError::EventParse("Empty result from getEvents".to_string())
                })?;

                debug!(
                    "Fetched {} events (latest_ledger={:?})",
                    result.events.len(),
                    result.latest_ledger
                );

                return Ok((result.events, result.cursor, result.latest_ledger));
            }
        }
    }
}

fn build_params(
    contract_ids: &[String],
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": contract_ids
            }
        ],
        "pagination": {
            "limit": limit
        }
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode raw RPC events. Events from failed calls, or without a
/// contract id, are dropped.
pub fn decode_events(raw: &[RawEvent]) -> Vec<RecoupmentEvent> {
    raw.iter().filter_map(decode_single).collect()
}

fn decode_single(raw: &RawEvent) -> Option<RecoupmentEvent> {
    if raw.in_successful_contract_call == Some(false) {
        return None;
    }
    let Some(contract_id) = raw.contract_id.clone() else {
        warn!("Skipping event {:?} without contract id", raw.id);
        return None;
    };

    let first_topic = raw.topic.first()?;
    let kind = EventKind::from_topic(&extract_symbol(first_topic));

    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let mut event = RecoupmentEvent {
        event_type: kind.as_str().to_string(),
        contract_id,
        actor: None,
        counterparty: None,
        amount: None,
        slot: None,
        detail: None,
        ledger: raw.ledger.unwrap_or(0) as i64,
        timestamp,
        tx_hash: raw.tx_hash.clone(),
        event_id: raw.id.clone(),
    };
    decode_data(&raw.value, kind, &mut event);

    // `rec_wdr` also carries the investor as its second topic.
    if kind == EventKind::RecoupmentWithdraw && event.actor.is_none() {
        event.actor = raw.topic.get(1).map(|t| extract_symbol(t));
    }

    Some(event)
}

/// Fill the kind-specific columns from the event's data value.
fn decode_data(value: &Value, kind: EventKind, event: &mut RecoupmentEvent) {
    match kind {
        EventKind::Transfer => {
            event.actor = field(value, "from");
            event.counterparty = field(value, "to");
            event.amount = field(value, "amount");
        }
        EventKind::Withdraw => {
            event.actor = field(value, "to");
            event.amount = field(value, "amount");
        }
        EventKind::RecoupmentDeposit => {
            event.slot = value.get("slot").and_then(decode_slot);
            event.detail = value.get("root").and_then(decode_root);
            event.amount = field(value, "amount");
        }
        EventKind::RecoupmentWithdraw => {
            event.actor = field(value, "investor");
            event.amount = field(value, "amount");
            event.slot = Some(match field(value, "round_index") {
                Some(index) => format!("carry:{index}"),
                None => "pref".to_string(),
            });
        }
        EventKind::StateChanged => {
            let from = value.get("from").and_then(variant_name);
            let to = value.get("to").and_then(variant_name);
            if let (Some(from), Some(to)) = (from, to) {
                event.detail = Some(format!("{from}->{to}"));
            }
        }
        EventKind::OwnershipTransferred => {
            event.actor = field(value, "previous_owner");
            event.counterparty = field(value, "new_owner");
        }
        EventKind::RoundAdded | EventKind::RoundRemoved => {
            event.actor = field(value, "by");
            event.counterparty = field(value, "round");
        }
        EventKind::CustodyPull | EventKind::CustodyPush => {
            event.actor = field(value, "round");
            event.counterparty = field(value, "counterparty");
            event.amount = field(value, "amount");
            event.detail = field(value, "token");
        }
        EventKind::Unknown => {}
    }
}

fn field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(as_text)
}

/// Flatten a JSON-rendered scalar into text. `null` and `void` are `None`.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => {
            if let Some(inner) = map.get("value") {
                return as_text(inner);
            }
            if let (Some(hi), Some(lo)) = (map.get("hi"), map.get("lo")) {
                return join_i128(hi, lo).map(|n| n.to_string());
            }
            if map.len() == 1 {
                return map.values().next().and_then(as_text);
            }
            None
        }
        Value::Array(_) => None,
    }
}

/// Rebuild an `i128` from its signed high and unsigned low 64-bit halves.
fn join_i128(hi: &Value, lo: &Value) -> Option<i128> {
    let hi: i64 = as_text(hi)?.parse().ok()?;
    let lo: u64 = as_text(lo)?.parse().ok()?;
    Some(((hi as i128) << 64) | lo as i128)
}

/// Name of a unit-like contract enum variant, rendered either as a bare
/// string or as a vector whose first element is the variant symbol.
fn variant_name(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items.first().and_then(as_text),
        Value::Object(map) if map.len() == 1 => map.values().next().and_then(variant_name),
        other => as_text(other),
    }
}

/// `Slot::Pref` becomes `pref`, `Slot::Carry(n)` becomes `carry:n`.
fn decode_slot(value: &Value) -> Option<String> {
    let items = match value {
        Value::Array(items) => items.clone(),
        Value::Object(map) if map.len() == 1 => {
            return map.values().next().and_then(decode_slot);
        }
        other => vec![other.clone()],
    };
    match as_text(items.first()?)?.as_str() {
        "Pref" => Some("pref".to_string()),
        "Carry" => Some(format!("carry:{}", as_text(items.get(1)?)?)),
        _ => None,
    }
}

/// Render a 32-byte merkle root as lowercase hex. The RPC may hand it over
/// as hex already or base64-encoded.
fn decode_root(value: &Value) -> Option<String> {
    let text = as_text(value)?;
    if text.len() == 64 && hex::decode(&text).is_ok() {
        return Some(text.to_ascii_lowercase());
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(text.as_bytes())
        .ok()?;
    (bytes.len() == 32).then(|| hex::encode(bytes))
}

/// Extract a Soroban Symbol from the topic string.
/// The RPC may return `{"type":"symbol","value":"rec_dep"}` or just the raw string.
fn extract_symbol(raw: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        if let Some(s) = as_text(&v) {
            return s;
        }
    }
    raw.to_string()
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
