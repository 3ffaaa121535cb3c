//! Long-running background task that polls the Soroban RPC and writes
//! decoded round and treasury events to the database.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::db;
use crate::rpc;

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Indexer loop; returns once `shutdown` is cancelled.
pub async fn run(state: Arc<IndexerState>, shutdown: CancellationToken) {
    info!(
        "Indexer starting, contracts: {}",
        state.config.contract_ids.join(", ")
    );

    let (mut current_ledger, mut cursor) = resume_point(&state.pool, &state.config).await;
    info!("Resuming from ledger {current_ledger}");

    loop {
        let result = tokio::select! {
            _ = shutdown.cancelled() => break,
            result = poll_once(
                &state.pool,
                &state.client,
                &state.config,
                current_ledger,
                cursor.as_deref(),
            ) => result,
        };

        match result {
            Ok((next_ledger, next_cursor)) => {
                current_ledger = next_ledger;
                cursor = next_cursor;
            }
            Err(e) => error!("Indexer poll error: {e}"),
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)) => {}
        }
    }

    info!("Indexer stopped at ledger {current_ledger}");
}

/// Ledger and page cursor to start from. A fresh database, or one whose
/// cursor row cannot be read, starts at `START_LEDGER`.
async fn resume_point(pool: &SqlitePool, config: &Config) -> (u32, Option<String>) {
    let stored = async {
        let ledger = db::get_last_ledger(pool).await?;
        let cursor = db::get_cursor_string(pool).await?;
        Ok::<_, crate::errors::IndexerError>((ledger, cursor))
    }
    .await;

    match stored {
        Ok((ledger, cursor)) if ledger > 0 => (ledger as u32, cursor),
        Ok(_) => (config.start_ledger, None),
        Err(e) => {
            error!("Cursor row unreadable, starting at ledger {}: {e}", config.start_ledger);
            (config.start_ledger, None)
        }
    }
}

/// One `getEvents` page: decode, store, then advance the cursor row.
/// Returns the ledger and page cursor for the next call.
async fn poll_once(
    pool: &SqlitePool,
    client: &Client,
    config: &Config,
    start_ledger: u32,
    cursor: Option<&str>,
) -> crate::errors::Result<(u32, Option<String>)> {
    let (raw_events, next_cursor, latest_ledger) = rpc::fetch_events(
        client,
        &config.rpc_url,
        &config.contract_ids,
        start_ledger,
        cursor,
        config.events_per_page,
    )
    .await?;

    if !raw_events.is_empty() {
        let decoded = rpc::decode_events(&raw_events);
        let inserted = db::insert_events(pool, &decoded).await?;
        info!(
            "Stored {inserted} of {} round/treasury events",
            raw_events.len()
        );
    }

    // While a page cursor is set, `startLedger` is not sent.
    let next_ledger = latest_ledger
        .map(|l| (l as u32).max(start_ledger))
        .unwrap_or(start_ledger);

    // Written after the insert commits; a crash in between replays the page,
    // which the event-id index absorbs.
    db::save_cursor(pool, next_ledger as i64, next_cursor.as_deref()).await?;

    Ok((next_ledger, next_cursor))
}
