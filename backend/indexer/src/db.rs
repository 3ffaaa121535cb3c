//! SQLite persistence for events and the resume cursor.

use std::collections::BTreeMap;

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, EventRecord, Holder, RecoupmentEvent};

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };
    // Create the file on first start.
    let url = if url.contains("mode=") || url.contains(":memory:") {
        url
    } else if url.contains('?') {
        format!("{url}&mode=rwc")
    } else {
        format!("{url}?mode=rwc")
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Cursor helpers
// ─────────────────────────────────────────────────────────

/// Read the last-seen ledger from the cursor row.
/// Returns `0` when no cursor has been persisted yet.
pub async fn get_last_ledger(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT last_ledger FROM indexer_cursor WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(v,)| v).unwrap_or(0))
}

/// Persist the last-seen ledger (and optionally a pagination cursor string).
pub async fn save_cursor(
    pool: &SqlitePool,
    last_ledger: i64,
    last_cursor: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE indexer_cursor SET last_ledger = ?1, last_cursor = ?2 WHERE id = 1")
        .bind(last_ledger)
        .bind(last_cursor)
        .execute(pool)
        .await?;
    Ok(())
}

/// Read back the raw cursor string (used to resume pagination mid-ledger).
pub async fn get_cursor_string(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|(v,)| v))
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Persist a batch of decoded events in one transaction. Events whose RPC
/// id is already stored are ignored, so replaying a page is harmless.
pub async fn insert_events(pool: &SqlitePool, events: &[RecoupmentEvent]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;
    for ev in events {
        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_id, event_type, contract_id, actor, counterparty, amount,
                 slot, detail, ledger, timestamp, tx_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&ev.event_id)
        .bind(&ev.event_type)
        .bind(&ev.contract_id)
        .bind(&ev.actor)
        .bind(&ev.counterparty)
        .bind(&ev.amount)
        .bind(&ev.slot)
        .bind(&ev.detail)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.tx_hash)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        count += rows_affected as usize;
    }
    tx.commit().await?;
    Ok(count)
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Fetch all events emitted by one contract, ordered by ledger ascending.
pub async fn get_events_for_contract(
    pool: &SqlitePool,
    contract_id: &str,
) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_type, contract_id, actor, counterparty, amount, slot,
               detail, ledger, timestamp, tx_hash, created_at
        FROM   events
        WHERE  contract_id = ?1
        ORDER  BY ledger ASC, id ASC
        "#,
    )
    .bind(contract_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch all events, ordered by ledger ascending.
pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_type, contract_id, actor, counterparty, amount, slot,
               detail, ledger, timestamp, tx_hash, created_at
        FROM   events
        ORDER  BY ledger ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Current round token holders of one round, folded from its `transfer`
/// records. Holders whose balance went back to zero are omitted.
pub async fn get_holders(pool: &SqlitePool, contract_id: &str) -> Result<Vec<Holder>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_type, contract_id, actor, counterparty, amount, slot,
               detail, ledger, timestamp, tx_hash, created_at
        FROM   events
        WHERE  contract_id = ?1 AND event_type = ?2
        ORDER  BY ledger ASC, id ASC
        "#,
    )
    .bind(contract_id)
    .bind(EventKind::Transfer.as_str())
    .fetch_all(pool)
    .await?;
    fold_holders(&rows)
}

/// Mints (no `actor`) credit the `counterparty`; burns (no `counterparty`)
/// debit the `actor`.
pub fn fold_holders(transfers: &[EventRecord]) -> Result<Vec<Holder>> {
    let mut balances: BTreeMap<String, i128> = BTreeMap::new();
    for record in transfers {
        let raw = record.amount.as_deref().unwrap_or("0");
        let amount: i128 = raw.parse().map_err(|_| IndexerError::Amount {
            id: record.id,
            value: raw.to_string(),
        })?;

        match (&record.actor, &record.counterparty) {
            (None, Some(to)) => *balances.entry(to.clone()).or_default() += amount,
            (Some(from), None) => *balances.entry(from.clone()).or_default() -= amount,
            // Holder-to-holder moves do not exist on the round token.
            _ => {}
        }
    }

    Ok(balances
        .into_iter()
        .filter(|(_, balance)| *balance != 0)
        .map(|(address, balance)| Holder {
            address,
            balance: balance.to_string(),
        })
        .collect())
}

// ─────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────
