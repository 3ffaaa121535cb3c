//! Event types emitted by the `funding_round` and `treasury` contracts.
//!
//! These mirror `contracts/funding_round/src/events.rs` and
//! `contracts/treasury/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Round tokens minted (`from` empty) or burned (`to` empty).
    Transfer,
    /// Raised principal sent to the admin.
    Withdraw,
    /// A distribution was committed and funded (`rec_dep` topic).
    RecoupmentDeposit,
    /// An investor claimed from a distribution (`rec_wdr` topic).
    RecoupmentWithdraw,
    /// Lifecycle transition of a round.
    StateChanged,
    /// Round admin or treasury owner handed over (`own_xfer` topic).
    OwnershipTransferred,
    /// A round was registered with the treasury.
    RoundAdded,
    /// A round was removed from the treasury registry.
    RoundRemoved,
    /// Funds entered custody on behalf of a round.
    CustodyPull,
    /// Funds left custody on behalf of a round.
    CustodyPush,
    /// An event from a watched contract that we don't recognise.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "transfer" => Self::Transfer,
            "withdraw" => Self::Withdraw,
            "rec_dep" => Self::RecoupmentDeposit,
            "rec_wdr" => Self::RecoupmentWithdraw,
            "state" => Self::StateChanged,
            "own_xfer" => Self::OwnershipTransferred,
            "added" => Self::RoundAdded,
            "removed" => Self::RoundRemoved,
            "pull" => Self::CustodyPull,
            "push" => Self::CustodyPush,
            _ => Self::Unknown,
        }
    }

    /// Identifier stored in the `event_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Withdraw => "withdraw",
            Self::RecoupmentDeposit => "recoupment_deposit",
            Self::RecoupmentWithdraw => "recoupment_withdraw",
            Self::StateChanged => "state_changed",
            Self::OwnershipTransferred => "ownership_transferred",
            Self::RoundAdded => "round_added",
            Self::RoundRemoved => "round_removed",
            Self::CustodyPull => "custody_pull",
            Self::CustodyPush => "custody_push",
            Self::Unknown => "unknown",
        }
    }
}

/// A decoded event, ready to be stored.
///
/// Column meaning depends on the kind:
///
/// | kind                    | actor          | counterparty | slot           | detail          |
/// |-------------------------|----------------|--------------|----------------|-----------------|
/// | `transfer`              | from (burn)    | to (mint)    |                |                 |
/// | `withdraw`              | recipient      |              |                |                 |
/// | `recoupment_deposit`    |                |              | `pref`/`carry:N` | root (hex)    |
/// | `recoupment_withdraw`   | investor       |              | `pref`/`carry:N` |               |
/// | `state_changed`         |                |              |                | `From->To`      |
/// | `ownership_transferred` | previous owner | new owner    |                |                 |
/// | `round_added`/`removed` | owner          | round        |                |                 |
/// | `custody_pull`/`push`   | round          | from / to    |                | token           |
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecoupmentEvent {
    pub event_type: String,
    pub contract_id: String,
    pub actor: Option<String>,
    pub counterparty: Option<String>,
    pub amount: Option<String>,
    pub slot: Option<String>,
    pub detail: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub tx_hash: Option<String>,
    /// RPC event id; unique per event, used for idempotent inserts.
    pub event_id: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_type: String,
    pub contract_id: String,
    pub actor: Option<String>,
    pub counterparty: Option<String>,
    pub amount: Option<String>,
    pub slot: Option<String>,
    pub detail: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

/// Round token balance of one investor, folded from `transfer` records.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Holder {
    pub address: String,
    /// Decimal string; token amounts are `i128` on-chain.
    pub balance: String,
}
