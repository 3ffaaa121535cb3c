//! # Types
//!
//! Shared data structures of the funding round.
//!
//! ## Lifecycle
//!
//! [`RoundState`] is a forward-only state machine:
//!
//! ```text
//! Pending ──► Open ──► Closed
//!    │          │
//!    └──────────┴────► Cancelled
//! ```
//!
//! `Closed` and `Cancelled` are terminal. Funding is only accepted in `Open`,
//! refunds only in `Cancelled`, principal withdrawal and distribution
//! deposits only in `Closed`.

use soroban_sdk::{contracttype, Address, BytesN, String};

/// Lifecycle state of the round.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoundState {
    /// Deployed, not yet accepting contributions.
    Pending,
    /// Accepting contributions.
    Open,
    /// Funding finished; principal can be withdrawn and returns distributed.
    Closed,
    /// Aborted; investors can refund their contributions.
    Cancelled,
}

/// Immutable round configuration, written once by the constructor.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundConfig {
    /// Round token name.
    pub name: String,
    /// Round token ticker.
    pub symbol: String,
    /// Quote asset contributed by investors.
    pub token: Address,
    /// Treasury holding custody of the quote asset.
    pub treasury: Address,
    /// Price of one round token in quote units, fixed-point scaled by 10^8.
    pub token_price: i128,
    /// Preferred return hurdle in basis points (10_000 = 100%).
    pub return_basis_points: u32,
}

/// The single-shot preferred return distribution.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrefSlot {
    pub root: BytesN<32>,
    pub total_amount: i128,
    /// Sum paid out so far; never exceeds `total_amount`.
    pub claimed_amount: i128,
}

/// One entry of the append-only carry distribution sequence.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CarryRound {
    pub index: u32,
    pub root: BytesN<32>,
    pub total_amount: i128,
    /// Sum paid out so far; never exceeds `total_amount`.
    pub claimed_amount: i128,
}

/// Addresses one distribution slot for claim bookkeeping.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Slot {
    Pref,
    Carry(u32),
}
