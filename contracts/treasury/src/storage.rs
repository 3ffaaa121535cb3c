//! # Storage
//!
//! Typed helpers over the two Soroban storage tiers used by the Treasury.
//!
//! | Key            | Tier       | Type      | Description                       |
//! |----------------|------------|-----------|-----------------------------------|
//! | `Owner`        | Instance   | `Address` | Registry owner                    |
//! | `Round(addr)`  | Persistent | `bool`    | Present while `addr` is registered |
//!
//! Instance TTL is bumped by 7 days whenever it falls below 1 day remaining;
//! registry entries are bumped by 30 days whenever they fall below 7 days.

use soroban_sdk::{contracttype, panic_with_error, Address, Env};

use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Registry owner (Instance).
    Owner,
    /// Authorized funding round (Persistent).
    Round(Address),
}

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

// ── Owner ────────────────────────────────────────────────────────────

pub fn set_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&DataKey::Owner, owner);
    bump_instance(env);
}

/// Panics with `Error::NotAuthorized` if the contract was never constructed.
pub fn get_owner(env: &Env) -> Address {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Owner)
        .unwrap_or_else(|| panic_with_error!(env, Error::NotAuthorized))
}

// ── Registry ─────────────────────────────────────────────────────────

pub fn register_round(env: &Env, round: &Address) {
    let key = DataKey::Round(round.clone());
    env.storage().persistent().set(&key, &true);
    bump_persistent(env, &key);
}

pub fn unregister_round(env: &Env, round: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::Round(round.clone()));
}

pub fn is_registered(env: &Env, round: &Address) -> bool {
    let key = DataKey::Round(round.clone());
    let registered = env.storage().persistent().has(&key);
    if registered {
        bump_persistent(env, &key);
    }
    registered
}
