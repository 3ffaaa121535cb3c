//! # Storage
//!
//! Typed helpers over the two Soroban storage tiers used by a funding round.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key           | Type          | Description                               |
//! |---------------|---------------|-------------------------------------------|
//! | `Admin`       | `Address`     | Privileged identity                       |
//! | `Config`      | `RoundConfig` | Immutable configuration                   |
//! | `State`       | `RoundState`  | Lifecycle state                           |
//! | `TotalSupply` | `i128`        | Outstanding round tokens                  |
//! | `Raised`      | `i128`        | Principal in custody not yet withdrawn    |
//! | `Entered`     | `bool`        | Reentrancy flag                           |
//! | `Pref`        | `PrefSlot`    | Preferred return commitment, once posted  |
//! | `CarryCount`  | `u32`         | Number of carry rounds posted             |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                   | Type         | Description                    |
//! |-----------------------|--------------|--------------------------------|
//! | `Balance(addr)`       | `i128`       | Round token balance            |
//! | `Claimed(slot, addr)` | `bool`       | Present once `addr` redeemed   |
//! | `Carry(index)`        | `CarryRound` | Posted carry commitment        |
//! | `CarryRoot(root)`     | `u32`        | Root → carry index             |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days
//! remaining. Claim markers and commitments are never removed.

use soroban_sdk::{contracttype, panic_with_error, Address, BytesN, Env};

use crate::types::{CarryRound, PrefSlot, RoundConfig, RoundState, Slot};
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
    Admin,
    Config,
    State,
    TotalSupply,
    Raised,
    Entered,
    Pref,
    CarryCount,
    Balance(Address),
    Claimed(Slot, Address),
    Carry(u32),
    CarryRoot(BytesN<32>),
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

// ── Instance Storage Helpers ─────────────────────────────────────────

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
    bump_instance(env);
}

pub fn get_admin(env: &Env) -> Address {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .unwrap_or_else(|| panic_with_error!(env, Error::InvalidConfig))
}

pub fn set_config(env: &Env, config: &RoundConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    bump_instance(env);
}

pub fn get_config(env: &Env) -> RoundConfig {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .unwrap_or_else(|| panic_with_error!(env, Error::InvalidConfig))
}

pub fn set_state(env: &Env, state: RoundState) {
    env.storage().instance().set(&DataKey::State, &state);
}

pub fn get_state(env: &Env) -> RoundState {
    env.storage()
        .instance()
        .get(&DataKey::State)
        .unwrap_or(RoundState::Pending)
}

pub fn get_total_supply(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalSupply)
        .unwrap_or(0)
}

pub fn set_total_supply(env: &Env, supply: i128) {
    env.storage().instance().set(&DataKey::TotalSupply, &supply);
}

pub fn get_raised(env: &Env) -> i128 {
    env.storage().instance().get(&DataKey::Raised).unwrap_or(0)
}

pub fn set_raised(env: &Env, raised: i128) {
    env.storage().instance().set(&DataKey::Raised, &raised);
}

pub fn is_entered(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Entered)
        .unwrap_or(false)
}

pub fn set_entered(env: &Env, entered: bool) {
    if entered {
        env.storage().instance().set(&DataKey::Entered, &true);
    } else {
        env.storage().instance().remove(&DataKey::Entered);
    }
}

pub fn get_pref(env: &Env) -> Option<PrefSlot> {
    env.storage().instance().get(&DataKey::Pref)
}

pub fn set_pref(env: &Env, slot: &PrefSlot) {
    env.storage().instance().set(&DataKey::Pref, slot);
    bump_instance(env);
}

pub fn get_carry_count(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::CarryCount)
        .unwrap_or(0)
}

// ── Persistent Storage Helpers ───────────────────────────────────────

pub fn get_balance(env: &Env, holder: &Address) -> i128 {
    let key = DataKey::Balance(holder.clone());
    match env.storage().persistent().get::<_, i128>(&key) {
        Some(balance) => {
            bump_persistent(env, &key);
            balance
        }
        None => 0,
    }
}

/// Zero balances are removed rather than stored.
pub fn set_balance(env: &Env, holder: &Address, balance: i128) {
    let key = DataKey::Balance(holder.clone());
    if balance == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &balance);
        bump_persistent(env, &key);
    }
}

pub fn is_claimed(env: &Env, slot: &Slot, claimant: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Claimed(slot.clone(), claimant.clone()))
}

pub fn mark_claimed(env: &Env, slot: &Slot, claimant: &Address) {
    let key = DataKey::Claimed(slot.clone(), claimant.clone());
    env.storage().persistent().set(&key, &true);
    bump_persistent(env, &key);
}

/// Append a carry round and return its index.
pub fn push_carry(env: &Env, root: &BytesN<32>, total_amount: i128) -> u32 {
    let index = get_carry_count(env);
    let round = CarryRound {
        index,
        root: root.clone(),
        total_amount,
        claimed_amount: 0,
    };

    let carry_key = DataKey::Carry(index);
    let root_key = DataKey::CarryRoot(root.clone());
    env.storage().persistent().set(&carry_key, &round);
    env.storage().persistent().set(&root_key, &index);
    bump_persistent(env, &carry_key);
    bump_persistent(env, &root_key);

    env.storage()
        .instance()
        .set(&DataKey::CarryCount, &(index + 1));
    bump_instance(env);
    index
}

pub fn get_carry(env: &Env, index: u32) -> Option<CarryRound> {
    let key = DataKey::Carry(index);
    let round: Option<CarryRound> = env.storage().persistent().get(&key);
    if round.is_some() {
        bump_persistent(env, &key);
    }
    round
}

pub fn set_carry(env: &Env, round: &CarryRound) {
    let key = DataKey::Carry(round.index);
    env.storage().persistent().set(&key, round);
    bump_persistent(env, &key);
}

pub fn get_carry_index(env: &Env, root: &BytesN<32>) -> Option<u32> {
    env.storage()
        .persistent()
        .get(&DataKey::CarryRoot(root.clone()))
}
