//! # Treasury Contract
//!
//! Shared custody of quote assets on behalf of a registry of funding rounds.
//!
//! | Phase        | Entry Point(s)                                         |
//! |--------------|--------------------------------------------------------|
//! | Bootstrap    | constructor (`owner`)                                  |
//! | Registry     | `add_funding_contract`, `remove_funding_contract`      |
//! | Custody      | [`Treasury::pull`], [`Treasury::push`]                 |
//! | Ownership    | `transfer_ownership`                                   |
//! | Queries      | `owner`, `is_funding_contract`, `balance`              |
//!
//! ## Trust model
//!
//! The Treasury keeps no per-round sub-ledger. Any registered round may move
//! custody up to what its own bookkeeping permits; removing a round only
//! revokes future `pull`/`push` authorization and leaves custodied funds in
//! place. Per-round entitlement lives entirely in each round's token balances
//! and distribution slots.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, panic_with_error, token, Address, Env};

mod events;
mod storage;


pub use events::{CustodyMoved, OwnershipTransferred, RegistryChanged};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    NotAuthorized         = 1,
    NotRegistered         = 2,
    InsufficientAllowance = 3,
    InsufficientBalance   = 4,
    InvalidAmount         = 5,
}

#[contract]
pub struct Treasury;

/// Load the owner and check that `caller` is it.
fn require_owner(env: &Env, caller: &Address) {
    caller.require_auth();
    if *caller != storage::get_owner(env) {
        panic_with_error!(env, Error::NotAuthorized);
    }
}

/// Gate for the custody primitives: the invoking round must authorize and
/// be present in the registry.
fn require_registered_round(env: &Env, round: &Address) {
    round.require_auth();
    if !storage::is_registered(env, round) {
        panic_with_error!(env, Error::NotRegistered);
    }
}

#[contractimpl]
impl Treasury {
    pub fn __constructor(env: Env, owner: Address) {
        storage::set_owner(&env, &owner);
    }

    // ─────────────────────────────────────────────────────────
    // Registry
    // ─────────────────────────────────────────────────────────

    /// Authorize `round` to pull into and push out of custody.
    pub fn add_funding_contract(env: Env, caller: Address, round: Address) {
        require_owner(&env, &caller);
        storage::register_round(&env, &round);
        events::emit_round_added(&env, round, caller);
    }

    /// Revoke `round`'s custody authorization. Funds already custodied on
    /// its behalf are untouched.
    pub fn remove_funding_contract(env: Env, caller: Address, round: Address) {
        require_owner(&env, &caller);
        storage::unregister_round(&env, &round);
        events::emit_round_removed(&env, round, caller);
    }

    pub fn is_funding_contract(env: Env, round: Address) -> bool {
        storage::is_registered(&env, &round)
    }

    // ─────────────────────────────────────────────────────────
    // Custody
    // ─────────────────────────────────────────────────────────

    /// Move `amount` of `token` from `from` into custody.
    ///
    /// Uses the allowance `from` granted to the Treasury, so the investor
    /// approves the Treasury once and every registered round can pull
    /// against that approval while executing its own entry point.
    pub fn pull(env: Env, round: Address, token: Address, from: Address, amount: i128) {
        require_registered_round(&env, &round);
        if amount <= 0 {
            panic_with_error!(&env, Error::InvalidAmount);
        }

        let custody = env.current_contract_address();
        let client = token::Client::new(&env, &token);
        if client.allowance(&from, &custody) < amount {
            panic_with_error!(&env, Error::InsufficientAllowance);
        }
        if client.balance(&from) < amount {
            panic_with_error!(&env, Error::InsufficientBalance);
        }

        client.transfer_from(&custody, &from, &custody, &amount);
        events::emit_pulled(&env, round, token, from, amount);
    }

    /// Move `amount` of `token` out of custody to `to`.
    pub fn push(env: Env, round: Address, token: Address, to: Address, amount: i128) {
        require_registered_round(&env, &round);
        if amount <= 0 {
            panic_with_error!(&env, Error::InvalidAmount);
        }

        let custody = env.current_contract_address();
        let client = token::Client::new(&env, &token);
        if client.balance(&custody) < amount {
            panic_with_error!(&env, Error::InsufficientBalance);
        }

        client.transfer(&custody, &to, &amount);
        events::emit_pushed(&env, round, token, to, amount);
    }

    /// Custody balance of `token` across every round.
    pub fn balance(env: Env, token: Address) -> i128 {
        token::Client::new(&env, &token).balance(&env.current_contract_address())
    }

    // ─────────────────────────────────────────────────────────
    // Ownership
    // ─────────────────────────────────────────────────────────

    pub fn owner(env: Env) -> Address {
        storage::get_owner(&env)
    }

    pub fn transfer_ownership(env: Env, caller: Address, new_owner: Address) {
        require_owner(&env, &caller);
        storage::set_owner(&env, &new_owner);
        events::emit_ownership_transferred(&env, caller, new_owner);
    }
}
