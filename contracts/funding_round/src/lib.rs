//! # Funding Round Contract
//!
//! One pooled-investment offering. Investors contribute a quote asset and
//! receive round tokens at a fixed price; after the round closes the admin
//! withdraws the principal and later settles preferred return and carry
//! through merkle-committed distributions that each investor redeems
//! themselves.
//!
//! | Phase         | Entry Point(s)                                        |
//! |---------------|-------------------------------------------------------|
//! | Bootstrap     | constructor                                           |
//! | Lifecycle     | `open`, `close`, `cancel`                             |
//! | Funding       | [`FundingRound::fund`], [`FundingRound::refund`]      |
//! | Principal     | [`FundingRound::withdraw`]                            |
//! | Distribution  | `deposit_pref`, `deposit_carry`, `withdraw_pref`, `withdraw_carry` |
//! | Ownership     | `transfer_ownership`                                  |
//! | Queries       | `state`, `total_supply`, `balance`, `pref_slot`, `carry_round`, ... |
//!
//! ## Architecture
//!
//! Custody lives in the shared Treasury contract ([`custody`]); this
//! contract only keeps token balances and distribution slots. Merkle
//! verification lives in [`merkle`] and the deposit/claim protocol built on
//! it in [`commitment`]. Every entry point that moves value out of custody
//! is wrapped in [`guard`] and commits its bookkeeping before calling the
//! Treasury.

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

use soroban_sdk::{
    contract, contracterror, contractimpl, panic_with_error, token, Address, BytesN, Env, String,
    Vec,
};

mod access;
mod commitment;
mod custody;
mod events;
mod guard;
pub mod math;
pub mod merkle;
mod storage;
mod types;

#[cfg(test)]
mod merkle_builder;
#[cfg(test)]
mod test_commitment;

pub use events::{
    OwnershipTransferred, RecoupmentDeposit, RecoupmentWithdraw, StateChanged, Transfer, Withdraw,
};
pub use types::{CarryRound, PrefSlot, RoundConfig, RoundState, Slot};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    StateError            = 1,
    NotAuthorized         = 2,
    ProofFailed           = 3,
    AlreadyClaimed        = 4,
    AlreadyDeposited      = 5,
    InsufficientAllowance = 6,
    InsufficientBalance   = 7,
    ReentrancyDetected    = 8,
    InvalidAmount         = 9,
    InvalidConfig         = 10,
    NotDeposited          = 11,
    CarryRoundNotFound    = 12,
    Overflow              = 13,
}

#[contract]
pub struct FundingRound;

fn require_state(env: &Env, expected: RoundState) {
    if storage::get_state(env) != expected {
        panic_with_error!(env, Error::StateError);
    }
}

fn transition(env: &Env, allowed: &[RoundState], to: RoundState) {
    let from = storage::get_state(env);
    if !allowed.contains(&from) {
        panic_with_error!(env, Error::StateError);
    }
    storage::set_state(env, to);
    events::emit_state_changed(env, from, to);
}

fn checked(env: &Env, value: Option<i128>) -> i128 {
    value.unwrap_or_else(|| panic_with_error!(env, Error::Overflow))
}

/// Preferred return owed on the whole outstanding supply.
fn pref_total(env: &Env, config: &RoundConfig) -> i128 {
    let principal = checked(
        env,
        math::quote_for(storage::get_total_supply(env), config.token_price),
    );
    checked(env, math::with_return(principal, config.return_basis_points))
}

#[contractimpl]
impl FundingRound {
    /// Deploy the round in `Pending`.
    ///
    /// - `token_price` is the quote price of one round token, scaled by 10^8.
    /// - `return_basis_points` is the preferred return hurdle (1000 = 10%).
    pub fn __constructor(
        env: Env,
        admin: Address,
        name: String,
        symbol: String,
        token: Address,
        treasury: Address,
        token_price: i128,
        return_basis_points: u32,
    ) {
        if token_price <= 0 {
            panic_with_error!(&env, Error::InvalidConfig);
        }

        storage::set_admin(&env, &admin);
        storage::set_config(
            &env,
            &RoundConfig {
                name,
                symbol,
                token,
                treasury,
                token_price,
                return_basis_points,
            },
        );
        storage::set_state(&env, RoundState::Pending);
    }

    // ─────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────

    pub fn open(env: Env, caller: Address) {
        access::require_admin(&env, &caller);
        transition(&env, &[RoundState::Pending], RoundState::Open);
    }

    pub fn close(env: Env, caller: Address) {
        access::require_admin(&env, &caller);
        transition(&env, &[RoundState::Open], RoundState::Closed);
    }

    /// Abort the round. Further funding is rejected and refunds open up.
    pub fn cancel(env: Env, caller: Address) {
        access::require_admin(&env, &caller);
        transition(
            &env,
            &[RoundState::Pending, RoundState::Open],
            RoundState::Cancelled,
        );
    }

    // ─────────────────────────────────────────────────────────
    // Funding
    // ─────────────────────────────────────────────────────────

    /// Contribute `amount` of the quote asset and receive
    /// `floor(amount * 10^8 / token_price)` round tokens.
    ///
    /// The investor must have approved the Treasury for at least `amount`.
    /// Returns the number of tokens minted.
    pub fn fund(env: Env, investor: Address, amount: i128) -> i128 {
        investor.require_auth();
        require_state(&env, RoundState::Open);
        if amount <= 0 {
            panic_with_error!(&env, Error::InvalidAmount);
        }

        let config = storage::get_config(&env);
        let minted = checked(&env, math::tokens_for(amount, config.token_price));
        if minted == 0 {
            panic_with_error!(&env, Error::InvalidAmount);
        }

        let balance = storage::get_balance(&env, &investor);
        storage::set_balance(&env, &investor, checked(&env, balance.checked_add(minted)));
        let supply = storage::get_total_supply(&env);
        storage::set_total_supply(&env, checked(&env, supply.checked_add(minted)));
        let raised = storage::get_raised(&env);
        storage::set_raised(&env, checked(&env, raised.checked_add(amount)));

        custody::pull(&env, &config, &investor, amount);

        events::emit_mint(&env, investor, minted);
        minted
    }

    /// Burn the investor's whole balance in a cancelled round and return
    /// `floor(balance * token_price / 10^8)` of the quote asset.
    ///
    /// A zero balance is a no-op returning 0.
    pub fn refund(env: Env, investor: Address) -> i128 {
        investor.require_auth();
        require_state(&env, RoundState::Cancelled);

        let balance = storage::get_balance(&env, &investor);
        if balance == 0 {
            return 0;
        }

        guard::enter(&env);
        let config = storage::get_config(&env);
        let payout = checked(&env, math::quote_for(balance, config.token_price));

        storage::set_balance(&env, &investor, 0);
        let supply = storage::get_total_supply(&env);
        storage::set_total_supply(&env, supply - balance);
        let raised = storage::get_raised(&env);
        storage::set_raised(&env, checked(&env, raised.checked_sub(payout)));

        if payout > 0 {
            custody::push(&env, &config, &investor, payout);
        }

        events::emit_burn(&env, investor, balance);
        guard::exit(&env);
        payout
    }

    /// Send the round's whole raised principal to the admin.
    ///
    /// Round tokens stay outstanding; they are what later distributions are
    /// computed against.
    pub fn withdraw(env: Env, caller: Address) -> i128 {
        access::require_admin(&env, &caller);
        require_state(&env, RoundState::Closed);

        guard::enter(&env);
        let amount = storage::get_raised(&env);
        if amount == 0 {
            panic_with_error!(&env, Error::StateError);
        }
        storage::set_raised(&env, 0);

        let config = storage::get_config(&env);
        custody::push(&env, &config, &caller, amount);

        events::emit_withdraw(&env, caller, amount);
        guard::exit(&env);
        amount
    }

    // ─────────────────────────────────────────────────────────
    // Distributions
    // ─────────────────────────────────────────────────────────

    /// Post the preferred return distribution. Single-shot.
    ///
    /// The committed total is computed here as principal plus the return
    /// hurdle on the whole supply; `proof` must link the `(this round, total)`
    /// sentinel leaf to `root`. The admin must have approved the Treasury
    /// for the total. Returns the total deposited.
    pub fn deposit_pref(env: Env, caller: Address, root: BytesN<32>, proof: Vec<BytesN<32>>) -> i128 {
        access::require_admin(&env, &caller);
        require_state(&env, RoundState::Closed);
        if storage::get_pref(&env).is_some() {
            panic_with_error!(&env, Error::AlreadyDeposited);
        }

        let config = storage::get_config(&env);
        let total = pref_total(&env, &config);
        if total <= 0 {
            panic_with_error!(&env, Error::InvalidAmount);
        }
        commitment::check_sentinel(&env, &root, &proof, total);

        storage::set_pref(
            &env,
            &PrefSlot {
                root: root.clone(),
                total_amount: total,
                claimed_amount: 0,
            },
        );
        custody::pull(&env, &config, &caller, total);

        events::emit_recoupment_deposit(&env, Slot::Pref, root, total);
        total
    }

    /// Append a carry distribution committing `total_amount`.
    ///
    /// Roots are unique across carry rounds. Returns the new round's index.
    pub fn deposit_carry(
        env: Env,
        caller: Address,
        root: BytesN<32>,
        proof: Vec<BytesN<32>>,
        total_amount: i128,
    ) -> u32 {
        access::require_admin(&env, &caller);
        require_state(&env, RoundState::Closed);
        if total_amount <= 0 {
            panic_with_error!(&env, Error::InvalidAmount);
        }
        if storage::get_carry_index(&env, &root).is_some() {
            panic_with_error!(&env, Error::AlreadyDeposited);
        }
        commitment::check_sentinel(&env, &root, &proof, total_amount);

        let index = storage::push_carry(&env, &root, total_amount);
        let config = storage::get_config(&env);
        custody::pull(&env, &config, &caller, total_amount);

        events::emit_recoupment_deposit(&env, Slot::Carry(index), root, total_amount);
        index
    }

    /// Redeem the investor's preferred return entry `(investor, amount)`.
    pub fn withdraw_pref(env: Env, investor: Address, proof: Vec<BytesN<32>>, amount: i128) {
        investor.require_auth();
        if storage::get_pref(&env).is_none() {
            panic_with_error!(&env, Error::NotDeposited);
        }

        guard::enter(&env);
        let config = storage::get_config(&env);
        commitment::claim(&env, &config, &Slot::Pref, &investor, &proof, amount);

        events::emit_recoupment_withdraw(&env, investor, amount, None);
        guard::exit(&env);
    }

    /// Redeem the investor's entry in the carry round committed to `root`.
    /// Returns that carry round's index.
    pub fn withdraw_carry(
        env: Env,
        investor: Address,
        root: BytesN<32>,
        proof: Vec<BytesN<32>>,
        amount: i128,
    ) -> u32 {
        investor.require_auth();
        let index = storage::get_carry_index(&env, &root)
            .unwrap_or_else(|| panic_with_error!(&env, Error::CarryRoundNotFound));

        guard::enter(&env);
        let config = storage::get_config(&env);
        commitment::claim(
            &env,
            &config,
            &Slot::Carry(index),
            &investor,
            &proof,
            amount,
        );

        events::emit_recoupment_withdraw(&env, investor, amount, Some(index));
        guard::exit(&env);
        index
    }

    // ─────────────────────────────────────────────────────────
    // Ownership
    // ─────────────────────────────────────────────────────────

    pub fn transfer_ownership(env: Env, caller: Address, new_admin: Address) {
        let previous = access::transfer(&env, &caller, &new_admin);
        events::emit_ownership_transferred(&env, previous, new_admin);
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn admin(env: Env) -> Address {
        storage::get_admin(&env)
    }

    pub fn name(env: Env) -> String {
        storage::get_config(&env).name
    }

    pub fn symbol(env: Env) -> String {
        storage::get_config(&env).symbol
    }

    /// Round tokens share the quote asset's decimals: at a price of 10^8 one
    /// token is one quote unit.
    pub fn decimals(env: Env) -> u32 {
        token::Client::new(&env, &storage::get_config(&env).token).decimals()
    }

    pub fn config(env: Env) -> RoundConfig {
        storage::get_config(&env)
    }

    pub fn state(env: Env) -> RoundState {
        storage::get_state(&env)
    }

    pub fn total_supply(env: Env) -> i128 {
        storage::get_total_supply(&env)
    }

    pub fn balance(env: Env, holder: Address) -> i128 {
        storage::get_balance(&env, &holder)
    }

    /// Principal in custody that `withdraw` would send to the admin.
    pub fn raised(env: Env) -> i128 {
        storage::get_raised(&env)
    }

    /// Total a `deposit_pref` call would commit right now.
    pub fn pref_amount(env: Env) -> i128 {
        let config = storage::get_config(&env);
        pref_total(&env, &config)
    }

    pub fn pref_slot(env: Env) -> Option<PrefSlot> {
        storage::get_pref(&env)
    }

    pub fn pref_claimed(env: Env, investor: Address) -> bool {
        storage::is_claimed(&env, &Slot::Pref, &investor)
    }

    pub fn carry_round_count(env: Env) -> u32 {
        storage::get_carry_count(&env)
    }

    pub fn carry_round(env: Env, index: u32) -> CarryRound {
        storage::get_carry(&env, index)
            .unwrap_or_else(|| panic_with_error!(&env, Error::CarryRoundNotFound))
    }

    pub fn carry_index(env: Env, root: BytesN<32>) -> Option<u32> {
        storage::get_carry_index(&env, &root)
    }

    pub fn carry_claimed(env: Env, index: u32, investor: Address) -> bool {
        storage::is_claimed(&env, &Slot::Carry(index), &investor)
    }
}
