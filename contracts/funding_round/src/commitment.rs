//! # Distribution commitments
//!
//! A distribution is an off-chain list of `(investor, amount)` entries plus
//! one sentinel entry `(round, total)`, hashed into a sorted-pair merkle
//! tree. Posting a distribution and redeeming from it run through the same
//! [`merkle::verify`] routine:
//!
//! - [`check_sentinel`] proves at deposit time that the root commits to
//!   exactly the total being pulled into custody, bound to this round's own
//!   address so a root built for another round or another total is rejected.
//! - [`claim`] proves at withdrawal time that `(investor, amount)` is one of
//!   the committed entries, records the claim, then pays out. Payouts from
//!   one distribution are capped at its committed total.
//!
//! The contract never holds or iterates the investor set; every call costs
//! O(log N) hashes. Duplicate entries for one address must be merged by the
//! builder, since only the first matching claim per slot can succeed.

use soroban_sdk::{panic_with_error, Address, BytesN, Env, Vec};

use crate::types::{CarryRound, PrefSlot, RoundConfig, Slot};
use crate::{custody, merkle, storage, Error};

/// Panic with `ProofFailed` unless `proof` links the `(this round, total)`
/// sentinel leaf to `root`.
pub fn check_sentinel(env: &Env, root: &BytesN<32>, proof: &Vec<BytesN<32>>, total: i128) {
    let sentinel = merkle::leaf_hash(env, &env.current_contract_address(), total);
    if !merkle::verify(env, proof, root, sentinel) {
        panic_with_error!(env, Error::ProofFailed);
    }
}

/// A posted distribution together with its payout bookkeeping.
enum Posted {
    Pref(PrefSlot),
    Carry(CarryRound),
}

impl Posted {
    fn load(env: &Env, slot: &Slot) -> Self {
        match slot {
            Slot::Pref => Posted::Pref(
                storage::get_pref(env)
                    .unwrap_or_else(|| panic_with_error!(env, Error::NotDeposited)),
            ),
            Slot::Carry(index) => Posted::Carry(
                storage::get_carry(env, *index)
                    .unwrap_or_else(|| panic_with_error!(env, Error::CarryRoundNotFound)),
            ),
        }
    }

    fn root(&self) -> &BytesN<32> {
        match self {
            Posted::Pref(pref) => &pref.root,
            Posted::Carry(carry) => &carry.root,
        }
    }

    /// Amount still payable from this distribution.
    fn remaining(&self) -> i128 {
        match self {
            Posted::Pref(pref) => pref.total_amount - pref.claimed_amount,
            Posted::Carry(carry) => carry.total_amount - carry.claimed_amount,
        }
    }

    fn record_payout(self, env: &Env, amount: i128) {
        match self {
            Posted::Pref(mut pref) => {
                pref.claimed_amount += amount;
                storage::set_pref(env, &pref);
            }
            Posted::Carry(mut carry) => {
                carry.claimed_amount += amount;
                storage::set_carry(env, &carry);
            }
        }
    }
}

/// Redeem `amount` for `investor` from the distribution posted in `slot`.
///
/// A payout never exceeds what the distribution still holds, so a faulty
/// tree cannot reach custody backing other rounds. The claim marker and the
/// payout total are written before the Treasury transfer.
pub fn claim(
    env: &Env,
    config: &RoundConfig,
    slot: &Slot,
    investor: &Address,
    proof: &Vec<BytesN<32>>,
    amount: i128,
) {
    let posted = Posted::load(env, slot);
    if amount <= 0 {
        panic_with_error!(env, Error::InvalidAmount);
    }
    if storage::is_claimed(env, slot, investor) {
        panic_with_error!(env, Error::AlreadyClaimed);
    }
    let leaf = merkle::leaf_hash(env, investor, amount);
    if !merkle::verify(env, proof, posted.root(), leaf) {
        panic_with_error!(env, Error::ProofFailed);
    }
    if amount > posted.remaining() {
        panic_with_error!(env, Error::InsufficientBalance);
    }

    storage::mark_claimed(env, slot, investor);
    posted.record_payout(env, amount);
    custody::push(env, config, investor, amount);
}
