//! Calls into the Treasury that holds this round's quote asset.

use soroban_sdk::{contractclient, panic_with_error, token, Address, Env};

use crate::types::RoundConfig;
use crate::Error;

#[allow(dead_code)]
#[contractclient(name = "TreasuryClient")]
pub trait TreasuryInterface {
    fn pull(env: Env, round: Address, token: Address, from: Address, amount: i128);
    fn push(env: Env, round: Address, token: Address, to: Address, amount: i128);
    fn balance(env: Env, token: Address) -> i128;
}

/// Move `amount` from `from` into Treasury custody. Checked here so a
/// short investor fails with this round's codes, not the Treasury's.
pub fn pull(env: &Env, config: &RoundConfig, from: &Address, amount: i128) {
    let quote = token::Client::new(env, &config.token);
    if quote.allowance(from, &config.treasury) < amount {
        panic_with_error!(env, Error::InsufficientAllowance);
    }
    if quote.balance(from) < amount {
        panic_with_error!(env, Error::InsufficientBalance);
    }
    TreasuryClient::new(env, &config.treasury).pull(
        &env.current_contract_address(),
        &config.token,
        from,
        &amount,
    );
}

/// Move `amount` from Treasury custody to `to`. Callers bound `amount` by
/// the round's own books; the Treasury checks custody.
pub fn push(env: &Env, config: &RoundConfig, to: &Address, amount: i128) {
    TreasuryClient::new(env, &config.treasury).push(
        &env.current_contract_address(),
        &config.token,
        to,
        &amount,
    );
}
