use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env};

use crate::types::{RoundState, Slot};

/// Mint (`from = None`) or burn (`to = None`) of round tokens.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transfer {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Withdraw {
    pub to: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecoupmentDeposit {
    pub slot: Slot,
    pub root: BytesN<32>,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecoupmentWithdraw {
    pub investor: Address,
    pub amount: i128,
    pub round_index: Option<u32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StateChanged {
    pub from: RoundState,
    pub to: RoundState,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnershipTransferred {
    pub previous_owner: Address,
    pub new_owner: Address,
}

pub fn emit_mint(env: &Env, to: Address, amount: i128) {
    let topics = (symbol_short!("transfer"),);
    let data = Transfer {
        from: None,
        to: Some(to),
        amount,
    };
    env.events().publish(topics, data);
}

pub fn emit_burn(env: &Env, from: Address, amount: i128) {
    let topics = (symbol_short!("transfer"),);
    let data = Transfer {
        from: Some(from),
        to: None,
        amount,
    };
    env.events().publish(topics, data);
}

pub fn emit_withdraw(env: &Env, to: Address, amount: i128) {
    let topics = (symbol_short!("withdraw"),);
    env.events().publish(topics, Withdraw { to, amount });
}

pub fn emit_recoupment_deposit(env: &Env, slot: Slot, root: BytesN<32>, amount: i128) {
    let topics = (symbol_short!("rec_dep"),);
    let data = RecoupmentDeposit { slot, root, amount };
    env.events().publish(topics, data);
}

pub fn emit_recoupment_withdraw(
    env: &Env,
    investor: Address,
    amount: i128,
    round_index: Option<u32>,
) {
    let topics = (symbol_short!("rec_wdr"), investor.clone());
    let data = RecoupmentWithdraw {
        investor,
        amount,
        round_index,
    };
    env.events().publish(topics, data);
}

pub fn emit_state_changed(env: &Env, from: RoundState, to: RoundState) {
    let topics = (symbol_short!("state"),);
    env.events().publish(topics, StateChanged { from, to });
}

pub fn emit_ownership_transferred(env: &Env, previous_owner: Address, new_owner: Address) {
    let topics = (symbol_short!("own_xfer"),);
    let data = OwnershipTransferred {
        previous_owner,
        new_owner,
    };
    env.events().publish(topics, data);
}
