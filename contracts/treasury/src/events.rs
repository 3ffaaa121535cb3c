use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegistryChanged {
    pub round: Address,
    pub by: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CustodyMoved {
    pub round: Address,
    pub token: Address,
    pub counterparty: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnershipTransferred {
    pub previous_owner: Address,
    pub new_owner: Address,
}

pub fn emit_round_added(env: &Env, round: Address, by: Address) {
    let topics = (symbol_short!("added"), round.clone());
    env.events().publish(topics, RegistryChanged { round, by });
}

pub fn emit_round_removed(env: &Env, round: Address, by: Address) {
    let topics = (symbol_short!("removed"), round.clone());
    env.events().publish(topics, RegistryChanged { round, by });
}

/// Funds moved from `from` into custody on behalf of `round`.
pub fn emit_pulled(env: &Env, round: Address, token: Address, from: Address, amount: i128) {
    let topics = (symbol_short!("pull"), round.clone());
    let data = CustodyMoved {
        round,
        token,
        counterparty: from,
        amount,
    };
    env.events().publish(topics, data);
}

/// Funds moved out of custody to `to` on behalf of `round`.
pub fn emit_pushed(env: &Env, round: Address, token: Address, to: Address, amount: i128) {
    let topics = (symbol_short!("push"), round.clone());
    let data = CustodyMoved {
        round,
        token,
        counterparty: to,
        amount,
    };
    env.events().publish(topics, data);
}

pub fn emit_ownership_transferred(env: &Env, previous_owner: Address, new_owner: Address) {
    let topics = (symbol_short!("own_xfer"),);
    let data = OwnershipTransferred {
        previous_owner,
        new_owner,
    };
    env.events().publish(topics, data);
}
