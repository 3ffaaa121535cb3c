//! Reentrancy guard.
//!
//! Every entry point that moves value out of custody calls [`enter`] before
//! its first external call and [`exit`] once its bookkeeping is complete. A
//! nested call while the flag is raised fails with `ReentrancyDetected`.
//! A failed invocation rolls back its storage writes, flag included, so the
//! guard can never be left raised.

use soroban_sdk::{panic_with_error, Env};

use crate::{storage, Error};

pub fn enter(env: &Env) {
    if storage::is_entered(env) {
        panic_with_error!(env, Error::ReentrancyDetected);
    }
    storage::set_entered(env, true);
}

pub fn exit(env: &Env) {
    storage::set_entered(env, false);
}
