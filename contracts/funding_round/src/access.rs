//! Single-owner access control.
//!
//! The round has exactly one privileged identity. Privileged entry points
//! take the caller explicitly so an unauthorized caller is rejected with a
//! typed `NotAuthorized` error rather than an opaque auth failure.

use soroban_sdk::{panic_with_error, Address, Env};

use crate::{storage, Error};

/// Require `caller` to sign and to be the current admin.
pub fn require_admin(env: &Env, caller: &Address) {
    caller.require_auth();
    if *caller != storage::get_admin(env) {
        panic_with_error!(env, Error::NotAuthorized);
    }
}

/// Hand the admin capability to `new_admin`. Returns the previous admin.
pub fn transfer(env: &Env, caller: &Address, new_admin: &Address) -> Address {
    require_admin(env, caller);
    storage::set_admin(env, new_admin);
    caller.clone()
}
