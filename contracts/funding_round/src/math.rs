//! Fixed-point arithmetic for pricing and returns.
//!
//! Prices are scaled by [`PRICE_SCALE`] (10^8), returns by [`BPS_SCALE`]
//! (10^4). Every division floors, so rounding always favours the round and
//! never the investor. Functions return `None` on overflow.

/// Fixed-point-8 scale of `token_price`.
pub const PRICE_SCALE: i128 = 100_000_000;

/// Basis-point scale of `return_basis_points`.
pub const BPS_SCALE: i128 = 10_000;

/// Round tokens minted for a contribution of `amount` quote units:
/// `floor(amount * 10^8 / token_price)`.
pub fn tokens_for(amount: i128, token_price: i128) -> Option<i128> {
    amount.checked_mul(PRICE_SCALE)?.checked_div(token_price)
}

/// Quote units represented by `tokens`: `floor(tokens * token_price / 10^8)`.
pub fn quote_for(tokens: i128, token_price: i128) -> Option<i128> {
    tokens.checked_mul(token_price)?.checked_div(PRICE_SCALE)
}

/// Principal plus the preferred return hurdle:
/// `floor(principal * (10^4 + return_basis_points) / 10^4)`.
pub fn with_return(principal: i128, return_basis_points: u32) -> Option<i128> {
    let factor = BPS_SCALE.checked_add(return_basis_points as i128)?;
    principal.checked_mul(factor)?.checked_div(BPS_SCALE)
}
