//! Virtual-offset share pricing.
//!
//! Both conversions pad the real totals with a constant number of virtual
//! shares and virtual assets before computing the exchange rate. The padding
//! keeps the rate defined on an empty vault and makes a donation to a nearly
//! empty vault unable to round a later depositor's shares down to zero.
//!
//! All division floors, so rounding always favors the vault.

use alloy_primitives::{ruint::aliases::U512, U256};

/// Shares that exist on paper before anyone deposits.
pub const VIRTUAL_SHARES: U256 = U256::from_limbs([1_000_000_000, 0, 0, 0]);

/// Assets that exist on paper before anyone deposits.
pub const VIRTUAL_ASSETS: U256 = U256::from_limbs([1, 0, 0, 0]);

/// Computes `floor(x * y / denominator)` with a 512-bit intermediate product.
///
/// Returns `None` when `denominator` is zero or the quotient does not fit in
/// 256 bits.
pub fn mul_div(x: U256, y: U256, denominator: U256) -> Option<U256> {
    if denominator.is_zero() {
        return None;
    }

    let product = widen(x) * widen(y);
    U256::checked_from_limbs_slice((product / widen(denominator)).as_limbs())
}

fn widen(value: U256) -> U512 {
    U512::from_limbs_slice(value.as_limbs())
}

/// Shares minted for `assets` given the current totals.
pub fn convert_to_shares(assets: U256, total_shares: U256, total_assets: U256) -> Option<U256> {
    mul_div(
        assets,
        total_shares.checked_add(VIRTUAL_SHARES)?,
        total_assets.checked_add(VIRTUAL_ASSETS)?,
    )
}

/// Assets redeemed for `shares` given the current totals.
pub fn convert_to_assets(shares: U256, total_shares: U256, total_assets: U256) -> Option<U256> {
    mul_div(
        shares,
        total_assets.checked_add(VIRTUAL_ASSETS)?,
        total_shares.checked_add(VIRTUAL_SHARES)?,
    )
}
