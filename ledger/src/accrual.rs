//! Reward accrual arithmetic.
//!
//! `earned = ⌊principal × rate_raw × elapsed / RATE_SCALE⌋`
//!
//! All values are integers. The product is formed in 256 bits so large
//! principals never overflow before the division; sub-unit remainders are
//! dropped and never carried forward.

use crate::account::ParticipantAccount;
use crate::error::LedgerError;
use staking_types::{RewardRate, Timestamp, RATE_SCALE};

/// Result of bringing one account's reward up to date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    /// The account as it would look after settlement.
    pub account: ParticipantAccount,
    /// Reward earned over the elapsed interval, before the solvency cap.
    pub earned: u128,
    /// Reward actually credited (`earned` capped at the reward budget).
    pub credited: u128,
}

impl Settlement {
    /// Earned reward that custody could not back and was therefore dropped.
    pub fn forfeited(&self) -> u128 {
        self.earned - self.credited
    }
}

/// Settle `account` up to `now`, crediting at most `budget` new reward.
///
/// Pure: the caller decides whether to commit the returned account.
pub fn settle(
    account: &ParticipantAccount,
    rate: RewardRate,
    now: Timestamp,
    budget: u128,
) -> Result<Settlement, LedgerError> {
    if now < account.last_accrual {
        return Err(LedgerError::InvalidTimestamp);
    }
    let elapsed = account.last_accrual.elapsed_since(now);
    let earned = earned(account.principal, rate, elapsed);
    let credited = earned.min(budget);

    let mut next = account.clone();
    next.accrued_reward = next
        .accrued_reward
        .checked_add(credited)
        .ok_or(LedgerError::Overflow)?;
    next.last_accrual = now;

    Ok(Settlement {
        account: next,
        earned,
        credited,
    })
}

/// Reward earned by `principal` over `elapsed` seconds, truncated.
///
/// Saturates at `u128::MAX`; settlement caps the credit at the budget, so
/// an oversized interval never blocks the account.
pub fn earned(principal: u128, rate: RewardRate, elapsed: u64) -> u128 {
    if principal == 0 || rate.is_zero() || elapsed == 0 {
        return 0;
    }
    rate.raw()
        .checked_mul(elapsed as u128)
        .and_then(|rate_time| mul_div(principal, rate_time, RATE_SCALE))
        .unwrap_or(u128::MAX)
}

/// `⌊a × b / d⌋` with a 256-bit intermediate product.
///
/// Returns `None` when `d == 0` or the quotient exceeds `u128::MAX`.
pub fn mul_div(a: u128, b: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    let (hi, lo) = mul_wide(a, b);
    if hi == 0 {
        return Some(lo / d);
    }
    if hi >= d {
        return None;
    }

    // Restoring long division of (hi, lo) by d. Invariant: rem < d.
    let mut rem = hi;
    let mut quotient: u128 = 0;
    for bit in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> bit) & 1);
        quotient <<= 1;
        if carry == 1 || rem >= d {
            rem = rem.wrapping_sub(d);
            quotient |= 1;
        }
    }
    Some(quotient)
}

/// Full 256-bit product of two `u128`s as `(high, low)`.
fn mul_wide(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = u64::MAX as u128;
    let (a_hi, a_lo) = (a >> 64, a & MASK);
    let (b_hi, b_lo) = (b >> 64, b & MASK);

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    let mid = (ll >> 64) + (lh & MASK) + (hl & MASK);
    let lo = (ll & MASK) | (mid << 64);
    let hi = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (hi, lo)
}
