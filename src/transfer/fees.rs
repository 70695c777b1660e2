//! Fee Calculation
//!
//! Pure percentage-based fee with a min/max clamp. No I/O, no state.

/// Compute the fee for a transfer amount.
///
/// `fee = clamp(ceil(amount * fee_percentage / 100), min_fee, max_fee)`
///
/// Preconditions (enforced by the validation boundary, not here):
/// `amount > 0`, `min_fee <= max_fee`.
pub fn compute_fee(amount: u64, fee_percentage: f64, min_fee: u64, max_fee: u64) -> u64 {
    let raw = (amount as f64 * fee_percentage / 100.0).ceil() as u64;
    raw.clamp(min_fee, max_fee)
}
