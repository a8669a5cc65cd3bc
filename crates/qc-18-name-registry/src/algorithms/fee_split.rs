//! # Fee Apportioning
//!
//! Splits the funds attached to a call across destinations.

/// Split `total` into `parts` equal shares, the last share absorbing the
/// integer-division remainder. The shares always sum to `total`.
///
/// `parts == 0` yields no shares.
pub fn split_evenly(total: u128, parts: usize) -> Vec<u128> {
    if parts == 0 {
        return Vec::new();
    }
    let divisor = parts as u128;
    let share = total / divisor;
    let remainder = total % divisor;

    let mut shares = vec![share; parts];
    if let Some(last) = shares.last_mut() {
        *last += remainder;
    }
    shares
}
