//! Monetary rounding helper shared by the split and settle modules.

/// Rounds a monetary value to 2 decimal places, half away from zero.
///
/// Applied only at reporting points (per-item shares, tax/service shares,
/// subtotals, final totals), never to raw split ratios.
pub fn round_to_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
