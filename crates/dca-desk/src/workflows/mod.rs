pub mod cases;
pub mod portfolio;
pub mod triage;

/// Rounds to a fixed number of decimal places, ties to even.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
