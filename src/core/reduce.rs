//! Purpose: Reduce the request parameters to their sum.
//! Exports: `sum_params`.
//! Invariants: Empty input sums to 0; accumulation wraps on i64 overflow instead of panicking.

pub fn sum_params(params: &[i64]) -> i64 {
    params.iter().fold(0i64, |acc, value| acc.wrapping_add(*value))
}
