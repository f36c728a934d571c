//! Small statistics helpers

use std::collections::BTreeMap;

/// Standard deviation at or below which numeric judgments count as identical
const PERFECT_STD_DEV: f64 = 1.0;
/// Percentage points lost per unit of standard deviation beyond the threshold
const DECAY_PER_STD_DEV: f64 = 25.0;

pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// 100 when σ ≤ 1, then linear decay of 25 points per unit σ, floored at 0.
///
/// ```
/// use citeguard_domain::consistency::numeric_consistency;
///
/// assert_eq!(numeric_consistency(&[9.0, 9.0, 9.0]), 100.0);
/// assert!(numeric_consistency(&[9.0, 1.0, 9.0]) < 50.0);
/// ```
pub fn numeric_consistency(values: &[f64]) -> f64 {
    let sigma = population_std_dev(values);
    if sigma <= PERFECT_STD_DEV {
        100.0
    } else {
        (100.0 - (sigma - PERFECT_STD_DEV) * DECAY_PER_STD_DEV).max(0.0)
    }
}

/// Percentage of tokens equal to the most frequent one
pub fn categorical_consistency<T: AsRef<str>>(tokens: &[T]) -> f64 {
    if tokens.is_empty() {
        return 100.0;
    }
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for token in tokens {
        *counts.entry(token.as_ref()).or_default() += 1;
    }
    let mode = counts.values().copied().max().unwrap_or(0);
    mode as f64 / tokens.len() as f64 * 100.0
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
