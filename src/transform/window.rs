//! Trailing window functions over probability series.

/// Probabilistic OR of independent events: `1 - Π(1 - p)`.
pub fn prob_or(probs: &[f64]) -> f64 {
    1.0 - probs.iter().map(|p| 1.0 - p).product::<f64>()
}

/// Compute the rolling probabilistic OR over a trailing window.
///
/// Position `i` combines `series[i + 1 - window..=i]`. The first `window - 1`
/// positions lack a full window and are NaN.
///
/// # Arguments
/// * `series` - Input probabilities
/// * `window` - Window size in buckets
pub fn rolling_prob_or(series: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(series, window, prob_or)
}

/// Generic trailing rolling window application.
fn rolling_apply<F>(series: &[f64], window: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    if series.is_empty() || window == 0 {
        return vec![f64::NAN; series.len()];
    }

    let n = series.len();
    let mut result = vec![f64::NAN; n];

    for i in 0..n {
        if i + 1 < window {
            continue;
        }
        result[i] = f(&series[i + 1 - window..i + 1]);
    }

    result
}

/// Fill NaN values with the next defined value (backward fill).
///
/// Trailing NaNs without any later defined value are left untouched.
pub fn backfill(series: &mut [f64]) {
    let mut next = f64::NAN;
    for v in series.iter_mut().rev() {
        if v.is_nan() {
            *v = next;
        } else {
            next = *v;
        }
    }
}
