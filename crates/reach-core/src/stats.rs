use serde::{Deserialize, Serialize};

/// Summary of a sample array: mean and the 10th/50th/90th percentiles.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub mean: f64,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

impl Summary {
    pub fn zeros() -> Self {
        Self::default()
    }
}

/// Reduce `samples` to a [`Summary`]. Empty input yields all zeros.
pub fn summarize(samples: &[f64]) -> Summary {
    if samples.is_empty() {
        return Summary::zeros();
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Summary {
        mean: mean_of_sorted(&sorted),
        p10: percentile_sorted(&sorted, 10.0),
        p50: percentile_sorted(&sorted, 50.0),
        p90: percentile_sorted(&sorted, 90.0),
    }
}

/// Linear interpolation between order statistics at rank `q/100 * (n-1)`.
///
/// `sorted` must be ascending and non-empty.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = (q / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

fn mean_of_sorted(sorted: &[f64]) -> f64 {
    // A constant array has its value as the exact mean; summation would drift.
    let (first, last) = (sorted[0], sorted[sorted.len() - 1]);
    if first == last {
        return first;
    }
    let m = mean(sorted);
    // NaN sorts last under total_cmp and infinities have no finite bound
    if first.is_finite() && last.is_finite() {
        m.clamp(first, last)
    } else {
        m
    }
}
