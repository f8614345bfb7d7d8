//! Statistical helper functions shared across the MOS-X verification crates.

/// Arithmetic mean of a slice. Returns NaN if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

/// Population variance (N denominator, matching NumPy's default `var`).
/// Returns NaN if empty.
pub fn population_variance(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    let m = mean(data);
    data.iter().map(|&x| (x - m) * (x - m)).sum::<f64>() / data.len() as f64
}

/// Population standard deviation.
pub fn population_sd(data: &[f64]) -> f64 {
    population_variance(data).sqrt()
}

/// `n` evenly spaced values from `start` to `stop` inclusive.
///
/// Returns an empty vector for `n == 0` and `[start]` for `n == 1`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Sorts a copy of `data` ascending, placing NaN last.
pub fn sorted(data: &[f64]) -> Vec<f64> {
    let mut out = data.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}
