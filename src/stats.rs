//! Numeric helpers behind the summary statistics

/// Arithmetic mean, 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator), 0.0 when n < 2
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Standard error of the mean: sample stddev / sqrt(n), 0.0 when n < 2
pub fn standard_error(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    sample_std_dev(values) / (values.len() as f64).sqrt()
}

/// Smallest value, 0.0 for an empty slice
pub fn min(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Largest value, 0.0 for an empty slice
pub fn max(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Bytes to megabytes, rounded to two decimals
pub fn bytes_to_mb(bytes: f64) -> f64 {
    round2(bytes / (1024.0 * 1024.0))
}

/// Microseconds to milliseconds, rounded to two decimals
pub fn micros_to_ms(micros: f64) -> f64 {
    round2(micros / 1000.0)
}
