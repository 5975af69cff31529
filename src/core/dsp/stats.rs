//! Statistical helpers shared across the analysis modules

/// Linear-interpolated quantile of an ascending-sorted slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let clamped = q.clamp(0.0, 1.0);
    let position = (sorted.len() - 1) as f64 * clamped;
    let left = position.floor() as usize;
    let right = (left + 1).min(sorted.len() - 1);
    let frac = position - left as f64;
    sorted[left] * (1.0 - frac) + sorted[right] * frac
}

/// Median of a slice; sorts a copy.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    quantile_sorted(&sorted, 0.5)
}

/// Interquartile range (P75 - P25) of a slice; sorts a copy.
pub fn interquartile_range(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    quantile_sorted(&sorted, 0.75) - quantile_sorted(&sorted, 0.25)
}

/// Arithmetic mean and population standard deviation.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, variance.max(0.0).sqrt())
}

/// Third and fourth standardized moments of a distribution.
///
/// Zero-variance input yields (0, 0) rather than dividing by zero.
pub fn skewness_kurtosis(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let (mean, std) = mean_std(values);
    if std < 1e-12 {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mut third = 0.0f64;
    let mut fourth = 0.0f64;
    for &value in values {
        let z = (value - mean) / std;
        third += z * z * z;
        fourth += z * z * z * z;
    }
    (third / n, fourth / n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_endpoints() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile_sorted(&sorted, 0.0) - 1.0).abs() < 1e-12);
        assert!((quantile_sorted(&sorted, 1.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [0.0, 10.0];
        assert!((quantile_sorted(&sorted, 0.25) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_median_odd_even() {
        assert!((median(&[3.0, 1.0, 2.0]) - 2.0).abs() < 1e-12);
        assert!((median(&[4.0, 1.0, 2.0, 3.0]) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_mean_std_constant() {
        let (mean, std) = mean_std(&[2.5; 10]);
        assert!((mean - 2.5).abs() < 1e-12);
        assert!(std < 1e-12);
    }

    #[test]
    fn test_skewness_symmetric_is_zero() {
        let (skew, _) = skewness_kurtosis(&[-2.0, -1.0, 0.0, 1.0, 2.0]);
        assert!(skew.abs() < 1e-12);
    }

    #[test]
    fn test_iqr_uniform() {
        let values: Vec<f64> = (0..=100).map(|i| i as f64).collect();
        assert!((interquartile_range(&values) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_inputs_are_neutral() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(mean_std(&[]), (0.0, 0.0));
        assert_eq!(skewness_kurtosis(&[]), (0.0, 0.0));
        assert_eq!(interquartile_range(&[]), 0.0);
    }
}
