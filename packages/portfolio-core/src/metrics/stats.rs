//! Descriptive statistics over return series.
//!
//! All estimators are the sample (n-1) versions. Inputs too short for an
//! estimator yield 0.0 rather than NaN so callers can treat them as
//! degenerate statistics.

/// Denominators smaller than this in absolute value are treated as zero.
pub const DEGENERATE_EPSILON: f64 = 1e-12;

/// Whether a denominator is too close to zero to divide by.
pub fn is_degenerate(value: f64) -> bool {
    !value.is_finite() || value.abs() < DEGENERATE_EPSILON
}

/// Arithmetic mean. Empty input yields 0.0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n-1 denominator).
pub fn sample_variance(values: &[f64]) -> f64 {
    sample_covariance(values, values)
}

/// Sample standard deviation (n-1 denominator).
pub fn sample_std(values: &[f64]) -> f64 {
    sample_variance(values).max(0.0).sqrt()
}

/// Sample covariance of two equally long series.
///
/// Only the common prefix is used if the lengths differ; callers that care
/// about alignment check lengths first.
pub fn sample_covariance(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let (a, b) = (&a[..n], &b[..n]);
    let mean_a = mean(a);
    let mean_b = mean(b);

    a.iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum::<f64>()
        / (n - 1) as f64
}

/// Empirical quantile with linear interpolation between order statistics.
///
/// `q` is clamped to `[0, 1]`. Empty input yields 0.0.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Bias-adjusted sample skewness (Fisher-Pearson G1).
///
/// Fewer than three observations or zero variance yields 0.0.
pub fn skewness(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return 0.0;
    }

    let nf = n as f64;
    let m = mean(values);
    let m2 = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / nf;
    let m3 = values.iter().map(|x| (x - m).powi(3)).sum::<f64>() / nf;

    if is_degenerate(m2) {
        return 0.0;
    }

    (nf * (nf - 1.0)).sqrt() / (nf - 2.0) * m3 / m2.powf(1.5)
}

/// Bias-adjusted sample excess kurtosis (G2); a normal sample scores ~0.
///
/// Fewer than four observations or zero variance yields 0.0.
pub fn excess_kurtosis(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 4 {
        return 0.0;
    }

    let nf = n as f64;
    let m = mean(values);
    let s2 = values.iter().map(|x| (x - m).powi(2)).sum::<f64>();
    let s4 = values.iter().map(|x| (x - m).powi(4)).sum::<f64>();

    if is_degenerate(s2) {
        return 0.0;
    }

    let numerator = nf * (nf + 1.0) * (nf - 1.0) * s4;
    let denominator = (nf - 2.0) * (nf - 3.0) * s2 * s2;
    let adjustment = 3.0 * (nf - 1.0).powi(2) / ((nf - 2.0) * (nf - 3.0));

    numerator / denominator - adjustment
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_variance() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(mean(&values), 2.5);
        // sum of squared deviations = 5.0, / 3
        assert_relative_eq!(sample_variance(&values), 5.0 / 3.0, epsilon = 1e-12);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(sample_variance(&[1.0]), 0.0);
    }

    #[test]
    fn test_sample_covariance_sign() {
        let a = vec![0.01, 0.02, 0.03];
        let b = vec![0.03, 0.02, 0.01];
        assert!(sample_covariance(&a, &a) > 0.0);
        assert!(sample_covariance(&a, &b) < 0.0);
    }

    #[test]
    fn test_quantile_interpolates() {
        let values = vec![4.0, 1.0, 3.0, 2.0];
        assert_eq!(quantile(&values, 0.0), 1.0);
        assert_eq!(quantile(&values, 1.0), 4.0);
        // position 1.5 between 2.0 and 3.0
        assert_relative_eq!(quantile(&values, 0.5), 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_skewness_symmetric_is_zero() {
        let values = vec![-2.0, -1.0, 0.0, 1.0, 2.0];
        assert_relative_eq!(skewness(&values), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_skewness_right_tail_positive() {
        let values = vec![0.0, 0.0, 0.0, 0.0, 10.0];
        assert!(skewness(&values) > 0.0);
    }

    #[test]
    fn test_excess_kurtosis_known_value() {
        // G2 for 1..=5 is -1.2
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(excess_kurtosis(&values), -1.2, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(skewness(&[0.01, 0.01, 0.01]), 0.0);
        assert_eq!(excess_kurtosis(&[0.01, 0.01, 0.01, 0.01]), 0.0);
        assert_eq!(excess_kurtosis(&[1.0, 2.0, 3.0]), 0.0);
        assert!(is_degenerate(0.0));
        assert!(is_degenerate(1e-15));
        assert!(is_degenerate(f64::NAN));
        assert!(!is_degenerate(1e-6));
    }
}
