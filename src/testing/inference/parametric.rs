//! Two-sample t-tests on expression slices.
//!
//! Works from sums and sums of squares so the per-gene pass can accumulate
//! statistics in a single traversal of each row slice.

use num_traits::{Float, NumCast};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use crate::testing::{TTestType, TestResult};

/// Above this many degrees of freedom the t-distribution is
/// indistinguishable from the normal at the precision we report.
const NORMAL_APPROX_DF: f64 = 100.0;

/// Two-sample t-test comparing two slices.
pub fn t_test<T>(x: &[T], y: &[T], test_type: TTestType) -> TestResult
where
    T: Float + NumCast,
{
    let mut sum_x = T::zero();
    let mut sum_sq_x = T::zero();
    for &val in x {
        sum_x = sum_x + val;
        sum_sq_x = sum_sq_x + val * val;
    }

    let mut sum_y = T::zero();
    let mut sum_sq_y = T::zero();
    for &val in y {
        sum_y = sum_y + val;
        sum_sq_y = sum_sq_y + val * val;
    }

    t_test_from_sums(
        sum_x.to_f64().unwrap_or(f64::NAN),
        sum_sq_x.to_f64().unwrap_or(f64::NAN),
        x.len() as f64,
        sum_y.to_f64().unwrap_or(f64::NAN),
        sum_sq_y.to_f64().unwrap_or(f64::NAN),
        y.len() as f64,
        test_type,
    )
}

/// T-test from precomputed summary statistics.
///
/// Zero standard error is resolved rather than propagated: coinciding means
/// give an undefined statistic (NaN, p = 1), distinct means give perfect
/// separation (±∞, p = 0).
pub fn t_test_from_sums(
    sum1: f64,
    sum_sq1: f64,
    n1: f64,
    sum2: f64,
    sum_sq2: f64,
    n2: f64,
    test_type: TTestType,
) -> TestResult {
    if n1 < 2.0 || n2 < 2.0 {
        return TestResult::new(f64::NAN, 1.0, 0.0);
    }

    let mean1 = sum1 / n1;
    let mean2 = sum2 / n2;

    // Computational formula; clamp tiny negative residues from cancellation.
    let var1 = ((sum_sq1 - sum1 * sum1 / n1) / (n1 - 1.0)).max(0.0);
    let var2 = ((sum_sq2 - sum2 * sum2 / n2) / (n2 - 1.0)).max(0.0);

    let mean_diff = mean1 - mean2;

    let (std_err, df) = match test_type {
        TTestType::Student => {
            let pooled_var = ((n1 - 1.0) * var1 + (n2 - 1.0) * var2) / (n1 + n2 - 2.0);
            let std_err = (pooled_var * (1.0 / n1 + 1.0 / n2)).sqrt();
            (std_err, n1 + n2 - 2.0)
        }
        TTestType::Welch => {
            let term1 = var1 / n1;
            let term2 = var2 / n2;
            let combined = term1 + term2;
            // Welch-Satterthwaite equation
            let df = if combined > 0.0 {
                combined * combined
                    / (term1 * term1 / (n1 - 1.0) + term2 * term2 / (n2 - 1.0))
            } else {
                0.0
            };
            (combined.sqrt(), df)
        }
    };

    if std_err == 0.0 {
        return if mean_diff == 0.0 {
            TestResult::new(f64::NAN, 1.0, df)
        } else {
            let t = if mean_diff > 0.0 {
                f64::INFINITY
            } else {
                f64::NEG_INFINITY
            };
            TestResult::new(t, 0.0, df)
        };
    }

    let t_stat = mean_diff / std_err;
    TestResult::new(t_stat, two_sided_p_value(t_stat, df), df)
}

/// Two-sided p-value for a t-statistic.
fn two_sided_p_value(t_stat: f64, df: f64) -> f64 {
    if !t_stat.is_finite() {
        return if t_stat.is_infinite() { 0.0 } else { 1.0 };
    }
    if df <= 0.0 || !df.is_finite() {
        return 1.0;
    }

    let abs_t = t_stat.abs();

    if df > NORMAL_APPROX_DF {
        return match Normal::new(0.0, 1.0) {
            Ok(normal) => (2.0 * (1.0 - normal.cdf(abs_t))).min(1.0),
            Err(_) => 1.0,
        };
    }

    match StudentsT::new(0.0, 1.0, df) {
        Ok(t_dist) => (2.0 * (1.0 - t_dist.cdf(abs_t))).min(1.0),
        Err(_) => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_clearly_separated_groups() {
        // [1, 2, 3] vs [7, 8, 9]: large |t|, small p.
        let result = t_test(&[1.0, 2.0, 3.0], &[7.0, 8.0, 9.0], TTestType::Student);
        assert!(result.statistic < -2.0);
        assert!(result.p_value < 0.05);
        assert_relative_eq!(result.degrees_of_freedom, 4.0);
    }

    #[test]
    fn test_identical_groups() {
        let result = t_test(&[5.0, 6.0, 7.0], &[5.0, 6.0, 7.0], TTestType::Welch);
        assert_abs_diff_eq!(result.statistic, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.p_value, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_welch_against_reference() {
        // scipy.stats.ttest_ind([1,2,3,4], [10,20,30,40], equal_var=False)
        // -> statistic = -3.4683, pvalue = 0.0399, df = 3.06
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [10.0, 20.0, 30.0, 40.0];
        let result = t_test(&x, &y, TTestType::Welch);
        assert_abs_diff_eq!(result.statistic, -3.4683, epsilon = 1e-3);
        assert_abs_diff_eq!(result.p_value, 0.0399, epsilon = 2e-3);
        assert_abs_diff_eq!(result.degrees_of_freedom, 3.06, epsilon = 0.01);
    }

    #[test]
    fn test_student_against_reference() {
        // scipy.stats.ttest_ind([2,4,6,8], [1,3,5,7], equal_var=True)
        // -> statistic = 0.5477, pvalue = 0.6036
        let x = [2.0, 4.0, 6.0, 8.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let result = t_test(&x, &y, TTestType::Student);
        assert_abs_diff_eq!(result.statistic, 0.5477, epsilon = 1e-3);
        assert_abs_diff_eq!(result.p_value, 0.6036, epsilon = 1e-3);
    }

    #[test]
    fn test_zero_variance_coinciding_means_is_undefined() {
        let result = t_test(&[5.0, 5.0, 5.0], &[5.0, 5.0, 5.0], TTestType::Welch);
        assert!(!result.is_defined());
        assert_relative_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_zero_variance_distinct_means_is_separation() {
        let result = t_test(&[1.0, 1.0, 1.0], &[9.0, 9.0, 9.0], TTestType::Welch);
        assert!(result.statistic.is_infinite());
        assert!(result.statistic < 0.0);
        assert_relative_eq!(result.p_value, 0.0);
    }

    #[test]
    fn test_insufficient_samples() {
        let result = t_test(&[1.0], &[2.0, 3.0, 4.0], TTestType::Welch);
        assert!(!result.is_defined());
        assert_relative_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_large_df_uses_normal_approximation() {
        let x: Vec<f64> = (0..200).map(|i| (i % 7) as f64).collect();
        let y: Vec<f64> = (0..200).map(|i| (i % 7) as f64 + 0.1).collect();
        let result = t_test(&x, &y, TTestType::Welch);
        assert!(result.degrees_of_freedom > NORMAL_APPROX_DF);
        assert!(result.p_value > 0.0 && result.p_value <= 1.0);
    }
}
