//! Descriptive statistics over finite `f64` samples.
//!
//! Every function returns a `Derived`: an empty sample, a too-small sample or
//! a zero denominator comes back as a tagged `Undefined` instead of `NaN`,
//! infinity or a silent zero.

use core_types::{Derived, Undefined};
use serde::{Deserialize, Serialize};

fn all_equal(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

fn sum_squared_deviations(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean) * (v - mean)).sum()
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Derived {
    if values.is_empty() {
        return Err(Undefined::MissingData);
    }
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    if sum.is_finite() {
        Ok(sum / n)
    } else {
        // the plain sum overflows near f64::MAX; scale first
        Ok(values.iter().map(|v| v / n).sum())
    }
}

/// Sample standard deviation (N - 1 denominator).
pub fn sample_std_dev(values: &[f64]) -> Derived {
    if values.is_empty() {
        return Err(Undefined::MissingData);
    }
    if values.len() < 2 {
        return Err(Undefined::InsufficientSample {
            required: 2,
            found: values.len(),
        });
    }
    // Identical readings have exactly zero spread; the two-pass formula can
    // leave a rounding residue there.
    if all_equal(values) {
        return Ok(0.0);
    }
    let mean = mean(values)?;
    let variance = sum_squared_deviations(values, mean) / (values.len() - 1) as f64;
    Ok(variance.sqrt())
}

/// The `p`-th percentile (`p` in `[0, 1]`) by linear interpolation between
/// order statistics: `rank = p * (n - 1)`, blended between `floor(rank)` and
/// `ceil(rank)`.
pub fn percentile(values: &[f64], p: f64) -> Derived {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_sorted(&sorted, p)
}

/// Same as [`percentile`] for an already ascending sample. `p` is clamped to `[0, 1]`.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Derived {
    if sorted.is_empty() {
        return Err(Undefined::MissingData);
    }
    let p = if p.is_nan() { 0.5 } else { p.clamp(0.0, 1.0) };
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    let (a, b) = (sorted[lo], sorted[hi]);
    let value = a + (b - a) * frac;
    if value.is_finite() {
        Ok(value)
    } else {
        // `b - a` overflowed; the weighted form stays between a and b
        Ok(a * (1.0 - frac) + b * frac)
    }
}

/// `(value - mean) / mean * 100`.
pub fn percent_difference(value: f64, mean: f64) -> Derived {
    if mean == 0.0 {
        return Err(Undefined::DivideByZero);
    }
    Ok((value - mean) / mean * 100.0)
}

/// Pearson correlation of paired readings. Needs three pairs.
pub fn pearson(pairs: &[(f64, f64)]) -> Derived {
    if pairs.len() < 3 {
        return Err(Undefined::InsufficientSample {
            required: 3,
            found: pairs.len(),
        });
    }
    let xs: Vec<f64> = pairs.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = pairs.iter().map(|p| p.1).collect();
    if all_equal(&xs) || all_equal(&ys) {
        return Err(Undefined::DivideByZero);
    }
    let mean_x = mean(&xs)?;
    let mean_y = mean(&ys)?;
    let covariance: f64 = pairs
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let denominator = (sum_squared_deviations(&xs, mean_x) * sum_squared_deviations(&ys, mean_y)).sqrt();
    if denominator == 0.0 {
        return Err(Undefined::DivideByZero);
    }
    Ok(covariance / denominator)
}

/// Standardised mean difference: `|mean(a) - mean(b)|` over the pooled
/// sample standard deviation of both groups.
pub fn effect_size(a: &[f64], b: &[f64]) -> Derived {
    let mean_a = mean(a)?;
    let mean_b = mean(b)?;
    let dof = a.len() + b.len();
    if dof < 3 {
        return Err(Undefined::InsufficientSample {
            required: 3,
            found: dof,
        });
    }
    let pooled_variance = (sum_squared_deviations(a, mean_a) + sum_squared_deviations(b, mean_b))
        / (dof - 2) as f64;
    let pooled_sd = pooled_variance.sqrt();
    if pooled_sd == 0.0 {
        return Err(Undefined::DivideByZero);
    }
    Ok((mean_a - mean_b).abs() / pooled_sd)
}

/// Count, mean and spread of one sample, kept together for z-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub count: usize,
    pub mean: Derived,
    pub std_dev: Derived,
}

impl SampleStats {
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            count: values.len(),
            mean: mean(values),
            std_dev: sample_std_dev(values),
        }
    }

    /// `(value - mean) / std_dev`. Undefined below two readings or with zero spread.
    pub fn z_score(&self, value: f64) -> Derived {
        let mean = self.mean?;
        let std_dev = self.std_dev?;
        if std_dev == 0.0 {
            return Err(Undefined::DivideByZero);
        }
        Ok((value - mean) / std_dev)
    }

    pub fn percent_difference(&self, value: f64) -> Derived {
        percent_difference(value, self.mean?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn mean_of_empty_is_missing() {
        assert_eq!(mean(&[]), Err(Undefined::MissingData));
        assert_eq!(mean(&[0.0]), Ok(0.0));
    }

    #[test]
    fn sample_std_dev_uses_n_minus_one() {
        let sd = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!(close(sd, (32.0f64 / 7.0).sqrt()));
        assert_eq!(
            sample_std_dev(&[3.0]),
            Err(Undefined::InsufficientSample { required: 2, found: 1 })
        );
        assert_eq!(sample_std_dev(&[0.1, 0.1, 0.1]), Ok(0.0));
    }

    #[test]
    fn percentile_interpolates_between_order_statistics() {
        let values = [15.0, 20.0, 35.0, 40.0, 50.0];
        assert_eq!(percentile(&values, 0.0), Ok(15.0));
        assert_eq!(percentile(&values, 1.0), Ok(50.0));
        assert_eq!(percentile(&values, 0.5), Ok(35.0));
        // rank = 0.9 * 4 = 3.6 -> 40 + 0.6 * 10
        assert!(close(percentile(&values, 0.9).unwrap(), 46.0));
        // unsorted input gives the same answer
        assert!(close(percentile(&[50.0, 15.0, 40.0, 35.0, 20.0], 0.9).unwrap(), 46.0));
        assert_eq!(percentile(&[], 0.9), Err(Undefined::MissingData));
        assert_eq!(percentile(&[7.0], 0.9), Ok(7.0));
    }

    #[test]
    fn extreme_finite_values_do_not_overflow() {
        let values = [-1.7e308, 1.7e308];
        assert_eq!(percentile(&values, 0.5), Ok(0.0));
        assert_eq!(percentile(&values, 0.0), Ok(-1.7e308));
        assert_eq!(percentile(&values, 1.0), Ok(1.7e308));
        assert!(close(mean(&[1.7e308, 1.7e308]).unwrap() / 1e308, 1.7));
        assert_eq!(mean(&values), Ok(0.0));
    }

    #[test]
    fn percent_difference_with_zero_mean_is_undefined() {
        assert_eq!(percent_difference(5.0, 0.0), Err(Undefined::DivideByZero));
        assert!(close(percent_difference(110.0, 100.0).unwrap(), 10.0));
        assert!(close(percent_difference(90.0, 100.0).unwrap(), -10.0));
    }

    #[test]
    fn z_score_of_single_reading_is_undefined_not_zero() {
        let stats = SampleStats::from_values(&[42.0]);
        assert_eq!(
            stats.z_score(42.0),
            Err(Undefined::InsufficientSample { required: 2, found: 1 })
        );
    }

    #[test]
    fn z_score_with_no_spread_is_undefined() {
        let stats = SampleStats::from_values(&[5.0, 5.0, 5.0]);
        assert_eq!(stats.z_score(5.0), Err(Undefined::DivideByZero));
    }

    #[test]
    fn z_score() {
        let stats = SampleStats::from_values(&[2.0, 4.0, 6.0]);
        assert!(close(stats.z_score(6.0).unwrap(), 1.0));
        assert!(close(stats.z_score(4.0).unwrap(), 0.0));
    }

    #[test]
    fn pearson_correlation() {
        let perfect = [(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)];
        assert!(close(pearson(&perfect).unwrap(), 1.0));
        let inverse = [(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)];
        assert!(close(pearson(&inverse).unwrap(), -1.0));
        assert!(matches!(
            pearson(&perfect[..2]),
            Err(Undefined::InsufficientSample { .. })
        ));
        assert_eq!(
            pearson(&[(1.0, 1.0), (1.0, 2.0), (1.0, 3.0)]),
            Err(Undefined::DivideByZero)
        );
    }

    #[test]
    fn effect_size_uses_pooled_sd() {
        // ss_a = 2, ss_b = 2, pooled = sqrt(4 / 4) = 1
        let d = effect_size(&[1.0, 2.0, 3.0], &[3.0, 4.0, 5.0]).unwrap();
        assert!(close(d, 2.0));
        assert_eq!(effect_size(&[], &[1.0]), Err(Undefined::MissingData));
        assert_eq!(effect_size(&[1.0, 1.0], &[1.0, 1.0]), Err(Undefined::DivideByZero));
    }
}
