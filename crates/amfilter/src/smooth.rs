//! Differentiable max and min.
//!
//! `smooth_max` is a p-norm with an exponent correction for the number of
//! terms; `smooth_min` is a quadratically regularized minimum.

use crate::error::{FilterError, Result};

/// Corrected exponent `q = p + ln(n) / ln(0.5)` for `n` arguments.
pub fn corrected_exponent(p: f64, count: usize) -> f64 {
    p + (count as f64).ln() / 0.5f64.ln()
}

/// `(sum a^p)^(1/q)` over non-negative `args`.
///
/// Converges to `max(args)` as `p` grows. It is at least the true max once
/// that max is 1 or more; below 1 it may fall slightly short.
pub fn smooth_max(args: &[f64], p: f64) -> Result<f64> {
    let q = checked_exponent(args, p)?;
    let sum: f64 = args.iter().map(|a| a.powf(p)).sum();
    Ok(sum.powf(1.0 / q))
}

/// Partial derivatives of [`smooth_max`] with respect to each argument.
pub fn smooth_max_gradient(args: &[f64], p: f64) -> Result<Vec<f64>> {
    let q = checked_exponent(args, p)?;
    let sum: f64 = args.iter().map(|a| a.powf(p)).sum();
    if sum == 0.0 {
        // one argument is the identity; otherwise the slope vanishes at 0
        let slope = if args.len() == 1 { 1.0 } else { 0.0 };
        return Ok(vec![slope; args.len()]);
    }
    let value = sum.powf(1.0 / q);
    Ok(args
        .iter()
        .map(|a| p / q * value * a.powf(p - 1.0) / sum)
        .collect())
}

/// `0.5 (a + b - sqrt((a - b)^2 + eps) + sqrt(eps))`.
///
/// Symmetric, equal to `min(a, b)` for `eps = 0`, and never more than
/// `sqrt(eps) / 2` above the true min.
pub fn smooth_min(a: f64, b: f64, eps: f64) -> f64 {
    0.5 * (a + b - ((a - b).powi(2) + eps).sqrt() + eps.sqrt())
}

/// `(d/da, d/db)` of [`smooth_min`].
pub fn smooth_min_gradient(a: f64, b: f64, eps: f64) -> (f64, f64) {
    let root = ((a - b).powi(2) + eps).sqrt();
    if root == 0.0 {
        return (0.5, 0.5);
    }
    let t = (a - b) / root;
    (0.5 * (1.0 - t), 0.5 * (1.0 + t))
}

fn checked_exponent(args: &[f64], p: f64) -> Result<f64> {
    if args.is_empty() {
        return Err(FilterError::EmptyArguments);
    }
    if let Some(&a) = args.iter().find(|a| !(**a >= 0.0)) {
        return Err(FilterError::NegativeArgument(a));
    }
    let q = corrected_exponent(p, args.len());
    if !(q > 0.0) {
        return Err(FilterError::InvalidExponent {
            p,
            count: args.len(),
        });
    }
    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_smooth_max_reference_values() {
        let args: Vec<f64> = (0..10).map(|i| i as f64 / 10.0).collect();
        assert_relative_eq!(
            smooth_max(&args, 200.0).unwrap(),
            0.898_399_821_932_430_95,
            max_relative = 1e-12
        );

        let args = [0.0, 0.1, 0.23, 0.48, 0.71, 0.32, 0.22, 0.17, 1.0, 0.336];
        assert_relative_eq!(smooth_max(&args, 200.0).unwrap(), 1.0, max_relative = 1e-14);
    }

    #[test]
    fn test_smooth_max_errors() {
        let args = [0.0, 0.1, 0.23, 0.48, -0.71, 0.32];
        assert!(matches!(
            smooth_max(&args, 200.0),
            Err(FilterError::NegativeArgument(a)) if a == -0.71
        ));
        assert!(matches!(smooth_max(&[], 200.0), Err(FilterError::EmptyArguments)));
        assert!(matches!(smooth_max(&[0.2, 0.3], f64::NAN), Err(FilterError::InvalidExponent { .. })));
        // q = 0.5 + ln(2) / ln(0.5) < 0
        assert!(matches!(
            smooth_max(&[0.2, 0.3], 0.5),
            Err(FilterError::InvalidExponent { p, count: 2 }) if p == 0.5
        ));
    }

    #[test]
    fn test_smooth_max_single_argument_is_identity() {
        assert_relative_eq!(smooth_max(&[0.37], 6.0).unwrap(), 0.37, max_relative = 1e-14);
    }

    #[test]
    fn test_smooth_max_bounds_and_monotonicity() {
        let args = [1.0, 0.4, 1.3, 0.9];
        let s = smooth_max(&args, 6.0).unwrap();
        assert!(s >= 1.3);

        // below 1 the estimate may undershoot
        let small = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];
        assert!(smooth_max(&small, 200.0).unwrap() < 0.9);

        let mut bumped = args;
        for i in 0..args.len() {
            bumped[i] += 0.05;
            assert!(smooth_max(&bumped, 6.0).unwrap() >= s);
            bumped[i] = args[i];
        }
    }

    #[test]
    fn test_smooth_max_converges() {
        let args = [0.2, 0.5, 0.45];
        let coarse = (smooth_max(&args, 20.0).unwrap() - 0.5).abs();
        let fine = (smooth_max(&args, 1000.0).unwrap() - 0.5).abs();
        assert!(fine < coarse);
        assert!(fine < 1e-3);
    }

    #[test]
    fn test_smooth_min_reference_values() {
        let eps = f64::EPSILON;
        assert_relative_eq!(smooth_min(0.0, 1.0, eps), 7.450_580_596_923_828_1e-9, max_relative = 1e-9);
        assert_relative_eq!(smooth_min(1.0, 0.0, eps), 7.450_580_596_923_828_1e-9, max_relative = 1e-9);
        assert_relative_eq!(smooth_min(0.5, 0.8, eps), 0.500_000_007_450_580_37, max_relative = 1e-14);
        assert_eq!(smooth_min(0.5, 0.5, eps), 0.5);
        assert_relative_eq!(smooth_min(-1.0, 1.0, eps), -0.999_999_992_549_419_4, max_relative = 1e-14);
        assert_relative_eq!(smooth_min(-2.0, -1.0, eps), -1.999_999_992_549_419_4, max_relative = 1e-14);
    }

    #[test]
    fn test_smooth_min_bound() {
        let eps = 1e-4;
        for &(a, b) in &[(0.0, 1.0), (0.3, 0.31), (0.7, 0.2), (1.0, 1.0), (2.0, 0.0)] {
            let s = smooth_min(a, b, eps);
            assert!(s <= a.min(b) + 0.5 * eps.sqrt() + 1e-15);
            assert!(s >= a.min(b) - 1e-15);
            assert_eq!(s, smooth_min(b, a, eps));
            assert_relative_eq!(smooth_min(a, b, 0.0), a.min(b), epsilon = 1e-15);
        }
    }

    fn central_difference(f: impl Fn(f64) -> f64, x: f64) -> f64 {
        let h = 1e-6;
        (f(x + h) - f(x - h)) / (2.0 * h)
    }

    #[test]
    fn test_smooth_max_gradient_matches_finite_difference() {
        let args = [0.3, 0.8, 0.55, 0.7];
        let p = 6.0;
        let grad = smooth_max_gradient(&args, p).unwrap();
        for i in 0..args.len() {
            let fd = central_difference(
                |x| {
                    let mut a = args;
                    a[i] = x;
                    smooth_max(&a, p).unwrap()
                },
                args[i],
            );
            assert_relative_eq!(grad[i], fd, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_smooth_max_gradient_at_zero() {
        assert_eq!(smooth_max_gradient(&[0.0, 0.0], 6.0).unwrap(), vec![0.0, 0.0]);
        assert_eq!(smooth_max_gradient(&[0.0], 6.0).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_smooth_min_gradient_matches_finite_difference() {
        let eps = 1e-4;
        for &(a, b) in &[(0.2, 0.9), (0.5, 0.5), (1.0, 0.3)] {
            let (da, db) = smooth_min_gradient(a, b, eps);
            assert_relative_eq!(da, central_difference(|x| smooth_min(x, b, eps), a), epsilon = 1e-6);
            assert_relative_eq!(db, central_difference(|x| smooth_min(a, x, eps), b), epsilon = 1e-6);
            assert_relative_eq!(da + db, 1.0, epsilon = 1e-14);
        }
        assert_eq!(smooth_min_gradient(0.4, 0.4, 0.0), (0.5, 0.5));
    }
}
