//! Polynomial regression on a single explanatory variable.
//!
//! Raw calendar years make a badly scaled Vandermonde matrix (`2000² ≈ 4e6`), so
//! `x` is centred on its mean before building the design. Predictions undo the
//! shift, so the fitted curve is identical to an uncentred fit.

use nalgebra::{DMatrix, DVector};

use crate::math::ols::solve_least_squares;

/// A fitted polynomial `y = Σ c_k (x - x_mean)^k`.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyFit {
    pub degree: usize,
    pub x_mean: f64,
    /// Coefficients in ascending power order (intercept first).
    pub coefficients: Vec<f64>,
    /// In-sample coefficient of determination.
    pub r_squared: f64,
}

impl PolyFit {
    pub fn predict(&self, x: f64) -> f64 {
        let u = x - self.x_mean;
        // Horner, highest power first.
        self.coefficients.iter().rev().fold(0.0, |acc, &c| acc * u + c)
    }
}

/// Fit a polynomial of `degree` by least squares.
///
/// Returns `None` when there are not more points than coefficients, the inputs
/// have different lengths, or the system cannot be solved.
pub fn fit_polynomial(xs: &[f64], ys: &[f64], degree: usize) -> Option<PolyFit> {
    let p = degree + 1;
    let n = xs.len();
    if n != ys.len() || n < p {
        return None;
    }

    let x_mean = xs.iter().sum::<f64>() / n as f64;

    let mut design = DMatrix::<f64>::zeros(n, p);
    for (i, &x) in xs.iter().enumerate() {
        let u = x - x_mean;
        let mut term = 1.0;
        for k in 0..p {
            design[(i, k)] = term;
            term *= u;
        }
    }
    let y = DVector::from_column_slice(ys);

    let beta = solve_least_squares(&design, &y)?;

    let mut fit = PolyFit {
        degree,
        x_mean,
        coefficients: beta.iter().copied().collect(),
        r_squared: 0.0,
    };
    fit.r_squared = r_squared(xs, ys, &fit);
    Some(fit)
}

/// Residual sum of squares treated as zero for a constant target.
const PERFECT_FIT_TOLERANCE: f64 = 1e-9;

/// `1 - SSE/SST`. A constant target (SST = 0) reports 1 when fitted exactly,
/// otherwise 0.
fn r_squared(xs: &[f64], ys: &[f64], fit: &PolyFit) -> f64 {
    let n = ys.len() as f64;
    let y_mean = ys.iter().sum::<f64>() / n;
    let sst: f64 = ys.iter().map(|y| (y - y_mean).powi(2)).sum();
    let sse: f64 = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| (y - fit.predict(x)).powi(2))
        .sum();
    if sst <= 0.0 {
        let scale = 1.0 + y_mean * y_mean;
        return if sse <= PERFECT_FIT_TOLERANCE * n * scale { 1.0 } else { 0.0 };
    }
    1.0 - sse / sst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_quadratic() {
        let xs: Vec<f64> = (1990..2000).map(f64::from).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 + 0.5 * (x - 1990.0) + 0.25 * (x - 1990.0).powi(2)).collect();

        let fit = fit_polynomial(&xs, &ys, 2).unwrap();
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
        let expected = 3.0 + 0.5 * 12.0 + 0.25 * 144.0;
        assert!((fit.predict(2002.0) - expected).abs() < 1e-6);
    }

    #[test]
    fn too_few_points_is_none() {
        assert!(fit_polynomial(&[1.0, 2.0], &[1.0, 2.0], 2).is_none());
        assert!(fit_polynomial(&[1.0, 2.0, 3.0], &[1.0, 2.0], 1).is_none());
    }

    #[test]
    fn constant_series_fitted_exactly_has_unit_r_squared() {
        let fit = fit_polynomial(&[1.0, 2.0, 3.0, 4.0], &[5.0, 5.0, 5.0, 5.0], 2).unwrap();
        assert_eq!(fit.r_squared, 1.0);
        assert!((fit.predict(10.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn constant_target_with_residuals_has_zero_r_squared() {
        let fit = PolyFit {
            degree: 1,
            x_mean: 0.0,
            coefficients: vec![4.0, 1.0],
            r_squared: 0.0,
        };
        assert_eq!(r_squared(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0], &fit), 0.0);
    }
}
