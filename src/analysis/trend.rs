//! Forecast of yearly incident counts.

use serde::Serialize;
use tracing::info;

use crate::domain::YearlyTotals;
use crate::error::AppError;
use crate::math::{PolyFit, fit_polynomial};

/// Degree of the trend polynomial.
pub const TREND_DEGREE: usize = 2;
/// Longest forecast horizon accepted, in years.
pub const MAX_FORECAST_YEARS: u16 = 200;

/// One forecast year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub predicted_incidents: f64,
}

#[derive(Debug, Clone)]
pub struct TrendForecast {
    pub fit: PolyFit,
    pub last_observed_year: i32,
    pub forecast: Vec<TrendPoint>,
}

/// Fit a quadratic to incidents-per-year and forecast `years_ahead` years.
///
/// Predictions are floored at zero. `years_ahead` must be in `1..=MAX_FORECAST_YEARS`.
pub fn predict_future_trends(yearly: &[YearlyTotals], years_ahead: usize) -> Result<TrendForecast, AppError> {
    let horizon = i32::try_from(years_ahead)
        .ok()
        .filter(|&h| (1..=i32::from(MAX_FORECAST_YEARS)).contains(&h))
        .ok_or_else(|| {
            AppError::input(format!(
                "Forecast horizon must be between 1 and {MAX_FORECAST_YEARS} years (got {years_ahead})."
            ))
        })?;

    if yearly.len() <= TREND_DEGREE {
        return Err(AppError::no_data(format!(
            "Trend forecast needs at least {} distinct years (found {}).",
            TREND_DEGREE + 1,
            yearly.len()
        )));
    }

    let xs: Vec<f64> = yearly.iter().map(|y| f64::from(y.year)).collect();
    let ys: Vec<f64> = yearly.iter().map(|y| y.incidents as f64).collect();

    let fit = fit_polynomial(&xs, &ys, TREND_DEGREE)
        .ok_or_else(|| AppError::internal("Trend regression could not be solved."))?;

    let last_observed_year = yearly.iter().map(|y| y.year).max().unwrap_or_default();
    let forecast = (1..=horizon)
        .map(|offset| {
            let year = last_observed_year + offset;
            TrendPoint {
                year,
                predicted_incidents: fit.predict(f64::from(year)).max(0.0),
            }
        })
        .collect();

    info!(r_squared = fit.r_squared, years_ahead, "fitted trend");

    Ok(TrendForecast {
        fit,
        last_observed_year,
        forecast,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yearly(counts: &[(i32, u64)]) -> Vec<YearlyTotals> {
        counts
            .iter()
            .map(|&(year, incidents)| YearlyTotals {
                year,
                incidents,
                fatalities: 0.0,
                aboard: 0.0,
            })
            .collect()
    }

    #[test]
    fn forecasts_following_years() {
        let data = yearly(&[(2000, 10), (2001, 12), (2002, 14), (2003, 16)]);
        let trend = predict_future_trends(&data, 3).unwrap();
        let years: Vec<i32> = trend.forecast.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2004, 2005, 2006]);
        assert!((trend.forecast[0].predicted_incidents - 18.0).abs() < 1e-6);
        assert!((trend.fit.r_squared - 1.0).abs() < 1e-9);
    }

    #[test]
    fn declining_trend_is_floored_at_zero() {
        let data = yearly(&[(2000, 30), (2001, 20), (2002, 10), (2003, 0)]);
        let trend = predict_future_trends(&data, 2).unwrap();
        assert!(trend.forecast.iter().all(|p| p.predicted_incidents >= 0.0));
        assert_eq!(trend.forecast[1].predicted_incidents, 0.0);
    }

    #[test]
    fn too_few_years_is_an_error() {
        let err = predict_future_trends(&yearly(&[(2000, 1), (2001, 2)]), 5).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn out_of_range_horizon_is_input_error() {
        let data = yearly(&[(2000, 10), (2001, 12), (2002, 14), (2003, 16)]);
        for years in [0, usize::from(MAX_FORECAST_YEARS) + 1, 3_000_000_000, (1 << 32) + 2] {
            let err = predict_future_trends(&data, years).unwrap_err();
            assert_eq!(err.exit_code(), 2, "horizon {years}");
        }
        let longest = predict_future_trends(&data, usize::from(MAX_FORECAST_YEARS)).unwrap();
        assert_eq!(longest.forecast.len(), usize::from(MAX_FORECAST_YEARS));
    }
}
