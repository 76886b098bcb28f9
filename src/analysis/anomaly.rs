//! Years with unusually many incidents or fatalities.
//!
//! Z-scores use the population standard deviation; a flat series has no anomalies.

use serde::Serialize;

use crate::domain::YearlyTotals;

/// Default absolute z-score above which a year is flagged.
pub const DEFAULT_Z_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnomalyKind {
    HighIncidents,
    HighFatalities,
}

impl AnomalyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnomalyKind::HighIncidents => "High Incidents",
            AnomalyKind::HighFatalities => "High Fatalities",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearAnomaly {
    pub year: i32,
    pub incidents: u64,
    pub fatalities: f64,
    pub incident_z: f64,
    pub fatality_z: f64,
    pub kind: AnomalyKind,
}

/// Flag years whose incident or fatality |z| exceeds `threshold`.
///
/// Output is ascending by year. The incident signal wins when both exceed.
pub fn detect_anomalies(yearly: &[YearlyTotals], threshold: f64) -> Vec<YearAnomaly> {
    let incidents: Vec<f64> = yearly.iter().map(|y| y.incidents as f64).collect();
    let fatalities: Vec<f64> = yearly.iter().map(|y| y.fatalities).collect();
    let incident_z = abs_z_scores(&incidents);
    let fatality_z = abs_z_scores(&fatalities);

    let mut out: Vec<YearAnomaly> = yearly
        .iter()
        .zip(incident_z.iter().zip(&fatality_z))
        .filter(|(_, (iz, fz))| **iz > threshold || **fz > threshold)
        .map(|(y, (&iz, &fz))| YearAnomaly {
            year: y.year,
            incidents: y.incidents,
            fatalities: y.fatalities,
            incident_z: iz,
            fatality_z: fz,
            kind: if iz > threshold {
                AnomalyKind::HighIncidents
            } else {
                AnomalyKind::HighFatalities
            },
        })
        .collect();

    out.sort_by_key(|a| a.year);
    out
}

/// `|x - mean| / std` with population std; zero std maps every value to 0.
pub fn abs_z_scores(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();

    if !(std.is_finite() && std > 0.0) {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| ((v - mean) / std).abs()).collect()
}
