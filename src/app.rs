//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - sets up tracing
//! - parses CLI arguments
//! - loads the incident dataset
//! - runs the requested analysis
//! - prints reports and writes optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{AnomalyArgs, Command, RankArgs, RiskArgs, ScoreArgs, ShowArgs, StatsArgs, TrendArgs};
use crate::domain::IncidentRecord;
use crate::error::AppError;

pub mod pipeline;

use pipeline::Dataset;

/// Entry point for the `avs` binary.
pub fn run() -> Result<(), AppError> {
    crate::logging::init_tracing();

    let cli = crate::cli::Cli::parse();

    // `show` reads an export and never touches the dataset.
    if let Some(Command::Show(args)) = &cli.command {
        return handle_show(args);
    }

    let path = pipeline::resolve_dataset_path(cli.data.data.as_deref());
    let dataset = pipeline::load_dataset(&path)?;
    println!(
        "{}",
        crate::report::format_dataset_header(&dataset.ingest, dataset.context.max_year)
    );

    match cli.command {
        Some(Command::Score(args)) => handle_score(&dataset, &args),
        Some(Command::Rank(args)) => handle_rank(&dataset, &args),
        Some(Command::Risk(args)) => handle_risk(&dataset, &args),
        Some(Command::Trend(args)) => handle_trend(&dataset, &args),
        Some(Command::Anomalies(args)) => handle_anomalies(&dataset, &args),
        Some(Command::Stats(args)) => handle_stats(&dataset, &args),
        Some(Command::Insights) | None => handle_insights(&dataset),
        Some(Command::Show(_)) => Ok(()),
    }
}

fn handle_score(dataset: &Dataset, args: &ScoreArgs) -> Result<(), AppError> {
    let aggregate = crate::stats::aggregate_entity(&dataset.ingest.records, args.kind, &args.entity);
    let outcome = crate::score::score(&aggregate, dataset.context.max_year);
    println!("{}", crate::report::format_score(&outcome, args.kind, &aggregate));
    Ok(())
}

fn handle_rank(dataset: &Dataset, args: &RankArgs) -> Result<(), AppError> {
    let ranking = crate::score::rank_entities(
        &dataset.ingest.records,
        args.kind,
        args.top,
        dataset.context.max_year,
    );
    println!("{}", crate::report::format_ranking(&ranking));

    if let Some(path) = &args.export {
        crate::io::export::write_ranking_csv(path, &ranking)?;
        info!(path = %path.display(), "wrote ranking CSV");
    }
    if let Some(path) = &args.export_json {
        crate::io::export::write_ranking_json(path, &ranking)?;
        info!(path = %path.display(), "wrote ranking JSON");
    }
    Ok(())
}

fn handle_show(args: &ShowArgs) -> Result<(), AppError> {
    let file = crate::io::export::read_ranking_json(&args.ranking)?;
    println!("{}", crate::report::format_ranking_file(&file));
    Ok(())
}

fn handle_risk(dataset: &Dataset, args: &RiskArgs) -> Result<(), AppError> {
    let operator = args.operator.as_deref().map(|name| {
        crate::stats::aggregate_entity(&dataset.ingest.records, crate::domain::EntityKind::Operator, name)
    });

    let estimate = crate::score::estimate_risk(operator.as_ref(), args.season, args.day, &dataset.context);
    println!(
        "{}",
        crate::report::format_risk(
            &estimate,
            args.operator.as_deref(),
            args.season.display_name(),
            args.day.display_name()
        )
    );
    Ok(())
}

fn handle_trend(dataset: &Dataset, args: &TrendArgs) -> Result<(), AppError> {
    let yearly = crate::stats::yearly_totals(&dataset.ingest.records);
    let trend = crate::analysis::predict_future_trends(&yearly, usize::from(args.years))?;
    println!("{}", crate::report::format_trend(&trend, &yearly));
    Ok(())
}

fn handle_anomalies(dataset: &Dataset, args: &AnomalyArgs) -> Result<(), AppError> {
    let threshold = validate_threshold(args.threshold)?;
    let yearly = crate::stats::yearly_totals(&dataset.ingest.records);
    let anomalies = crate::analysis::detect_anomalies(&yearly, threshold);
    println!("{}", crate::report::format_anomalies(&anomalies, threshold));
    Ok(())
}

fn handle_stats(dataset: &Dataset, args: &StatsArgs) -> Result<(), AppError> {
    let records = select_year_range(&dataset.ingest.records, args.from, args.to)?;
    let breakdowns = crate::stats::breakdowns(&records);
    println!("{}", crate::report::format_breakdowns(&breakdowns));
    Ok(())
}

/// Z-score thresholds must be finite and positive.
fn validate_threshold(threshold: f64) -> Result<f64, AppError> {
    if threshold.is_finite() && threshold > 0.0 {
        Ok(threshold)
    } else {
        Err(AppError::input(format!("`--threshold` must be finite and > 0 (got {threshold}).")))
    }
}

/// Records in the inclusive year range; a reversed range is an input error and
/// an empty selection a no-data error.
fn select_year_range(
    records: &[IncidentRecord],
    from: Option<i32>,
    to: Option<i32>,
) -> Result<Vec<IncidentRecord>, AppError> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(AppError::input(format!("Empty year range: {from} > {to}.")));
        }
    }

    let records = crate::stats::filter_years(records, from, to);
    if records.is_empty() {
        return Err(AppError::no_data("No incidents in the selected year range."));
    }
    Ok(records)
}

fn handle_insights(dataset: &Dataset) -> Result<(), AppError> {
    let insights = crate::analysis::generate_insights(&dataset.ingest.records);
    println!("{}", crate::report::format_insights(&insights));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::aggregate::tests::record;

    fn records() -> Vec<IncidentRecord> {
        vec![
            record("1990-03-01", "Alpha", 10.0, 1.0),
            record("1995-06-01", "Beta", 20.0, 2.0),
            record("2005-09-01", "Alpha", 30.0, 3.0),
        ]
    }

    #[test]
    fn threshold_must_be_positive_and_finite() {
        assert_eq!(validate_threshold(2.0).unwrap(), 2.0);
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert_eq!(validate_threshold(bad).unwrap_err().exit_code(), 2);
        }
    }

    #[test]
    fn reversed_year_range_is_input_error() {
        let err = select_year_range(&records(), Some(2000), Some(1990)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_year_range_is_no_data_error() {
        let err = select_year_range(&records(), Some(1996), Some(2004)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn year_range_is_inclusive() {
        let selected = select_year_range(&records(), Some(1995), Some(2005)).unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(select_year_range(&records(), None, None).unwrap().len(), 3);
    }
}
