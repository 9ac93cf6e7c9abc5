//! Metrics extraction from simulation reports.
//!
//! Reduces one run's report to a flat result row, and a group of replications
//! to summary statistics over those rows.

use dispatch_core::telemetry::SimulationReport;
use serde::Serialize;

use crate::parameters::ParameterSet;

/// Aggregated metrics from a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub experiment_id: String,
    pub run_id: usize,
    pub seed: u64,
    pub days: usize,
    pub total_incidents: u64,
    /// Running average response time after the last day.
    pub response_minutes: f64,
    /// Running average success ratio after the last day.
    pub success_ratio: f64,
    /// Median of the daily mean response times.
    pub median_daily_response_minutes: f64,
    /// P90 of the daily mean response times.
    pub p90_daily_response_minutes: f64,
    /// Slowest single response over the run.
    pub max_response_minutes: f64,
    /// Share of incidents that waited for capacity at least once.
    pub delayed_fraction: f64,
}

impl SimulationResult {
    /// Average, median and p90 of `values`; zeros when empty.
    pub fn calculate_stats(values: &[f64]) -> (f64, f64, f64) {
        if values.is_empty() {
            return (0.0, 0.0, 0.0);
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let avg = sorted.iter().sum::<f64>() / sorted.len() as f64;
        let median = if sorted.len() % 2 == 0 {
            (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
        } else {
            sorted[sorted.len() / 2]
        };
        let p90_idx = ((sorted.len() - 1) as f64 * 0.9) as usize;
        let p90 = sorted[p90_idx.min(sorted.len() - 1)];

        (avg, median, p90)
    }
}

/// Build the result row for one finished run.
pub fn extract_metrics(set: &ParameterSet, report: &SimulationReport) -> SimulationResult {
    let daily: Vec<f64> = report
        .days
        .iter()
        .filter_map(|d| d.mean_response_minutes)
        .collect();
    let (_, median, p90) = SimulationResult::calculate_stats(&daily);
    let max_response_minutes = report
        .days
        .iter()
        .filter_map(|d| d.max_response_minutes)
        .fold(0.0, f64::max);
    let delayed: usize = report.days.iter().map(|d| d.delayed).sum();
    let delayed_fraction = if report.total_incidents == 0 {
        0.0
    } else {
        delayed as f64 / report.total_incidents as f64
    };

    SimulationResult {
        experiment_id: set.experiment_id.clone(),
        run_id: set.run_id,
        seed: set.seed,
        days: report.days.len(),
        total_incidents: report.total_incidents,
        response_minutes: report.final_response_minutes().unwrap_or(0.0),
        success_ratio: report.final_success_ratio().unwrap_or(0.0),
        median_daily_response_minutes: median,
        p90_daily_response_minutes: p90,
        max_response_minutes,
        delayed_fraction,
    }
}

/// Statistics across the replications of one experiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentSummary {
    pub experiment_id: String,
    pub runs: usize,
    pub mean_response_minutes: f64,
    pub median_response_minutes: f64,
    pub p90_response_minutes: f64,
    pub mean_success_ratio: f64,
    pub min_success_ratio: f64,
}

/// Group results by experiment id, in first-seen order.
pub fn summarize(results: &[SimulationResult]) -> Vec<ExperimentSummary> {
    let mut order: Vec<&str> = Vec::new();
    for result in results {
        if !order.contains(&result.experiment_id.as_str()) {
            order.push(&result.experiment_id);
        }
    }

    order
        .into_iter()
        .map(|id| {
            let group: Vec<&SimulationResult> =
                results.iter().filter(|r| r.experiment_id == id).collect();
            let responses: Vec<f64> = group.iter().map(|r| r.response_minutes).collect();
            let successes: Vec<f64> = group.iter().map(|r| r.success_ratio).collect();
            let (mean_response, median_response, p90_response) =
                SimulationResult::calculate_stats(&responses);
            let (mean_success, _, _) = SimulationResult::calculate_stats(&successes);
            ExperimentSummary {
                experiment_id: id.to_string(),
                runs: group.len(),
                mean_response_minutes: mean_response,
                median_response_minutes: median_response,
                p90_response_minutes: p90_response,
                mean_success_ratio: mean_success,
                min_success_ratio: successes.iter().copied().fold(f64::INFINITY, f64::min),
            }
        })
        .collect()
}
