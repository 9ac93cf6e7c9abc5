//! Telemetry / KPIs: per-incident records, daily summaries and the running
//! averages reported at the end of a run.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::grid::Coordinate;
use crate::incident::{Incident, IncidentId};

/// One resolved incident, recorded when its task joins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentRecord {
    pub id: IncidentId,
    pub day: u32,
    pub zone: usize,
    pub location: Coordinate,
    pub intensity: u8,
    pub reported_minute: u32,
    pub response_minutes: f64,
    pub wait_minutes: f64,
    pub units: Vec<Coordinate>,
}

impl IncidentRecord {
    /// `None` when the incident never received an allocation.
    pub fn from_incident(day: u32, incident: &Incident) -> Option<Self> {
        Some(Self {
            id: incident.id,
            day,
            zone: incident.zone,
            location: incident.location,
            intensity: incident.intensity.level,
            reported_minute: incident.reported_minute,
            response_minutes: incident.response_minutes?,
            wait_minutes: incident.wait_minutes,
            units: incident.unit_locations(),
        })
    }

    pub fn travel_minutes(&self) -> f64 {
        self.response_minutes - self.wait_minutes
    }
}

/// Aggregates for one simulated day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DaySummary {
    pub day: u32,
    pub incidents: usize,
    pub successful: usize,
    /// Incidents that waited at least once for capacity.
    pub delayed: usize,
    /// `None` on a day without incidents.
    pub mean_response_minutes: Option<f64>,
    pub success_ratio: Option<f64>,
    pub max_response_minutes: Option<f64>,
}

impl DaySummary {
    pub fn from_records(day: u32, records: &[IncidentRecord], threshold_minutes: f64) -> Self {
        let incidents = records.len();
        let successful = records
            .iter()
            .filter(|r| r.response_minutes <= threshold_minutes)
            .count();
        let delayed = records.iter().filter(|r| r.wait_minutes > 0.0).count();
        let (mean_response_minutes, success_ratio, max_response_minutes) = if incidents == 0 {
            (None, None, None)
        } else {
            let total: f64 = records.iter().map(|r| r.response_minutes).sum();
            let max = records
                .iter()
                .map(|r| r.response_minutes)
                .fold(f64::NEG_INFINITY, f64::max);
            (
                Some(total / incidents as f64),
                Some(successful as f64 / incidents as f64),
                Some(max),
            )
        };
        Self {
            day,
            incidents,
            successful,
            delayed,
            mean_response_minutes,
            success_ratio,
            max_response_minutes,
        }
    }
}

/// Incremental mean over daily values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningAverage {
    value: f64,
    samples: u32,
}

impl RunningAverage {
    /// Fold in one day's value and return the new average.
    pub fn fold(&mut self, sample: f64) -> f64 {
        self.samples += 1;
        self.value = (self.value * f64::from(self.samples - 1) + sample) / f64::from(self.samples);
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }
}

/// Which units served an incident during the first simulated day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchTrace {
    pub incident: Coordinate,
    pub units: Vec<Coordinate>,
}

/// Accumulates daily summaries into the run's time series.
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    response: RunningAverage,
    success: RunningAverage,
    response_series: Vec<f64>,
    success_series: Vec<f64>,
    days: Vec<DaySummary>,
    total_incidents: u64,
    first_day_dispatches: Vec<DispatchTrace>,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Days without incidents carry the previous running values forward
    /// instead of folding in a sample.
    pub fn record_day(&mut self, summary: DaySummary) {
        if let (Some(mean), Some(ratio)) = (summary.mean_response_minutes, summary.success_ratio) {
            self.response.fold(mean);
            self.success.fold(ratio);
        }
        self.response_series.push(self.response.value());
        self.success_series.push(self.success.value());
        self.total_incidents += summary.incidents as u64;
        self.days.push(summary);
    }

    /// Record the first `limit` incidents of the first day, in spawn order.
    pub fn record_first_day(&mut self, records: &[IncidentRecord], limit: usize) {
        self.first_day_dispatches = records
            .iter()
            .take(limit)
            .map(|r| DispatchTrace {
                incident: r.location,
                units: r.units.clone(),
            })
            .collect();
    }

    pub fn days_recorded(&self) -> usize {
        self.days.len()
    }

    pub fn response_average(&self) -> RunningAverage {
        self.response
    }

    pub fn success_average(&self) -> RunningAverage {
        self.success
    }

    pub fn into_report(self) -> SimulationReport {
        SimulationReport {
            response_time_series: self.response_series,
            success_ratio_series: self.success_series,
            days: self.days,
            total_incidents: self.total_incidents,
            first_day_dispatches: self.first_day_dispatches,
        }
    }
}

/// Result of a full run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    /// Running average of daily mean response time after each day.
    pub response_time_series: Vec<f64>,
    /// Running average of daily success ratio after each day.
    pub success_ratio_series: Vec<f64>,
    pub days: Vec<DaySummary>,
    pub total_incidents: u64,
    pub first_day_dispatches: Vec<DispatchTrace>,
}

impl SimulationReport {
    pub fn final_response_minutes(&self) -> Option<f64> {
        self.response_time_series.last().copied()
    }

    pub fn final_success_ratio(&self) -> Option<f64> {
        self.success_ratio_series.last().copied()
    }

    /// First-day dispatches keyed by incident location. A later incident at
    /// the same location replaces an earlier one.
    pub fn dispatch_map(&self) -> BTreeMap<Coordinate, Vec<Coordinate>> {
        self.first_day_dispatches
            .iter()
            .map(|t| (t.incident, t.units.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(response: f64, wait: f64) -> IncidentRecord {
        IncidentRecord {
            id: IncidentId(0),
            day: 0,
            zone: 0,
            location: Coordinate::new(0, 0),
            intensity: 1,
            reported_minute: 0,
            response_minutes: response,
            wait_minutes: wait,
            units: vec![Coordinate::new(0, 0)],
        }
    }

    #[test]
    fn day_summary_counts_successes_at_threshold() {
        let records = [record(1.0, 0.0), record(10.0, 0.0), record(12.0, 3.0)];
        let summary = DaySummary::from_records(0, &records, 10.0);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.delayed, 1);
        assert_eq!(summary.max_response_minutes, Some(12.0));
        assert!((summary.mean_response_minutes.unwrap() - 23.0 / 3.0).abs() < 1e-12);
        assert!((summary.success_ratio.unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert!((records[2].travel_minutes() - 9.0).abs() < 1e-12);
    }

    #[test]
    fn running_average_matches_arithmetic_mean() {
        let mut avg = RunningAverage::default();
        for x in [2.0, 4.0, 9.0] {
            avg.fold(x);
        }
        assert!((avg.value() - 5.0).abs() < 1e-12);
        assert_eq!(avg.samples(), 3);
    }

    #[test]
    fn empty_days_carry_previous_values() {
        let mut stats = RunStatistics::new();
        stats.record_day(DaySummary::from_records(0, &[record(2.0, 0.0)], 10.0));
        stats.record_day(DaySummary::from_records(1, &[], 10.0));
        stats.record_day(DaySummary::from_records(2, &[record(4.0, 0.0)], 10.0));
        let report = stats.into_report();
        assert_eq!(report.response_time_series, vec![2.0, 2.0, 3.0]);
        assert_eq!(report.success_ratio_series, vec![1.0, 1.0, 1.0]);
        assert_eq!(report.total_incidents, 2);
        assert_eq!(report.days.len(), 3);
    }

    #[test]
    fn dispatch_map_keeps_latest_per_location() {
        let mut stats = RunStatistics::new();
        let mut later = record(1.0, 0.0);
        later.units = vec![Coordinate::new(0, 1)];
        stats.record_first_day(&[record(1.0, 0.0), later, record(1.0, 0.0)], 2);
        let report = stats.into_report();
        assert_eq!(report.first_day_dispatches.len(), 2);
        assert_eq!(
            report.dispatch_map().get(&Coordinate::new(0, 0)),
            Some(&vec![Coordinate::new(0, 1)])
        );
    }
}
