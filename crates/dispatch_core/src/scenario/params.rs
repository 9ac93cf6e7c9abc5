use serde::{Deserialize, Serialize};

use crate::grid::Coordinate;
use crate::responders::SizeClass;
use crate::traffic::TrafficProfileKind;

/// Expected incidents per minute for [`DEFAULT_BASE_POPULATION`] people.
pub const DEFAULT_EMERGENCY_RATE: f64 = 13.165119;
pub const DEFAULT_BASE_POPULATION: u64 = 200_000;

const DEFAULT_DAYS: u32 = 100;
const DEFAULT_SUCCESS_THRESHOLD_MINUTES: f64 = 10.0;
const DEFAULT_DIAGNOSTIC_INCIDENTS: usize = 5;

fn default_emergency_rate() -> f64 {
    DEFAULT_EMERGENCY_RATE
}

fn default_base_population() -> u64 {
    DEFAULT_BASE_POPULATION
}

/// One responder station in a city description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPlacement {
    pub size: SizeClass,
    pub location: Coordinate,
}

impl UnitPlacement {
    pub fn new(size: SizeClass, location: impl Into<Coordinate>) -> Self {
        Self {
            size,
            location: location.into(),
        }
    }
}

/// Static description of a city: zone layout, populations, incident mix and
/// responder placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityConfig {
    /// Zones along the horizontal axis.
    pub width: u32,
    /// Zones along the vertical axis.
    pub height: u32,
    /// Population per zone, row-major.
    pub zone_populations: Vec<u64>,
    /// Percent of incidents at each intensity level 1..=5.
    pub intensity_percentages: Vec<u32>,
    #[serde(default)]
    pub units: Vec<UnitPlacement>,
    #[serde(default = "default_emergency_rate")]
    pub emergency_rate_per_minute: f64,
    #[serde(default = "default_base_population")]
    pub base_population: u64,
}

impl CityConfig {
    pub fn new(width: u32, height: u32, zone_populations: Vec<u64>) -> Self {
        Self {
            width,
            height,
            zone_populations,
            intensity_percentages: vec![100, 0, 0, 0, 0],
            units: Vec::new(),
            emergency_rate_per_minute: DEFAULT_EMERGENCY_RATE,
            base_population: DEFAULT_BASE_POPULATION,
        }
    }

    pub fn with_intensity_percentages(mut self, percentages: Vec<u32>) -> Self {
        self.intensity_percentages = percentages;
        self
    }

    pub fn with_unit(mut self, size: SizeClass, location: impl Into<Coordinate>) -> Self {
        self.units.push(UnitPlacement::new(size, location));
        self
    }

    pub fn with_units(mut self, units: impl IntoIterator<Item = UnitPlacement>) -> Self {
        self.units.extend(units);
        self
    }

    pub fn with_emergency_rate(mut self, per_minute: f64, base_population: u64) -> Self {
        self.emergency_rate_per_minute = per_minute;
        self.base_population = base_population;
        self
    }

    /// Expected incidents per person per minute.
    pub fn rate_per_person(&self) -> f64 {
        self.emergency_rate_per_minute / self.base_population as f64
    }

    pub fn total_population(&self) -> u64 {
        self.zone_populations.iter().sum()
    }
}

impl Default for CityConfig {
    /// Two zones of 2,500 people each, all incidents at intensity 1 and nine
    /// small stations spread across the six columns.
    fn default() -> Self {
        let stations = [(1, 1), (1, 3), (1, 5), (0, 2), (0, 4), (2, 0), (2, 2), (2, 4), (0, 0)];
        Self::new(2, 1, vec![2500, 2500]).with_units(
            stations
                .into_iter()
                .map(|loc| UnitPlacement::new(SizeClass::Small, loc)),
        )
    }
}

/// Run-level knobs. Everything has a default, so an empty JSON object is a
/// valid parameter file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub days: u32,
    /// Seed for the run's RNG; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Response times at or below this count as successful.
    pub success_threshold_minutes: f64,
    /// Free-flow travel time of one grid edge.
    pub commute_minutes: f64,
    pub traffic_profile: TrafficProfileKind,
    /// How many first-day incidents to record in the dispatch map.
    pub diagnostic_incidents: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS,
            seed: None,
            success_threshold_minutes: DEFAULT_SUCCESS_THRESHOLD_MINUTES,
            commute_minutes: crate::graph::DEFAULT_COMMUTE_MINUTES,
            traffic_profile: TrafficProfileKind::default(),
            diagnostic_incidents: DEFAULT_DIAGNOSTIC_INCIDENTS,
        }
    }
}

impl SimulationParams {
    pub fn with_days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_success_threshold(mut self, minutes: f64) -> Self {
        self.success_threshold_minutes = minutes;
        self
    }

    pub fn with_commute_minutes(mut self, minutes: f64) -> Self {
        self.commute_minutes = minutes;
        self
    }

    pub fn with_traffic_profile(mut self, kind: TrafficProfileKind) -> Self {
        self.traffic_profile = kind;
        self
    }

    pub fn with_diagnostic_incidents(mut self, count: usize) -> Self {
        self.diagnostic_incidents = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_file_uses_defaults() {
        let params: SimulationParams = serde_json::from_str("{}").expect("parse");
        assert_eq!(params, SimulationParams::default());
        assert_eq!(params.days, 100);
        assert_eq!(params.success_threshold_minutes, 10.0);
    }

    #[test]
    fn city_json_fills_rate_defaults() {
        let json = r#"{
            "width": 1,
            "height": 1,
            "zone_populations": [1000],
            "intensity_percentages": [60, 40, 0, 0, 0],
            "units": [{ "size": "medium", "location": { "row": 1, "col": 1 } }]
        }"#;
        let city: CityConfig = serde_json::from_str(json).expect("parse");
        assert_eq!(city.units[0].size, SizeClass::Medium);
        assert_eq!(city.emergency_rate_per_minute, DEFAULT_EMERGENCY_RATE);
        assert!((city.rate_per_person() - 13.165119 / 200_000.0).abs() < 1e-15);
    }

    #[test]
    fn demo_city_has_nine_small_stations() {
        let city = CityConfig::default();
        assert_eq!(city.units.len(), 9);
        assert_eq!(city.total_population(), 5000);
    }
}
