//! Replication plans: which city and parameters to run, how many times, and
//! with which seeds.

use dispatch_core::scenario::{CityConfig, SimulationParams};
use dispatch_core::traffic::TrafficProfileKind;
use serde::Serialize;

const SEED_STRIDE: u64 = 0x9e37_79b9;

/// One run of one configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSet {
    pub city: CityConfig,
    pub params: SimulationParams,
    /// Identifies the configuration; replications of it share this id.
    pub experiment_id: String,
    /// Replication index within the experiment.
    pub run_id: usize,
    pub seed: u64,
}

impl ParameterSet {
    pub fn new(
        city: CityConfig,
        params: SimulationParams,
        experiment_id: String,
        run_id: usize,
        seed: u64,
    ) -> Self {
        Self {
            city,
            params,
            experiment_id,
            run_id,
            seed,
        }
    }

    /// Run parameters with this set's seed applied.
    pub fn simulation_params(&self) -> SimulationParams {
        self.params.clone().with_seed(self.seed)
    }
}

/// A grid of configurations to explore, each replicated with distinct seeds.
///
/// Axes left empty fall back to the base parameters.
#[derive(Debug, Clone)]
pub struct ParameterSpace {
    city: CityConfig,
    base: SimulationParams,
    replications: usize,
    base_seed: u64,
    rate_multipliers: Vec<f64>,
    commute_minutes: Vec<f64>,
    traffic_profiles: Vec<TrafficProfileKind>,
    success_thresholds: Vec<f64>,
}

impl ParameterSpace {
    pub fn new(city: CityConfig, base: SimulationParams) -> Self {
        Self {
            city,
            base,
            replications: 1,
            base_seed: 0,
            rate_multipliers: vec![],
            commute_minutes: vec![],
            traffic_profiles: vec![],
            success_thresholds: vec![],
        }
    }

    pub fn replications(mut self, count: usize) -> Self {
        self.replications = count.max(1);
        self
    }

    pub fn base_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    /// Scale the city's emergency rate by each of these factors.
    pub fn rate_multiplier(mut self, multipliers: Vec<f64>) -> Self {
        self.rate_multipliers = multipliers;
        self
    }

    pub fn commute_minutes(mut self, minutes: Vec<f64>) -> Self {
        self.commute_minutes = minutes;
        self
    }

    pub fn traffic_profile(mut self, profiles: Vec<TrafficProfileKind>) -> Self {
        self.traffic_profiles = profiles;
        self
    }

    pub fn success_threshold(mut self, minutes: Vec<f64>) -> Self {
        self.success_thresholds = minutes;
        self
    }

    fn axis<T: Clone>(values: &[T], fallback: T) -> Vec<T> {
        if values.is_empty() {
            vec![fallback]
        } else {
            values.to_vec()
        }
    }

    /// Cartesian product of every axis, times the replication count.
    pub fn generate(&self) -> Vec<ParameterSet> {
        let rates = Self::axis(&self.rate_multipliers, 1.0);
        let commutes = Self::axis(&self.commute_minutes, self.base.commute_minutes);
        let profiles = Self::axis(&self.traffic_profiles, self.base.traffic_profile.clone());
        let thresholds = Self::axis(&self.success_thresholds, self.base.success_threshold_minutes);

        let mut sets = Vec::new();
        let mut experiment = 0usize;
        for &rate in &rates {
            for &commute in &commutes {
                for profile in &profiles {
                    for &threshold in &thresholds {
                        let mut city = self.city.clone();
                        city.emergency_rate_per_minute *= rate;
                        let params = self
                            .base
                            .clone()
                            .with_commute_minutes(commute)
                            .with_traffic_profile(profile.clone())
                            .with_success_threshold(threshold);
                        for run_id in 0..self.replications {
                            let index = (experiment * self.replications + run_id) as u64;
                            let seed = self
                                .base_seed
                                .wrapping_add(index.wrapping_mul(SEED_STRIDE));
                            sets.push(ParameterSet::new(
                                city.clone(),
                                params.clone(),
                                format!("exp_{experiment}"),
                                run_id,
                                seed,
                            ));
                        }
                        experiment += 1;
                    }
                }
            }
        }
        sets
    }
}
