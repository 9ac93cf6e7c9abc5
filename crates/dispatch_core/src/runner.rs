//! Simulation driver: advances the virtual clock minute by minute, spawns one
//! task per incident and folds daily results into running statistics.
//!
//! A day is 1440 simulated minutes measured from whenever the previous day's
//! last incident resolved. The graph is reweighted at the start of every
//! traffic window, each zone runs one trial per minute, and the day closes
//! once every incident it spawned has joined. Statistics are folded in spawn
//! order, so a seeded run is reproducible.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::clock::{virtual_time_runtime, MINUTES_PER_DAY};
use crate::context::RunContext;
use crate::dispatch::DispatchEngine;
use crate::error::SimulationError;
use crate::incident::IncidentGenerator;
use crate::responders::ResponderPool;
use crate::scenario::{build_scenario, CityConfig, Scenario, SimulationParams};
use crate::telemetry::{DaySummary, IncidentRecord, RunStatistics, SimulationReport};
use crate::traffic::TimeOfDayProfile;

/// Refuse to start a run that could block forever: an empty pool, or one too
/// small for the largest incident the generator can produce.
pub fn check_capacity(
    pool: &ResponderPool,
    generator: &IncidentGenerator,
) -> Result<(), SimulationError> {
    let available = pool.total_capacity();
    if available == 0 {
        return Err(SimulationError::NoCapacityConfigured);
    }
    let required = generator.max_intensity().teams;
    if available < required {
        return Err(SimulationError::InsufficientCapacity {
            required,
            available,
        });
    }
    Ok(())
}

pub struct SimulationDriver {
    engine: DispatchEngine,
    generator: IncidentGenerator,
    traffic: TimeOfDayProfile,
    params: SimulationParams,
    rng: StdRng,
    day: u32,
    stats: RunStatistics,
}

impl SimulationDriver {
    /// Must be called inside the simulation runtime.
    pub fn new(scenario: Scenario) -> Result<Self, SimulationError> {
        let Scenario {
            graph,
            pool,
            generator,
            traffic,
            params,
        } = scenario;
        check_capacity(&pool, &generator)?;

        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let ctx = Arc::new(RunContext::new(graph, pool));
        Ok(Self {
            engine: DispatchEngine::new(ctx),
            generator,
            traffic,
            params,
            rng,
            day: 0,
            stats: RunStatistics::new(),
        })
    }

    pub fn engine(&self) -> &DispatchEngine {
        &self.engine
    }

    /// Index of the next day to simulate.
    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn statistics(&self) -> &RunStatistics {
        &self.stats
    }

    /// Simulate one day and return its summary.
    pub async fn run_day(&mut self) -> Result<DaySummary, SimulationError> {
        let day = self.day;
        let ctx = Arc::clone(self.engine.context());
        let clock = *ctx.clock();
        let day_start = clock.now_minutes();

        let mut handles = Vec::new();
        for minute in 0..MINUTES_PER_DAY {
            if let Some(weight) = self.traffic.reweight_at(minute) {
                ctx.graph_mut().reweight(weight, &mut self.rng)?;
            }
            for zone in 0..self.generator.zone_count() {
                if !self.generator.trial(zone, &mut self.rng) {
                    continue;
                }
                let Some(incident) = self.generator.create_incident(zone, minute, &mut self.rng)
                else {
                    continue;
                };
                let engine = self.engine.clone();
                handles.push(tokio::spawn(async move { engine.resolve(incident).await }));
            }
            clock
                .sleep_until_minute(day_start + f64::from(minute + 1))
                .await;
        }

        let spawned = handles.len();
        let mut records = Vec::with_capacity(spawned);
        for handle in handles {
            let incident = handle.await??;
            if let Some(record) = IncidentRecord::from_incident(day, &incident) {
                records.push(record);
            }
        }

        {
            let pool = ctx.lock_pool().await;
            if !pool.is_fully_available() {
                return Err(SimulationError::CapacityLeak {
                    day,
                    available: pool.available_capacity(),
                    total: pool.total_capacity(),
                });
            }
        }

        if day == 0 {
            self.stats
                .record_first_day(&records, self.params.diagnostic_incidents);
        }
        let summary =
            DaySummary::from_records(day, &records, self.params.success_threshold_minutes);
        self.stats.record_day(summary);
        self.day += 1;

        info!(
            day,
            incidents = spawned,
            mean_response_minutes = summary.mean_response_minutes,
            success_ratio = summary.success_ratio,
            delayed = summary.delayed,
            "day complete"
        );
        debug!(
            running_response = self.stats.response_average().value(),
            running_success = self.stats.success_average().value(),
            elapsed_minutes = clock.now_minutes(),
            "running averages"
        );
        Ok(summary)
    }

    /// Run every configured day.
    pub async fn run(self) -> Result<SimulationReport, SimulationError> {
        self.run_with_hook(|_| {}).await
    }

    /// Run every configured day, invoking `hook` after each.
    pub async fn run_with_hook<F>(mut self, mut hook: F) -> Result<SimulationReport, SimulationError>
    where
        F: FnMut(&DaySummary),
    {
        while self.day < self.params.days {
            let summary = self.run_day().await?;
            hook(&summary);
        }
        let report = self.stats.into_report();
        info!(
            days = report.days.len(),
            incidents = report.total_incidents,
            response_minutes = report.final_response_minutes(),
            success_ratio = report.final_success_ratio(),
            "simulation finished"
        );
        Ok(report)
    }
}

/// Run a prepared scenario on a fresh paused-time runtime.
pub fn run_simulation(scenario: Scenario) -> Result<SimulationReport, SimulationError> {
    let runtime = virtual_time_runtime()?;
    runtime.block_on(async move { SimulationDriver::new(scenario)?.run().await })
}

/// Validate a city, build its scenario and run it.
pub fn simulate(
    city: &CityConfig,
    params: SimulationParams,
) -> Result<SimulationReport, SimulationError> {
    run_simulation(build_scenario(city, params)?)
}
