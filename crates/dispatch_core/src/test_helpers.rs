//! Test helpers for common test setup and utilities.
//!
//! Shared by unit tests, integration tests and benches so every caller builds
//! the same small cities.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::context::RunContext;
use crate::dispatch::DispatchEngine;
use crate::grid::Coordinate;
use crate::incident::{intensity_profile, Incident, IncidentId};
use crate::responders::SizeClass;
use crate::scenario::{build_scenario, CityConfig, Scenario, SimulationParams, UnitPlacement};

/// Population of each zone in the two-zone test city.
pub const TEST_ZONE_POPULATION: u64 = 2500;

/// Two zones side by side (3 rows x 6 columns), no units.
pub fn two_zone_city() -> CityConfig {
    CityConfig::new(2, 1, vec![TEST_ZONE_POPULATION, TEST_ZONE_POPULATION])
}

/// The two-zone city with a small unit on every one of its 18 coordinates.
pub fn saturated_city() -> CityConfig {
    let city = two_zone_city();
    let units: Vec<UnitPlacement> = (0..3)
        .flat_map(|row| (0..6).map(move |col| UnitPlacement::new(SizeClass::Small, (row, col))))
        .collect();
    city.with_units(units)
}

/// Build a scenario, panicking on invalid configuration.
///
/// # Panics
///
/// Panics if `city` fails validation.
pub fn scenario(city: &CityConfig, params: SimulationParams) -> Scenario {
    build_scenario(city, params).expect("test city should be valid")
}

/// A dispatch engine over `city`. Call inside a paused-time runtime.
pub fn engine_for(city: &CityConfig) -> DispatchEngine {
    let Scenario { graph, pool, .. } = scenario(city, SimulationParams::default());
    DispatchEngine::new(Arc::new(RunContext::new(graph, pool)))
}

/// An incident of `level` at `location` in zone 0.
///
/// # Panics
///
/// Panics if `level` is not 1..=5.
pub fn incident_at(id: u64, level: u8, location: impl Into<Coordinate>) -> Incident {
    let intensity = intensity_profile(level).expect("intensity level should be 1..=5");
    Incident::new(IncidentId(id), 0, location.into(), intensity, 0)
}

/// Samples the responder pool every `period_minutes` of virtual time while
/// incidents are in flight.
pub struct CapacityObserver {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<u32>,
}

impl CapacityObserver {
    /// Each sample asserts that no unit has more teams available than it owns.
    /// Call inside the paused-time runtime.
    pub fn spawn(ctx: Arc<RunContext>, period_minutes: f64) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let handle = tokio::spawn({
            let stop = Arc::clone(&stop);
            async move {
                let mut peak_dispatched = 0;
                while !stop.load(Ordering::Relaxed) {
                    {
                        let pool = ctx.lock_pool().await;
                        for (id, unit) in pool.units() {
                            assert!(
                                unit.available_capacity() <= unit.total_capacity(),
                                "unit {id:?} has {} of {} teams available",
                                unit.available_capacity(),
                                unit.total_capacity()
                            );
                        }
                        assert!(pool.available_capacity() <= pool.total_capacity());
                        peak_dispatched = peak_dispatched.max(pool.dispatched_capacity());
                    }
                    ctx.clock().sleep_minutes(period_minutes).await;
                }
                peak_dispatched
            }
        });
        Self { stop, handle }
    }

    /// Stop sampling and return the most teams seen dispatched at once.
    ///
    /// # Panics
    ///
    /// Panics if any sample failed its capacity check.
    pub async fn finish(self) -> u32 {
        self.stop.store(true, Ordering::Relaxed);
        self.handle.await.expect("capacity check failed")
    }
}
