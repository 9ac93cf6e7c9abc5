mod support;

use dispatch_core::error::{ConfigError, SimulationError};
use dispatch_core::responders::SizeClass;
use dispatch_core::runner::SimulationDriver;
use dispatch_core::scenario::{CityConfig, SimulationParams};
use dispatch_core::simulate;
use dispatch_core::test_helpers::{saturated_city, scenario, two_zone_city};
use dispatch_core::traffic::TrafficProfileKind;
use support::runtime::{block_on_virtual, run_collecting};

#[test]
fn demo_city_keeps_response_times_low() {
    let params = SimulationParams::default().with_days(5).with_seed(7);
    let (report, days) = run_collecting(scenario(&CityConfig::default(), params)).expect("run");

    assert_eq!(days.len(), 5);
    assert_eq!(report.response_time_series.len(), 5);
    assert_eq!(report.success_ratio_series.len(), 5);
    assert!(report.total_incidents > 100, "{}", report.total_incidents);
    assert_eq!(
        report.total_incidents,
        days.iter().map(|d| d.incidents as u64).sum::<u64>()
    );

    let response = report.final_response_minutes().expect("response");
    let success = report.final_success_ratio().expect("success");
    assert!((1.0..=4.0).contains(&response), "response {response}");
    assert!(success >= 0.9, "success {success}");
    for summary in &days {
        assert!(summary.mean_response_minutes.expect("incidents") >= 1.0);
    }
}

#[test]
fn first_day_dispatch_map_lists_first_incidents() {
    let params = SimulationParams::default()
        .with_days(1)
        .with_seed(3)
        .with_diagnostic_incidents(5);
    let report = simulate(&CityConfig::default(), params).expect("run");
    assert_eq!(report.first_day_dispatches.len(), 5);
    for trace in &report.first_day_dispatches {
        assert!(!trace.units.is_empty());
    }
    assert!(!report.dispatch_map().is_empty());
}

#[test]
fn seeded_runs_are_reproducible() {
    let params = SimulationParams::default().with_days(2).with_seed(11);
    let a = simulate(&CityConfig::default(), params.clone()).expect("run");
    let b = simulate(&CityConfig::default(), params).expect("run");
    assert_eq!(a, b);
}

#[test]
fn free_flow_saturated_city_stays_near_one_minute() {
    let params = SimulationParams::default()
        .with_days(2)
        .with_seed(5)
        .with_traffic_profile(TrafficProfileKind::FreeFlow);
    let report = simulate(&saturated_city(), params).expect("run");
    for value in &report.response_time_series {
        assert!((1.0..=1.5).contains(value), "{value}");
    }
    assert!(report.final_success_ratio().expect("success") > 0.99);
}

#[test]
fn empty_pool_is_rejected_before_running() {
    let params = SimulationParams::default().with_days(1).with_seed(1);
    assert!(matches!(
        simulate(&two_zone_city(), params),
        Err(SimulationError::NoCapacityConfigured)
    ));
}

#[test]
fn pool_smaller_than_largest_incident_is_rejected() {
    let city = two_zone_city()
        .with_unit(SizeClass::Small, (0, 0))
        .with_intensity_percentages(vec![0, 0, 0, 0, 100]);
    let params = SimulationParams::default().with_days(1).with_seed(1);
    assert!(matches!(
        simulate(&city, params),
        Err(SimulationError::InsufficientCapacity {
            required: 7,
            available: 3
        })
    ));
}

#[test]
fn invalid_city_surfaces_config_error() {
    let city = CityConfig::new(1, 1, vec![0]).with_unit(SizeClass::Small, (0, 0));
    assert!(matches!(
        simulate(&city, SimulationParams::default()),
        Err(SimulationError::Config(ConfigError::InvalidPopulation { zone: 0, .. }))
    ));
}

#[test]
fn single_day_restores_the_pool_and_advances_the_clock() {
    let built = scenario(
        &CityConfig::default(),
        SimulationParams::default().with_seed(21),
    );
    let (summary, day, recorded, fully_available, elapsed) = block_on_virtual(async move {
        let mut driver = SimulationDriver::new(built).expect("driver");
        let summary = driver.run_day().await.expect("day");
        let ctx = driver.engine().context();
        let fully_available = ctx.lock_pool().await.is_fully_available();
        let elapsed = ctx.clock().now_minutes();
        (
            summary,
            driver.day(),
            driver.statistics().days_recorded(),
            fully_available,
            elapsed,
        )
    });
    assert_eq!(summary.day, 0);
    assert_eq!(day, 1);
    assert_eq!(recorded, 1);
    assert!(fully_available);
    assert!(elapsed >= 1440.0, "elapsed {elapsed}");
    assert!(summary.incidents > 0);
    assert!(summary.successful <= summary.incidents);
}
