mod support;

use std::sync::Arc;

use dispatch_core::clock::SimulationClock;
use dispatch_core::grid::Coordinate;
use dispatch_core::incident::IncidentState;
use dispatch_core::responders::SizeClass;
use dispatch_core::test_helpers::{
    engine_for, incident_at, saturated_city, two_zone_city, CapacityObserver,
};
use support::runtime::block_on_virtual;

#[test]
fn co_located_unit_gives_one_minute_response() {
    let resolved = block_on_virtual(async {
        let engine = engine_for(&saturated_city());
        engine
            .resolve(incident_at(0, 1, (1, 1)))
            .await
            .expect("resolve")
    });
    assert_eq!(resolved.response_minutes, Some(1.0));
    assert_eq!(resolved.wait_minutes, 0.0);
    assert_eq!(resolved.assignments.len(), 1);
    assert_eq!(resolved.state, IncidentState::Resolved);
}

#[test]
fn higher_intensity_draws_from_neighbours() {
    let resolved = block_on_virtual(async {
        let engine = engine_for(&saturated_city());
        engine
            .resolve(incident_at(0, 5, (1, 1)))
            .await
            .expect("resolve")
    });
    let teams: u32 = resolved.assignments.iter().map(|a| a.teams).sum();
    assert_eq!(teams, 7);
    assert_eq!(resolved.assignments.len(), 3);
    // the co-located unit and its neighbours are all one free-flow minute away
    for location in resolved.unit_locations() {
        assert!(location == Coordinate::new(1, 1) || location.is_adjacent(&Coordinate::new(1, 1)));
    }
    assert_eq!(resolved.response_minutes, Some(1.0));
}

#[test]
fn pool_is_restored_after_every_incident_resolves() {
    let (available, total, peak) = block_on_virtual(async {
        let engine = engine_for(&saturated_city());
        let observer = CapacityObserver::spawn(Arc::clone(engine.context()), 0.25);
        let mut handles = Vec::new();
        for id in 0..40u64 {
            let engine = engine.clone();
            let level = (id % 5) as u8 + 1;
            let location = ((id % 3) as u32, (id % 6) as u32);
            handles.push(tokio::spawn(async move {
                engine.resolve(incident_at(id, level, location)).await
            }));
        }
        for handle in handles {
            let incident = handle.await.expect("join").expect("resolve");
            assert!(incident.is_resolved());
        }
        let peak = observer.finish().await;
        let pool = engine.context().lock_pool().await;
        (pool.available_capacity(), pool.total_capacity(), peak)
    });
    assert_eq!(total, 54);
    assert_eq!(available, total);
    assert!(peak > 0 && peak <= total);
}

#[test]
fn contention_charges_wait_minutes() {
    let city = two_zone_city().with_unit(SizeClass::Small, (0, 0));
    let (first, second, elapsed) = block_on_virtual(async {
        let engine = engine_for(&city);
        let clock = SimulationClock::start();
        let a = tokio::spawn({
            let engine = engine.clone();
            async move { engine.resolve(incident_at(0, 1, (0, 0))).await }
        });
        tokio::task::yield_now().await;
        let b = tokio::spawn({
            let engine = engine.clone();
            async move { engine.resolve(incident_at(1, 1, (0, 0))).await }
        });
        let a = a.await.expect("join").expect("first");
        let b = b.await.expect("join").expect("second");
        (a, b, clock.now_minutes())
    });
    assert_eq!(first.response_minutes, Some(1.0));
    assert_eq!(second.wait_minutes, 1.0);
    assert_eq!(second.response_minutes, Some(2.0));
    // first busy 7 minutes, second then busy 2 + 5 + 1
    assert!((elapsed - 15.0).abs() < 1e-6, "elapsed {elapsed}");
}
