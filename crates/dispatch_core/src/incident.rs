//! Incidents and the stochastic incident generator.
//!
//! Each zone runs one Bernoulli trial per simulated minute. The trial's
//! probability comes from the zone's expected incident rate treated as a
//! Poisson process. A firing trial produces an [`Incident`] at a uniformly
//! chosen coordinate of the zone with an intensity drawn from the configured
//! percentages.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::dispatch::Assignment;
use crate::distributions::{per_minute_probability, sample_cumulative_percent, MinuteTrial};
use crate::graph::TravelGraph;
use crate::grid::Coordinate;

pub const INTENSITY_LEVELS: usize = 5;

/// Teams required and on-scene work for one intensity level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityProfile {
    pub level: u8,
    pub teams: u32,
    pub on_scene_minutes: f64,
}

pub const INTENSITY_TABLE: [IntensityProfile; INTENSITY_LEVELS] = [
    IntensityProfile { level: 1, teams: 3, on_scene_minutes: 5.0 },
    IntensityProfile { level: 2, teams: 4, on_scene_minutes: 10.0 },
    IntensityProfile { level: 3, teams: 5, on_scene_minutes: 15.0 },
    IntensityProfile { level: 4, teams: 6, on_scene_minutes: 20.0 },
    IntensityProfile { level: 5, teams: 7, on_scene_minutes: 25.0 },
];

/// Profile for `level` (1-based).
pub fn intensity_profile(level: u8) -> Option<IntensityProfile> {
    INTENSITY_TABLE.get(usize::from(level).checked_sub(1)?).copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IncidentId(pub u64);

/// Lifecycle of an incident inside the dispatch engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum IncidentState {
    #[default]
    Pending,
    Allocating,
    Waiting,
    Satisfied,
    Resolving,
    Resolved,
}

#[derive(Debug, Clone)]
pub struct Incident {
    pub id: IncidentId,
    pub zone: usize,
    pub location: Coordinate,
    pub intensity: IntensityProfile,
    /// Minute of the simulated day at which the incident was reported.
    pub reported_minute: u32,
    pub state: IncidentState,
    pub assignments: Vec<Assignment>,
    /// Average travel time of the assigned units plus wait time; set on allocation.
    pub response_minutes: Option<f64>,
    pub wait_minutes: f64,
}

impl Incident {
    pub fn new(
        id: IncidentId,
        zone: usize,
        location: Coordinate,
        intensity: IntensityProfile,
        reported_minute: u32,
    ) -> Self {
        Self {
            id,
            zone,
            location,
            intensity,
            reported_minute,
            state: IncidentState::Pending,
            assignments: Vec::new(),
            response_minutes: None,
            wait_minutes: 0.0,
        }
    }

    pub fn required_teams(&self) -> u32 {
        self.intensity.teams
    }

    pub fn is_resolved(&self) -> bool {
        self.state == IncidentState::Resolved
    }

    pub fn unit_locations(&self) -> Vec<Coordinate> {
        self.assignments.iter().map(|a| a.location).collect()
    }
}

#[derive(Debug, Clone)]
struct ZoneSource {
    probability: f64,
    trial: MinuteTrial,
    coordinates: Vec<Coordinate>,
}

/// Turns per-zone rates into minute trials and incidents.
#[derive(Debug, Clone)]
pub struct IncidentGenerator {
    zones: Vec<ZoneSource>,
    cumulative_intensity: [u32; INTENSITY_LEVELS],
    next_id: u64,
}

impl IncidentGenerator {
    /// `rate_per_person` is the expected number of incidents per person per
    /// minute; `intensity_percentages` must already be validated to sum to 100.
    pub fn new(
        graph: &TravelGraph,
        zone_populations: &[u64],
        rate_per_person: f64,
        intensity_percentages: &[u32; INTENSITY_LEVELS],
    ) -> Self {
        let zones = zone_populations
            .iter()
            .enumerate()
            .map(|(zone, population)| {
                let probability = per_minute_probability(rate_per_person, *population as f64);
                ZoneSource {
                    probability,
                    trial: MinuteTrial::from_probability(probability),
                    coordinates: graph.zone_coordinates(zone),
                }
            })
            .collect();

        let mut cumulative_intensity = [0; INTENSITY_LEVELS];
        let mut running = 0;
        for (slot, pct) in cumulative_intensity.iter_mut().zip(intensity_percentages) {
            running += pct;
            *slot = running;
        }

        Self {
            zones,
            cumulative_intensity,
            next_id: 0,
        }
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn probability(&self, zone: usize) -> Option<f64> {
        self.zones.get(zone).map(|z| z.probability)
    }

    pub fn cumulative_intensity(&self) -> &[u32; INTENSITY_LEVELS] {
        &self.cumulative_intensity
    }

    /// Highest intensity level that can be drawn.
    pub fn max_intensity(&self) -> IntensityProfile {
        let mut previous = 0;
        let mut highest = INTENSITY_TABLE[0];
        for (profile, &cumulative) in INTENSITY_TABLE.iter().zip(&self.cumulative_intensity) {
            if cumulative > previous {
                highest = *profile;
            }
            previous = cumulative;
        }
        highest
    }

    /// Run this minute's trial for `zone`. Unknown zones never fire.
    pub fn trial<R: Rng + ?Sized>(&self, zone: usize, rng: &mut R) -> bool {
        self.zones
            .get(zone)
            .is_some_and(|z| z.trial.fires(rng))
    }

    pub fn sample_location<R: Rng + ?Sized>(&self, zone: usize, rng: &mut R) -> Option<Coordinate> {
        self.zones.get(zone)?.coordinates.choose(rng).copied()
    }

    pub fn sample_intensity<R: Rng + ?Sized>(&self, rng: &mut R) -> IntensityProfile {
        let index = sample_cumulative_percent(&self.cumulative_intensity, rng);
        INTENSITY_TABLE[index.min(INTENSITY_LEVELS - 1)]
    }

    /// Create the next incident in `zone`, reported at `minute`.
    pub fn create_incident<R: Rng + ?Sized>(
        &mut self,
        zone: usize,
        minute: u32,
        rng: &mut R,
    ) -> Option<Incident> {
        let location = self.sample_location(zone, rng)?;
        let intensity = self.sample_intensity(rng);
        let id = IncidentId(self.next_id);
        self.next_id += 1;
        Some(Incident::new(id, zone, location, intensity, minute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generator(percentages: [u32; INTENSITY_LEVELS]) -> IncidentGenerator {
        let graph = TravelGraph::build(2, 1, &[2500, 2500]).expect("graph");
        IncidentGenerator::new(&graph, &[2500, 2500], 13.165119 / 200_000.0, &percentages)
    }

    #[test]
    fn intensity_table_lookup() {
        assert_eq!(intensity_profile(1).map(|p| p.teams), Some(3));
        assert_eq!(intensity_profile(5).map(|p| p.on_scene_minutes), Some(25.0));
        assert!(intensity_profile(0).is_none());
        assert!(intensity_profile(6).is_none());
    }

    #[test]
    fn zone_probability_follows_poisson() {
        let gen = generator([100, 0, 0, 0, 0]);
        let expected = 1.0 - (-(13.165119 / 200_000.0) * 2500.0_f64).exp();
        assert!((gen.probability(0).expect("zone") - expected).abs() < 1e-12);
        assert!(gen.probability(2).is_none());
    }

    #[test]
    fn sampled_locations_stay_in_zone() {
        let gen = generator([100, 0, 0, 0, 0]);
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..200 {
            let c = gen.sample_location(1, &mut rng).expect("location");
            assert!((3..6).contains(&c.col) && c.row < 3, "{c}");
        }
    }

    #[test]
    fn intensity_follows_cumulative_percentages() {
        let gen = generator([100, 0, 0, 0, 0]);
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..200 {
            assert_eq!(gen.sample_intensity(&mut rng).level, 1);
        }
        assert_eq!(gen.cumulative_intensity(), &[100, 100, 100, 100, 100]);

        let mixed = generator([20, 20, 20, 20, 20]);
        let mut seen = [0u32; INTENSITY_LEVELS];
        for _ in 0..5000 {
            seen[usize::from(mixed.sample_intensity(&mut rng).level) - 1] += 1;
        }
        assert!(seen.iter().all(|&n| n > 800), "{seen:?}");
    }

    #[test]
    fn max_intensity_ignores_empty_levels() {
        assert_eq!(generator([100, 0, 0, 0, 0]).max_intensity().level, 1);
        assert_eq!(generator([50, 0, 50, 0, 0]).max_intensity().level, 3);
        assert_eq!(generator([0, 0, 0, 0, 100]).max_intensity().level, 5);
    }

    #[test]
    fn created_incidents_carry_required_teams_and_fresh_ids() {
        let mut gen = generator([0, 100, 0, 0, 0]);
        let mut rng = StdRng::seed_from_u64(2);
        let a = gen.create_incident(0, 10, &mut rng).expect("incident");
        let b = gen.create_incident(1, 11, &mut rng).expect("incident");
        assert_eq!(a.required_teams(), 4);
        assert_eq!(a.state, IncidentState::Pending);
        assert_ne!(a.id, b.id);
        assert_eq!(b.zone, 1);
        assert!(gen.create_incident(9, 12, &mut rng).is_none());
    }
}
