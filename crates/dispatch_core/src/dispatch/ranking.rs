use std::cmp::Ordering;

use crate::error::{GraphError, PoolError};
use crate::graph::{TravelGraph, CO_LOCATED_MINUTES};
use crate::grid::Coordinate;
use crate::responders::ResponderPool;

use super::types::{Assignment, Candidate};

/// Nearer first, then larger available capacity, then lower unit id so the
/// order is total.
pub fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    a.travel_minutes
        .total_cmp(&b.travel_minutes)
        .then_with(|| b.available.cmp(&a.available))
        .then_with(|| a.unit.cmp(&b.unit))
}

/// Every unit with free capacity, sorted by [`compare_candidates`].
///
/// Runs one single-source search from the incident and reads every unit's
/// travel time off it.
pub fn rank_candidates(
    pool: &ResponderPool,
    graph: &TravelGraph,
    incident_location: Coordinate,
) -> Result<Vec<Candidate>, GraphError> {
    let times = graph.travel_times_from(incident_location)?;
    let mut candidates = pool
        .units()
        .filter(|(_, unit)| unit.available_capacity() > 0)
        .map(|(id, unit)| -> Result<Candidate, GraphError> {
            let travel_minutes = if unit.location == incident_location {
                CO_LOCATED_MINUTES
            } else {
                times
                    .get(&unit.location)
                    .copied()
                    .ok_or(GraphError::Unreachable {
                        from: unit.location,
                        to: incident_location,
                    })?
            };
            Ok(Candidate {
                unit: id,
                location: unit.location,
                available: unit.available_capacity(),
                travel_minutes,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    candidates.sort_by(compare_candidates);
    Ok(candidates)
}

/// Same ordering as [`rank_candidates`], one pairwise search per unit.
pub fn rank_candidates_pairwise(
    pool: &ResponderPool,
    graph: &TravelGraph,
    incident_location: Coordinate,
) -> Result<Vec<Candidate>, GraphError> {
    let mut candidates = Vec::new();
    for (id, unit) in pool.units() {
        if unit.available_capacity() == 0 {
            continue;
        }
        candidates.push(Candidate {
            unit: id,
            location: unit.location,
            available: unit.available_capacity(),
            travel_minutes: graph.shortest_travel_time(unit.location, incident_location)?,
        });
    }
    candidates.sort_by(compare_candidates);
    Ok(candidates)
}

/// Walk ranked candidates drawing capacity until `required` is covered.
///
/// Returns `None` when the candidates cannot cover the requirement; nothing is
/// dispatched here, the caller commits the plan.
pub fn plan_assignments(
    pool: &ResponderPool,
    candidates: &[Candidate],
    required: u32,
) -> Result<Option<Vec<Assignment>>, PoolError> {
    let mut remaining = required;
    let mut assignments = Vec::new();
    for candidate in candidates {
        if remaining == 0 {
            break;
        }
        let availability = pool.check_availability(candidate.unit, remaining)?;
        if !availability.any_taken {
            continue;
        }
        assignments.push(Assignment {
            unit: candidate.unit,
            location: candidate.location,
            teams: availability.taken,
            travel_minutes: candidate.travel_minutes,
        });
        remaining = availability.remaining;
    }
    Ok((remaining == 0).then_some(assignments))
}

/// Mean travel time over the units an allocation draws from.
pub fn average_response_minutes(assignments: &[Assignment]) -> f64 {
    if assignments.is_empty() {
        return 0.0;
    }
    let sum: f64 = assignments.iter().map(|a| a.travel_minutes).sum();
    sum / assignments.len() as f64
}
