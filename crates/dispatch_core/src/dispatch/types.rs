use serde::Serialize;

use crate::grid::Coordinate;
use crate::responders::UnitId;

/// A unit with free capacity, annotated with its travel time to an incident.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub unit: UnitId,
    pub location: Coordinate,
    pub available: u32,
    pub travel_minutes: f64,
}

/// Teams drawn from one unit for one incident.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assignment {
    pub unit: UnitId,
    pub location: Coordinate,
    pub teams: u32,
    pub travel_minutes: f64,
}

/// Outcome of a successful allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub assignments: Vec<Assignment>,
    /// Mean travel time over the units drawn from.
    pub avg_response_minutes: f64,
    /// Simulated minutes charged for waiting on freed capacity.
    pub wait_minutes: f64,
    /// Number of candidate evaluations, including the successful one.
    pub attempts: u32,
}

impl Allocation {
    pub fn teams(&self) -> u32 {
        self.assignments.iter().map(|a| a.teams).sum()
    }
}
