//! Error types for every layer of the dispatch core.
//!
//! Each layer owns one enum and converts upward with `#[from]`, so callers at
//! the top (the simulation runner) only ever see [`SimulationError`].

use thiserror::Error;

use crate::grid::Coordinate;
use crate::responders::UnitId;

/// Failures raised by the travel graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("expected {expected} zone populations for the grid, got {actual}")]
    InvalidZoneCount { expected: usize, actual: usize },
    #[error("coordinate {0} is not a node of the travel graph")]
    UnknownCoordinate(Coordinate),
    #[error("no route between {from} and {to}")]
    Unreachable { from: Coordinate, to: Coordinate },
    #[error(transparent)]
    Distribution(#[from] DistributionError),
}

/// Failures raised while constructing or sampling a distribution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistributionError {
    #[error("PERT confidence must lie in [1, 18], got {0}")]
    InvalidConfidence(f64),
    #[error("PERT bounds must satisfy low <= likely <= high with low < high (low={low}, likely={likely}, high={high})")]
    InvalidBounds { low: f64, likely: f64, high: f64 },
    #[error("beta shape parameters rejected (alpha={alpha}, beta={beta})")]
    InvalidShape { alpha: f64, beta: f64 },
}

/// Failures raised by the responder pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("a responder unit is already stationed at {0}")]
    DuplicateLocation(Coordinate),
    #[error("unknown responder unit {0:?}")]
    UnknownUnit(UnitId),
    #[error("unit {unit:?} has {available} teams available, {requested} requested")]
    InsufficientCapacity {
        unit: UnitId,
        requested: u32,
        available: u32,
    },
    #[error("releasing {released} teams to unit {unit:?} would exceed its capacity of {total} (available {available})")]
    ReleaseExceedsCapacity {
        unit: UnitId,
        released: u32,
        available: u32,
        total: u32,
    },
}

/// Configuration rejected while building a scenario.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("city dimensions must be positive and addressable, got {width}x{height} zones")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("zone {zone} has population {population}; populations must be positive")]
    InvalidPopulation { zone: usize, population: u64 },
    #[error("intensity distribution must have 5 percentages summing to 100, got {0:?}")]
    InvalidIntensityDistribution(Vec<u32>),
    #[error("duplicate responder unit location {0}")]
    DuplicateUnitLocation(Coordinate),
    #[error("coordinate {coordinate} lies outside the {rows}x{cols} grid")]
    OutOfBoundsCoordinate {
        coordinate: Coordinate,
        rows: u32,
        cols: u32,
    },
    #[error("emergency rate and base population must be positive (rate={rate}, population={population})")]
    InvalidRate { rate: f64, population: u64 },
    #[error("base commute time must be positive and finite, got {0}")]
    InvalidCommuteTime(f64),
    #[error("success threshold must be non-negative, got {0}")]
    InvalidThreshold(f64),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Failures raised while resolving a single incident.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Failures that abort a simulation run.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("the responder pool has no registered capacity")]
    NoCapacityConfigured,
    #[error("the responder pool holds {available} teams but an incident may require {required}")]
    InsufficientCapacity { required: u32, available: u32 },
    #[error("day {day} ended with {available} of {total} teams available")]
    CapacityLeak { day: u32, available: u32, total: u32 },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("incident resolution task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("failed to start simulation runtime: {0}")]
    Runtime(#[from] std::io::Error),
}
