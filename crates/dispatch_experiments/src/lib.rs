//! Replicated experiments for the emergency dispatch simulation.
//!
//! Runs many independent simulations in parallel, varying city load, commute
//! times and traffic profiles, and reduces each run to a row of metrics.
//!
//! # Quick Start
//!
//! ```no_run
//! use dispatch_core::scenario::{CityConfig, SimulationParams};
//! use dispatch_experiments::{run_parallel_experiments, ParameterSpace};
//!
//! let space = ParameterSpace::new(CityConfig::default(), SimulationParams::default())
//!     .rate_multiplier(vec![1.0, 2.0])
//!     .replications(8)
//!     .base_seed(42);
//!
//! let results = run_parallel_experiments(&space.generate(), None).unwrap();
//! ```
//!
//! # Architecture
//!
//! - [`parameters`]: replication plans and seed derivation
//! - [`runner`]: parallel execution using rayon
//! - [`metrics`]: per-run metrics and per-experiment summaries
//! - [`export`]: JSON export

pub mod error;
pub mod export;
pub mod metrics;
pub mod parameters;
pub mod runner;

pub use error::ExperimentError;
pub use export::{export_to_json, find_best_result_index};
pub use metrics::{summarize, ExperimentSummary, SimulationResult};
pub use parameters::{ParameterSet, ParameterSpace};
pub use runner::{run_parallel_experiments, run_single_simulation};
