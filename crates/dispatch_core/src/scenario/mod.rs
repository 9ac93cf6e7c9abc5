//! Scenario setup: city description, run parameters and validation.

mod build;
mod params;

pub use build::{build_scenario, Scenario};
pub use params::{
    CityConfig, SimulationParams, UnitPlacement, DEFAULT_BASE_POPULATION, DEFAULT_EMERGENCY_RATE,
};
