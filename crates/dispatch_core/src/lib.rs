pub mod clock;
pub mod context;
pub mod dispatch;
pub mod distributions;
pub mod error;
pub mod graph;
pub mod grid;
pub mod incident;
pub mod responders;
pub mod runner;
pub mod scenario;
pub mod telemetry;
pub mod traffic;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use error::{ConfigError, DispatchError, GraphError, PoolError, SimulationError};
pub use runner::{run_simulation, simulate, SimulationDriver};
pub use scenario::{build_scenario, CityConfig, Scenario, SimulationParams};
pub use telemetry::SimulationReport;
