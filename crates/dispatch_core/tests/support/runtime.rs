use dispatch_core::clock::virtual_time_runtime;
use dispatch_core::runner::SimulationDriver;
use dispatch_core::scenario::Scenario;
use dispatch_core::telemetry::{DaySummary, SimulationReport};
use dispatch_core::SimulationError;

/// Run `future` on the paused-time runtime a simulation uses.
pub fn block_on_virtual<F: std::future::Future>(future: F) -> F::Output {
    virtual_time_runtime()
        .expect("runtime")
        .block_on(future)
}

/// Run a scenario and collect each day's summary as it completes.
pub fn run_collecting(
    scenario: Scenario,
) -> Result<(SimulationReport, Vec<DaySummary>), SimulationError> {
    block_on_virtual(async move {
        let mut days = Vec::new();
        let report = SimulationDriver::new(scenario)?
            .run_with_hook(|summary| days.push(*summary))
            .await?;
        Ok((report, days))
    })
}
