use dispatch_core::SimulationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("run {experiment_id}/{run_id} failed: {source}")]
    Simulation {
        experiment_id: String,
        run_id: usize,
        #[source]
        source: SimulationError,
    },
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("no results to export")]
    EmptyResults,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
