//! Result export to JSON.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::error::ExperimentError;
use crate::metrics::{summarize, ExperimentSummary, SimulationResult};

/// Everything written for one batch: per-run rows and per-experiment summaries.
#[derive(Debug, Serialize)]
pub struct ExportBundle<'a> {
    pub results: &'a [SimulationResult],
    pub summaries: Vec<ExperimentSummary>,
}

fn create_output_file(path: &Path) -> Result<File, ExperimentError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

/// Write results and their summaries to `path` as pretty JSON.
///
/// # Errors
///
/// Returns an error if `results` is empty, or if file creation or
/// serialization fails.
pub fn export_to_json(
    results: &[SimulationResult],
    path: impl AsRef<Path>,
) -> Result<(), ExperimentError> {
    if results.is_empty() {
        return Err(ExperimentError::EmptyResults);
    }
    let bundle = ExportBundle {
        results,
        summaries: summarize(results),
    };
    let writer = BufWriter::new(create_output_file(path.as_ref())?);
    serde_json::to_writer_pretty(writer, &bundle)?;
    Ok(())
}

/// Index of the result with the lowest response time.
pub fn find_best_result_index(results: &[SimulationResult]) -> Option<usize> {
    results
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.response_minutes.total_cmp(&b.response_minutes))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn result(run_id: usize, response: f64) -> SimulationResult {
        SimulationResult {
            experiment_id: "exp_0".to_string(),
            run_id,
            seed: 1,
            days: 3,
            total_incidents: 900,
            response_minutes: response,
            success_ratio: 1.0,
            median_daily_response_minutes: response,
            p90_daily_response_minutes: response,
            max_response_minutes: 4.0,
            delayed_fraction: 0.01,
        }
    }

    #[test]
    fn test_export_to_json() {
        let results = vec![result(0, 1.8), result(1, 1.6)];
        let file = NamedTempFile::new().expect("temp file");
        export_to_json(&results, file.path()).expect("export");

        let contents = fs::read_to_string(file.path()).expect("read");
        let value: serde_json::Value = serde_json::from_str(&contents).expect("json");
        assert_eq!(value["results"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["summaries"][0]["runs"], 2);
    }

    #[test]
    fn test_export_rejects_empty_results() {
        let file = NamedTempFile::new().expect("temp file");
        assert!(matches!(
            export_to_json(&[], file.path()),
            Err(ExperimentError::EmptyResults)
        ));
    }

    #[test]
    fn test_find_best_result_index() {
        let results = vec![result(0, 2.0), result(1, 1.2), result(2, 1.5)];
        assert_eq!(find_best_result_index(&results), Some(1));
        assert_eq!(find_best_result_index(&[]), None);
    }
}
