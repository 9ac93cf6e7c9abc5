use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use dispatch_core::scenario::{CityConfig, SimulationParams};
use dispatch_core::simulate;
use dispatch_core::telemetry::{DispatchTrace, SimulationReport};
use dispatch_core::traffic::TrafficProfileKind;
use dispatch_experiments::{
    export_to_json, find_best_result_index, run_parallel_experiments, summarize, ParameterSpace,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    name = "dispatch-sim",
    about = "Monte-Carlo simulation of emergency responder dispatch",
    long_about = "Simulates incidents arriving across a city grid and dispatches\n\
                  responder teams along the fastest routes under time-of-day traffic."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ScenarioArgs {
    /// City description (JSON). Defaults to the built-in two-zone demo city
    #[arg(long, env = "DISPATCH_CITY")]
    city: Option<PathBuf>,
    /// Run parameters (JSON). Missing fields take their defaults
    #[arg(long, env = "DISPATCH_PARAMS")]
    params: Option<PathBuf>,
    /// Number of simulated days
    #[arg(long)]
    days: Option<u32>,
    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    #[arg(value_enum, long)]
    traffic: Option<TrafficArg>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulation and print a JSON summary
    Run {
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Include per-day summaries in the output
        #[arg(long)]
        full: bool,
    },
    /// Run replications in parallel and export their metrics
    Sweep {
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Replications per configuration
        #[arg(long, default_value_t = 8)]
        replications: usize,
        /// Emergency-rate multipliers to sweep, comma separated
        #[arg(long, value_delimiter = ',', default_value = "1.0")]
        rate_multipliers: Vec<f64>,
        /// Worker threads (defaults to one per core)
        #[arg(long)]
        threads: Option<usize>,
        /// Output file path
        #[arg(long, default_value = "dispatch_results.json")]
        output: PathBuf,
    },
    /// Print the built-in demo city as JSON
    DemoCity,
}

#[derive(Clone, Copy, ValueEnum)]
enum TrafficArg {
    Standard,
    FreeFlow,
}

impl From<TrafficArg> for TrafficProfileKind {
    fn from(arg: TrafficArg) -> Self {
        match arg {
            TrafficArg::Standard => TrafficProfileKind::Standard,
            TrafficArg::FreeFlow => TrafficProfileKind::FreeFlow,
        }
    }
}

#[derive(Serialize)]
struct RunOutput<'a> {
    days: usize,
    total_incidents: u64,
    response_minutes: Option<f64>,
    success_ratio: Option<f64>,
    response_time_series: &'a [f64],
    success_ratio_series: &'a [f64],
    first_day_dispatches: &'a [DispatchTrace],
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a SimulationReport>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid JSON in {}: {e}", path.display()).into())
}

fn load_scenario(args: &ScenarioArgs) -> CliResult<(CityConfig, SimulationParams)> {
    let city = match &args.city {
        Some(path) => read_json(path)?,
        None => CityConfig::default(),
    };
    let mut params: SimulationParams = match &args.params {
        Some(path) => read_json(path)?,
        None => SimulationParams::default(),
    };
    if let Some(days) = args.days {
        params.days = days;
    }
    if let Some(seed) = args.seed {
        params.seed = Some(seed);
    }
    if let Some(traffic) = args.traffic {
        params.traffic_profile = traffic.into();
    }
    Ok((city, params))
}

fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Run { scenario, full } => {
            let (city, params) = load_scenario(&scenario)?;
            info!(days = params.days, seed = ?params.seed, "running simulation");
            let report = simulate(&city, params)?;
            let output = RunOutput {
                days: report.days.len(),
                total_incidents: report.total_incidents,
                response_minutes: report.final_response_minutes(),
                success_ratio: report.final_success_ratio(),
                response_time_series: &report.response_time_series,
                success_ratio_series: &report.success_ratio_series,
                first_day_dispatches: &report.first_day_dispatches,
                report: full.then_some(&report),
            };
            serde_json::to_writer_pretty(io::stdout().lock(), &output)?;
            println!();
        }
        Commands::Sweep {
            scenario,
            replications,
            rate_multipliers,
            threads,
            output,
        } => {
            let (city, params) = load_scenario(&scenario)?;
            let base_seed = params.seed.unwrap_or_default();
            let sets = ParameterSpace::new(city, params)
                .rate_multiplier(rate_multipliers)
                .replications(replications)
                .base_seed(base_seed)
                .generate();
            let results = run_parallel_experiments(&sets, threads)?;
            export_to_json(&results, &output)?;
            let summaries = summarize(&results);
            for summary in &summaries {
                info!(
                    experiment = %summary.experiment_id,
                    runs = summary.runs,
                    mean_response_minutes = summary.mean_response_minutes,
                    mean_success_ratio = summary.mean_success_ratio,
                    "experiment summary"
                );
            }
            if let Some(best) = find_best_result_index(&results) {
                info!(
                    experiment = %results[best].experiment_id,
                    run = results[best].run_id,
                    response_minutes = results[best].response_minutes,
                    "fastest run"
                );
            }
            info!(path = %output.display(), runs = results.len(), "results written");
            serde_json::to_writer_pretty(io::stdout().lock(), &summaries)?;
            println!();
        }
        Commands::DemoCity => {
            serde_json::to_writer_pretty(io::stdout().lock(), &CityConfig::default())?;
            println!();
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
