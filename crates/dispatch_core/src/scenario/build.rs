use tracing::debug;

use crate::error::{ConfigError, PoolError};
use crate::graph::TravelGraph;
use crate::grid::CityGrid;
use crate::incident::{IncidentGenerator, INTENSITY_LEVELS};
use crate::responders::{ResponderPool, ResponderUnit};
use crate::scenario::params::{CityConfig, SimulationParams};
use crate::traffic::TimeOfDayProfile;

/// Everything a run starts from, validated and ready to simulate.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub graph: TravelGraph,
    pub pool: ResponderPool,
    pub generator: IncidentGenerator,
    pub traffic: TimeOfDayProfile,
    pub params: SimulationParams,
}

fn validate_intensity(percentages: &[u32]) -> Result<[u32; INTENSITY_LEVELS], ConfigError> {
    let levels: [u32; INTENSITY_LEVELS] = percentages
        .try_into()
        .map_err(|_| ConfigError::InvalidIntensityDistribution(percentages.to_vec()))?;
    if levels.iter().sum::<u32>() != 100 {
        return Err(ConfigError::InvalidIntensityDistribution(percentages.to_vec()));
    }
    Ok(levels)
}

/// Validate `city` and `params` and assemble the graph, pool and generator.
pub fn build_scenario(
    city: &CityConfig,
    params: SimulationParams,
) -> Result<Scenario, ConfigError> {
    let fits = CityGrid::checked(city.width, city.height).is_some();
    if city.width == 0 || city.height == 0 || !fits {
        return Err(ConfigError::InvalidDimensions {
            width: city.width,
            height: city.height,
        });
    }
    if let Some((zone, &population)) = city
        .zone_populations
        .iter()
        .enumerate()
        .find(|(_, &p)| p == 0)
    {
        return Err(ConfigError::InvalidPopulation { zone, population });
    }
    let intensity = validate_intensity(&city.intensity_percentages)?;
    let rate_ok = city.emergency_rate_per_minute.is_finite() && city.emergency_rate_per_minute > 0.0;
    if !rate_ok || city.base_population == 0 {
        return Err(ConfigError::InvalidRate {
            rate: city.emergency_rate_per_minute,
            population: city.base_population,
        });
    }
    if !(params.commute_minutes.is_finite() && params.commute_minutes > 0.0) {
        return Err(ConfigError::InvalidCommuteTime(params.commute_minutes));
    }
    if params.success_threshold_minutes.is_nan() || params.success_threshold_minutes < 0.0 {
        return Err(ConfigError::InvalidThreshold(params.success_threshold_minutes));
    }

    let graph = TravelGraph::build_with_commute(
        city.width,
        city.height,
        &city.zone_populations,
        params.commute_minutes,
    )?;

    let mut pool = ResponderPool::new();
    for placement in &city.units {
        if !graph.contains(placement.location) {
            return Err(ConfigError::OutOfBoundsCoordinate {
                coordinate: placement.location,
                rows: graph.grid().rows(),
                cols: graph.grid().cols(),
            });
        }
        pool.register(ResponderUnit::new(placement.size, placement.location))
            .map_err(|err| match err {
                PoolError::DuplicateLocation(at) => ConfigError::DuplicateUnitLocation(at),
                _ => ConfigError::DuplicateUnitLocation(placement.location),
            })?;
    }

    let generator = IncidentGenerator::new(
        &graph,
        &city.zone_populations,
        city.rate_per_person(),
        &intensity,
    );
    let traffic = TimeOfDayProfile::from_kind(&params.traffic_profile);

    debug!(
        zones = graph.zone_count(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        units = pool.len(),
        capacity = pool.total_capacity(),
        "scenario built"
    );

    Ok(Scenario {
        graph,
        pool,
        generator,
        traffic,
        params,
    })
}
