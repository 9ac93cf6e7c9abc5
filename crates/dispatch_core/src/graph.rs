//! Travel-time graph over the city grid.
//!
//! Nodes are grid coordinates tagged with their zone and per-coordinate
//! population share; edges join 4-adjacent coordinates. Edge travel times start
//! at the base commute time and are redrawn by [`TravelGraph::reweight`] at each
//! time-of-day window.
//!
//! Shortest paths run Dijkstra from the `pathfinding` crate over
//! [`OrderedFloat`] minutes. Single-source results are cached per origin until
//! the next reweight.

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use ordered_float::OrderedFloat;
use parking_lot::Mutex;
use pathfinding::prelude::{dijkstra, dijkstra_all};
use rand::distributions::Distribution;
use rand::Rng;
use tracing::debug;

use crate::distributions::ModifiedPert;
use crate::error::GraphError;
use crate::grid::{CityGrid, Coordinate, COORDINATES_PER_ZONE};

/// Free-flow travel time across one edge, in minutes.
pub const DEFAULT_COMMUTE_MINUTES: f64 = 1.0;

/// Handling time when responder and incident share a coordinate.
pub const CO_LOCATED_MINUTES: f64 = 1.0;

/// PERT confidence used for traffic draws.
pub const TRAFFIC_CONFIDENCE: f64 = 4.0;

/// Number of per-origin distance maps kept between reweights.
const DISTANCE_CACHE_SIZE: usize = 512;

/// Shared read-only view of travel times from one origin.
pub type TravelTimes = Arc<HashMap<Coordinate, f64>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub zone: usize,
    /// Zone population divided evenly over its coordinates.
    pub population_share: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub a: Coordinate,
    pub b: Coordinate,
    pub base_minutes: f64,
    pub travel_minutes: f64,
    /// Most likely traffic fraction, in [0, 1].
    traffic_likelihood: f64,
}

impl Edge {
    pub fn traffic_likelihood(&self) -> f64 {
        self.traffic_likelihood
    }
}

pub struct TravelGraph {
    grid: CityGrid,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// `adjacency[node]` lists `(neighbor, edge index)`.
    adjacency: Vec<Vec<(usize, usize)>>,
    base_minutes: f64,
    distance_cache: Mutex<LruCache<Coordinate, TravelTimes>>,
}

impl TravelGraph {
    /// Build a graph with the default base commute time.
    pub fn build(width: u32, height: u32, zone_populations: &[u64]) -> Result<Self, GraphError> {
        Self::build_with_commute(width, height, zone_populations, DEFAULT_COMMUTE_MINUTES)
    }

    pub fn build_with_commute(
        width: u32,
        height: u32,
        zone_populations: &[u64],
        base_minutes: f64,
    ) -> Result<Self, GraphError> {
        let grid = CityGrid::new(width, height);
        if zone_populations.len() != grid.zone_count() {
            return Err(GraphError::InvalidZoneCount {
                expected: grid.zone_count(),
                actual: zone_populations.len(),
            });
        }

        let nodes: Vec<Node> = grid
            .coordinates()
            .map(|coord| {
                // zone_of is Some for every coordinate yielded by the grid
                let zone = grid.zone_of(coord).unwrap_or_default();
                Node {
                    zone,
                    population_share: zone_populations[zone] as f64 / COORDINATES_PER_ZONE as f64,
                }
            })
            .collect();

        let peak_share = nodes
            .iter()
            .map(|n| n.population_share)
            .fold(0.0_f64, f64::max);

        let mut edges = Vec::new();
        let mut adjacency = vec![Vec::new(); nodes.len()];
        for (i, coord) in grid.coordinates().enumerate() {
            let right = Coordinate::new(coord.row, coord.col + 1);
            let down = Coordinate::new(coord.row + 1, coord.col);
            for other in [right, down] {
                let Some(j) = grid.index_of(other) else {
                    continue;
                };
                let mean_share = (nodes[i].population_share + nodes[j].population_share) / 2.0;
                let traffic_likelihood = if peak_share > 0.0 {
                    (mean_share / peak_share).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let e = edges.len();
                edges.push(Edge {
                    a: coord,
                    b: other,
                    base_minutes,
                    travel_minutes: base_minutes,
                    traffic_likelihood,
                });
                adjacency[i].push((j, e));
                adjacency[j].push((i, e));
            }
        }

        Ok(Self {
            grid,
            nodes,
            edges,
            adjacency,
            base_minutes,
            distance_cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(DISTANCE_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
            )),
        })
    }

    /// Redraw every edge's travel time for a new time-of-day window.
    ///
    /// Each edge draws a traffic fraction from a modified PERT over `[0, 1]`
    /// peaking at the edge's population-driven likelihood, then takes
    /// `base + base * fraction * weight` minutes.
    pub fn reweight<R: Rng + ?Sized>(&mut self, weight: f64, rng: &mut R) -> Result<(), GraphError> {
        let weight = weight.max(0.0);
        for edge in &mut self.edges {
            let pert = ModifiedPert::new(0.0, edge.traffic_likelihood, 1.0, TRAFFIC_CONFIDENCE)?;
            let fraction = pert.sample(rng);
            edge.travel_minutes = edge.base_minutes * (1.0 + fraction * weight);
        }
        self.distance_cache.get_mut().clear();
        debug!(weight, edges = self.edges.len(), "travel graph reweighted");
        Ok(())
    }

    /// Minimum travel time from `a` to `b`; [`CO_LOCATED_MINUTES`] when equal.
    pub fn shortest_travel_time(&self, a: Coordinate, b: Coordinate) -> Result<f64, GraphError> {
        let start = self.index(a)?;
        let goal = self.index(b)?;
        if start == goal {
            return Ok(CO_LOCATED_MINUTES);
        }
        dijkstra(&start, |&n| self.successors(n), |&n| n == goal)
            .map(|(_, cost)| cost.into_inner())
            .ok_or(GraphError::Unreachable { from: a, to: b })
    }

    /// Travel times from `origin` to every node, from a single search.
    ///
    /// The origin maps to [`CO_LOCATED_MINUTES`]. The graph is undirected, so
    /// the same map gives times from every node to `origin`.
    pub fn travel_times_from(&self, origin: Coordinate) -> Result<TravelTimes, GraphError> {
        let start = self.index(origin)?;
        if let Some(hit) = self.distance_cache.lock().get(&origin) {
            return Ok(Arc::clone(hit));
        }

        let reached = dijkstra_all(&start, |&n| self.successors(n));
        let mut times: HashMap<Coordinate, f64> = reached
            .into_iter()
            .map(|(n, (_, cost))| (self.grid.coordinate_at(n), cost.into_inner()))
            .collect();
        times.insert(origin, CO_LOCATED_MINUTES);

        let times = Arc::new(times);
        self.distance_cache.lock().put(origin, Arc::clone(&times));
        Ok(times)
    }

    fn successors(&self, node: usize) -> impl Iterator<Item = (usize, OrderedFloat<f64>)> + '_ {
        self.adjacency[node]
            .iter()
            .map(move |&(next, e)| (next, OrderedFloat(self.edges[e].travel_minutes)))
    }

    fn index(&self, coord: Coordinate) -> Result<usize, GraphError> {
        self.grid
            .index_of(coord)
            .ok_or(GraphError::UnknownCoordinate(coord))
    }

    pub fn grid(&self) -> &CityGrid {
        &self.grid
    }

    pub fn base_minutes(&self) -> f64 {
        self.base_minutes
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        self.grid.contains(coord)
    }

    pub fn node(&self, coord: Coordinate) -> Option<&Node> {
        self.grid.index_of(coord).map(|i| &self.nodes[i])
    }

    pub fn zone_of(&self, coord: Coordinate) -> Option<usize> {
        self.node(coord).map(|n| n.zone)
    }

    pub fn zone_coordinates(&self, zone: usize) -> Vec<Coordinate> {
        self.grid.zone_coordinates(zone)
    }

    pub fn zone_count(&self) -> usize {
        self.grid.zone_count()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Current travel time of the edge joining `a` and `b`, if one exists.
    pub fn edge_minutes(&self, a: Coordinate, b: Coordinate) -> Option<f64> {
        let i = self.grid.index_of(a)?;
        let j = self.grid.index_of(b)?;
        self.adjacency[i]
            .iter()
            .find(|(next, _)| *next == j)
            .map(|&(_, e)| self.edges[e].travel_minutes)
    }

    pub fn has_edge(&self, a: Coordinate, b: Coordinate) -> bool {
        self.edge_minutes(a, b).is_some()
    }
}

impl Clone for TravelGraph {
    /// Clones start with an empty distance cache.
    fn clone(&self) -> Self {
        Self {
            grid: self.grid,
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            adjacency: self.adjacency.clone(),
            base_minutes: self.base_minutes,
            distance_cache: Mutex::new(LruCache::new(self.distance_cache.lock().cap())),
        }
    }
}

impl fmt::Debug for TravelGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TravelGraph")
            .field("grid", &self.grid)
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("base_minutes", &self.base_minutes)
            .finish()
    }
}
