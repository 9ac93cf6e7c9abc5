//! Shared state for one simulation run.
//!
//! Everything a run mutates lives here rather than in globals: the travel
//! graph (written only by the driver between minutes), the responder pool
//! (the single allocation lock), the capacity-freed signal and the clock.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{Mutex, MutexGuard, Notify};

use crate::clock::SimulationClock;
use crate::graph::TravelGraph;
use crate::responders::ResponderPool;

#[derive(Debug)]
pub struct RunContext {
    graph: RwLock<TravelGraph>,
    pool: Mutex<ResponderPool>,
    capacity_freed: Notify,
    clock: SimulationClock,
}

impl RunContext {
    /// Must be called inside the simulation runtime; the clock starts here.
    pub fn new(graph: TravelGraph, pool: ResponderPool) -> Self {
        Self {
            graph: RwLock::new(graph),
            pool: Mutex::new(pool),
            capacity_freed: Notify::new(),
            clock: SimulationClock::start(),
        }
    }

    /// Read access to the graph. Do not hold across an `.await`.
    pub fn graph(&self) -> RwLockReadGuard<'_, TravelGraph> {
        self.graph.read()
    }

    pub fn graph_mut(&self) -> RwLockWriteGuard<'_, TravelGraph> {
        self.graph.write()
    }

    /// Acquire the allocation lock.
    pub async fn lock_pool(&self) -> MutexGuard<'_, ResponderPool> {
        self.pool.lock().await
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub(crate) fn capacity_freed(&self) -> &Notify {
        &self.capacity_freed
    }
}
