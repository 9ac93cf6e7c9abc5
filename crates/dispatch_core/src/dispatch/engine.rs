//! Concurrent allocation and resolution of incidents.
//!
//! Every incident runs as its own task. Allocation plans against a snapshot
//! of the pool taken under the allocation lock and commits only when the whole
//! requirement is covered, so a task never holds part of its teams while
//! waiting for the rest. When the plan falls short the task registers for the
//! capacity-freed signal before releasing the lock, which rules out missing a
//! release that lands between the failed attempt and the wait.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::context::RunContext;
use crate::error::{DispatchError, PoolError};
use crate::incident::{Incident, IncidentState};

use super::ranking::{average_response_minutes, plan_assignments, rank_candidates};
use super::types::{Allocation, Assignment};

/// Minutes charged per failed allocation attempt.
pub const WAIT_PENALTY_MINUTES: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct DispatchEngine {
    ctx: Arc<RunContext>,
}

impl DispatchEngine {
    pub fn new(ctx: Arc<RunContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<RunContext> {
        &self.ctx
    }

    /// Draw the incident's required teams from the nearest units, waiting for
    /// released capacity as often as needed.
    pub async fn allocate(&self, incident: &mut Incident) -> Result<Allocation, DispatchError> {
        let required = incident.required_teams();
        let mut wait_minutes = 0.0;
        let mut attempts = 0;

        loop {
            incident.state = IncidentState::Allocating;
            attempts += 1;

            let mut pool = self.ctx.lock_pool().await;
            let candidates = {
                let graph = self.ctx.graph();
                rank_candidates(&pool, &graph, incident.location)?
            };

            if let Some(assignments) = plan_assignments(&pool, &candidates, required)? {
                for assignment in &assignments {
                    pool.dispatch(assignment.unit, assignment.teams)?;
                }
                drop(pool);

                incident.state = IncidentState::Satisfied;
                let avg_response_minutes = average_response_minutes(&assignments);
                debug!(
                    incident = incident.id.0,
                    required,
                    units = assignments.len(),
                    avg_response_minutes,
                    wait_minutes,
                    "incident allocated"
                );
                return Ok(Allocation {
                    assignments,
                    avg_response_minutes,
                    wait_minutes,
                    attempts,
                });
            }

            let freed = self.ctx.capacity_freed().notified();
            drop(pool);

            incident.state = IncidentState::Waiting;
            wait_minutes += WAIT_PENALTY_MINUTES;
            trace!(
                incident = incident.id.0,
                required,
                wait_minutes,
                "not enough free teams, waiting"
            );
            freed.await;
        }
    }

    /// Return teams to their units and wake every waiting incident.
    pub async fn release(&self, assignments: &[Assignment]) -> Result<(), PoolError> {
        {
            let mut pool = self.ctx.lock_pool().await;
            for assignment in assignments {
                pool.release(assignment.unit, assignment.teams)?;
            }
        }
        self.ctx.capacity_freed().notify_waiters();
        Ok(())
    }

    /// Full lifecycle of one incident: allocate, stay busy for the round trip
    /// plus on-scene work plus any wait, then release.
    pub async fn resolve(&self, mut incident: Incident) -> Result<Incident, DispatchError> {
        let allocation = self.allocate(&mut incident).await?;
        let response_minutes = allocation.avg_response_minutes + allocation.wait_minutes;
        incident.response_minutes = Some(response_minutes);
        incident.wait_minutes = allocation.wait_minutes;
        incident.state = IncidentState::Resolving;

        let busy_minutes = busy_minutes(&allocation, incident.intensity.on_scene_minutes);
        self.ctx.clock().sleep_minutes(busy_minutes).await;

        self.release(&allocation.assignments).await?;
        incident.assignments = allocation.assignments;
        incident.state = IncidentState::Resolved;
        trace!(
            incident = incident.id.0,
            response_minutes,
            busy_minutes,
            "incident resolved"
        );
        Ok(incident)
    }
}

/// Travel out and back, on-scene work, plus the wait penalty.
pub fn busy_minutes(allocation: &Allocation, on_scene_minutes: f64) -> f64 {
    2.0 * allocation.avg_response_minutes + on_scene_minutes + allocation.wait_minutes
}
