pub mod engine;
pub mod ranking;
pub mod types;

pub use engine::DispatchEngine;
pub use ranking::{
    average_response_minutes, compare_candidates, plan_assignments, rank_candidates,
    rank_candidates_pairwise,
};
pub use types::{Allocation, Assignment, Candidate};
