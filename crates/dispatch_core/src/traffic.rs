//! Traffic model: time-of-day weights applied to sampled per-edge congestion.
//!
//! A day is split into four six-hour windows. At the start of each window the
//! travel graph is reweighted with that window's weight, which scales the PERT
//! traffic fraction drawn for every edge. Weight 0 means free flow.

use serde::{Deserialize, Serialize};

use crate::clock::MINUTES_PER_DAY;

/// Length of one traffic window in minutes.
pub const WINDOW_MINUTES: u32 = 360;

/// Number of traffic windows per day.
pub const WINDOWS_PER_DAY: usize = (MINUTES_PER_DAY / WINDOW_MINUTES) as usize;

/// Pre-defined time-of-day profiles.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum TrafficProfileKind {
    /// Night free flow, heavy morning and afternoon, moderate evening: `[0, 2, 2, 1]`.
    #[default]
    Standard,
    /// No congestion in any window.
    FreeFlow,
    /// Custom per-window weights (index 0 = 00:00-06:00).
    Custom([f64; WINDOWS_PER_DAY]),
}

/// Per-window weights for one simulated day.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeOfDayProfile {
    pub window_weights: [f64; WINDOWS_PER_DAY],
}

impl TimeOfDayProfile {
    pub fn standard() -> Self {
        Self {
            window_weights: [0.0, 2.0, 2.0, 1.0],
        }
    }

    pub fn free_flow() -> Self {
        Self {
            window_weights: [0.0; WINDOWS_PER_DAY],
        }
    }

    pub fn from_kind(kind: &TrafficProfileKind) -> Self {
        match kind {
            TrafficProfileKind::Standard => Self::standard(),
            TrafficProfileKind::FreeFlow => Self::free_flow(),
            TrafficProfileKind::Custom(weights) => Self {
                window_weights: weights.map(|w| w.max(0.0)),
            },
        }
    }

    /// Weight in effect at `minute_of_day`.
    pub fn weight_at(&self, minute_of_day: u32) -> f64 {
        let window = ((minute_of_day % MINUTES_PER_DAY) / WINDOW_MINUTES) as usize;
        self.window_weights[window.min(WINDOWS_PER_DAY - 1)]
    }

    /// `Some(weight)` when `minute_of_day` opens a new window and the graph
    /// must be reweighted, `None` otherwise.
    pub fn reweight_at(&self, minute_of_day: u32) -> Option<f64> {
        (minute_of_day % WINDOW_MINUTES == 0).then(|| self.weight_at(minute_of_day))
    }
}

impl Default for TimeOfDayProfile {
    fn default() -> Self {
        Self::standard()
    }
}
