//! Virtual simulation clock.
//!
//! Simulated minutes map onto tokio's timer with time paused: the runtime
//! jumps straight to the next pending timer whenever every task is idle, so
//! waiting out a busy period costs no wall-clock time and no CPU proportional
//! to the simulated minutes. The timer wheel is the event queue.

use std::io;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tokio::time::{sleep, sleep_until, Instant};

pub const MINUTES_PER_DAY: u32 = 1440;
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Build the single-threaded, paused-time runtime a simulation runs on.
pub fn virtual_time_runtime() -> io::Result<Runtime> {
    Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
}

pub fn minutes_to_duration(minutes: f64) -> Duration {
    Duration::from_secs_f64(minutes.max(0.0) * SECONDS_PER_MINUTE)
}

/// Minutes elapsed since the clock was started.
#[derive(Debug, Clone, Copy)]
pub struct SimulationClock {
    origin: Instant,
}

impl SimulationClock {
    /// Start a clock at the runtime's current instant. Call from inside the
    /// simulation runtime so the origin uses virtual time.
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now_minutes(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() / SECONDS_PER_MINUTE
    }

    /// Suspend the calling task for `minutes` of simulated time.
    pub async fn sleep_minutes(&self, minutes: f64) {
        if minutes > 0.0 {
            sleep(minutes_to_duration(minutes)).await;
        }
    }

    /// Suspend until the clock reads `minute`. Returns immediately if it
    /// already has.
    pub async fn sleep_until_minute(&self, minute: f64) {
        sleep_until(self.origin + minutes_to_duration(minute)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sleeping_advances_virtual_minutes() {
        let clock = SimulationClock::start();
        let wall = std::time::Instant::now();
        clock.sleep_minutes(90.0).await;
        assert!((clock.now_minutes() - 90.0).abs() < 1e-6);
        clock.sleep_until_minute(1440.0).await;
        assert!((clock.now_minutes() - 1440.0).abs() < 1e-6);
        assert!(wall.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_sleepers_wake_in_deadline_order() {
        let clock = SimulationClock::start();
        let order = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
        let mut handles = Vec::new();
        for minutes in [30.0, 5.0, 12.5] {
            let order = std::sync::Arc::clone(&order);
            handles.push(tokio::spawn(async move {
                clock.sleep_minutes(minutes).await;
                order.lock().push(minutes);
            }));
        }
        for h in handles {
            h.await.expect("sleeper");
        }
        assert_eq!(*order.lock(), vec![5.0, 12.5, 30.0]);
    }

    #[test]
    fn runtime_starts_with_time_paused() {
        let rt = virtual_time_runtime().expect("runtime");
        let elapsed = rt.block_on(async {
            let clock = SimulationClock::start();
            clock.sleep_minutes(MINUTES_PER_DAY as f64).await;
            clock.now_minutes()
        });
        assert!((elapsed - MINUTES_PER_DAY as f64).abs() < 1e-6);
    }
}
