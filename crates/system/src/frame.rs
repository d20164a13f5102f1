use crate::clock::{Clock, SystemClock};
use crate::window::RollingWindow;
use std::time::Instant;

/// Default number of tick intervals averaged.
pub const DEFAULT_WINDOW: usize = 1000;

/// Smoothed frame rate from the mean interval between [`tick`](Self::tick) calls.
///
/// The previous-tick timestamp is seeded at construction so the first tick
/// measures time since creation instead of an unbounded gap.
#[derive(Debug)]
pub struct FrameIntervalEstimator<C = SystemClock> {
    clock:     C,
    last_tick: Instant,
    intervals: RollingWindow<f64>,
}

impl FrameIntervalEstimator<SystemClock> {
    pub fn new(window: usize) -> Self {
        Self::with_clock(window, SystemClock)
    }
}

impl<C: Clock> FrameIntervalEstimator<C> {
    pub fn with_clock(window: usize, clock: C) -> Self {
        let last_tick = clock.now();
        Self {
            clock,
            last_tick,
            intervals: RollingWindow::new(window),
        }
    }

    /// Record the seconds elapsed since the previous tick and return them.
    pub fn tick(&mut self) -> f64 {
        let now = self.clock.now();
        let delta = now.saturating_duration_since(self.last_tick).as_secs_f64();
        self.last_tick = now;
        self.intervals.push(delta);
        delta
    }

    /// `1 / mean interval`, or `0.0` while the mean interval is zero.
    pub fn mean_fps(&self) -> f64 {
        let mean = self.intervals.mean();
        if mean > 0.0 {
            1.0 / mean
        } else {
            0.0
        }
    }

    /// Tick, then report the updated mean rate.
    pub fn update(&mut self) -> f64 {
        self.tick();
        self.mean_fps()
    }

    /// Mean tick interval in seconds.
    pub fn mean_interval(&self) -> f64 {
        self.intervals.mean()
    }
}
