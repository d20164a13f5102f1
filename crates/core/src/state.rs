use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text shown in place of a value that is currently unavailable.
pub const PLACEHOLDER: &str = "--";

/// Screen rectangle restricting frame capture, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    /// `true` when the rectangle covers no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// One slow-cadence CPU reading.
#[derive(Debug, Clone, Serialize)]
pub struct CpuSnapshot {
    /// Instantaneous system-wide utilization (0.0 – 100.0).
    pub utilization_percent: f32,
    /// Mean of the sampler's rolling window, including this reading.
    pub average_percent: f32,
    /// Package temperature in °C, `None` when no sensor answered.
    pub temperature_celsius: Option<f32>,
    /// Wall-clock time the reading was taken.
    pub taken_at: DateTime<Local>,
}

impl fmt::Display for CpuSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CPU: {:.0}% | Temp: ", self.utilization_percent)?;
        match self.temperature_celsius {
            Some(t) => write!(f, "{t:.0}°C"),
            None    => write!(f, "{PLACEHOLDER}°C"),
        }
    }
}

/// One slow-cadence GPU reading.  Both fields are `None` when the GPU query
/// is unavailable or failed this cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GpuSnapshot {
    pub utilization_percent: Option<u32>,
    pub temperature_celsius: Option<f32>,
}

impl GpuSnapshot {
    pub fn unavailable() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.utilization_percent.is_some() && self.temperature_celsius.is_some()
    }
}

impl fmt::Display for GpuSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.utilization_percent, self.temperature_celsius) {
            (Some(u), Some(t)) => write!(f, "GPU: {u}% | Temp: {t:.0}°C"),
            _ => write!(f, "GPU: {PLACEHOLDER}% | Temp: {PLACEHOLDER}°C"),
        }
    }
}

/// Both frame-rate measures, read together on the fast cadence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FpsSnapshot {
    /// Smoothed rate derived from the mean interval between ticks.
    pub mean_fps: f64,
    /// Captured-frame rate over the last accumulation window.
    /// `None` when frame capture is disabled.
    pub real_fps: Option<f64>,
}

impl fmt::Display for FpsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FPS avg: {}", self.mean_fps as u64)?;
        if let Some(real) = self.real_fps {
            write!(f, " | FPS real: {}", real as u64)?;
        }
        Ok(())
    }
}
