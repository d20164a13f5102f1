use hud_core::CaptureRegion;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure parsed from `perfhud.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    pub cadence: CadenceConfig,
    pub cpu: CpuConfig,
    pub fps: FpsConfig,
    pub capture: CaptureConfig,
    pub sensors: SensorPaths,
    pub output: OutputConfig,
}

/// The two independent polling clocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    /// CPU/GPU sampling period in milliseconds.
    pub slow_ms: u64,
    /// Frame-rate bookkeeping period in milliseconds (may be as low as 1).
    pub fast_ms: u64,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            slow_ms: 500,
            fast_ms: 16,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    /// Rolling-window capacity for utilization smoothing.
    pub window: usize,
    /// How long a single utilization measurement blocks, in milliseconds.
    pub sample_ms: u64,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            window:    10,
            sample_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FpsConfig {
    /// Rolling-window capacity for tick intervals.
    pub window: usize,
}

impl Default for FpsConfig {
    fn default() -> Self {
        Self { window: 1000 }
    }
}

/// Which frame-source backend feeds the captured-frame counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FrameSourceKind {
    /// Paced source emitting frames at `synthetic_hz`.  It measures nothing
    /// on screen; useful for exercising the pipeline.
    #[default]
    Synthetic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// When `false` only the tick-based frame rate is reported.
    /// Off unless a frame source is configured explicitly.
    pub enabled: bool,
    /// Requested capture rate; 0 means "as fast as possible".
    pub target_rate: u32,
    /// Capture rectangle; absent means the full output.
    pub region: Option<CaptureRegion>,
    pub source: FrameSourceKind,
    /// Refresh rate emulated by the synthetic source.
    pub synthetic_hz: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled:      false,
            target_rate:  0,
            region:       None,
            source:       FrameSourceKind::Synthetic,
            synthetic_hz: 60,
        }
    }
}

/// Filesystem roots the sensor backends read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorPaths {
    pub hwmon_root: PathBuf,
    pub thermal_root: PathBuf,
    pub drm_root: PathBuf,
}

impl Default for SensorPaths {
    fn default() -> Self {
        Self {
            hwmon_root:   PathBuf::from("/sys/class/hwmon"),
            thermal_root: PathBuf::from("/sys/class/thermal"),
            drm_root:     PathBuf::from("/sys/class/drm"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable `CPU: 12% | Temp: 48°C` lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}
