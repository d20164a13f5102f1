//! Sensor aggregation for the overlay: rolling averages, the CPU temperature
//! provider chain, CPU and GPU sampling, and the two frame-rate estimators.
//!
//! Nothing here spawns threads.  Callers drive every component from their
//! own cadence; only [`CpuSampler::sample`] blocks.

pub mod capture;
pub mod clock;
pub mod cpu;
pub mod frame;
pub mod gpu;
pub mod temperature;
pub mod window;

pub use capture::{CaptureFrameCounter, FrameBuffer, FrameSource, SyntheticFrameSource};
pub use clock::{Clock, ManualClock, SystemClock};
pub use cpu::{CpuSampler, LoadProbe, SysinfoLoad};
pub use frame::FrameIntervalEstimator;
pub use gpu::{DrmGpu, GpuMonitor, GpuQuery};
#[cfg(feature = "nvml")]
pub use gpu::NvmlGpu;
pub use temperature::{Resolution, TemperatureProvider, TemperatureProviderChain};
pub use window::RollingWindow;
