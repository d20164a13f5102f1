use hud_config::{FrameSourceKind, HudConfig};
use hud_core::{CpuSnapshot, FpsSnapshot, GpuSnapshot};
use hud_system::{
    CaptureFrameCounter, CpuSampler, DrmGpu, FrameIntervalEstimator, FrameSource, GpuMonitor,
    GpuQuery, LoadProbe, SyntheticFrameSource, SysinfoLoad, TemperatureProviderChain,
};
use std::time::Duration;

pub type BoxedCapture = CaptureFrameCounter<Box<dyn FrameSource>>;

/// One overlay's worth of sensor state.
///
/// Every instance owns its own windows, accumulators and hardware handles.
/// [`slow_tick`](Self::slow_tick) and [`fast_tick`](Self::fast_tick) are the
/// only entry points the cadences call.
pub struct Overlay<P = SysinfoLoad> {
    cpu:     CpuSampler<P>,
    gpu:     GpuMonitor,
    frames:  FrameIntervalEstimator,
    capture: Option<BoxedCapture>,
}

impl Overlay<SysinfoLoad> {
    /// Build every component against the real system.
    pub fn from_config(config: &HudConfig) -> Self {
        let temps = TemperatureProviderChain::with_default_providers(
            &config.sensors.hwmon_root,
            &config.sensors.thermal_root,
        );
        let cpu = CpuSampler::system(
            config.cpu.window,
            Duration::from_millis(config.cpu.sample_ms),
            temps,
        );
        let gpu = GpuMonitor::first_available(gpu_candidates(config));
        let frames = FrameIntervalEstimator::new(config.fps.window);

        let capture = config.capture.enabled.then(|| {
            let capture = &config.capture;
            let (kind, hz) = (capture.source, capture.synthetic_hz);
            CaptureFrameCounter::open(capture.region, capture.target_rate, move |region| match kind {
                FrameSourceKind::Synthetic => SyntheticFrameSource::create(region, hz)
                    .map(|s| Box::new(s) as Box<dyn FrameSource>),
            })
        });

        Self::from_parts(cpu, gpu, frames, capture)
    }
}

/// GPU queries in priority order: NVML first, then the DRM class.
fn gpu_candidates(config: &HudConfig) -> Vec<Box<dyn GpuQuery>> {
    let mut candidates: Vec<Box<dyn GpuQuery>> = Vec::new();
    #[cfg(feature = "nvml")]
    candidates.push(Box::new(hud_system::NvmlGpu::new(0)));
    candidates.push(Box::new(DrmGpu::new(&config.sensors.drm_root)));
    candidates
}

impl<P: LoadProbe> Overlay<P> {
    pub fn from_parts(
        cpu: CpuSampler<P>,
        gpu: GpuMonitor,
        frames: FrameIntervalEstimator,
        capture: Option<BoxedCapture>,
    ) -> Self {
        Self { cpu, gpu, frames, capture }
    }

    /// CPU and GPU reading.  Blocks for the CPU measurement window.
    pub fn slow_tick(&mut self) -> (CpuSnapshot, GpuSnapshot) {
        (self.cpu.sample(), self.gpu.sample())
    }

    /// Frame-rate bookkeeping; cheap enough for a 1 ms cadence.
    pub fn fast_tick(&mut self) -> FpsSnapshot {
        let mean_fps = self.frames.update();
        let real_fps = self.capture.as_mut().map(|c| {
            c.poll_once();
            c.real_fps()
        });
        FpsSnapshot { mean_fps, real_fps }
    }

    #[must_use]
    pub fn capture_running(&self) -> bool {
        self.capture.as_ref().is_some_and(|c| c.is_running())
    }

    /// Release the frame source.  Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(capture) = self.capture.as_mut() {
            capture.stop();
        }
    }
}
