use crate::temperature::parse_millidegrees;
use hud_core::{GpuSnapshot, HudError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// GPU utilization and temperature backend.
pub trait GpuQuery: Send {
    fn name(&self) -> &'static str;

    /// Locate the device.  Called once.
    fn initialize(&mut self) -> Result<()>;

    /// Busy percentage, 0–100.
    fn utilization(&mut self) -> Result<u32>;

    /// Die temperature in °C.
    fn temperature(&mut self) -> Result<f32>;
}

/// Wraps a [`GpuQuery`] and turns every failure into placeholder values.
pub struct GpuMonitor {
    query: Option<Box<dyn GpuQuery>>,
}

impl GpuMonitor {
    pub fn new(mut query: Box<dyn GpuQuery>) -> Self {
        match query.initialize() {
            Ok(()) => {
                info!("GPU query: {}", query.name());
                Self { query: Some(query) }
            }
            Err(e) => {
                warn!("GPU query {} unavailable: {e}", query.name());
                Self::unavailable()
            }
        }
    }

    /// Use the first query in `candidates` that initializes.
    pub fn first_available(candidates: Vec<Box<dyn GpuQuery>>) -> Self {
        for mut query in candidates {
            match query.initialize() {
                Ok(()) => {
                    info!("GPU query: {}", query.name());
                    return Self { query: Some(query) };
                }
                Err(e) => debug!("GPU query {} rejected: {e}", query.name()),
            }
        }
        warn!("no GPU query available; GPU values will be shown as unavailable");
        Self::unavailable()
    }

    /// A monitor that always reports placeholders.
    pub fn unavailable() -> Self {
        Self { query: None }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.query.is_some()
    }

    /// Query both values; either failing blanks the whole reading.
    pub fn sample(&mut self) -> GpuSnapshot {
        let Some(query) = self.query.as_mut() else {
            return GpuSnapshot::unavailable();
        };

        match (query.utilization(), query.temperature()) {
            (Ok(u), Ok(t)) => GpuSnapshot {
                utilization_percent: Some(u.min(100)),
                temperature_celsius: Some(t),
            },
            (Err(e), _) | (_, Err(e)) => {
                debug!("{e}");
                GpuSnapshot::unavailable()
            }
        }
    }
}

#[cfg(feature = "nvml")]
pub use nvml::NvmlGpu;

#[cfg(feature = "nvml")]
mod nvml {
    use super::GpuQuery;
    use hud_core::{HudError, Result};
    use nvml_wrapper::enum_wrappers::device::TemperatureSensor;
    use nvml_wrapper::{Device, Nvml};

    const NAME: &str = "nvml";

    /// NVIDIA GPU through NVML, the library behind `nvidia-smi`.
    ///
    /// NVML is initialized once; the device handle is looked up per query
    /// because it borrows the library handle.
    pub struct NvmlGpu {
        index: u32,
        nvml:  Option<Nvml>,
    }

    impl NvmlGpu {
        pub fn new(index: u32) -> Self {
            Self { index, nvml: None }
        }

        fn device(&self) -> Result<Device<'_>> {
            let nvml = self
                .nvml
                .as_ref()
                .ok_or_else(|| HudError::GpuUnavailable("NVML not initialized".into()))?;
            nvml.device_by_index(self.index).map_err(|e| {
                HudError::GpuUnavailable(format!("NVIDIA device {}: {e}", self.index))
            })
        }
    }

    impl GpuQuery for NvmlGpu {
        fn name(&self) -> &'static str {
            NAME
        }

        fn initialize(&mut self) -> Result<()> {
            let nvml = Nvml::init().map_err(|e| HudError::GpuUnavailable(format!("NVML: {e}")))?;
            self.nvml = Some(nvml);
            if let Err(e) = self.device() {
                self.nvml = None;
                return Err(e);
            }
            Ok(())
        }

        fn utilization(&mut self) -> Result<u32> {
            self.device()?
                .utilization_rates()
                .map(|u| u.gpu)
                .map_err(|e| HudError::GpuUnavailable(format!("utilization: {e}")))
        }

        fn temperature(&mut self) -> Result<f32> {
            self.device()?
                .temperature(TemperatureSensor::Gpu)
                .map(|t| t as f32)
                .map_err(|e| HudError::GpuUnavailable(format!("temperature: {e}")))
        }
    }
}

const DRM: &str = "drm";

/// GPU readout from the kernel DRM class (`/sys/class/drm`).
///
/// Uses the first `cardN` whose device exposes `gpu_busy_percent` and reads
/// the temperature from that device's hwmon chip.
#[derive(Debug)]
pub struct DrmGpu {
    root:   PathBuf,
    device: Option<PathBuf>,
    temp:   Option<PathBuf>,
}

impl DrmGpu {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root:   root.into(),
            device: None,
            temp:   None,
        }
    }

    fn is_card(name: &str) -> bool {
        name.strip_prefix("card")
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
    }

    fn find_temp_input(device: &Path) -> Option<PathBuf> {
        let mut chips: Vec<PathBuf> = std::fs::read_dir(device.join("hwmon"))
            .ok()?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .collect();
        chips.sort();
        chips
            .into_iter()
            .map(|chip| chip.join("temp1_input"))
            .find(|p| p.exists())
    }
}

impl GpuQuery for DrmGpu {
    fn name(&self) -> &'static str {
        DRM
    }

    fn initialize(&mut self) -> Result<()> {
        let mut cards: Vec<PathBuf> = std::fs::read_dir(&self.root)?
            .filter_map(|e| e.ok())
            .filter(|e| Self::is_card(&e.file_name().to_string_lossy()))
            .map(|e| e.path().join("device"))
            .collect();
        cards.sort();

        let device = cards
            .into_iter()
            .find(|d| d.join("gpu_busy_percent").exists())
            .ok_or_else(|| HudError::GpuUnavailable("no DRM card reports utilization".into()))?;

        self.temp = Self::find_temp_input(&device);
        self.device = Some(device);
        Ok(())
    }

    fn utilization(&mut self) -> Result<u32> {
        let device = self
            .device
            .as_ref()
            .ok_or_else(|| HudError::GpuUnavailable("not initialized".into()))?;
        let raw = std::fs::read_to_string(device.join("gpu_busy_percent"))?;
        raw.trim()
            .parse()
            .map_err(|e| HudError::GpuUnavailable(format!("bad busy percent {raw:?}: {e}")))
    }

    fn temperature(&mut self) -> Result<f32> {
        let input = self
            .temp
            .as_ref()
            .ok_or_else(|| HudError::GpuUnavailable("no temperature sensor".into()))?;
        let raw = std::fs::read_to_string(input)?;
        parse_millidegrees(&raw)
            .ok_or_else(|| HudError::GpuUnavailable(format!("bad temperature {raw:?}")))
    }
}
