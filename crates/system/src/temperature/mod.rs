//! CPU temperature through a priority-ordered chain of sensor backends.
//!
//! The chain commits to the first backend whose [`TemperatureProvider::initialize`]
//! succeeds and never re-probes.  Individual read failures surface as `None`.

pub mod components;
pub mod hwmon;
pub mod thermal_zone;

pub use components::SysinfoProvider;
pub use hwmon::HwmonProvider;
pub use thermal_zone::ThermalZoneProvider;

use hud_core::{HudError, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// Lowest and highest readings accepted as real, in °C.
pub const PLAUSIBLE_RANGE: std::ops::RangeInclusive<f32> = -40.0..=150.0;

/// One CPU temperature backend.
pub trait TemperatureProvider: Send {
    /// Short identifier used in logs, e.g. `"hwmon"`.
    fn name(&self) -> &'static str;

    /// One-time handshake with the backend.  Called at most once per instance.
    fn initialize(&mut self) -> Result<()>;

    /// Current package temperature in °C.
    fn read_temperature(&mut self) -> Result<f32>;
}

/// Outcome of resolving a [`TemperatureProviderChain`].
pub enum Resolution {
    Resolved(Box<dyn TemperatureProvider>),
    Unresolved,
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolved(p) => f.debug_tuple("Resolved").field(&p.name()).finish(),
            Self::Unresolved  => f.write_str("Unresolved"),
        }
    }
}

/// Ordered candidates, resolved once to a single active provider.
pub struct TemperatureProviderChain {
    candidates: Vec<Box<dyn TemperatureProvider>>,
    resolution: Option<Resolution>,
}

impl TemperatureProviderChain {
    /// Build a chain over `candidates` in priority order.  Nothing is probed
    /// until [`resolve`](Self::resolve) is called.
    pub fn new(candidates: Vec<Box<dyn TemperatureProvider>>) -> Self {
        Self {
            candidates,
            resolution: None,
        }
    }

    /// The standard order: hwmon driver, firmware thermal zones, sysinfo.
    pub fn with_default_providers(hwmon_root: &Path, thermal_root: &Path) -> Self {
        let candidates: Vec<Box<dyn TemperatureProvider>> = vec![
            Box::new(HwmonProvider::new(hwmon_root)),
            Box::new(ThermalZoneProvider::new(thermal_root)),
            Box::new(SysinfoProvider::new()),
        ];
        Self::new(candidates)
    }

    /// Try each candidate in order and keep the first that initializes.
    ///
    /// Only the first call probes; later calls return the cached outcome.
    /// Returns the active provider's name, if any.
    pub fn resolve(&mut self) -> Option<&'static str> {
        if self.resolution.is_none() {
            self.resolution = Some(self.probe());
        }
        self.active_provider()
    }

    fn probe(&mut self) -> Resolution {
        for mut candidate in self.candidates.drain(..) {
            match candidate.initialize() {
                Ok(()) => {
                    info!("CPU temperature provider: {}", candidate.name());
                    return Resolution::Resolved(candidate);
                }
                Err(e) => debug!("temperature provider {} rejected: {e}", candidate.name()),
            }
        }
        warn!("{}; CPU temperature will be shown as unavailable", HudError::ProviderUnavailable);
        Resolution::Unresolved
    }

    /// `true` once a provider has been committed to.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self.resolution, Some(Resolution::Resolved(_)))
    }

    /// `true` once the candidates have been tried, whatever the outcome.
    #[must_use]
    pub fn is_probed(&self) -> bool {
        self.resolution.is_some()
    }

    /// Name of the active provider, `None` if unresolved or nothing matched.
    pub fn active_provider(&self) -> Option<&'static str> {
        match &self.resolution {
            Some(Resolution::Resolved(p)) => Some(p.name()),
            _ => None,
        }
    }

    /// Read from the active provider.  Resolves first if needed.
    ///
    /// Any failure, including an implausible value, yields `None` for this
    /// call only.
    pub fn read_temperature(&mut self) -> Option<f32> {
        self.resolve();
        let Some(Resolution::Resolved(provider)) = self.resolution.as_mut() else {
            return None;
        };

        match provider.read_temperature() {
            Ok(t) if t.is_finite() && PLAUSIBLE_RANGE.contains(&t) => Some(t),
            Ok(t) => {
                debug!("{}: discarding implausible reading {t}", provider.name());
                None
            }
            Err(e) => {
                debug!("{e}");
                None
            }
        }
    }
}

impl std::fmt::Debug for TemperatureProviderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemperatureProviderChain")
            .field("pending", &self.candidates.len())
            .field("resolution", &self.resolution)
            .finish()
    }
}

/// Whether a sensor label names the CPU package or its primary core.
pub(crate) fn is_package_label(label: &str) -> bool {
    let label = label.to_ascii_lowercase();
    ["package", "tctl", "tdie", "core 0", "core #1", "cpu"]
        .iter()
        .any(|marker| label.contains(marker))
}

/// Parse a sysfs millidegree reading such as `"48500\n"`.
pub(crate) fn parse_millidegrees(raw: &str) -> Option<f32> {
    raw.trim().parse::<i64>().ok().map(|m| m as f32 / 1000.0)
}
