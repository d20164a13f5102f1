use crate::temperature::TemperatureProviderChain;
use crate::window::RollingWindow;
use chrono::Local;
use hud_core::CpuSnapshot;
use std::time::Duration;
use sysinfo::System;

/// Default number of utilization samples kept for smoothing.
pub const DEFAULT_WINDOW: usize = 10;

/// Instantaneous system-wide CPU load.
pub trait LoadProbe: Send {
    /// Utilization in percent.  Implementations may block.
    fn instantaneous_load(&mut self) -> f32;
}

/// Blocking load probe over `sysinfo`.
///
/// Takes two CPU refreshes `window` apart and reports the usage between them.
/// Must only be driven from the slow cadence.
pub struct SysinfoLoad {
    sys:    System,
    window: Duration,
}

impl SysinfoLoad {
    pub fn new(window: Duration) -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        Self { sys, window }
    }
}

impl LoadProbe for SysinfoLoad {
    fn instantaneous_load(&mut self) -> f32 {
        self.sys.refresh_cpu_usage();
        std::thread::sleep(self.window);
        self.sys.refresh_cpu_usage();
        self.sys.global_cpu_usage()
    }
}

/// Per-cycle CPU reading: utilization plus package temperature.
///
/// Owns the temperature chain, which is resolved once at construction.
pub struct CpuSampler<P = SysinfoLoad> {
    probe:   P,
    history: RollingWindow<f32>,
    temps:   TemperatureProviderChain,
}

impl CpuSampler<SysinfoLoad> {
    /// Sampler over the real system, blocking `sample_window` per reading.
    pub fn system(window: usize, sample_window: Duration, temps: TemperatureProviderChain) -> Self {
        Self::new(SysinfoLoad::new(sample_window), window, temps)
    }
}

impl<P: LoadProbe> CpuSampler<P> {
    pub fn new(probe: P, window: usize, mut temps: TemperatureProviderChain) -> Self {
        temps.resolve();
        Self {
            probe,
            history: RollingWindow::new(window),
            temps,
        }
    }

    /// Take one reading.  Blocks for the probe's measurement window.
    pub fn sample(&mut self) -> CpuSnapshot {
        let raw = self.probe.instantaneous_load();
        let utilization_percent = if raw.is_finite() { raw.clamp(0.0, 100.0) } else { 0.0 };
        self.history.push(utilization_percent);

        CpuSnapshot {
            utilization_percent,
            average_percent: self.average_utilization(),
            temperature_celsius: self.temps.read_temperature(),
            taken_at: Local::now(),
        }
    }

    /// Mean of the retained utilization samples; `0.0` before the first sample.
    pub fn average_utilization(&self) -> f32 {
        self.history.mean() as f32
    }

    /// Name of the temperature provider in use, if any.
    pub fn temperature_provider(&self) -> Option<&'static str> {
        self.temps.active_provider()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temperature::TemperatureProvider;
    use hud_core::{HudError, Result};

    struct Scripted(std::vec::IntoIter<f32>);

    impl LoadProbe for Scripted {
        fn instantaneous_load(&mut self) -> f32 {
            self.0.next().unwrap_or(0.0)
        }
    }

    fn scripted(values: &[f32]) -> Scripted {
        Scripted(values.to_vec().into_iter())
    }

    struct Fixed(f32);

    impl TemperatureProvider for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }
        fn initialize(&mut self) -> Result<()> {
            Ok(())
        }
        fn read_temperature(&mut self) -> Result<f32> {
            Ok(self.0)
        }
    }

    struct Broken;

    impl TemperatureProvider for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn initialize(&mut self) -> Result<()> {
            Err(HudError::ProviderUnavailable)
        }
        fn read_temperature(&mut self) -> Result<f32> {
            unreachable!("never resolved")
        }
    }

    #[test]
    fn sample_pushes_into_window() {
        let chain =
            TemperatureProviderChain::new(vec![Box::new(Fixed(48.0)) as Box<dyn TemperatureProvider>]);
        let mut sampler = CpuSampler::new(scripted(&[10.0, 20.0, 60.0]), 10, chain);

        assert_eq!(sampler.average_utilization(), 0.0);
        let first = sampler.sample();
        assert_eq!(first.utilization_percent, 10.0);
        assert_eq!(first.temperature_celsius, Some(48.0));

        sampler.sample();
        let third = sampler.sample();
        assert_eq!(third.utilization_percent, 60.0);
        assert_eq!(third.average_percent, 30.0);
        assert_eq!(sampler.average_utilization(), 30.0);
        assert_eq!(sampler.temperature_provider(), Some("fixed"));
    }

    #[test]
    fn out_of_range_load_is_clamped() {
        let chain = TemperatureProviderChain::new(Vec::new());
        let mut sampler = CpuSampler::new(scripted(&[140.0, -3.0, f32::NAN]), 10, chain);

        assert_eq!(sampler.sample().utilization_percent, 100.0);
        assert_eq!(sampler.sample().utilization_percent, 0.0);
        assert_eq!(sampler.sample().utilization_percent, 0.0);
    }

    #[test]
    fn missing_provider_gives_none_temperature() {
        let chain =
            TemperatureProviderChain::new(vec![Box::new(Broken) as Box<dyn TemperatureProvider>]);
        let mut sampler = CpuSampler::new(scripted(&[5.0]), 10, chain);

        assert!(sampler.sample().temperature_celsius.is_none());
        assert_eq!(sampler.temperature_provider(), None);
    }

    #[test]
    fn window_respects_capacity() {
        let chain = TemperatureProviderChain::new(Vec::new());
        let mut sampler = CpuSampler::new(scripted(&[100.0, 0.0, 0.0]), 2, chain);
        for _ in 0..3 {
            sampler.sample();
        }
        assert_eq!(sampler.average_utilization(), 0.0);
    }

    #[test]
    fn real_system_reading_is_in_range() {
        let chain = TemperatureProviderChain::with_default_providers(
            std::path::Path::new("/sys/class/hwmon"),
            std::path::Path::new("/sys/class/thermal"),
        );
        let mut sampler = CpuSampler::system(DEFAULT_WINDOW, Duration::from_millis(20), chain);

        for _ in 0..2 {
            let snap = sampler.sample();
            assert!((0.0..=100.0).contains(&snap.utilization_percent));
            if let Some(t) = snap.temperature_celsius {
                assert!((-40.0..=150.0).contains(&t));
            }
        }
    }
}
