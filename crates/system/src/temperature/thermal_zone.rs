use super::{parse_millidegrees, TemperatureProvider};
use hud_core::{HudError, Result};
use std::path::PathBuf;

const NAME: &str = "thermal-zone";

/// Zone types firmware uses for the CPU package.
const CPU_ZONE_TYPES: &[&str] = &["x86_pkg_temp", "cpu-thermal", "cpu_thermal", "soc_thermal"];

/// Reads the firmware-exposed thermal zones under `/sys/class/thermal`.
///
/// Zones are matched by their `type` once during the handshake; the first
/// matching zone in sorted order wins on each read.
#[derive(Debug)]
pub struct ThermalZoneProvider {
    root:  PathBuf,
    zones: Vec<PathBuf>,
}

impl ThermalZoneProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root:  root.into(),
            zones: Vec::new(),
        }
    }
}

fn is_cpu_zone(kind: &str) -> bool {
    CPU_ZONE_TYPES.contains(&kind) || kind.to_ascii_lowercase().contains("cpu")
}

impl TemperatureProvider for ThermalZoneProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn initialize(&mut self) -> Result<()> {
        let mut zones: Vec<PathBuf> = std::fs::read_dir(&self.root)?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with("thermal_zone"))
            })
            .filter(|p| {
                std::fs::read_to_string(p.join("type")).is_ok_and(|t| is_cpu_zone(t.trim()))
            })
            .collect();
        zones.sort();

        if zones.is_empty() {
            return Err(HudError::sensor(NAME, "no CPU thermal zone"));
        }
        self.zones = zones;
        Ok(())
    }

    fn read_temperature(&mut self) -> Result<f32> {
        self.zones
            .iter()
            .find_map(|zone| {
                std::fs::read_to_string(zone.join("temp"))
                    .ok()
                    .and_then(|raw| parse_millidegrees(&raw))
            })
            .ok_or_else(|| HudError::sensor(NAME, "no readable CPU zone"))
    }
}
