use super::{is_package_label, parse_millidegrees, TemperatureProvider};
use hud_core::{HudError, Result};
use std::path::{Path, PathBuf};

const NAME: &str = "hwmon";

/// hwmon drivers that report CPU die temperatures.
const CPU_DRIVERS: &[&str] = &["coretemp", "k10temp", "zenpower", "cpu_thermal"];

/// One `tempN_*` channel of a CPU hwmon chip.
#[derive(Debug, Clone)]
struct Channel {
    label: String,
    input: PathBuf,
}

/// Reads the CPU sensor driver directly from the Linux hwmon class.
///
/// The handshake walks every `hwmonN` directory once, keeps the chips whose
/// `name` is a CPU driver and caches their labelled temperature channels.
/// Reads only touch the cached `tempN_input` files.
#[derive(Debug)]
pub struct HwmonProvider {
    root:     PathBuf,
    channels: Vec<Channel>,
}

impl HwmonProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root:     root.into(),
            channels: Vec::new(),
        }
    }

    fn scan_chip(chip: &Path, out: &mut Vec<Channel>) -> Result<()> {
        for entry in std::fs::read_dir(chip)? {
            let file_name = entry?.file_name();
            let file_name = file_name.to_string_lossy();
            let Some(channel) = file_name
                .strip_prefix("temp")
                .and_then(|rest| rest.strip_suffix("_input"))
            else {
                continue;
            };

            // Unlabelled channels on a CPU driver are the package sensor.
            let label = std::fs::read_to_string(chip.join(format!("temp{channel}_label")))
                .map(|l| l.trim().to_string())
                .unwrap_or_else(|_| "Package".to_string());

            out.push(Channel {
                label,
                input: chip.join(&*file_name),
            });
        }
        Ok(())
    }
}

impl TemperatureProvider for HwmonProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn initialize(&mut self) -> Result<()> {
        let mut chips: Vec<PathBuf> = std::fs::read_dir(&self.root)?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .collect();
        chips.sort();

        for chip in chips {
            let Ok(driver) = std::fs::read_to_string(chip.join("name")) else {
                continue;
            };
            if !CPU_DRIVERS.contains(&driver.trim()) {
                continue;
            }
            let start = self.channels.len();
            Self::scan_chip(&chip, &mut self.channels)?;
            self.channels[start..].sort_by(|a, b| a.input.cmp(&b.input));
        }

        if self.channels.is_empty() {
            return Err(HudError::sensor(NAME, "no CPU hwmon chip found"));
        }
        Ok(())
    }

    fn read_temperature(&mut self) -> Result<f32> {
        let channel = self
            .channels
            .iter()
            .find(|c| is_package_label(&c.label))
            .ok_or_else(|| HudError::sensor(NAME, "no package sensor"))?;

        let raw = std::fs::read_to_string(&channel.input)
            .map_err(|e| HudError::sensor(NAME, format!("{}: {e}", channel.input.display())))?;
        parse_millidegrees(&raw)
            .ok_or_else(|| HudError::sensor(NAME, format!("unparseable reading {raw:?}")))
    }
}
