use super::{is_package_label, TemperatureProvider};
use hud_core::{HudError, Result};
use sysinfo::Components;

const NAME: &str = "sysinfo";

/// OS-generic sensors through `sysinfo::Components`.  Last in the chain.
pub struct SysinfoProvider {
    components: Option<Components>,
}

impl SysinfoProvider {
    pub fn new() -> Self {
        Self { components: None }
    }
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TemperatureProvider for SysinfoProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn initialize(&mut self) -> Result<()> {
        let components = Components::new_with_refreshed_list();
        if components.list().is_empty() {
            return Err(HudError::sensor(NAME, "no hardware components exposed"));
        }
        self.components = Some(components);
        Ok(())
    }

    fn read_temperature(&mut self) -> Result<f32> {
        let components = self
            .components
            .as_mut()
            .ok_or_else(|| HudError::sensor(NAME, "not initialized"))?;
        components.refresh(false);

        components
            .list()
            .iter()
            .filter(|c| is_package_label(c.label()))
            .find_map(|c| c.temperature())
            .ok_or_else(|| HudError::sensor(NAME, "no package sensor"))
    }
}
