pub mod schema;

pub use schema::{
    CadenceConfig, CaptureConfig, CpuConfig, FpsConfig, FrameSourceKind, HudConfig,
    OutputConfig, OutputFormat, SensorPaths,
};

use hud_core::{HudError, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns `HudConfig::default()` if
/// the file doesn't exist so the overlay always has sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<HudConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(HudConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| HudError::Config(format!("cannot read '{}': {e}", path.display())))?;

    let config: HudConfig =
        toml::from_str(&raw).map_err(|e| HudError::Config(format!("TOML parse error: {e}")))?;
    validate(&config)?;
    Ok(config)
}

/// Reject values the core cannot run with.
pub fn validate(config: &HudConfig) -> Result<()> {
    if config.cadence.slow_ms == 0 || config.cadence.fast_ms == 0 {
        return Err(HudError::Config("cadence intervals must be non-zero".into()));
    }
    if config.cpu.window == 0 || config.fps.window == 0 {
        return Err(HudError::Config("window capacities must be non-zero".into()));
    }
    if config.capture.region.is_some_and(|r| r.is_empty()) {
        return Err(HudError::Config("capture region has zero area".into()));
    }
    if config.capture.source == FrameSourceKind::Synthetic && config.capture.synthetic_hz == 0 {
        return Err(HudError::Config("synthetic_hz must be non-zero".into()));
    }
    Ok(())
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("perfhud").join("perfhud.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load(dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.cadence.slow_ms, 500);
        assert_eq!(cfg.cadence.fast_ms, 16);
        assert_eq!(cfg.cpu.window, 10);
        assert_eq!(cfg.fps.window, 1000);
        assert!(cfg.capture.region.is_none());
        assert!(!cfg.capture.enabled);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[cadence]
fast_ms = 1

[capture]
enabled = true
region = {{ x = 10, y = 20, width = 640, height = 480 }}

[output]
format = "json"
"#
        )
        .unwrap();

        let cfg = load(file.path()).unwrap();
        assert_eq!(cfg.cadence.fast_ms, 1);
        assert_eq!(cfg.cadence.slow_ms, 500);
        assert_eq!(cfg.output.format, OutputFormat::Json);
        assert!(cfg.capture.enabled);
        assert_eq!(cfg.capture.source, FrameSourceKind::Synthetic);
        let region = cfg.capture.region.unwrap();
        assert_eq!((region.x, region.y, region.width, region.height), (10, 20, 640, 480));
    }

    #[test]
    fn zero_window_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cpu]\nwindow = 0").unwrap();
        assert!(matches!(load(file.path()), Err(HudError::Config(_))));
    }

    #[test]
    fn zero_area_region_rejected() {
        let mut cfg = HudConfig::default();
        cfg.capture.region = Some(hud_core::CaptureRegion { x: 0, y: 0, width: 0, height: 0 });
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn garbage_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is = = not toml").unwrap();
        assert!(matches!(load(file.path()), Err(HudError::Config(_))));
    }
}
