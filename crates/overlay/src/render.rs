use hud_config::OutputFormat;
use hud_core::{CpuSnapshot, FpsSnapshot, GpuSnapshot};

/// Format one overlay line from the latest readings.
pub fn render_line(
    format: OutputFormat,
    cpu: &CpuSnapshot,
    gpu: &GpuSnapshot,
    fps: &FpsSnapshot,
) -> String {
    match format {
        OutputFormat::Text => format!("{cpu}  {gpu}  {fps}"),
        OutputFormat::Json => serde_json::json!({
            "cpu": cpu,
            "gpu": gpu,
            "fps": fps,
        })
        .to_string(),
    }
}
