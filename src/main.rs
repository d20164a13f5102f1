//! perfhud: always-on-top style telemetry for CPU, GPU and frame rates.
//!
//! Run with:  `RUST_LOG=info perfhud [config.toml]`

use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Structured logging; RUST_LOG controls verbosity (default: info).
    // Logs go to stderr so stdout carries only overlay lines.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("perfhud v{} starting", env!("CARGO_PKG_VERSION"));

    let path = std::env::args_os()
        .nth(1)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(hud_config::default_path);
    let config = hud_config::load(&path)?;

    hud_overlay::run(config).map_err(Into::into)
}
