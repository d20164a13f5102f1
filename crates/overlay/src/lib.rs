//! Snapshot assembler: drives the sensor core from two independent cadences
//! and writes one status line per slow tick.

pub mod monitor;
pub mod render;

pub use monitor::Overlay;

use hud_config::{CadenceConfig, HudConfig, OutputFormat};
use hud_core::Result;
use hud_system::LoadProbe;
use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

/// Run the overlay until Ctrl-C.
///
/// Uses a single-threaded runtime: both cadences share one thread, so the
/// blocking CPU measurement delays frame bookkeeping for its duration.
pub fn run(config: HudConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let mut overlay = Overlay::from_config(&config);
        let shutdown = wait_for_signal(tokio::signal::ctrl_c());
        let stdout = std::io::stdout();
        drive(
            &mut overlay,
            &config.cadence,
            config.output.format,
            &mut stdout.lock(),
            shutdown,
        )
        .await
    })
}

/// Resolve when `signal` fires.
///
/// If the handler could not be installed this never resolves, so the
/// overlay keeps running instead of exiting at once.
pub async fn wait_for_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!("cannot listen for Ctrl-C: {e}; stop the process to exit");
        std::future::pending::<()>().await;
    }
}

/// Drive `overlay` on the slow and fast cadences until `shutdown` resolves,
/// then release its frame source.
///
/// Each slow tick writes a line combining fresh CPU/GPU readings with the
/// most recent frame-rate snapshot.
pub async fn drive<P, W, F>(
    overlay: &mut Overlay<P>,
    cadence: &CadenceConfig,
    format: OutputFormat,
    out: &mut W,
    shutdown: F,
) -> Result<()>
where
    P: LoadProbe,
    W: Write,
    F: Future<Output = ()>,
{
    let mut slow = time::interval(Duration::from_millis(cadence.slow_ms));
    let mut fast = time::interval(Duration::from_millis(cadence.fast_ms));
    slow.set_missed_tick_behavior(MissedTickBehavior::Delay);
    fast.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut fps = overlay.fast_tick();
    let outcome = loop {
        tokio::select! {
            _ = &mut shutdown => break Ok(()),
            _ = slow.tick() => {
                let (cpu, gpu) = overlay.slow_tick();
                let line = render::render_line(format, &cpu, &gpu, &fps);
                if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
                    break Err(e.into());
                }
            }
            _ = fast.tick() => {
                fps = overlay.fast_tick();
            }
        }
    };

    overlay.shutdown();
    info!("overlay stopped");
    outcome
}
