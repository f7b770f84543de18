//! # LANC Zoom
//!
//! Simulated LANC zoom controller.
//!
//! Runs the LANC receiver and motor controller against a simulated camera
//! that plays the command script from the configuration file.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lanc_zoom::config::{Config, LoggingConfig};
use lanc_zoom::lanc::protocol::FRAME_PERIOD_US;
use lanc_zoom::sim::Session;

/// Configuration file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for LANC Zoom
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging with tracing subscriber
///    - Queue the command script on the simulated camera
///
/// 2. **Main Loop**
///    - Simulate one LANC frame (192 bit ticks) per frame period
///    - Log applied commands and periodic counters
///    - Handle Ctrl+C for graceful shutdown
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
///
/// Expected output:
/// ```text
/// INFO lanc_zoom: LANC Zoom v0.1.0 starting...
/// INFO lanc_zoom: Timer: compare A 103, compare B 51, 9615 bit/s (+0.16%)
/// INFO lanc_zoom::sim::session: Frame 0: Move { direction: Forward, speed_index: 3 } -> duty 16, outputs FORWARD | INDICATOR
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let _log_guard = init_logging(&config.logging)?;

    info!("LANC Zoom v{} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        "Timer: compare A {}, compare B {}, {:.0} bit/s ({:+.2}%)",
        config.timer.compare_a()?,
        config.timer.compare_b()?,
        config.timer.actual_baud_rate(),
        config.timer.baud_error_percent()
    );
    info!("Speed table: {:?}", config.speed_table()?.entries());

    let mut session = Session::from_config(&config)?;
    info!(
        "Running {} frames ({} us each, {})",
        session.frames_to_run(),
        FRAME_PERIOD_US,
        if config.simulation.realtime { "real time" } else { "unpaced" }
    );
    info!("Press Ctrl+C to exit");

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let summary = session.run(config.simulation.realtime, shutdown).await?;

    info!(
        "Done: {} frames, {} commands applied, {} overruns, final duty {}",
        summary.frames, summary.commands_applied, summary.overruns, summary.final_state.duty
    );

    Ok(())
}

/// Initialize the tracing subscriber
///
/// `RUST_LOG` overrides the configured level. When a log file is
/// configured, output goes to both stdout and the file; the returned guard
/// must be held until exit so the file writer flushes.
fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lanc_zoom={}", config.level)));

    let Some(file) = &config.file else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return Ok(None);
    };

    let path = Path::new(file);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| anyhow!("Log file path has no file name: {}", file))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();

    Ok(Some(guard))
}
